use super::*;
use crate::types::AnnotatedMove;

fn mv(uci: &str, san: &str, white: u64, draws: u64, black: u64) -> MoveStats {
    MoveStats::new(uci, san).with_counts(white, draws, black)
}

fn ucis(moves: &[MoveStats]) -> Vec<&str> {
    moves.iter().map(|m| m.uci.as_str()).collect()
}

fn included_line() -> Variant {
    let moves = [
        ("e2e4", "e4"),
        ("e7e5", "e5"),
        ("f1c4", "Bc4"),
        ("g8f6", "Nf6"),
        ("d2d4", "d4"),
        ("e5d4", "exd4"),
        ("g1f3", "Nf3"),
        ("b8c6", "Nc6"),
        ("e1g1", "O-O"),
        ("f6e4", "Nxe4"),
    ];
    Variant::new(
        moves
            .iter()
            .map(|(uci, san)| AnnotatedMove::from(mv(uci, san, 400, 200, 400)))
            .collect(),
        500.0,
        0.0,
    )
}

#[test]
fn test_wilson_prefers_larger_sample() {
    let mut moves = vec![
        mv("e2e4", "e4", 40, 20, 40),
        mv("d2d4", "d4", 100, 50, 50),
        mv("c2c4", "c4", 30, 10, 60),
    ];
    sort_by_win_rate(&mut moves, Color::White);
    assert_eq!(ucis(&moves), vec!["d2d4", "e2e4", "c2c4"]);
}

#[test]
fn test_wilson_score_values() {
    let even = mv("e2e4", "e4", 40, 20, 40);
    assert!((wilson_score(&even, Color::White) - 0.40383).abs() < 1e-4);
    assert_eq!(wilson_score(&MoveStats::new("e2e4", "e4"), Color::White), 0.0);

    let black_heavy = mv("c2c4", "c4", 30, 10, 60);
    assert!(wilson_score(&black_heavy, Color::Black) > wilson_score(&black_heavy, Color::White));
}

#[test]
fn test_sort_by_popularity() {
    let mut moves = vec![
        mv("e2e4", "e4", 1, 1, 1),
        mv("d2d4", "d4", 10, 0, 0),
        mv("c2c4", "c4", 2, 2, 2),
    ];
    sort_by_popularity(&mut moves);
    assert_eq!(ucis(&moves), vec!["d2d4", "c2c4", "e2e4"]);
    assert_eq!(total_occurrences(&moves), 19);
    assert!((share(&moves[0], 19) - 10.0 / 19.0).abs() < 1e-12);
    assert_eq!(share(&moves[0], 0), 0.0);
}

#[test]
fn test_included_moves_come_first() {
    let variant = included_line();
    let play: Vec<MoveStats> = variant.stats().take(2).cloned().collect();
    let candidates = vec![
        mv("f1c4", "Bc4", 450, 100, 450),
        mv("g1f3", "Nf3", 450, 200, 350),
        mv("d2d4", "d4", 500, 250, 250),
        mv("d2d3", "d3", 300, 200, 500),
        mv("f2f4", "f4", 400, 200, 400),
    ];

    let sorted = sort_by_included_and_win_rate(&candidates, Color::White, &play, &[variant]);
    assert_eq!(
        ucis(&sorted),
        vec!["f1c4", "d2d4", "g1f3", "f2f4", "d2d3"]
    );
}

#[test]
fn test_early_arrival_beats_better_statistics() {
    let variant = included_line();
    let play: Vec<MoveStats> = variant.stats().take(2).cloned().collect();
    let candidates = vec![
        mv("g1f3", "Nf3", 600, 200, 200),
        mv("d2d4", "d4", 200, 200, 600),
    ];

    let sorted = sort_by_included_and_win_rate(&candidates, Color::White, &play, &[variant]);
    assert_eq!(ucis(&sorted), vec!["d2d4", "g1f3"]);
}

#[test]
fn test_no_included_lines_is_plain_wilson_order() {
    let candidates = vec![
        mv("e2e4", "e4", 40, 20, 40),
        mv("d2d4", "d4", 100, 50, 50),
    ];
    let sorted = sort_by_included_and_win_rate(&candidates, Color::White, &[], &[]);
    assert_eq!(ucis(&sorted), vec!["d2d4", "e2e4"]);
}
