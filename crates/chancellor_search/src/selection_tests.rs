use super::*;
use chancellor_core::position::replay_from;

fn board(moves: &[&str]) -> Board {
    replay_from(&Board::default(), moves.iter().copied()).unwrap()
}

fn mv(uci: &str, white: u64, draws: u64, black: u64) -> MoveStats {
    MoveStats::new(uci, uci).with_counts(white, draws, black)
}

fn ucis(moves: &[MoveStats]) -> Vec<&str> {
    moves.iter().map(|m| m.uci.as_str()).collect()
}

#[derive(Debug)]
struct Failed;

impl From<ChessError> for Failed {
    fn from(_: ChessError) -> Self {
        Failed
    }
}

#[test]
fn test_floor_and_width() {
    let pruning = PruningConfig::default();
    assert!(is_below_floor(&pruning, 0.09));
    assert!(!is_below_floor(&pruning, 0.10));

    let width = WidthConfig {
        moves_to_consider: 2,
        additional_moves_at_root: 3,
    };
    assert_eq!(candidate_width(&width, true), 5);
    assert_eq!(candidate_width(&width, false), 2);
}

#[test]
fn test_castling_is_normalized() {
    let board = board(&["e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "f8c5"]);
    let moves = normalize_moves(&board, vec![mv("e1h1", 10, 0, 0), mv("d2d3", 5, 0, 0)]).unwrap();
    assert_eq!(ucis(&moves), ["e1g1", "d2d3"]);
    assert_eq!(moves[0].white, 10);

    assert!(normalize_moves(&board, vec![mv("e1c1", 1, 0, 0)]).is_err());
}

#[test]
fn test_retain_respects_width_and_share() {
    let ordered = vec![
        mv("e2e4", 50, 10, 40),
        mv("a2a3", 1, 0, 0),
        mv("d2d4", 40, 10, 30),
        mv("c2c4", 30, 10, 30),
    ];
    let mut offered = Vec::new();
    let selection = retain_candidates(&Board::default(), &ordered, 2, 0.02, |m| {
        offered.push(m.uci.clone());
        Ok::<_, Failed>(true)
    })
    .unwrap();
    assert_eq!(ucis(&selection.moves), ["e2e4", "d2d4"]);
    assert!(!selection.mate);
    assert_eq!(offered, ["e2e4", "d2d4"]);
}

#[test]
fn test_rejected_moves_free_their_slot() {
    let ordered = vec![
        mv("e2e4", 50, 10, 40),
        mv("d2d4", 40, 10, 30),
        mv("c2c4", 30, 10, 30),
    ];
    let selection = retain_candidates(&Board::default(), &ordered, 2, 0.0, |m| {
        Ok::<_, Failed>(m.uci != "d2d4")
    })
    .unwrap();
    assert_eq!(ucis(&selection.moves), ["e2e4", "c2c4"]);
}

#[test]
fn test_mate_in_one_wins_selection() {
    let board = board(&["f2f3", "e7e5", "g2g4"]);
    let ordered = vec![mv("b8c6", 30, 10, 60), mv("d8h4", 0, 0, 20)];
    let selection = retain_candidates(&board, &ordered, 3, 0.02, |m| {
        assert_ne!(m.uci, "d8h4");
        Ok::<_, Failed>(true)
    })
    .unwrap();
    assert!(selection.mate);
    assert_eq!(ucis(&selection.moves), ["d8h4"]);
    assert!(mates_immediately(&board, &ordered[1]).unwrap());
    assert!(!mates_immediately(&board, &ordered[0]).unwrap());
}

#[test]
fn test_probe_errors_propagate() {
    let ordered = vec![mv("e2e4", 1, 0, 0)];
    let result = retain_candidates(&Board::default(), &ordered, 2, 0.0, |_| Err::<bool, _>(Failed));
    assert!(result.is_err());

    let illegal = vec![mv("e2e5", 1, 0, 0)];
    let result = retain_candidates(&Board::default(), &illegal, 2, 0.0, |_| Ok::<_, Failed>(true));
    assert!(result.is_err());
}

#[test]
fn test_reply_branches() {
    let replies = vec![
        mv("c7c5", 300, 200, 500),
        mv("e7e5", 400, 300, 300),
        mv("a7a5", 5, 0, 0),
    ];
    let branches = reply_branches(replies, Color::White, 0.5, 0.01);
    assert_eq!(branches.len(), 2);
    // Best for White first.
    assert_eq!(branches[0].reply.uci, "e7e5");
    assert!((branches[0].share - 1000.0 / 2005.0).abs() < 1e-12);
    assert!((branches[0].probability - 0.5 * 1000.0 / 2005.0).abs() < 1e-12);
    assert_eq!(branches[1].reply.uci, "c7c5");
}

#[test]
fn test_single_game_reply_is_not_expanded() {
    let branches = reply_branches(vec![mv("e7e5", 1, 0, 0)], Color::White, 1.0, 0.01);
    assert_eq!(branches.len(), 1);
    assert_eq!(branches[0].share, 1.0);
    assert_eq!(branches[0].probability, 0.0);
    assert!(reply_branches(Vec::new(), Color::White, 1.0, 0.01).is_empty());
}

#[test]
fn test_ordering_without_included_lines_is_wilson() {
    let candidates = vec![mv("c2c4", 30, 10, 60), mv("d2d4", 100, 50, 50)];
    let ordered = order_candidates(&candidates, Color::White, &[], &[]);
    assert_eq!(ucis(&ordered), ["d2d4", "c2c4"]);
}
