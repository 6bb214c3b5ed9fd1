use super::*;

fn stats(ucis: &[&str]) -> Vec<MoveStats> {
    annotate_line(&Board::default(), ucis.iter().copied()).unwrap()
}

fn san_of(fen: &str, uci: &str) -> String {
    let board = parse_fen(fen).unwrap();
    let mv = parse_uci(&board, uci).unwrap();
    san(&board, mv)
}

#[test]
fn test_position_key_strips_move_counters() {
    let a = PositionKey::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
    let b = PositionKey::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 12 40");
    assert_eq!(a, b);
    assert_eq!(
        a.as_str(),
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -"
    );
}

#[test]
fn test_castling_accepts_both_spellings() {
    let board = parse_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
    let standard = parse_uci(&board, "e1g1").unwrap();
    let king_takes_rook = parse_uci(&board, "e1h1").unwrap();
    assert_eq!(standard, king_takes_rook);
    assert_eq!(to_uci(&board, standard), "e1g1");
    assert_eq!(san(&board, standard), "O-O");

    let long = parse_uci(&board, "e1c1").unwrap();
    assert_eq!(san(&board, long), "O-O-O");
    assert_eq!(to_uci(&board, long), "e1c1");
}

#[test]
fn test_illegal_move_is_rejected() {
    let board = Board::default();
    assert!(matches!(
        parse_uci(&board, "e2e5"),
        Err(ChessError::IllegalMove { .. })
    ));
    assert!(parse_uci(&board, "zz").is_err());
}

#[test]
fn test_san_basic_moves() {
    let start = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
    assert_eq!(san_of(start, "e2e4"), "e4");
    assert_eq!(san_of(start, "g1f3"), "Nf3");

    let line = stats(&["e2e4", "d7d5", "e4d5", "d8d5", "b1c3"]);
    let sans: Vec<_> = line.iter().map(|m| m.san.as_str()).collect();
    assert_eq!(sans, vec!["e4", "d5", "exd5", "Qxd5", "Nc3"]);
}

#[test]
fn test_san_disambiguation() {
    assert_eq!(san_of("7k/8/8/8/8/8/8/R4R1K w - - 0 1", "a1d1"), "Rad1");
    assert_eq!(san_of("7k/8/8/R7/8/8/8/R6K w - - 0 1", "a1a3"), "R1a3");
}

#[test]
fn test_san_promotion_and_en_passant() {
    assert_eq!(san_of("8/P6k/8/8/8/8/8/K7 w - - 0 1", "a7a8q"), "a8=Q");
    assert_eq!(san_of("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2", "e5d6"), "exd6");
}

#[test]
fn test_checkmate_suffix_and_detection() {
    let line = stats(&["f2f3", "e7e5", "g2g4", "d8h4"]);
    assert_eq!(line[3].san, "Qh4#");
    let board = replay(&line).unwrap();
    assert!(is_checkmate(&board));
    assert!(!has_legal_moves(&board));
}

#[test]
fn test_material_balance_after_capture() {
    assert_eq!(material_balance(&Board::default()), 0);
    let board = replay(&stats(&["e2e4", "d7d5", "e4d5"])).unwrap();
    assert_eq!(material_balance(&board), 100);
}

#[test]
fn test_captured_piece() {
    let board = replay(&stats(&["e2e4", "d7d5"])).unwrap();
    let capture = parse_uci(&board, "e4d5").unwrap();
    assert_eq!(captured_piece(&board, capture), Some(Piece::Pawn));
    let quiet = parse_uci(&board, "g1f3").unwrap();
    assert!(!is_capture(&board, quiet));
}

#[test]
fn test_pawn_threats() {
    let board = replay(&stats(&["e2e4", "e7e5", "d2d4", "b8c6", "d4d5"])).unwrap();
    assert!(pawns_threaten_pieces(&board, Color::White));
    assert!(!pawns_threaten_pieces(&board, Color::Black));
}

#[test]
fn test_transposition_detection() {
    let a = stats(&["g1f3", "g8f6", "b1c3"]);
    let b = stats(&["b1c3", "g8f6", "g1f3"]);
    assert!(is_transposition(&a, &b));
    assert!(!is_transposition(&a, &stats(&["g1f3", "g8f6"])));
    assert!(is_legal_line(&a));
    assert!(!is_legal_line(&[MoveStats::new("e2e5", "e5")]));
}
