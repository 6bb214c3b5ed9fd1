//! Board arrows for the line the engine just scored.

use chancellor_core::position::parse_uci;
use chancellor_core::{ChessError, Evaluation, MoveStats};
use cozy_chess::{Board, Color, Piece};
use serde::Serialize;

/// Arrows drawn for at most this many plies after the root.
const MAX_ARROWS: usize = 6;

/// Advantage above which the line counts as going our way.
const CLEAR_EDGE_CP: i32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Brush {
    Blue,
    Green,
    Red,
    Yellow,
}

/// Piece drawn at the arrow tail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieceHint {
    pub role: &'static str,
    pub color: &'static str,
    pub scale: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    pub orig: String,
    pub dest: String,
    pub brush: Brush,
    pub line_width: u8,
    pub piece: PieceHint,
}

fn role(piece: Piece) -> &'static str {
    match piece {
        Piece::Pawn => "pawn",
        Piece::Knight => "knight",
        Piece::Bishop => "bishop",
        Piece::Rook => "rook",
        Piece::Queen => "queen",
        Piece::King => "king",
    }
}

fn color_name(color: Color) -> &'static str {
    match color {
        Color::White => "white",
        Color::Black => "black",
    }
}

/// Arrows for the moves of `play` after `root_ply`.
///
/// Our moves are blue when `evaluation` shows us clearly ahead and green
/// otherwise; replies are red when we are clearly behind and yellow otherwise.
/// Later arrows are thinner and their pieces smaller.
pub fn best_line_shapes(
    play: &[MoveStats],
    evaluation: &Evaluation,
    root_ply: usize,
    sign: i32,
) -> Result<Vec<Shape>, ChessError> {
    let ours = sign * evaluation.centipawns;
    let mut board = Board::default();
    let mut shapes = Vec::new();

    for (ply, mv) in play.iter().enumerate() {
        let parsed = parse_uci(&board, &mv.uci)?;
        let index = ply.wrapping_sub(root_ply);
        if ply >= root_ply && index < MAX_ARROWS && mv.uci.len() >= 4 {
            let brush = match (index % 2 == 0, ours) {
                (true, cp) if cp > CLEAR_EDGE_CP => Brush::Blue,
                (true, _) => Brush::Green,
                (false, cp) if cp < -CLEAR_EDGE_CP => Brush::Red,
                (false, _) => Brush::Yellow,
            };
            shapes.push(Shape {
                orig: mv.uci[0..2].to_string(),
                dest: mv.uci[2..4].to_string(),
                brush,
                line_width: (10 - index.min(9)) as u8,
                piece: PieceHint {
                    role: role(board.piece_on(parsed.from).unwrap_or(Piece::Pawn)),
                    color: color_name(board.side_to_move()),
                    scale: 1.0 - index as f64 / 10.0,
                },
            });
        }
        board.play_unchecked(parsed);
    }
    Ok(shapes)
}
