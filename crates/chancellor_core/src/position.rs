//! Position helpers on top of `cozy-chess`: transposition keys, move notation,
//! replaying stored lines and the material/threat queries used when a
//! refutation line is cut down.

use cozy_chess::{get_pawn_attacks, Board, Color, File, Move, Piece, Rank, Square};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ChessError;
use crate::types::MoveStats;

/// Board, side to move, castling rights and en passant square of a position.
///
/// Move counters are left out so that transpositions and repetitions compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PositionKey(String);

impl PositionKey {
    pub fn from_fen(fen: &str) -> Self {
        Self(fen.split_whitespace().take(4).collect::<Vec<_>>().join(" "))
    }

    pub fn of(board: &Board) -> Self {
        Self::from_fen(&board.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PositionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn parse_fen(fen: &str) -> Result<Board, ChessError> {
    Board::from_fen(fen, false).map_err(|e| ChessError::InvalidFen {
        fen: fen.to_string(),
        reason: format!("{e:?}"),
    })
}

pub fn legal_moves(board: &Board) -> Vec<Move> {
    let mut moves = Vec::new();
    board.generate_moves(|piece_moves| {
        moves.extend(piece_moves);
        false
    });
    moves
}

pub fn has_legal_moves(board: &Board) -> bool {
    board.generate_moves(|piece_moves| !piece_moves.is_empty())
}

pub fn is_checkmate(board: &Board) -> bool {
    !board.checkers().is_empty() && !has_legal_moves(board)
}

/// Square the king lands on when `mv` castles, encoded as king-takes-rook.
fn castling_destination(board: &Board, mv: Move) -> Option<Square> {
    let side = board.side_to_move();
    if board.piece_on(mv.from) != Some(Piece::King) || board.color_on(mv.to) != Some(side) {
        return None;
    }
    let file = if is_kingside(mv) {
        File::G
    } else {
        File::C
    };
    Some(Square::new(file, mv.from.rank()))
}

fn is_kingside(mv: Move) -> bool {
    mv.to.file() as u8 > mv.from.file() as u8
}

fn is_castle(board: &Board, mv: Move) -> bool {
    castling_destination(board, mv).is_some()
}

/// Parse a coordinate move by matching it against the legal moves.
///
/// Castling is accepted both as king-to-destination (`e1g1`) and as
/// king-takes-rook (`e1h1`).
pub fn parse_uci(board: &Board, uci: &str) -> Result<Move, ChessError> {
    let illegal = || ChessError::IllegalMove {
        mv: uci.to_string(),
        fen: board.to_string(),
    };
    let parsed: Move = uci.parse().map_err(|_| illegal())?;

    legal_moves(board)
        .into_iter()
        .find(|m| {
            m.from == parsed.from
                && m.promotion == parsed.promotion
                && (m.to == parsed.to || castling_destination(board, *m) == Some(parsed.to))
        })
        .ok_or_else(illegal)
}

/// Coordinate notation with castling written as king-to-destination.
pub fn to_uci(board: &Board, mv: Move) -> String {
    match castling_destination(board, mv) {
        Some(to) => format!("{}{}", mv.from, to),
        None => mv.to_string(),
    }
}

fn piece_letter(piece: Piece) -> char {
    match piece {
        Piece::Pawn => 'P',
        Piece::Knight => 'N',
        Piece::Bishop => 'B',
        Piece::Rook => 'R',
        Piece::Queen => 'Q',
        Piece::King => 'K',
    }
}

fn file_char(file: File) -> char {
    char::from(b'a' + file as u8)
}

fn rank_char(rank: Rank) -> char {
    char::from(b'1' + rank as u8)
}

/// The piece `mv` removes from the board, if any (en passant included).
pub fn captured_piece(board: &Board, mv: Move) -> Option<Piece> {
    let them = !board.side_to_move();
    if board.color_on(mv.to) == Some(them) {
        return board.piece_on(mv.to);
    }
    if board.piece_on(mv.from) == Some(Piece::Pawn) && mv.from.file() != mv.to.file() {
        return Some(Piece::Pawn);
    }
    None
}

pub fn is_capture(board: &Board, mv: Move) -> bool {
    captured_piece(board, mv).is_some()
}

/// Standard algebraic notation for a legal move.
pub fn san(board: &Board, mv: Move) -> String {
    let mut san = String::new();

    if is_castle(board, mv) {
        san.push_str(if is_kingside(mv) {
            "O-O"
        } else {
            "O-O-O"
        });
    } else {
        let piece = board.piece_on(mv.from).unwrap_or(Piece::Pawn);
        let capture = is_capture(board, mv);

        if piece == Piece::Pawn {
            if capture {
                san.push(file_char(mv.from.file()));
                san.push('x');
            }
            san.push_str(&mv.to.to_string());
            if let Some(promotion) = mv.promotion {
                san.push('=');
                san.push(piece_letter(promotion));
            }
        } else {
            san.push(piece_letter(piece));

            let mut rivals = Vec::new();
            board.generate_moves(|piece_moves| {
                if piece_moves.piece == piece {
                    for m in piece_moves {
                        if m.to == mv.to && m.from != mv.from {
                            rivals.push(m.from);
                        }
                    }
                }
                false
            });
            if !rivals.is_empty() {
                let file_clash = rivals.iter().any(|sq| sq.file() == mv.from.file());
                let rank_clash = rivals.iter().any(|sq| sq.rank() == mv.from.rank());
                if !file_clash {
                    san.push(file_char(mv.from.file()));
                } else if !rank_clash {
                    san.push(rank_char(mv.from.rank()));
                } else {
                    san.push_str(&mv.from.to_string());
                }
            }

            if capture {
                san.push('x');
            }
            san.push_str(&mv.to.to_string());
        }
    }

    let mut after = board.clone();
    after.play_unchecked(mv);
    if !after.checkers().is_empty() {
        san.push(if has_legal_moves(&after) { '+' } else { '#' });
    }
    san
}

/// Play a coordinate move, returning it as parsed.
pub fn play_uci(board: &mut Board, uci: &str) -> Result<Move, ChessError> {
    let mv = parse_uci(board, uci)?;
    board.play_unchecked(mv);
    Ok(mv)
}

/// Replay a stored line from the standard starting position.
pub fn replay(moves: &[MoveStats]) -> Result<Board, ChessError> {
    replay_from(&Board::default(), moves.iter().map(|m| m.uci.as_str()))
}

pub fn replay_from<'a>(
    start: &Board,
    ucis: impl IntoIterator<Item = &'a str>,
) -> Result<Board, ChessError> {
    let mut board = start.clone();
    for uci in ucis {
        play_uci(&mut board, uci)?;
    }
    Ok(board)
}

/// Convert a coordinate line into moves carrying their algebraic notation.
pub fn annotate_line<'a>(
    start: &Board,
    ucis: impl IntoIterator<Item = &'a str>,
) -> Result<Vec<MoveStats>, ChessError> {
    let mut board = start.clone();
    let mut line = Vec::new();
    for uci in ucis {
        let mv = parse_uci(&board, uci)?;
        line.push(MoveStats::new(to_uci(&board, mv), san(&board, mv)));
        board.play_unchecked(mv);
    }
    Ok(line)
}

/// Whether both lines are legal and end in the same position.
pub fn is_transposition(a: &[MoveStats], b: &[MoveStats]) -> bool {
    match (replay(a), replay(b)) {
        (Ok(x), Ok(y)) => PositionKey::of(&x) == PositionKey::of(&y),
        _ => false,
    }
}

pub fn is_legal_line(moves: &[MoveStats]) -> bool {
    replay(moves).is_ok()
}

pub fn piece_value(piece: Piece) -> i32 {
    match piece {
        Piece::Pawn => 100,
        Piece::Knight | Piece::Bishop => 300,
        Piece::Rook => 500,
        Piece::Queen => 900,
        Piece::King => 0,
    }
}

/// White material minus Black material, in centipawns.
pub fn material_balance(board: &Board) -> i32 {
    Piece::ALL
        .iter()
        .map(|&piece| {
            let white = board.colored_pieces(Color::White, piece).len() as i32;
            let black = board.colored_pieces(Color::Black, piece).len() as i32;
            (white - black) * piece_value(piece)
        })
        .sum()
}

/// Whether any pawn of `color` attacks an enemy piece other than a pawn.
///
/// Pins are ignored.
pub fn pawns_threaten_pieces(board: &Board, color: Color) -> bool {
    let targets = board.colors(!color) & !board.pieces(Piece::Pawn);
    board
        .colored_pieces(color, Piece::Pawn)
        .into_iter()
        .any(|sq| !(get_pawn_attacks(sq, color) & targets).is_empty())
}

#[cfg(test)]
#[path = "position_tests.rs"]
mod position_tests;
