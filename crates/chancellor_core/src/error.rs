use thiserror::Error;

/// Failures while decoding positions or replaying a stored move sequence.
///
/// Either one means the input data is corrupt, so callers abort instead of
/// trying to continue from a partially replayed board.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChessError {
    #[error("invalid FEN `{fen}`: {reason}")]
    InvalidFen { fen: String, reason: String },

    #[error("illegal move `{mv}` in position `{fen}`")]
    IllegalMove { mv: String, fen: String },
}
