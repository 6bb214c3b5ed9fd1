//! Shared building blocks for the opening-tree search: the move/evaluation data
//! model, position helpers built on `cozy-chess`, the centipawn to win-rate model,
//! candidate ranking and line rendering.

pub mod error;
pub mod pgn;
pub mod position;
pub mod ranking;
pub mod types;
pub mod win_rate;

pub use error::ChessError;
pub use position::PositionKey;
pub use types::*;
