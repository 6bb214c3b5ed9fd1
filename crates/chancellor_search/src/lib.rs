//! Opening-tree expectimax search.
//!
//! Starting from a played sequence, the engine follows our best-scoring
//! candidate moves and every realistic opponent reply, weighting replies by how
//! often real players chose them. Nodes whose probability of being reached
//! drops below a floor are scored by the engine oracle instead of expanded.
//! The result is the single best line tree for the side to move, annotated
//! with move-quality glyphs and refutations of popular mistakes.

pub mod annotate;
pub mod blunder;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod events;
pub mod leaf_count;
pub mod principal;
pub mod query;
pub mod selection;
pub mod shapes;
pub mod stop;

pub use cache::{CacheManager, CachePolicy, CacheStats};
pub use config::SearchConfig;
pub use engine::{SearchEngine, SearchNode};
pub use error::SearchError;
pub use evaluator::Evaluator;
pub use events::{EventSink, SearchEvent};
pub use leaf_count::Census;
pub use query::{run_query, QueryReport, QueryRequest, ScenarioReport};
pub use shapes::{Brush, Shape};
pub use stop::StopSignal;
