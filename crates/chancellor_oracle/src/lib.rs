//! Network oracles consulted by the search: aggregate game statistics per move
//! and multi-line engine evaluations, both behind a retrying HTTP transport.

pub mod cloud_eval;
pub mod error;
pub mod explorer;
pub mod settings;
pub mod transport;

pub use cloud_eval::{CloudEvalClient, EngineOracle, PvLine};
pub use error::OracleError;
pub use explorer::{ExplorerClient, ExplorerFilter, ExplorerFilters, MoveStatistics, Mover, Speed};
pub use settings::OracleSettings;
pub use transport::{HttpTransport, Reply, Request, RetryPolicy, Retrying, Transport};
