use chancellor_core::ChessError;
use chancellor_oracle::OracleError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    /// An oracle could not be reached; the whole query is abandoned.
    #[error(transparent)]
    Oracle(#[from] OracleError),

    /// A stored or fetched move could not be replayed.
    #[error(transparent)]
    Chess(#[from] ChessError),

    #[error("search cancelled after {visited} nodes")]
    Cancelled { visited: u64 },

    #[error("invalid search configuration: {0}")]
    Config(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid report JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SearchError>;
