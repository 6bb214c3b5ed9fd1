use thiserror::Error;

#[derive(Debug, Error)]
pub enum OracleError {
    /// Every attempt was rate limited or failed to connect. Callers should
    /// re-authenticate or try again later.
    #[error("failed to fetch {url} after {attempts} attempts")]
    RetriesExhausted { url: String, attempts: u32 },

    #[error("request to {url} failed: {reason}")]
    Network { url: String, reason: String },

    #[error("unexpected HTTP status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("malformed response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl OracleError {
    /// Whether another attempt at the same request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, OracleError::Network { .. })
    }
}
