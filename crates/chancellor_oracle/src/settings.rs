//! Endpoint configuration for the oracles.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::transport::RetryPolicy;

pub const DEFAULT_EXPLORER_URL: &str = "http://localhost:9002/lichess";
pub const DEFAULT_CLOUD_EVAL_URL: &str = "http://127.0.0.1:9003/api/cloud-eval";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleSettings {
    pub explorer_url: String,
    pub cloud_eval_url: String,
    /// Bearer token for the evaluator
    pub token: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    pub retry: RetryPolicy,
}

impl OracleSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self {
            explorer_url: DEFAULT_EXPLORER_URL.to_string(),
            cloud_eval_url: DEFAULT_CLOUD_EVAL_URL.to_string(),
            token: None,
            timeout_secs: 30,
            retry: RetryPolicy::default(),
        }
    }
}
