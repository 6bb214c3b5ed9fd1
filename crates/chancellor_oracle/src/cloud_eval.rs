//! Cloud engine evaluation client.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::OracleError;
use crate::settings::OracleSettings;
use crate::transport::{HttpTransport, Request, Retrying, Transport};

/// One principal variation as returned by the evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PvLine {
    /// Space separated coordinate moves
    pub moves: String,
    /// Centipawns for the side to move
    #[serde(default)]
    pub cp: Option<i32>,
    /// Moves to mate, negative when the side to move gets mated
    #[serde(default)]
    pub mate: Option<i32>,
}

impl PvLine {
    pub fn uci_moves(&self) -> impl Iterator<Item = &str> {
        self.moves.split_whitespace()
    }
}

/// Something that can analyse a position.
pub trait EngineOracle {
    /// Up to `multi_pv` lines in engine preference order, or `None` when the
    /// position has no evaluation.
    fn analyse(&self, fen: &str, multi_pv: usize) -> Result<Option<Vec<PvLine>>, OracleError>;
}

impl<T: EngineOracle + ?Sized> EngineOracle for &T {
    fn analyse(&self, fen: &str, multi_pv: usize) -> Result<Option<Vec<PvLine>>, OracleError> {
        (**self).analyse(fen, multi_pv)
    }
}

#[derive(Debug, Deserialize)]
struct CloudEvalResponse {
    #[serde(default)]
    pvs: Option<Vec<PvLine>>,
}

pub struct CloudEvalClient<T = Retrying<HttpTransport>> {
    transport: T,
    endpoint: String,
    token: Option<String>,
}

impl CloudEvalClient {
    pub fn from_settings(settings: &OracleSettings) -> Result<Self, OracleError> {
        let transport = Retrying::new(
            HttpTransport::new(settings.timeout())?,
            settings.retry.clone(),
        );
        Ok(Self::new(
            transport,
            settings.cloud_eval_url.clone(),
            settings.token.clone(),
        ))
    }
}

impl<T: Transport> CloudEvalClient<T> {
    pub fn new(transport: T, endpoint: impl Into<String>, token: Option<String>) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
            token,
        }
    }
}

impl<T: Transport> EngineOracle for CloudEvalClient<T> {
    fn analyse(&self, fen: &str, multi_pv: usize) -> Result<Option<Vec<PvLine>>, OracleError> {
        let request = Request::get(&self.endpoint)
            .param("fen", fen)
            .param("multiPv", multi_pv.to_string())
            .bearer(self.token.as_deref());
        let reply = self.transport.get(&request)?;

        // Rejected credentials need the caller's attention; anything else
        // unsuccessful just means the position is not analysed.
        if matches!(reply.status, 401 | 403) {
            return Err(OracleError::Status {
                url: request.url,
                status: reply.status,
            });
        }
        if !reply.is_success() {
            debug!(fen, status = reply.status, "no cloud evaluation");
            return Ok(None);
        }

        let response: CloudEvalResponse =
            serde_json::from_str(&reply.body).map_err(|source| OracleError::Decode {
                url: request.url.clone(),
                source,
            })?;
        Ok(response.pvs.filter(|pvs| !pvs.is_empty()))
    }
}

#[cfg(test)]
#[path = "cloud_eval_tests.rs"]
mod cloud_eval_tests;
