//! Blocking HTTP GET transport with rate-limit aware retries.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::OracleError;

const USER_AGENT: &str = concat!("chancellor/", env!("CARGO_PKG_VERSION"));

/// HTTP 429
pub const TOO_MANY_REQUESTS: u16 = 429;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub url: String,
    pub query: Vec<(String, String)>,
    /// Sent as `Authorization: Bearer ...` when present
    pub bearer: Option<String>,
}

impl Request {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
            bearer: None,
        }
    }

    pub fn param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    pub fn bearer(mut self, token: Option<&str>) -> Self {
        self.bearer = token.map(str::to_string);
        self
    }

    /// Query parameter value, if set.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status == TOO_MANY_REQUESTS
    }
}

/// Something that can perform a GET request.
pub trait Transport {
    fn get(&self, request: &Request) -> Result<Reply, OracleError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, request: &Request) -> Result<Reply, OracleError> {
        (**self).get(request)
    }
}

/// `reqwest` blocking client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, OracleError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| OracleError::Client(e.to_string()))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, request: &Request) -> Result<Reply, OracleError> {
        let mut builder = self.client.get(&request.url).query(&request.query);
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }

        let network = |e: reqwest::Error| OracleError::Network {
            url: request.url.clone(),
            reason: e.to_string(),
        };
        let response = builder.send().map_err(network)?;
        let status = response.status().as_u16();
        let body = response.text().map_err(network)?;
        debug!(url = %request.url, status, bytes = body.len(), "oracle reply");
        Ok(Reply { status, body })
    }
}

/// How often and how patiently to retry a rate-limited request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Wait after the first failed attempt, in milliseconds
    pub base_delay_ms: u64,
    /// Extra wait added per further attempt, in milliseconds
    pub step_ms: u64,
}

impl RetryPolicy {
    /// Retry immediately; for tests and local mirrors.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay_ms: 0,
            step_ms: 0,
        }
    }

    pub fn delay_for(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.base_delay_ms + self.step_ms * attempt as u64)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 60_000,
            step_ms: 1_000,
        }
    }
}

/// Wraps a transport, retrying rate-limited and unreachable requests with a
/// growing delay. Any other reply, successful or not, is passed through.
#[derive(Debug, Clone)]
pub struct Retrying<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T: Transport> Retrying<T> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T: Transport> Transport for Retrying<T> {
    fn get(&self, request: &Request) -> Result<Reply, OracleError> {
        let attempts = self.policy.max_attempts.max(1);
        for attempt in 0..attempts {
            match self.inner.get(request) {
                Ok(reply) if !reply.is_rate_limited() => return Ok(reply),
                Ok(_) => warn!(url = %request.url, attempt, "rate limited"),
                Err(e) if e.is_transient() => {
                    warn!(url = %request.url, attempt, error = %e, "request failed")
                }
                Err(e) => return Err(e),
            }
            if attempt + 1 < attempts {
                let delay = self.policy.delay_for(attempt);
                if !delay.is_zero() {
                    std::thread::sleep(delay);
                }
            }
        }
        Err(OracleError::RetriesExhausted {
            url: request.url.clone(),
            attempts,
        })
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod transport_tests;
