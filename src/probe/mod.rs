//! Probe execution
//!
//! A probe is one HTTP GET against the target. Any complete HTTP response,
//! including a 500, is a `ProbeResult`; only failures to obtain a response
//! at all are `TransportError`s.
//!
//! - `http`: reqwest-backed prober used by the CLI

use async_trait::async_trait;
use bytes::Bytes;
use std::borrow::Cow;
use std::collections::HashMap;
use std::time::Duration;

use crate::config::EndpointTarget;

pub mod http;

pub use http::HttpProber;

/// Failure to obtain any HTTP response for one attempt
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Failed to read response body: {0}")]
    Body(String),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),
}

/// Outcome of one HTTP attempt
#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

impl ProbeResult {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    /// Body decoded as UTF-8, with invalid sequences replaced
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Issues a single probe against a target
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, target: &EndpointTarget) -> Result<ProbeResult, TransportError>;
}

#[async_trait]
impl<P: Prober + ?Sized> Prober for std::sync::Arc<P> {
    async fn probe(&self, target: &EndpointTarget) -> Result<ProbeResult, TransportError> {
        (**self).probe(target).await
    }
}
