//! HTTP prober - one GET per attempt via reqwest
//!
//! The client carries a per-request timeout so a stalled connection turns
//! into a retryable `TransportError`. Redirects follow reqwest's default
//! policy. With debug enabled the request headers, response headers and
//! body are logged; that never changes the returned result. The request dump
//! is taken before the client fills in its defaults, so the user agent is
//! logged alongside it.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

use super::{ProbeResult, Prober, TransportError};
use crate::config::{EndpointTarget, PollConfig};
use crate::engine::PollError;

/// Sent on every request unless the caller supplies its own `user-agent`
pub const USER_AGENT: &str = concat!("signalman/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct HttpProber {
    client: reqwest::Client,
    timeout: Duration,
    debug: bool,
}

impl HttpProber {
    pub fn new(config: &PollConfig) -> Result<Self, PollError> {
        let timeout = config.request_timeout();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| PollError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            timeout,
            debug: config.debug,
        })
    }

    fn build_request(&self, target: &EndpointTarget) -> Result<reqwest::Request, TransportError> {
        let url = target
            .url()
            .map_err(|e| TransportError::InvalidTarget(e.to_string()))?;

        let mut request = self.client.get(url);
        for (name, value) in &target.headers {
            request = request.header(name, value);
        }

        request
            .build()
            .map_err(|e| TransportError::InvalidTarget(e.to_string()))
    }

    fn classify(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(self.timeout)
        } else if err.is_connect() {
            TransportError::Connect(error_chain(&err))
        } else {
            TransportError::Request(error_chain(&err))
        }
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, target: &EndpointTarget) -> Result<ProbeResult, TransportError> {
        let request = self.build_request(target)?;
        let url = request.url().clone();

        if self.debug {
            debug!(
                "Sent: Headers:{:?} User-Agent:{}",
                request.headers(),
                USER_AGENT
            );
        }

        let start = std::time::Instant::now();
        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(self.timeout)
            } else {
                TransportError::Body(error_chain(&e))
            }
        })?;

        info!(
            "GET {} -> {} ({}ms)",
            url,
            status,
            start.elapsed().as_millis()
        );

        if self.debug {
            debug!(
                "Received: Headers:{:?} Body:{}",
                headers,
                String::from_utf8_lossy(&body)
            );
        }

        Ok(ProbeResult {
            status,
            headers,
            body,
        })
    }
}

/// reqwest's top-level message hides the cause ("error sending request"),
/// so append the source chain
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
