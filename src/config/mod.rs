//! Run configuration types
//!
//! Everything here is built once from the command line, before any network
//! activity, and is immutable afterwards:
//! - `condition` - SuccessCondition and the raw `--r-type`/`--r-value` parser
//! - `endpoint` - EndpointTarget and the URL normalizer
//! - `headers` - `name:value` header entry parsing
//! - `poll_config` - deadline, backoff and transport settings

pub mod condition;
pub mod endpoint;
pub mod headers;
pub mod poll_config;

pub use condition::{ConditionKind, SuccessCondition};
pub use endpoint::{EndpointTarget, Scheme};
pub use headers::parse_headers;
pub use poll_config::{BackoffPolicy, PollConfig};

/// Errors raised while turning command-line input into run configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid status code '{0}': expected an integer between 100 and 999")]
    InvalidStatusCode(String),

    #[error("Invalid json condition '{0}': expected key:value")]
    MissingJsonSeparator(String),

    #[error("Invalid json condition '{0}': key must not be empty")]
    EmptyJsonKey(String),

    #[error("Invalid endpoint '{0}': no host found")]
    EmptyHost(String),

    #[error("Invalid port '{port}' in endpoint '{endpoint}'")]
    InvalidPort { endpoint: String, port: String },

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Timeout must be at least one minute")]
    ZeroTimeout,
}
