//! Poll engine error types

use crate::config::ConfigError;

/// Errors that stop a run before the first probe is sent
///
/// Per-attempt failures never surface here: transport errors and
/// mismatched responses are retried until the deadline.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}
