//! Success conditions
//!
//! A run watches for exactly one condition. The kind comes from `--r-type`
//! and the raw `--r-value` is parsed according to it up front, so a
//! malformed value never reaches the poll loop.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ConfigError;

/// Discriminator selected by `--r-type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ConditionKind {
    /// Match the HTTP status code
    Code,
    /// Match a literal substring of the response body
    Text,
    /// Match a top-level field of a JSON response body
    Json,
}

/// What a response has to look like for the run to succeed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuccessCondition {
    StatusCode(u16),
    TextContains(String),
    JsonField { key: String, expected: String },
}

impl SuccessCondition {
    /// Parse a raw value according to its kind
    ///
    /// `json` values are split on the first `:`, so the expected value may
    /// itself contain colons (`url:http://x`).
    pub fn parse(kind: ConditionKind, raw: &str) -> Result<Self, ConfigError> {
        match kind {
            ConditionKind::Code => {
                let code: u16 = raw
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidStatusCode(raw.to_string()))?;
                reqwest::StatusCode::from_u16(code)
                    .map_err(|_| ConfigError::InvalidStatusCode(raw.to_string()))?;
                Ok(Self::StatusCode(code))
            }
            ConditionKind::Text => Ok(Self::TextContains(raw.to_string())),
            ConditionKind::Json => {
                let (key, expected) = raw
                    .split_once(':')
                    .ok_or_else(|| ConfigError::MissingJsonSeparator(raw.to_string()))?;
                if key.is_empty() {
                    return Err(ConfigError::EmptyJsonKey(raw.to_string()));
                }
                Ok(Self::JsonField {
                    key: key.to_string(),
                    expected: expected.to_string(),
                })
            }
        }
    }

    pub fn kind(&self) -> ConditionKind {
        match self {
            Self::StatusCode(_) => ConditionKind::Code,
            Self::TextContains(_) => ConditionKind::Text,
            Self::JsonField { .. } => ConditionKind::Json,
        }
    }
}

impl fmt::Display for SuccessCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StatusCode(code) => write!(f, "status code {}", code),
            Self::TextContains(text) => write!(f, "body containing '{}'", text),
            Self::JsonField { key, expected } => write!(f, "json field '{}:{}'", key, expected),
        }
    }
}
