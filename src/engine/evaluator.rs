//! Match evaluation
//!
//! Judges one `ProbeResult` against the run's success condition. Every
//! verdict carries a human-readable message for the progress log.
//!
//! JSON fields are compared loosely: the field value is rendered as text
//! (strings without quotes, everything else as JSON) and compared with the
//! expected string, so `5` matches `"5"` and `true` matches `"true"`.

use serde_json::Value;

use crate::config::SuccessCondition;
use crate::probe::ProbeResult;

/// Judgment for one probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Satisfied(String),
    NotSatisfied(String),
}

impl Verdict {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, Verdict::Satisfied(_))
    }

    pub fn message(&self) -> &str {
        match self {
            Verdict::Satisfied(message) | Verdict::NotSatisfied(message) => message,
        }
    }
}

/// Decides whether a probe result ends the run
pub trait MatchEvaluator: Send + Sync {
    fn evaluate(&self, result: &ProbeResult) -> Verdict;

    /// Short description for log lines
    fn describe(&self) -> String {
        "custom condition".to_string()
    }
}

impl MatchEvaluator for SuccessCondition {
    fn evaluate(&self, result: &ProbeResult) -> Verdict {
        evaluate(self, result)
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

pub fn evaluate(condition: &SuccessCondition, result: &ProbeResult) -> Verdict {
    match condition {
        SuccessCondition::StatusCode(expected) => {
            if result.status == *expected {
                Verdict::Satisfied(format!(
                    "Response code conditions met, found {}",
                    result.status
                ))
            } else {
                Verdict::NotSatisfied(format!(
                    "Response code was {}, looking for {}",
                    result.status, expected
                ))
            }
        }
        SuccessCondition::TextContains(text) => {
            if result.text().contains(text.as_str()) {
                Verdict::Satisfied(format!(
                    "Response text conditions met, found {} in response text",
                    text
                ))
            } else {
                Verdict::NotSatisfied(format!("Response text did not contain {}", text))
            }
        }
        SuccessCondition::JsonField { key, expected } => evaluate_json(key, expected, result),
    }
}

fn evaluate_json(key: &str, expected: &str, result: &ProbeResult) -> Verdict {
    let body: Value = match serde_json::from_slice(&result.body) {
        Ok(body) => body,
        Err(e) => {
            return Verdict::NotSatisfied(format!("Response body is not valid JSON: {}", e));
        }
    };

    match body.get(key) {
        Some(found) => {
            let found = loose_string(found);
            if found == expected {
                Verdict::Satisfied(format!(
                    "Response JSON contains matching key and value. Found '{}:{}'",
                    key, found
                ))
            } else {
                Verdict::NotSatisfied(format!(
                    "Response JSON contains matching key but wrong value. Value found is {}, looking for {}.",
                    found, expected
                ))
            }
        }
        None => Verdict::NotSatisfied(format!(
            "Response key/value pair not matched, key '{}' not found. Retrying...",
            key
        )),
    }
}

fn loose_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
