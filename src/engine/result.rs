//! Retry loop and run result types

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// How the backoff loop stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryExit {
    Satisfied {
        attempts: u32,
        message: String,
    },
    Cancelled {
        attempts: u32,
        last_reason: Option<String>,
    },
}

impl RetryExit {
    pub fn attempts(&self) -> u32 {
        match self {
            RetryExit::Satisfied { attempts, .. } | RetryExit::Cancelled { attempts, .. } => {
                *attempts
            }
        }
    }
}

/// Summary of a finished run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    pub attempts: u32,
    /// Satisfying message on success, last failure reason on timeout
    pub message: Option<String>,
}

impl RunReport {
    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }
}

/// Final result of a run
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    Success(RunReport),
    TimedOut(RunReport),
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Success(_))
    }

    pub fn report(&self) -> &RunReport {
        match self {
            RunOutcome::Success(report) | RunOutcome::TimedOut(report) => report,
        }
    }

    /// Process exit code: 0 on success, 1 on timeout
    pub fn exit_code(&self) -> u8 {
        match self {
            RunOutcome::Success(_) => 0,
            RunOutcome::TimedOut(_) => 1,
        }
    }
}
