//! # Signalman
//!
//! Polls a single HTTP(S) endpoint until a success condition shows up in
//! the response or an overall deadline elapses. Meant as a deployment gate:
//! succeed as soon as a service is healthy, fail after a bounded wait.
//!
//! ## Conditions
//!
//! - **code**: the response status equals a given code
//! - **text**: the response body contains a literal substring
//! - **json**: a top-level field of a JSON body equals a given value
//!
//! ## How a run works
//!
//! Each attempt is one GET. A transport failure or a mismatching response
//! is retried after an exponential backoff (1s, 2s, 4s, 8s, then 10s
//! forever). The whole retry loop races a deadline; when the deadline
//! wins, the in-flight attempt or backoff sleep is abandoned and the run
//! reports a timeout.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use signalman::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let condition = SuccessCondition::parse(ConditionKind::Json, "status:ready")?;
//!     let target = EndpointTarget::build("localhost:8080/health", None, false)?;
//!     let config = PollConfig::from_timeout_minutes(5)?;
//!
//!     let outcome = Poller::new(config)?.run(&target, &condition).await;
//!     std::process::exit(i32::from(outcome.exit_code()));
//! }
//! ```

pub mod config;
pub mod engine;
pub mod probe;

// Re-export main types
pub use config::{
    parse_headers, BackoffPolicy, ConditionKind, ConfigError, EndpointTarget, PollConfig, Scheme,
    SuccessCondition,
};
pub use engine::{
    evaluate, run_with_deadline, BackoffRetrier, DeadlineSupervisor, MatchEvaluator, PollError,
    Poller, RetryExit, RunOutcome, RunReport, Verdict,
};
pub use probe::{HttpProber, ProbeResult, Prober, TransportError};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{
        parse_headers, ConditionKind, ConfigError, EndpointTarget, PollConfig, SuccessCondition,
    };
    pub use crate::engine::{MatchEvaluator, PollError, Poller, RunOutcome, RunReport, Verdict};
    pub use crate::probe::{ProbeResult, Prober};
}
