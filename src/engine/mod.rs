//! Poll engine
//!
//! This module contains:
//! - `evaluator` - Verdicts and the match evaluator
//! - `backoff` - The exponential backoff retry loop
//! - `supervisor` - The deadline race around the retry loop
//! - `poller` - Wires prober, evaluator, retrier and supervisor together
//! - `result` - Retry and run result types
//! - `error` - Engine error types

pub mod backoff;
pub mod error;
pub mod evaluator;
pub mod poller;
pub mod result;
pub mod supervisor;

#[cfg(test)]
pub(crate) mod test_support;

pub use backoff::BackoffRetrier;
pub use error::PollError;
pub use evaluator::{evaluate, MatchEvaluator, Verdict};
pub use poller::Poller;
pub use result::{RetryExit, RunOutcome, RunReport};
pub use supervisor::{run_with_deadline, DeadlineSupervisor};
