//! Backoff retrier
//!
//! Runs probe attempts strictly one after another until a verdict is
//! satisfied. Transport errors and mismatched responses are treated alike:
//! log, wait, try again. There is no attempt limit; the loop only ends on
//! success or when its cancellation token fires, which is checked while a
//! probe is in flight and while sleeping between attempts.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::evaluator::{MatchEvaluator, Verdict};
use super::result::RetryExit;
use crate::config::{BackoffPolicy, EndpointTarget};
use crate::probe::Prober;

#[derive(Debug, Clone, Default)]
pub struct BackoffRetrier {
    policy: BackoffPolicy,
}

impl BackoffRetrier {
    pub fn new(policy: BackoffPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }

    pub async fn retry_until_satisfied<P, E>(
        &self,
        prober: &P,
        evaluator: &E,
        target: &EndpointTarget,
        cancel: &CancellationToken,
    ) -> RetryExit
    where
        P: Prober + ?Sized,
        E: MatchEvaluator + ?Sized,
    {
        let mut attempts = 0u32;
        let mut last_reason = None;

        loop {
            if cancel.is_cancelled() {
                return RetryExit::Cancelled {
                    attempts,
                    last_reason,
                };
            }

            attempts += 1;
            debug!(attempt = attempts, "Probing {}", target);

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(attempt = attempts, "Abandoning in-flight probe");
                    return RetryExit::Cancelled { attempts, last_reason };
                }
                outcome = prober.probe(target) => outcome,
            };

            let reason = match outcome {
                Ok(result) => match evaluator.evaluate(&result) {
                    Verdict::Satisfied(message) => {
                        info!("{}", message);
                        return RetryExit::Satisfied { attempts, message };
                    }
                    Verdict::NotSatisfied(reason) => {
                        info!("{}", reason);
                        reason
                    }
                },
                Err(e) => {
                    warn!("Probe failed: {}", e);
                    e.to_string()
                }
            };
            last_reason = Some(reason);

            let delay = self.policy.delay_for(attempts);
            info!("Retrying in {:?} (attempt {} failed)", delay, attempts);

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return RetryExit::Cancelled { attempts, last_reason };
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}
