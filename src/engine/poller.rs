//! The poller - runs the backoff retrier under a deadline for one target

use tracing::{error, info, info_span, Instrument};

use super::backoff::BackoffRetrier;
use super::error::PollError;
use super::evaluator::MatchEvaluator;
use super::result::RunOutcome;
use super::supervisor::DeadlineSupervisor;
use crate::config::{EndpointTarget, PollConfig};
use crate::probe::{HttpProber, Prober};

pub struct Poller<P = HttpProber> {
    config: PollConfig,
    prober: P,
}

impl Poller<HttpProber> {
    /// Create a poller backed by a reqwest client built from `config`
    pub fn new(config: PollConfig) -> Result<Self, PollError> {
        let prober = HttpProber::new(&config)?;
        Ok(Self { config, prober })
    }
}

impl<P: Prober> Poller<P> {
    pub fn with_prober(config: PollConfig, prober: P) -> Self {
        Self { config, prober }
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Probe `target` until `evaluator` is satisfied or the deadline passes
    pub async fn run<E>(&self, target: &EndpointTarget, evaluator: &E) -> RunOutcome
    where
        E: MatchEvaluator + ?Sized,
    {
        let supervisor = DeadlineSupervisor::new(self.config.deadline());
        let retrier = BackoffRetrier::new(self.config.backoff.clone());
        let span = info_span!("poll", run_id = %supervisor.run_id());

        async move {
            info!(
                "Polling {} for {} (timeout {:?})",
                target,
                evaluator.describe(),
                supervisor.budget()
            );

            let outcome = supervisor
                .run(|cancel| async move {
                    retrier
                        .retry_until_satisfied(&self.prober, evaluator, target, &cancel)
                        .await
                })
                .await;

            let report = outcome.report();
            match &outcome {
                RunOutcome::Success(_) => info!(
                    attempts = report.attempts,
                    "Conditions met after {} attempt(s) in {:?}",
                    report.attempts,
                    report.elapsed()
                ),
                RunOutcome::TimedOut(_) => error!(
                    attempts = report.attempts,
                    last = report.message.as_deref().unwrap_or("none"),
                    "Timed out after {:?}",
                    report.elapsed()
                ),
            }

            outcome
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SuccessCondition;
    use crate::engine::test_support::{target, ScriptedProber};
    use crate::probe::ProbeResult;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_poller_success() {
        let prober = ScriptedProber::always(200).then(Ok(ProbeResult::new(502, "")));
        let poller = Poller::with_prober(PollConfig::new(Duration::from_secs(60)), prober);

        let outcome = poller
            .run(&target(), &SuccessCondition::StatusCode(200))
            .await;

        assert!(outcome.is_success());
        assert_eq!(outcome.report().attempts, 2);
        assert_eq!(outcome.report().elapsed(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_poller_times_out() {
        let prober = ScriptedProber::always(500);
        let config = PollConfig::from_timeout_minutes(1).unwrap();
        let poller = Poller::with_prober(config, prober);

        let outcome = poller
            .run(&target(), &SuccessCondition::StatusCode(200))
            .await;

        assert!(!outcome.is_success());
        assert_eq!(outcome.exit_code(), 1);
        assert_eq!(outcome.report().elapsed(), Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_poller_uses_configured_backoff() {
        let prober = ScriptedProber::always(200)
            .then(Ok(ProbeResult::new(500, "")))
            .then(Ok(ProbeResult::new(500, "")));
        let mut config = PollConfig::new(Duration::from_secs(60));
        config.backoff.initial_delay = 100;
        let poller = Poller::with_prober(config, prober);

        let outcome = poller
            .run(&target(), &SuccessCondition::StatusCode(200))
            .await;

        assert!(outcome.is_success());
        assert_eq!(outcome.report().elapsed(), Duration::from_millis(300));
    }
}
