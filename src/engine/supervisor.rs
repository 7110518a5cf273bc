//! Deadline supervisor
//!
//! Races a retry loop against a single countdown. The countdown starts once
//! and is never extended. When it fires, the supervisor cancels the loop's
//! token and waits for the loop to return, which happens at its next
//! suspension point. The outcome is decided by which side finished first:
//! a satisfied verdict that arrives after the deadline is still a timeout.

use chrono::Utc;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::result::{RetryExit, RunOutcome, RunReport};

#[derive(Debug)]
pub struct DeadlineSupervisor {
    budget: Duration,
    run_id: String,
    token: CancellationToken,
}

impl DeadlineSupervisor {
    pub fn new(budget: Duration) -> Self {
        Self {
            budget,
            run_id: uuid::Uuid::new_v4().to_string(),
            token: CancellationToken::new(),
        }
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Token handed to the retry loop; cancelling it externally ends the run as a timeout
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub async fn run<F, Fut>(&self, retry_loop: F) -> RunOutcome
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = RetryExit>,
    {
        let started_at = Utc::now();
        let start = Instant::now();
        // Budgets past the clock's range never fire; `sleep` clamps them
        let countdown = match start.checked_add(self.budget) {
            Some(deadline) => tokio::time::sleep_until(deadline),
            None => tokio::time::sleep(self.budget),
        };
        tokio::pin!(countdown);

        let run = retry_loop(self.token.clone());
        tokio::pin!(run);

        let (deadline_hit, exit) = tokio::select! {
            biased;
            exit = &mut run => (false, exit),
            _ = &mut countdown => {
                debug!("Deadline of {:?} reached, cancelling retry loop", self.budget);
                self.token.cancel();
                (true, run.await)
            }
        };

        let elapsed = start.elapsed();
        let attempts = exit.attempts();

        match (deadline_hit, exit) {
            (false, RetryExit::Satisfied { message, .. }) => RunOutcome::Success(RunReport {
                run_id: self.run_id.clone(),
                started_at,
                elapsed_ms: elapsed.as_millis() as u64,
                attempts,
                message: Some(message),
            }),
            (_, RetryExit::Satisfied { .. }) => self.timed_out(started_at, elapsed, attempts, None),
            (_, RetryExit::Cancelled { last_reason, .. }) => {
                self.timed_out(started_at, elapsed, attempts, last_reason)
            }
        }
    }

    fn timed_out(
        &self,
        started_at: chrono::DateTime<Utc>,
        elapsed: Duration,
        attempts: u32,
        message: Option<String>,
    ) -> RunOutcome {
        RunOutcome::TimedOut(RunReport {
            run_id: self.run_id.clone(),
            started_at,
            elapsed_ms: elapsed.as_millis() as u64,
            attempts,
            message,
        })
    }
}

/// Run `retry_loop` under a fresh supervisor with the given budget
pub async fn run_with_deadline<F, Fut>(budget: Duration, retry_loop: F) -> RunOutcome
where
    F: FnOnce(CancellationToken) -> Fut,
    Fut: Future<Output = RetryExit>,
{
    DeadlineSupervisor::new(budget).run(retry_loop).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SuccessCondition;
    use crate::engine::backoff::BackoffRetrier;
    use crate::engine::test_support::{target, HangingProber, ScriptedProber};
    use crate::probe::ProbeResult;

    #[tokio::test(start_paused = true)]
    async fn test_never_satisfied_times_out_at_deadline() {
        let prober = ScriptedProber::always(500);
        let condition = SuccessCondition::StatusCode(200);
        let retrier = BackoffRetrier::default();
        let target = target();

        let outcome = run_with_deadline(Duration::from_secs(60), |cancel| async move {
            retrier
                .retry_until_satisfied(&prober, &condition, &target, &cancel)
                .await
        })
        .await;

        assert!(!outcome.is_success());
        assert_eq!(outcome.exit_code(), 1);
        let report = outcome.report();
        assert_eq!(report.elapsed(), Duration::from_secs(60));
        // Attempts at 0, 1, 3, 7, 15, 25, 35, 45, 55
        assert_eq!(report.attempts, 9);
        assert_eq!(
            report.message.as_deref(),
            Some("Response code was 500, looking for 200")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_before_deadline_does_not_wait() {
        let prober = ScriptedProber::always(200)
            .then(Ok(ProbeResult::new(503, "")))
            .then(Ok(ProbeResult::new(503, "")));
        let condition = SuccessCondition::StatusCode(200);
        let retrier = BackoffRetrier::default();
        let target = target();
        let start = Instant::now();

        let outcome = run_with_deadline(Duration::from_secs(60), |cancel| async move {
            retrier
                .retry_until_satisfied(&prober, &condition, &target, &cancel)
                .await
        })
        .await;

        assert!(outcome.is_success());
        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(outcome.report().attempts, 3);
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_probe_cannot_overrun_deadline() {
        let hanging = HangingProber::new();
        let prober = &hanging;
        let condition = SuccessCondition::StatusCode(200);
        let retrier = BackoffRetrier::default();
        let target = target();

        let outcome = run_with_deadline(Duration::from_secs(120), |cancel| async move {
            retrier
                .retry_until_satisfied(prober, &condition, &target, &cancel)
                .await
        })
        .await;

        assert!(!outcome.is_success());
        assert_eq!(outcome.report().elapsed(), Duration::from_secs(120));
        assert_eq!(outcome.report().attempts, 1);
        assert_eq!(hanging.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_attempts_start_after_timeout() {
        let scripted = ScriptedProber::always(500);
        let prober = &scripted;
        let condition = SuccessCondition::StatusCode(200);
        let retrier = BackoffRetrier::default();
        let target = target();

        let outcome = run_with_deadline(Duration::from_secs(10), |cancel| async move {
            retrier
                .retry_until_satisfied(prober, &condition, &target, &cancel)
                .await
        })
        .await;
        let calls_at_timeout = scripted.calls();

        tokio::time::sleep(Duration::from_secs(60)).await;

        assert!(!outcome.is_success());
        assert_eq!(scripted.calls(), calls_at_timeout);
        // Attempts at 0, 1, 3, 7
        assert_eq!(calls_at_timeout, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_budget_beyond_clock_range_does_not_panic() {
        let config = crate::config::PollConfig::from_timeout_minutes(u64::MAX / 60 + 1).unwrap();
        let supervisor = DeadlineSupervisor::new(config.deadline());
        let prober = ScriptedProber::always(200).then(Ok(ProbeResult::new(503, "")));
        let condition = SuccessCondition::StatusCode(200);
        let retrier = BackoffRetrier::default();
        let target = target();

        let outcome = supervisor
            .run(|cancel| async move {
                retrier
                    .retry_until_satisfied(&prober, &condition, &target, &cancel)
                    .await
            })
            .await;

        assert!(outcome.is_success());
        assert_eq!(outcome.report().attempts, 2);
        assert_eq!(outcome.report().elapsed(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_satisfied_after_cancellation_is_still_a_timeout() {
        let supervisor = DeadlineSupervisor::new(Duration::from_secs(5));

        // Ignores the token and reports success late
        let outcome = supervisor
            .run(|_cancel| async {
                tokio::time::sleep(Duration::from_secs(6)).await;
                RetryExit::Satisfied {
                    attempts: 1,
                    message: "late".to_string(),
                }
            })
            .await;

        assert!(!outcome.is_success());
        assert_eq!(outcome.report().message, None);
        assert_eq!(outcome.report().elapsed(), Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_external_cancellation_ends_run() {
        let supervisor = DeadlineSupervisor::new(Duration::from_secs(600));
        let token = supervisor.token();
        let prober = ScriptedProber::always(500);
        let condition = SuccessCondition::StatusCode(200);
        let retrier = BackoffRetrier::default();
        let target = target();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            token.cancel();
        });

        let outcome = supervisor
            .run(|cancel| async move {
                retrier
                    .retry_until_satisfied(&prober, &condition, &target, &cancel)
                    .await
            })
            .await;

        assert!(!outcome.is_success());
        assert_eq!(outcome.report().elapsed(), Duration::from_secs(2));
    }

    #[test]
    fn test_run_ids_are_unique() {
        let a = DeadlineSupervisor::new(Duration::from_secs(1));
        let b = DeadlineSupervisor::new(Duration::from_secs(1));
        assert_ne!(a.run_id(), b.run_id());
        assert_eq!(a.budget(), Duration::from_secs(1));
    }
}
