use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

/// Delay strategy applied between retry attempts.
#[derive(Clone, Copy, Debug)]
pub enum Backoff {
    /// Constant delay before every retry.
    Fixed { delay: Duration },
    /// Delay before retry `k` (1-indexed) is `min(2^k * base, max)`.
    Exponential { base: Duration, max: Duration },
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff::Exponential {
            base: Duration::from_millis(500),
            max: Duration::from_secs(10),
        }
    }
}

#[derive(Clone, Debug)]
pub struct RetryPolicy {
    /// Additional attempts after the first, so total attempts = max_retries + 1.
    pub max_retries: u32,
    pub backoff: Backoff,
    /// Emit per-attempt detail through the debug channel.
    pub verbose: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            backoff: Backoff::default(),
            verbose: false,
        }
    }
}

impl RetryPolicy {
    pub fn fixed(max_retries: u32, delay: Duration) -> Self {
        Self {
            max_retries,
            backoff: Backoff::Fixed { delay },
            verbose: false,
        }
    }

    pub fn total_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay slept before retry `attempt` (1-indexed). The first attempt
    /// never waits.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed { delay } => delay,
            Backoff::Exponential { base, max } => {
                let exp = attempt.min(32);
                let millis =
                    (base.as_millis() as u64).saturating_mul(2u64.saturating_pow(exp));
                Duration::from_millis(millis).min(max)
            }
        }
    }
}

/// Runs `operation` until it succeeds or the policy's attempts are exhausted,
/// sleeping the backoff delay before every attempt after the first. Failures
/// are normalized to `anyhow::Error`; the last one is propagated on
/// exhaustion, never swallowed.
pub async fn retry_operation<T, F, Fut>(
    mut operation: F,
    policy: &RetryPolicy,
) -> anyhow::Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let total = policy.total_attempts();
    let mut last_error = None;

    for attempt in 1..=total {
        if attempt > 1 {
            let delay = policy.delay_for_attempt(attempt - 1);
            if policy.verbose {
                debug!(
                    attempt,
                    total,
                    delay_ms = delay.as_millis() as u64,
                    "waiting before retry"
                );
            }
            tokio::time::sleep(delay).await;
        }
        match operation().await {
            Ok(value) => {
                if policy.verbose && attempt > 1 {
                    debug!(attempts = attempt, "operation succeeded after retries");
                }
                return Ok(value);
            }
            Err(err) => {
                warn!(attempt, total, error = %err, "attempt failed");
                last_error = Some(err);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| anyhow::anyhow!("operation failed after retries")))
}
