//! Fixed-ceiling retry budget
//!
//! Some upstream endpoints are known to fail intermittently in ways that a
//! short, constant pause reliably clears. The budget here is deliberately
//! plain: a fixed attempt ceiling and a fixed inter-attempt delay, no
//! exponential growth and no jitter. The retry loop itself is written out at
//! the call site so the control flow stays visible; this type only carries
//! the policy and the cancellable pause.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::rate_limiter::Cancelled;

/// Fixed retry policy: at most `max_attempts` tries, `delay` between them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryBudget {
    max_attempts: u32,
    delay: Duration,
}

impl Default for RetryBudget {
    fn default() -> Self {
        Self { max_attempts: 200, delay: Duration::from_secs(10) }
    }
}

impl RetryBudget {
    /// Create a budget of `max_attempts` tries with `delay` between them.
    pub fn new(max_attempts: u32, delay: Duration) -> Result<Self, String> {
        if max_attempts == 0 {
            return Err("max_attempts must be greater than 0".to_string());
        }
        Ok(Self { max_attempts, delay })
    }

    /// The attempt ceiling.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// The fixed delay between attempts.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Pause for the fixed delay, aborting early when `cancel` fires.
    pub async fn pause(&self, cancel: &CancellationToken) -> Result<(), Cancelled> {
        if cancel.is_cancelled() {
            return Err(Cancelled);
        }
        tokio::select! {
            _ = cancel.cancelled() => Err(Cancelled),
            _ = tokio::time::sleep(self.delay) => Ok(()),
        }
    }
}
