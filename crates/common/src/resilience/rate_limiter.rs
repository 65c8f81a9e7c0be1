//! Blocking sliding-window rate limiter
//!
//! Enforces a maximum call count per rolling time window. Callers that would
//! exceed the quota are made to wait until the window frees capacity; no call
//! is ever dropped or rejected. The window is guarded by an async mutex, so
//! concurrent callers serialize their check-and-record step.

use std::collections::VecDeque;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Returned by cancellable waits when the supplied token fires first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation cancelled")]
pub struct Cancelled;

/// Configuration for the sliding-window limiter
#[derive(Debug, Clone)]
pub struct SlidingWindowConfig {
    /// Maximum number of calls permitted inside one window
    pub max_calls: u32,
    /// Length of the rolling window
    pub period: Duration,
}

impl Default for SlidingWindowConfig {
    fn default() -> Self {
        Self { max_calls: 25, period: Duration::from_secs(1) }
    }
}

impl SlidingWindowConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_calls == 0 {
            return Err("max_calls must be greater than 0".to_string());
        }
        if self.period.is_zero() {
            return Err("period must be greater than zero".to_string());
        }
        Ok(())
    }
}

/// Sliding-window rate limiter
///
/// Tracks the instants of the most recent permitted calls. `acquire` waits
/// until admitting one more call keeps the window within `max_calls`, then
/// records the call and returns. Backpressure is expressed purely as delay.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
///
/// use aptmap_common::resilience::SlidingWindow;
///
/// # async fn example() -> Result<(), String> {
/// let limiter = SlidingWindow::new(25, Duration::from_secs(1))?;
/// limiter.acquire().await; // returns immediately while under quota
/// # Ok(())
/// # }
/// ```
pub struct SlidingWindow {
    config: SlidingWindowConfig,
    calls: Mutex<VecDeque<Instant>>,
}

impl SlidingWindow {
    /// Create a limiter permitting `max_calls` per `period`.
    pub fn new(max_calls: u32, period: Duration) -> Result<Self, String> {
        Self::with_config(SlidingWindowConfig { max_calls, period })
    }

    /// Create a limiter from a validated configuration.
    pub fn with_config(config: SlidingWindowConfig) -> Result<Self, String> {
        config.validate()?;
        let capacity = config.max_calls as usize;
        Ok(Self { config, calls: Mutex::new(VecDeque::with_capacity(capacity)) })
    }

    /// Wait until one more call fits in the window, then record it.
    pub async fn acquire(&self) {
        loop {
            match self.try_reserve().await {
                None => return,
                Some(wait) => {
                    debug!(wait_ms = wait.as_millis() as u64, "rate limit reached, waiting");
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }

    /// Like [`acquire`](Self::acquire), but aborts the wait when `cancel`
    /// fires.
    pub async fn acquire_cancellable(&self, cancel: &CancellationToken) -> Result<(), Cancelled> {
        loop {
            if cancel.is_cancelled() {
                return Err(Cancelled);
            }
            match self.try_reserve().await {
                None => return Ok(()),
                Some(wait) => {
                    debug!(wait_ms = wait.as_millis() as u64, "rate limit reached, waiting");
                    tokio::select! {
                        _ = cancel.cancelled() => return Err(Cancelled),
                        _ = tokio::time::sleep(wait) => {}
                    }
                }
            }
        }
    }

    /// Number of calls that could be admitted right now without waiting.
    pub async fn available(&self) -> u32 {
        let mut calls = self.calls.lock().await;
        let now = Instant::now();
        Self::prune(&mut calls, now, self.config.period);
        self.config.max_calls - calls.len() as u32
    }

    /// Record the call if capacity allows, otherwise return how long the
    /// oldest tracked call still occupies the window.
    async fn try_reserve(&self) -> Option<Duration> {
        let mut calls = self.calls.lock().await;
        let now = Instant::now();
        Self::prune(&mut calls, now, self.config.period);

        if (calls.len() as u32) < self.config.max_calls {
            calls.push_back(now);
            return None;
        }

        let oldest = *calls.front()?;
        Some(self.config.period.saturating_sub(now.duration_since(oldest)))
    }

    fn prune(calls: &mut VecDeque<Instant>, now: Instant, period: Duration) {
        while calls.front().is_some_and(|t| now.duration_since(*t) >= period) {
            calls.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_validation() {
        assert!(SlidingWindow::new(0, Duration::from_secs(1)).is_err());
        assert!(SlidingWindow::new(10, Duration::ZERO).is_err());
        assert!(SlidingWindow::new(10, Duration::from_secs(1)).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn admits_up_to_max_calls_without_delay() {
        let limiter = SlidingWindow::new(25, Duration::from_secs(1)).unwrap();
        let start = Instant::now();

        for _ in 0..25 {
            limiter.acquire().await;
        }

        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(limiter.available().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn delays_the_call_past_window_capacity() {
        let limiter = SlidingWindow::new(25, Duration::from_secs(1)).unwrap();
        let start = Instant::now();

        // 26 back-to-back calls: the 26th must wait until a full period has
        // elapsed since the 1st.
        for _ in 0..26 {
            limiter.acquire().await;
        }

        assert!(start.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn window_frees_capacity_after_period() {
        let limiter = SlidingWindow::new(2, Duration::from_millis(100)).unwrap();

        limiter.acquire().await;
        limiter.acquire().await;
        assert_eq!(limiter.available().await, 0);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(limiter.available().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_token_aborts_before_wait() {
        let limiter = SlidingWindow::new(1, Duration::from_secs(60)).unwrap();
        limiter.acquire().await;

        let cancel = CancellationToken::new();
        cancel.cancel();

        assert_eq!(limiter.acquire_cancellable(&cancel).await, Err(Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_a_blocked_acquire() {
        let limiter = SlidingWindow::new(1, Duration::from_secs(60)).unwrap();
        limiter.acquire().await;

        let cancel = CancellationToken::new();
        let canceller = cancel.clone();
        let cancel_task = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            canceller.cancel();
        });

        let result = limiter.acquire_cancellable(&cancel).await;
        assert_eq!(result, Err(Cancelled));
        cancel_task.await.unwrap();
    }
}
