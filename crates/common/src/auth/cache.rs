//! Token cache with proactive refresh
//!
//! Wraps an authenticator behind a cache that:
//! - performs the authentication round trip lazily, on first use
//! - refreshes ahead of expiry (configurable skew)
//! - coalesces concurrent refreshes behind an async mutex
//! - stores nothing on failure, so a bad round trip never leaves a
//!   partially-valid token behind

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use super::types::AccessToken;
use crate::resilience::{Clock, SystemClock};

/// Performs the authentication round trip against the token service.
///
/// Implementations live next to the concrete API client; the cache only
/// cares that a fresh [`AccessToken`] (or a typed error) comes back.
#[async_trait]
pub trait TokenAuthenticator: Send + Sync {
    /// Error type surfaced to callers of [`TokenCache::get`].
    type Error: std::error::Error + Send + Sync + 'static;

    /// Obtain a brand-new token from the service.
    async fn authenticate(&self) -> Result<AccessToken, Self::Error>;
}

/// Caching facade over a [`TokenAuthenticator`]
///
/// `get()` is the only read path: it returns the cached token while it stays
/// outside the refresh skew, and otherwise authenticates exactly once even
/// under concurrent callers (double-checked behind the refresh gate).
pub struct TokenCache<A: TokenAuthenticator, C: Clock = SystemClock> {
    authenticator: A,
    refresh_skew: Duration,
    current: RwLock<Option<AccessToken>>,
    refresh_gate: Mutex<()>,
    clock: C,
}

impl<A: TokenAuthenticator> TokenCache<A> {
    /// Create a cache that refreshes `refresh_skew` ahead of expiry.
    pub fn new(authenticator: A, refresh_skew: Duration) -> Self {
        Self::with_clock(authenticator, refresh_skew, SystemClock)
    }
}

impl<A: TokenAuthenticator, C: Clock> TokenCache<A, C> {
    /// Create a cache with a custom clock (used by tests).
    pub fn with_clock(authenticator: A, refresh_skew: Duration, clock: C) -> Self {
        Self {
            authenticator,
            refresh_skew,
            current: RwLock::new(None),
            refresh_gate: Mutex::new(()),
            clock,
        }
    }

    /// Return a currently valid token, authenticating if needed.
    ///
    /// # Errors
    /// Propagates the authenticator's error unchanged. The cache is left
    /// empty in that case.
    pub async fn get(&self) -> Result<AccessToken, A::Error> {
        if let Some(token) = self.cached_valid().await {
            return Ok(token);
        }

        // Serialize refreshes; whoever loses the race re-checks the cache
        // and reuses the winner's token.
        let _gate = self.refresh_gate.lock().await;
        if let Some(token) = self.cached_valid().await {
            return Ok(token);
        }

        debug!("no usable cached token, authenticating");
        let fresh = self.authenticator.authenticate().await?;
        *self.current.write().await = Some(fresh.clone());
        Ok(fresh)
    }

    /// Drop the cached token so the next `get()` re-authenticates.
    pub async fn invalidate(&self) {
        *self.current.write().await = None;
    }

    /// Whether a token is currently cached (valid or not).
    pub async fn has_token(&self) -> bool {
        self.current.read().await.is_some()
    }

    async fn cached_valid(&self) -> Option<AccessToken> {
        let now_ms = self.clock.millis_since_epoch();
        self.current
            .read()
            .await
            .as_ref()
            .filter(|t| t.is_usable_at(now_ms, self.refresh_skew))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use thiserror::Error;

    use super::*;
    use crate::resilience::MockClock;

    const HOUR: Duration = Duration::from_secs(3600);
    const HOUR_MS: u64 = 60 * 60 * 1000;

    #[derive(Debug, Error)]
    #[error("authentication refused: {0}")]
    struct MockAuthError(String);

    struct MockAuthenticator {
        clock: MockClock,
        lifetime_ms: u64,
        calls: Arc<AtomicU32>,
        fail: bool,
    }

    impl MockAuthenticator {
        fn new(clock: MockClock, lifetime_ms: u64) -> Self {
            Self { clock, lifetime_ms, calls: Arc::new(AtomicU32::new(0)), fail: false }
        }

        fn failing(clock: MockClock) -> Self {
            Self { clock, lifetime_ms: 0, calls: Arc::new(AtomicU32::new(0)), fail: true }
        }
    }

    #[async_trait]
    impl TokenAuthenticator for MockAuthenticator {
        type Error = MockAuthError;

        async fn authenticate(&self) -> Result<AccessToken, MockAuthError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(MockAuthError("bad credentials".to_string()));
            }
            let now = self.clock.millis_since_epoch();
            Ok(AccessToken::new(format!("token-{n}"), now + self.lifetime_ms))
        }
    }

    #[tokio::test]
    async fn caches_token_across_calls_inside_skew() {
        let clock = MockClock::new();
        let auth = MockAuthenticator::new(clock.clone(), 3 * HOUR_MS);
        let calls = auth.calls.clone();
        let cache = TokenCache::with_clock(auth, HOUR, clock);

        let first = cache.get().await.unwrap();
        let second = cache.get().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn refreshes_once_after_expiry() {
        let clock = MockClock::new();
        let auth = MockAuthenticator::new(clock.clone(), 3 * HOUR_MS);
        let calls = auth.calls.clone();
        let cache = TokenCache::with_clock(auth, HOUR, clock.clone());

        let first = cache.get().await.unwrap();

        // Advance into the skew window: the cached token is no longer
        // usable even though its nominal expiry has not passed.
        clock.advance_millis(2 * HOUR_MS + 1);
        let second = cache.get().await.unwrap();

        assert_ne!(first.value, second.value);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_authentication_leaves_cache_empty() {
        let clock = MockClock::new();
        let auth = MockAuthenticator::failing(clock.clone());
        let cache = TokenCache::with_clock(auth, HOUR, clock);

        let err = cache.get().await.unwrap_err();
        assert!(err.to_string().contains("bad credentials"));
        assert!(!cache.has_token().await);
    }

    #[tokio::test]
    async fn invalidate_forces_reauthentication() {
        let clock = MockClock::new();
        let auth = MockAuthenticator::new(clock.clone(), 3 * HOUR_MS);
        let calls = auth.calls.clone();
        let cache = TokenCache::with_clock(auth, HOUR, clock);

        cache.get().await.unwrap();
        cache.invalidate().await;
        assert!(!cache.has_token().await);

        cache.get().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_refresh() {
        let clock = MockClock::new();
        let auth = MockAuthenticator::new(clock.clone(), 3 * HOUR_MS);
        let calls = auth.calls.clone();
        let cache = Arc::new(TokenCache::with_clock(auth, HOUR, clock));

        let a = cache.clone();
        let b = cache.clone();
        let (ra, rb) = tokio::join!(
            tokio::spawn(async move { a.get().await }),
            tokio::spawn(async move { b.get().await }),
        );

        let ta = ra.unwrap().unwrap();
        let tb = rb.unwrap().unwrap();
        assert_eq!(ta, tb);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
