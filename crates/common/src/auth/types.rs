//! Access token types

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A bearer token with an absolute expiry
///
/// Tokens are immutable: a refresh replaces the whole value, never mutates
/// one in place. The "no token" state is an explicit `Option<AccessToken>`
/// at the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    /// Opaque token value sent as the `accessToken` query parameter
    pub value: String,

    /// Absolute expiry in milliseconds since the UNIX epoch
    pub expires_at_ms: u64,
}

impl AccessToken {
    /// Create a token expiring at `expires_at_ms` (epoch millis).
    #[must_use]
    pub fn new(value: impl Into<String>, expires_at_ms: u64) -> Self {
        Self { value: value.into(), expires_at_ms }
    }

    /// Whether the token is still usable at `now_ms`, keeping `skew` of
    /// safety margin before the reported expiry.
    #[must_use]
    pub fn is_usable_at(&self, now_ms: u64, skew: Duration) -> bool {
        now_ms.saturating_add(skew.as_millis() as u64) < self.expires_at_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR_MS: u64 = 60 * 60 * 1000;

    #[test]
    fn usable_outside_the_skew_window() {
        let token = AccessToken::new("abc", 2 * HOUR_MS);
        let skew = Duration::from_secs(3600);

        assert!(token.is_usable_at(0, skew));
        assert!(token.is_usable_at(HOUR_MS - 1, skew));
    }

    #[test]
    fn unusable_inside_the_skew_window() {
        let token = AccessToken::new("abc", 2 * HOUR_MS);
        let skew = Duration::from_secs(3600);

        // Exactly one skew before expiry is already too close.
        assert!(!token.is_usable_at(HOUR_MS, skew));
        assert!(!token.is_usable_at(2 * HOUR_MS, skew));
        assert!(!token.is_usable_at(3 * HOUR_MS, skew));
    }

    #[test]
    fn saturating_arithmetic_handles_huge_clocks() {
        let token = AccessToken::new("abc", u64::MAX);
        assert!(token.is_usable_at(u64::MAX - 1, Duration::ZERO));
        assert!(!token.is_usable_at(u64::MAX, Duration::from_secs(3600)));
    }
}
