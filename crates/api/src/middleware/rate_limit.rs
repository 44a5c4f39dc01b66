//! Keyed in-memory rate limiting.
//!
//! Limits are checked by handlers because the keys (client IP plus invite
//! code or username) are only known once the request has been parsed.

use governor::{
    clock::{Clock, DefaultClock},
    DefaultKeyedRateLimiter, Quota, RateLimiter,
};
use std::{num::NonZeroU32, time::Duration};

use crate::error::ApiError;

/// A `max_attempts` per `window` limiter keyed by arbitrary strings.
///
/// The whole allowance is available as an initial burst and refills evenly
/// over the window.
pub struct KeyedRateLimiter {
    limiter: DefaultKeyedRateLimiter<String>,
    max_attempts: u32,
    window_secs: u64,
}

impl KeyedRateLimiter {
    /// Returns `None` when either value is 0, which disables limiting.
    pub fn new(max_attempts: u32, window_secs: u64) -> Option<Self> {
        let burst = NonZeroU32::new(max_attempts)?;
        if window_secs == 0 {
            return None;
        }
        let period = Duration::from_secs_f64(window_secs as f64 / max_attempts as f64);
        let quota = Quota::with_period(period)?.allow_burst(burst);

        Some(Self {
            limiter: RateLimiter::keyed(quota),
            max_attempts,
            window_secs,
        })
    }

    /// Builds the key for a pair of request attributes.
    pub fn key(client_ip: &str, subject: &str) -> String {
        format!("{}|{}", client_ip, subject)
    }

    /// Consumes one attempt for `key`. On rejection returns the number of
    /// seconds until the next attempt is allowed (at least 1).
    pub fn check(&self, key: &str) -> Result<(), u64> {
        self.limiter.check_key(&key.to_string()).map_err(|not_until| {
            let wait = not_until.wait_time_from(DefaultClock::default().now());
            wait.as_secs().max(1)
        })
    }

    /// Like [`check`](Self::check) but maps a rejection to an [`ApiError`].
    pub fn enforce(&self, key: &str) -> Result<(), ApiError> {
        self.check(key).map_err(|retry_after_secs| {
            tracing::warn!(key = %key, retry_after_secs, "Rate limit exceeded");
            ApiError::RateLimited { retry_after_secs }
        })
    }

    /// Drops keys whose allowance has fully refilled.
    pub fn prune(&self) -> usize {
        let before = self.limiter.len();
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
        before.saturating_sub(self.limiter.len())
    }

    pub fn len(&self) -> usize {
        self.limiter.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limiter.is_empty()
    }
}

impl std::fmt::Debug for KeyedRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyedRateLimiter")
            .field("max_attempts", &self.max_attempts)
            .field("window_secs", &self.window_secs)
            .field("tracked_keys", &self.limiter.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_disables() {
        assert!(KeyedRateLimiter::new(0, 600).is_none());
        assert!(KeyedRateLimiter::new(10, 0).is_none());
        assert!(KeyedRateLimiter::new(10, 600).is_some());
    }

    #[test]
    fn test_allows_burst_then_rejects() {
        let limiter = KeyedRateLimiter::new(3, 600).unwrap();
        let key = KeyedRateLimiter::key("203.0.113.9", "A007");

        for _ in 0..3 {
            assert!(limiter.check(&key).is_ok());
        }
        let retry_after = limiter.check(&key).unwrap_err();
        assert!(retry_after >= 1);
        assert!(retry_after <= 600);
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = KeyedRateLimiter::new(1, 600).unwrap();

        assert!(limiter.check(&KeyedRateLimiter::key("10.0.0.1", "A007")).is_ok());
        assert!(limiter.check(&KeyedRateLimiter::key("10.0.0.1", "A007")).is_err());
        assert!(limiter.check(&KeyedRateLimiter::key("10.0.0.1", "B001")).is_ok());
        assert!(limiter.check(&KeyedRateLimiter::key("10.0.0.2", "A007")).is_ok());
        assert_eq!(limiter.len(), 3);
    }

    #[test]
    fn test_enforce_maps_to_api_error() {
        let limiter = KeyedRateLimiter::new(1, 60).unwrap();
        assert!(limiter.enforce("k").is_ok());
        match limiter.enforce("k") {
            Err(ApiError::RateLimited { retry_after_secs }) => assert!(retry_after_secs >= 1),
            other => panic!("expected RateLimited, got {:?}", other),
        }
    }

    #[test]
    fn test_prune_keeps_exhausted_keys() {
        let limiter = KeyedRateLimiter::new(1, 600).unwrap();
        limiter.check("k").ok();
        limiter.prune();
        // Still inside its window, so the key must survive pruning
        assert!(limiter.check("k").is_err());
    }
}
