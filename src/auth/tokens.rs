//! Access token memoization

use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};

/// The cached copy expires this long before the provider's stated expiry.
pub const EXPIRY_SAFETY_MARGIN_SECS: i64 = 60;

/// Bearer token plus the instant after which it must not be reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Token issued at `issued_at` with a provider lifetime of `expires_in_secs`.
    pub fn issued(token: String, expires_in_secs: u64, issued_at: DateTime<Utc>) -> Self {
        let usable = i64::try_from(expires_in_secs)
            .unwrap_or(i64::MAX)
            .saturating_sub(EXPIRY_SAFETY_MARGIN_SECS);
        let expires_at = Duration::try_seconds(usable)
            .and_then(|d| issued_at.checked_add_signed(d))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self { token, expires_at }
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Source of the current time, swappable in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Process-wide token slot.
///
/// Advisory only: the lock is never held across a network call, so two
/// callers that both see an expired token may both refresh. Last write wins.
#[derive(Debug, Default, Clone)]
pub struct TokenCache {
    slot: Arc<Mutex<Option<AccessToken>>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached bearer string if still valid at `now`.
    pub fn get_valid(&self, now: DateTime<Utc>) -> Option<String> {
        let guard = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        guard
            .as_ref()
            .filter(|t| t.is_valid_at(now))
            .map(|t| t.token.clone())
    }

    pub fn store(&self, token: AccessToken) {
        let mut guard = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        *guard = Some(token);
    }

    pub fn clear(&self) {
        let mut guard = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }

    /// Expiry of the cached token, valid or not.
    #[cfg(test)]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let guard = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        guard.as_ref().map(|t| t.expires_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 20, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_token_valid_until_margin() {
        let token = AccessToken::issued("abc".into(), 3600, t0());

        assert!(token.is_valid_at(t0() + Duration::seconds(3500)));
        assert!(token.is_valid_at(t0() + Duration::seconds(3539)));
        assert!(!token.is_valid_at(t0() + Duration::seconds(3540)));
        assert!(!token.is_valid_at(t0() + Duration::seconds(3601)));
    }

    #[test]
    fn test_short_lived_token_is_immediately_stale() {
        // Lifetime shorter than the margin never yields a usable cache entry.
        let token = AccessToken::issued("abc".into(), 30, t0());
        assert!(!token.is_valid_at(t0()));
    }

    #[test]
    fn test_cache_store_and_expire() {
        let cache = TokenCache::new();
        assert!(cache.get_valid(t0()).is_none());

        cache.store(AccessToken::issued("tok-1".into(), 1799, t0()));
        assert_eq!(cache.get_valid(t0()).as_deref(), Some("tok-1"));
        assert!(cache.get_valid(t0() + Duration::seconds(1800)).is_none());

        // Last write wins.
        cache.store(AccessToken::issued("tok-2".into(), 1799, t0()));
        assert_eq!(cache.get_valid(t0()).as_deref(), Some("tok-2"));

        cache.clear();
        assert!(cache.expires_at().is_none());
    }
}
