use super::lock_poisoned;
use crate::error::{AuthError, Result};
use crate::providers::RateLimiter;
use chrono::{DateTime, Utc};
use event_vibe_core::environment::{Clock, SystemClock};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How often idle keys are swept out.
const SWEEP_INTERVAL_SECS: i64 = 60;

/// Accepted attempts for one key, with the window they were counted in.
struct Attempts {
    window: chrono::Duration,
    times: Vec<DateTime<Utc>>,
}

impl Attempts {
    fn is_idle(&self, now: DateTime<Utc>) -> bool {
        self.times.last().is_none_or(|last| *last + self.window <= now)
    }
}

struct Table {
    keys: HashMap<String, Attempts>,
    last_sweep: Option<DateTime<Utc>>,
}

/// In-memory sliding-window rate limiter.
///
/// Only accepted attempts are recorded. Old attempts for a key are dropped
/// whenever that key is checked, and keys with no attempt left in their
/// window are removed by a sweep that runs at most once a minute.
#[derive(Clone)]
pub struct InMemoryRateLimiter {
    table: Arc<Mutex<Table>>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for InMemoryRateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRateLimiter").finish_non_exhaustive()
    }
}

impl Default for InMemoryRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRateLimiter {
    /// Empty limiter on the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: Arc::new(Mutex::new(Table {
                keys: HashMap::new(),
                last_sweep: None,
            })),
            clock: Arc::new(SystemClock),
        }
    }

    /// Builder: clock used for the window.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Number of keys currently tracked.
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.table.lock().map(|t| t.keys.len()).unwrap_or_default()
    }
}

impl Table {
    fn sweep(&mut self, now: DateTime<Utc>) {
        let due = self
            .last_sweep
            .is_none_or(|last| now - last >= chrono::Duration::seconds(SWEEP_INTERVAL_SECS));
        if due {
            self.keys.retain(|_, attempts| !attempts.is_idle(now));
            self.last_sweep = Some(now);
        }
    }
}

impl RateLimiter for InMemoryRateLimiter {
    async fn check_and_record(&self, key: &str, max_attempts: u32, window: Duration) -> Result<()> {
        let now = self.clock.now();
        let window_chrono = chrono::Duration::from_std(window)
            .map_err(|e| AuthError::InternalError(format!("Invalid rate limit window: {e}")))?;
        let window_start = now - window_chrono;

        let mut table = self.table.lock().map_err(lock_poisoned)?;
        table.sweep(now);
        let attempts = table.keys.entry(key.to_string()).or_insert_with(|| Attempts {
            window: window_chrono,
            times: Vec::new(),
        });
        attempts.window = window_chrono;
        attempts.times.retain(|&ts| ts > window_start);

        if attempts.times.len() >= max_attempts as usize {
            let retry_after = attempts
                .times
                .first()
                .and_then(|oldest| (*oldest + window_chrono - now).to_std().ok())
                .unwrap_or(window);
            tracing::warn!(key = %key, max_attempts, "Rate limit exceeded");
            return Err(AuthError::TooManyAttempts { retry_after });
        }

        attempts.times.push(now);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use event_vibe_testing::ManualClock;

    #[tokio::test]
    async fn test_limit_resets_after_window() {
        let clock = ManualClock::new(event_vibe_testing::mocks::epoch());
        let limiter = InMemoryRateLimiter::new().with_clock(Arc::new(clock.clone()));
        let window = Duration::from_secs(900);

        for _ in 0..3 {
            assert_eq!(limiter.check_and_record("k", 3, window).await, Ok(()));
        }
        assert!(matches!(
            limiter.check_and_record("k", 3, window).await,
            Err(AuthError::TooManyAttempts { retry_after }) if retry_after == window
        ));
        assert_eq!(limiter.check_and_record("other", 3, window).await, Ok(()));

        clock.advance(chrono::Duration::seconds(901));
        assert_eq!(limiter.check_and_record("k", 3, window).await, Ok(()));
    }

    #[tokio::test]
    async fn test_rejected_attempts_do_not_extend_the_lockout() {
        let clock = ManualClock::new(event_vibe_testing::mocks::epoch());
        let limiter = InMemoryRateLimiter::new().with_clock(Arc::new(clock.clone()));
        let window = Duration::from_secs(900);

        for _ in 0..3 {
            limiter.check_and_record("k", 3, window).await.unwrap();
        }
        clock.advance(chrono::Duration::seconds(600));
        assert!(limiter.check_and_record("k", 3, window).await.is_err());

        clock.advance(chrono::Duration::seconds(301));
        assert_eq!(limiter.check_and_record("k", 3, window).await, Ok(()));
    }

    #[tokio::test]
    async fn test_idle_keys_are_swept_after_their_window() {
        let clock = ManualClock::new(event_vibe_testing::mocks::epoch());
        let limiter = InMemoryRateLimiter::new().with_clock(Arc::new(clock.clone()));
        let window = Duration::from_secs(900);

        for i in 0..1_000 {
            limiter
                .check_and_record(&format!("resend_verification:user{i}@example.com"), 3, window)
                .await
                .unwrap();
        }
        assert_eq!(limiter.key_count(), 1_000);

        clock.advance(chrono::Duration::hours(24));
        limiter.check_and_record("resend_verification:late@example.com", 3, window).await.unwrap();

        assert_eq!(limiter.key_count(), 1);
    }
}
