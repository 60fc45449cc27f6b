//! Redis-based rate limiter implementation.
//!
//! Sliding window over a sorted set of accepted attempt timestamps. One Lua
//! script, atomic on the server:
//! 1. Remove entries older than the window (ZREMRANGEBYSCORE)
//! 2. Count remaining entries (ZCARD)
//! 3. Under the limit: add this attempt (ZADD) and refresh the TTL
//!
//! Rejected attempts are not recorded, so retrying while limited does not
//! push the lockout further out.

use crate::error::{AuthError, Result};
use crate::providers::RateLimiter;
use redis::aio::ConnectionManager;
use redis::Client;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// KEYS[1] = set, ARGV = window start ms, now ms, member, max attempts, TTL seconds.
/// Returns `{accepted, oldest_ms}`; `oldest_ms` is -1 when the set is empty.
const CHECK_AND_RECORD: &str = r"
redis.call('ZREMRANGEBYSCORE', KEYS[1], 0, ARGV[1])
local count = redis.call('ZCARD', KEYS[1])
if count < tonumber(ARGV[4]) then
  redis.call('ZADD', KEYS[1], ARGV[2], ARGV[3])
  redis.call('EXPIRE', KEYS[1], ARGV[5])
  return {1, -1}
end
local oldest = redis.call('ZRANGE', KEYS[1], 0, 0, 'WITHSCORES')
return {0, tonumber(oldest[2])}
";

/// Time until the oldest counted attempt leaves the window.
fn retry_after(oldest_ms: i64, now_ms: u64, window: Duration) -> Duration {
    let Ok(oldest_ms) = u64::try_from(oldest_ms) else {
        return window;
    };
    let frees_at = Duration::from_millis(oldest_ms) + window;
    frees_at.saturating_sub(Duration::from_millis(now_ms))
}

/// `Redis`-based rate limiter using sliding window algorithm.
#[derive(Clone)]
pub struct RedisRateLimiter {
    /// Connection manager for connection pooling.
    conn_manager: ConnectionManager,
}

impl RedisRateLimiter {
    /// Connect to Redis.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unavailable`] if connection to `Redis` fails.
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| AuthError::Unavailable(format!("Failed to create Redis client: {e}")))?;
        let conn_manager = ConnectionManager::new(client).await.map_err(|e| {
            AuthError::Unavailable(format!("Failed to create Redis connection manager: {e}"))
        })?;

        Ok(Self { conn_manager })
    }

    fn rate_limit_key(key: &str) -> String {
        format!("rate_limit:{key}")
    }

    #[allow(clippy::cast_possible_truncation)] // Millisecond timestamps fit in u64
    fn current_timestamp_ms() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_millis() as u64
    }
}

impl RateLimiter for RedisRateLimiter {
    async fn check_and_record(&self, key: &str, max_attempts: u32, window: Duration) -> Result<()> {
        let mut conn = self.conn_manager.clone();
        let rate_key = Self::rate_limit_key(key);
        let now_ms = Self::current_timestamp_ms();
        #[allow(clippy::cast_possible_truncation)] // Windows are minutes, not centuries
        let window_ms = window.as_millis() as u64;
        let window_start = now_ms.saturating_sub(window_ms);
        let expire_seconds = i64::try_from(window.as_secs().max(1)).unwrap_or(i64::MAX);

        // Member includes a random suffix so two attempts in the same
        // millisecond both count.
        let member = format!("{now_ms}-{}", uuid::Uuid::new_v4());

        let (accepted, oldest_ms): (i64, i64) = redis::Script::new(CHECK_AND_RECORD)
            .key(&rate_key)
            .arg(window_start)
            .arg(now_ms)
            .arg(member)
            .arg(max_attempts)
            .arg(expire_seconds)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, key = %key, "Redis script failed during rate limit check");
                AuthError::Unavailable(format!("Failed to check and record rate limit: {e}"))
            })?;

        if accepted == 0 {
            tracing::warn!(rate_limit_exceeded = true, key = %key, max_attempts, "Rate limit exceeded");
            return Err(AuthError::TooManyAttempts {
                retry_after: retry_after(oldest_ms, now_ms, window),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)] // Test code
mod tests {
    use super::*;

    #[test]
    fn test_retry_after_counts_from_the_oldest_accepted_attempt() {
        let window = Duration::from_secs(900);
        assert_eq!(retry_after(1_000_000, 1_600_000, window), Duration::from_secs(300));
        assert_eq!(retry_after(1_000_000, 2_000_000, window), Duration::ZERO);
        assert_eq!(retry_after(-1, 1_600_000, window), window);
    }

    #[test]
    fn test_script_only_records_accepted_attempts() {
        let (accept, reject) = CHECK_AND_RECORD
            .split_once("\nend")
            .expect("script has an accept branch");
        assert!(accept.contains("ZADD"));
        assert!(!reject.contains("ZADD"));
    }
}
