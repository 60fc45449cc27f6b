//! Rate limiter trait.

use crate::error::Result;
use std::future::Future;
use std::time::Duration;

/// Sliding-window rate limiter.
///
/// # Example
///
/// ```no_run
/// use event_vibe_auth::providers::RateLimiter;
/// use std::time::Duration;
///
/// # async fn example(limiter: impl RateLimiter) -> Result<(), Box<dyn std::error::Error>> {
/// limiter
///     .check_and_record("resend_verification:ada@example.com", 3, Duration::from_secs(900))
///     .await?;
/// # Ok(())
/// # }
/// ```
pub trait RateLimiter: Send + Sync {
    /// Record an attempt for `key`, failing if `max_attempts` were already
    /// made within `window`.
    ///
    /// Check and record happen atomically.
    ///
    /// # Errors
    ///
    /// - [`crate::AuthError::TooManyAttempts`] when over the limit
    /// - store errors
    fn check_and_record(
        &self,
        key: &str,
        max_attempts: u32,
        window: Duration,
    ) -> impl Future<Output = Result<()>> + Send;
}
