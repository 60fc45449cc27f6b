//! Production store implementations.

pub mod rate_limiter_redis;
pub mod session_redis;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use rate_limiter_redis::RedisRateLimiter;
pub use session_redis::RedisSessionStore;
