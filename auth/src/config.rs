//! Authentication settings.

use chrono::Duration;

/// Minimum password length accepted at sign-up.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Authentication settings.
///
/// # Example
///
/// ```
/// use event_vibe_auth::config::AuthConfig;
/// use chrono::Duration;
///
/// let config = AuthConfig::default()
///     .with_app_base_url("https://eventvibe.example")
///     .with_session_ttl(Duration::hours(12));
///
/// assert_eq!(
///     config.verification_link("abc"),
///     "https://eventvibe.example/verify-email?mode=verifyEmail&oobCode=abc"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Public URL of the frontend, used in verification links.
    pub app_base_url: String,
    /// How long a session stays valid.
    pub session_ttl: Duration,
    /// How long a verification code stays valid.
    pub verification_code_ttl: Duration,
    /// Resend requests allowed per email within `resend_window`.
    pub resend_limit: u32,
    /// Sliding window for `resend_limit`.
    pub resend_window: std::time::Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            app_base_url: "http://localhost:3000".to_string(),
            session_ttl: Duration::hours(24),
            verification_code_ttl: Duration::hours(24),
            resend_limit: 3,
            resend_window: std::time::Duration::from_secs(15 * 60),
        }
    }
}

impl AuthConfig {
    /// Builder: frontend URL.
    #[must_use]
    pub fn with_app_base_url(mut self, url: impl Into<String>) -> Self {
        self.app_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Builder: session lifetime.
    #[must_use]
    pub const fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Builder: verification code lifetime.
    #[must_use]
    pub const fn with_verification_code_ttl(mut self, ttl: Duration) -> Self {
        self.verification_code_ttl = ttl;
        self
    }

    /// Builder: resend rate limit.
    #[must_use]
    pub const fn with_resend_limit(mut self, limit: u32, window: std::time::Duration) -> Self {
        self.resend_limit = limit;
        self.resend_window = window;
        self
    }

    /// Link the user follows to verify their email.
    #[must_use]
    pub fn verification_link(&self, code: &str) -> String {
        format!(
            "{}/verify-email?mode=verifyEmail&oobCode={}",
            self.app_base_url,
            urlencoding::encode(code)
        )
    }
}
