//! Console email provider for development.

use crate::error::Result;
use crate::providers::EmailProvider;
use tracing::info;

/// Logs verification links instead of sending mail.
///
/// Used when no SMTP server is configured.
#[derive(Clone, Debug, Default)]
pub struct ConsoleEmailProvider;

impl ConsoleEmailProvider {
    /// Create a new console email provider.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl EmailProvider for ConsoleEmailProvider {
    async fn send_verification_email(&self, to: &str, link: &str) -> Result<()> {
        info!(to = %to, link = %link, "Verification email (console delivery)");
        Ok(())
    }
}
