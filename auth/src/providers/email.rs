//! Email provider trait.

use crate::error::Result;
use std::future::Future;

/// Email delivery.
pub trait EmailProvider: Send + Sync {
    /// Send the verify-your-email message.
    ///
    /// # Arguments
    ///
    /// - `to`: Recipient email address
    /// - `link`: Full verification link
    ///
    /// # Errors
    ///
    /// Returns [`crate::AuthError::EmailError`] if delivery fails.
    fn send_verification_email(&self, to: &str, link: &str) -> impl Future<Output = Result<()>> + Send;
}
