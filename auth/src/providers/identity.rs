//! Identity provider trait.

use crate::error::Result;
use crate::state::Account;
use event_vibe_core::UserId;
use std::future::Future;

/// Accounts, credentials and email verification.
///
/// Emails passed in are already normalized.
pub trait IdentityProvider: Send + Sync {
    /// Create an unverified account.
    ///
    /// # Errors
    ///
    /// - [`crate::AuthError::EmailInUse`] if the email is taken
    /// - storage errors
    fn create_account(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> impl Future<Output = Result<Account>> + Send;

    /// Check credentials.
    ///
    /// Succeeds for unverified accounts too; the caller decides what to do
    /// with them.
    ///
    /// # Errors
    ///
    /// - [`crate::AuthError::InvalidCredentials`] for an unknown email or a
    ///   wrong password
    fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Account>> + Send;

    /// Look up an account without credentials.
    ///
    /// # Errors
    ///
    /// Returns storage errors only; a missing account is `Ok(None)`.
    fn find_account_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<Account>>> + Send;

    /// Issue a fresh single-use verification code for `uid`.
    ///
    /// # Errors
    ///
    /// Returns storage errors.
    fn issue_verification_code(&self, uid: UserId) -> impl Future<Output = Result<String>> + Send;

    /// Consume a verification code and mark its account verified.
    ///
    /// # Errors
    ///
    /// - [`crate::AuthError::VerificationCodeInvalid`] if the code is unknown,
    ///   used or expired
    fn apply_verification_code(&self, code: &str) -> impl Future<Output = Result<UserId>> + Send;
}
