use super::lock_poisoned;
use crate::error::{AuthError, Result};
use crate::providers::IdentityProvider;
use crate::state::Account;
use crate::utils::{generate_token, hash_password_blocking, verify_password_blocking};
use chrono::{DateTime, Duration, Utc};
use event_vibe_core::environment::{Clock, SystemClock};
use event_vibe_core::UserId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

struct StoredAccount {
    account: Account,
    password_hash: String,
}

struct IssuedCode {
    uid: UserId,
    expires_at: DateTime<Utc>,
}

#[derive(Default)]
struct Tables {
    /// Keyed by normalized email.
    accounts: HashMap<String, StoredAccount>,
    codes: HashMap<String, IssuedCode>,
}

impl Tables {
    fn purge_expired_codes(&mut self, now: DateTime<Utc>) {
        self.codes.retain(|_, issued| issued.expires_at > now);
    }
}

/// In-memory identity provider.
///
/// Password hashing runs on the blocking pool with the lock released.
/// Expired verification codes are purged whenever a new one is issued.
#[derive(Clone)]
pub struct InMemoryIdentityProvider {
    tables: Arc<Mutex<Tables>>,
    clock: Arc<dyn Clock>,
    code_ttl: Duration,
}

impl std::fmt::Debug for InMemoryIdentityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryIdentityProvider")
            .field("code_ttl", &self.code_ttl)
            .finish_non_exhaustive()
    }
}

impl Default for InMemoryIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryIdentityProvider {
    /// Empty provider on the system clock; codes live 24 hours.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tables: Arc::new(Mutex::new(Tables::default())),
            clock: Arc::new(SystemClock),
            code_ttl: Duration::hours(24),
        }
    }

    /// Builder: clock used for code expiry.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Builder: verification code lifetime.
    #[must_use]
    pub const fn with_code_ttl(mut self, ttl: Duration) -> Self {
        self.code_ttl = ttl;
        self
    }

    /// Number of outstanding verification codes, expired ones included.
    #[must_use]
    pub fn code_count(&self) -> usize {
        self.tables.lock().map(|t| t.codes.len()).unwrap_or_default()
    }
}

impl IdentityProvider for InMemoryIdentityProvider {
    async fn create_account(&self, email: &str, password: &str, display_name: &str) -> Result<Account> {
        let password_hash = hash_password_blocking(password).await?;
        let mut tables = self.tables.lock().map_err(lock_poisoned)?;

        if tables.accounts.contains_key(email) {
            return Err(AuthError::EmailInUse);
        }

        let account = Account {
            uid: UserId::new(),
            email: email.to_string(),
            display_name: display_name.to_string(),
            email_verified: false,
        };
        tables.accounts.insert(
            email.to_string(),
            StoredAccount {
                account: account.clone(),
                password_hash,
            },
        );
        Ok(account)
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<Account> {
        let stored = {
            let tables = self.tables.lock().map_err(lock_poisoned)?;
            tables
                .accounts
                .get(email)
                .map(|stored| (stored.account.clone(), stored.password_hash.clone()))
        };
        let (account, hash) = stored.unzip();
        if verify_password_blocking(password, hash).await? {
            account.ok_or(AuthError::InvalidCredentials)
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let tables = self.tables.lock().map_err(lock_poisoned)?;
        Ok(tables.accounts.get(email).map(|stored| stored.account.clone()))
    }

    async fn issue_verification_code(&self, uid: UserId) -> Result<String> {
        let code = generate_token();
        let now = self.clock.now();
        let expires_at = now
            .checked_add_signed(self.code_ttl)
            .ok_or_else(|| AuthError::InternalError("Verification code lifetime out of range".into()))?;
        let mut tables = self.tables.lock().map_err(lock_poisoned)?;
        tables.purge_expired_codes(now);
        tables.codes.insert(code.clone(), IssuedCode { uid, expires_at });
        Ok(code)
    }

    async fn apply_verification_code(&self, code: &str) -> Result<UserId> {
        let now = self.clock.now();
        let mut tables = self.tables.lock().map_err(lock_poisoned)?;

        // Single use: removed whether or not it is still valid.
        let issued = tables
            .codes
            .remove(code)
            .ok_or(AuthError::VerificationCodeInvalid)?;
        if issued.expires_at <= now {
            return Err(AuthError::VerificationCodeInvalid);
        }

        let stored = tables
            .accounts
            .values_mut()
            .find(|stored| stored.account.uid == issued.uid)
            .ok_or(AuthError::VerificationCodeInvalid)?;
        stored.account.email_verified = true;
        Ok(issued.uid)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use event_vibe_testing::ManualClock;

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let idp = InMemoryIdentityProvider::new();
        idp.create_account("ada@example.com", "secret1", "Ada").await.unwrap();

        let again = idp.create_account("ada@example.com", "secret2", "Ada 2").await;
        assert_eq!(again, Err(AuthError::EmailInUse));
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_look_the_same() {
        let idp = InMemoryIdentityProvider::new();
        idp.create_account("ada@example.com", "secret1", "Ada").await.unwrap();

        assert_eq!(
            idp.authenticate("ada@example.com", "nope").await,
            Err(AuthError::InvalidCredentials)
        );
        assert_eq!(
            idp.authenticate("bob@example.com", "secret1").await,
            Err(AuthError::InvalidCredentials)
        );
    }

    #[tokio::test]
    async fn test_code_verifies_once() {
        let idp = InMemoryIdentityProvider::new();
        let account = idp.create_account("ada@example.com", "secret1", "Ada").await.unwrap();
        let code = idp.issue_verification_code(account.uid).await.unwrap();

        assert_eq!(idp.apply_verification_code(&code).await, Ok(account.uid));
        assert_eq!(
            idp.apply_verification_code(&code).await,
            Err(AuthError::VerificationCodeInvalid)
        );
        let found = idp.find_account_by_email("ada@example.com").await.unwrap().unwrap();
        assert!(found.email_verified);
    }

    #[tokio::test]
    async fn test_expired_code_is_rejected() {
        let clock = ManualClock::new(event_vibe_testing::mocks::epoch());
        let idp = InMemoryIdentityProvider::new()
            .with_clock(Arc::new(clock.clone()))
            .with_code_ttl(Duration::hours(1));
        let account = idp.create_account("ada@example.com", "secret1", "Ada").await.unwrap();
        let code = idp.issue_verification_code(account.uid).await.unwrap();

        clock.advance(Duration::hours(2));

        assert_eq!(
            idp.apply_verification_code(&code).await,
            Err(AuthError::VerificationCodeInvalid)
        );
    }

    #[tokio::test]
    async fn test_issuing_a_code_purges_expired_ones() {
        let clock = ManualClock::new(event_vibe_testing::mocks::epoch());
        let idp = InMemoryIdentityProvider::new()
            .with_clock(Arc::new(clock.clone()))
            .with_code_ttl(Duration::hours(1));
        let account = idp.create_account("ada@example.com", "secret1", "Ada").await.unwrap();
        for _ in 0..5 {
            idp.issue_verification_code(account.uid).await.unwrap();
        }
        assert_eq!(idp.code_count(), 5);

        clock.advance(Duration::hours(2));
        let fresh = idp.issue_verification_code(account.uid).await.unwrap();

        assert_eq!(idp.code_count(), 1);
        assert_eq!(idp.apply_verification_code(&fresh).await, Ok(account.uid));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_lookups_are_not_blocked_by_password_checks() {
        let idp = InMemoryIdentityProvider::new();
        idp.create_account("ada@example.com", "secret1", "Ada").await.unwrap();

        let checks: Vec<_> = (0..4)
            .map(|_| {
                let idp = idp.clone();
                tokio::spawn(async move { idp.authenticate("ada@example.com", "wrong-1").await })
            })
            .collect();
        let found = idp.find_account_by_email("ada@example.com").await.unwrap();
        assert!(found.is_some());

        for check in checks {
            assert_eq!(check.await.unwrap(), Err(AuthError::InvalidCredentials));
        }
    }
}
