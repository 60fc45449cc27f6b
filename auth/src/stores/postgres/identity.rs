//! `PostgreSQL` identity provider.
//!
//! # Example
//!
//! ```no_run
//! use event_vibe_auth::stores::postgres::{migrate, PostgresIdentityProvider};
//! use sqlx::PgPool;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = PgPool::connect("postgresql://localhost/event_vibe").await?;
//! migrate(&pool).await?;
//! let identity = PostgresIdentityProvider::new(pool);
//! # Ok(())
//! # }
//! ```

use super::db_error;
use crate::error::{AuthError, Result};
use crate::providers::IdentityProvider;
use crate::state::Account;
use crate::utils::{generate_token, hash_password_blocking, verify_password_blocking};
use chrono::{DateTime, Duration, Utc};
use event_vibe_core::environment::{Clock, SystemClock};
use event_vibe_core::UserId;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

const UNIQUE_VIOLATION: &str = "23505";

type AccountRow = (Uuid, String, String, bool);

fn account_from_row((uid, email, display_name, email_verified): AccountRow) -> Account {
    Account {
        uid: UserId(uid),
        email,
        display_name,
        email_verified,
    }
}

/// Accounts and verification codes in `PostgreSQL`.
#[derive(Clone)]
pub struct PostgresIdentityProvider {
    pool: PgPool,
    clock: Arc<dyn Clock>,
    code_ttl: Duration,
}

impl std::fmt::Debug for PostgresIdentityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresIdentityProvider")
            .field("code_ttl", &self.code_ttl)
            .finish_non_exhaustive()
    }
}

impl PostgresIdentityProvider {
    /// Create a provider on `pool`. Codes live 24 hours.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
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
}

impl IdentityProvider for PostgresIdentityProvider {
    async fn create_account(&self, email: &str, password: &str, display_name: &str) -> Result<Account> {
        let uid = Uuid::new_v4();
        let password_hash = hash_password_blocking(password).await?;

        let result = sqlx::query(
            "INSERT INTO accounts (uid, email, display_name, password_hash, email_verified)
             VALUES ($1, $2, $3, $4, FALSE)",
        )
        .bind(uid)
        .bind(email)
        .bind(display_name)
        .bind(password_hash)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(Account {
                uid: UserId(uid),
                email: email.to_string(),
                display_name: display_name.to_string(),
                email_verified: false,
            }),
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                Err(AuthError::EmailInUse)
            }
            Err(e) => Err(db_error("Failed to create account", &e)),
        }
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<Account> {
        let row: Option<(Uuid, String, String, bool, String)> = sqlx::query_as(
            "SELECT uid, email, display_name, email_verified, password_hash
             FROM accounts WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load account", &e))?;

        let (account, hash) = row
            .map(|(uid, email, display_name, email_verified, hash)| {
                (account_from_row((uid, email, display_name, email_verified)), hash)
            })
            .unzip();
        if verify_password_blocking(password, hash).await? {
            account.ok_or(AuthError::InvalidCredentials)
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let row: Option<AccountRow> = sqlx::query_as(
            "SELECT uid, email, display_name, email_verified FROM accounts WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load account", &e))?;

        Ok(row.map(account_from_row))
    }

    async fn issue_verification_code(&self, uid: UserId) -> Result<String> {
        let code = generate_token();
        let expires_at = self.clock.now()
            .checked_add_signed(self.code_ttl)
            .ok_or_else(|| AuthError::InternalError("Verification code lifetime out of range".into()))?;

        sqlx::query("INSERT INTO verification_codes (code, uid, expires_at) VALUES ($1, $2, $3)")
            .bind(&code)
            .bind(uid.0)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to store verification code", &e))?;

        Ok(code)
    }

    async fn apply_verification_code(&self, code: &str) -> Result<UserId> {
        let now = self.clock.now();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", &e))?;

        // Single use: the row is gone whether or not it was still valid.
        let issued: Option<(Uuid, DateTime<Utc>)> =
            sqlx::query_as("DELETE FROM verification_codes WHERE code = $1 RETURNING uid, expires_at")
                .bind(code)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| db_error("Failed to consume verification code", &e))?;

        let Some((uid, expires_at)) = issued else {
            return Err(AuthError::VerificationCodeInvalid);
        };
        if expires_at <= now {
            tx.commit()
                .await
                .map_err(|e| db_error("Failed to commit transaction", &e))?;
            return Err(AuthError::VerificationCodeInvalid);
        }

        sqlx::query("UPDATE accounts SET email_verified = TRUE WHERE uid = $1")
            .bind(uid)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to mark email verified", &e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit transaction", &e))?;

        Ok(UserId(uid))
    }
}
