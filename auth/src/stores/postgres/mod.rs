//! `PostgreSQL` identity and profile storage.
//!
//! Both repositories share one pool; [`migrate`] creates their tables.

mod identity;
mod profile;

pub use identity::PostgresIdentityProvider;
pub use profile::PostgresProfileRepository;

use crate::error::{AuthError, Result};
use sqlx::PgPool;

/// Run the auth migrations.
///
/// # Errors
///
/// Returns [`AuthError::DatabaseError`] if a migration fails.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    let mut migrator = sqlx::migrate!("./migrations");
    // The events crate applies its own migrations to the same database.
    migrator.set_ignore_missing(true);
    migrator
        .run(pool)
        .await
        .map_err(|e| AuthError::DatabaseError(format!("Migration failed: {e}")))
}

/// Map a sqlx error, turning a pool timeout into [`AuthError::Unavailable`].
fn db_error(context: &str, error: &sqlx::Error) -> AuthError {
    match error {
        sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => {
            AuthError::Unavailable(format!("{context}: {error}"))
        }
        _ => AuthError::DatabaseError(format!("{context}: {error}")),
    }
}
