//! `PostgreSQL` stores for events and registrations.

mod events;
mod registrations;

pub use events::PostgresEventRepository;
pub use registrations::PostgresRegistrationRepository;

use crate::error::{EventsError, Result};
use sqlx::PgPool;

/// Run the events migrations.
///
/// # Errors
///
/// Returns [`EventsError::InternalError`] if a migration fails.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    let mut migrator = sqlx::migrate!("./migrations");
    // The auth crate applies its own migrations to the same database.
    migrator.set_ignore_missing(true);
    migrator
        .run(pool)
        .await
        .map_err(|e| EventsError::InternalError(format!("Migration failed: {e}")))
}
