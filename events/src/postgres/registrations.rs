//! `PostgreSQL` registration repository.
//!
//! A claim inserts into `registrations` with `ON CONFLICT DO NOTHING`; only
//! the transaction that inserted the row writes the `user_registrations`
//! copy, and both commit together.

use crate::error::{EventsError, Result};
use crate::repository::RegistrationRepository;
use crate::types::{ClaimOutcome, Registration};
use chrono::{DateTime, Utc};
use event_vibe_core::{EventId, UserId};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(FromRow)]
struct RegistrationRow {
    user_id: Uuid,
    event_id: Uuid,
    event_name: String,
    event_location: String,
    event_date: DateTime<Utc>,
    registered_at: DateTime<Utc>,
}

impl From<RegistrationRow> for Registration {
    fn from(row: RegistrationRow) -> Self {
        Self {
            user_id: UserId(row.user_id),
            event_id: EventId::from_uuid(row.event_id),
            event_name: row.event_name,
            event_location: row.event_location,
            event_date: row.event_date,
            registered_at: row.registered_at,
        }
    }
}

fn save_failed(e: &sqlx::Error) -> EventsError {
    EventsError::SaveFailed(format!("Failed to register: {e}"))
}

/// Registrations in `PostgreSQL`.
#[derive(Clone)]
pub struct PostgresRegistrationRepository {
    pool: PgPool,
}

impl PostgresRegistrationRepository {
    /// Create a repository on `pool`.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl RegistrationRepository for PostgresRegistrationRepository {
    async fn is_registered(&self, user_id: UserId, event_id: EventId) -> Result<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM user_registrations WHERE user_id = $1 AND event_id = $2)",
        )
        .bind(user_id.0)
        .bind(event_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| EventsError::LoadFailed(format!("Failed to check registration: {e}")))?;
        Ok(exists)
    }

    async fn claim(&self, registration: &Registration) -> Result<ClaimOutcome> {
        let mut tx = self.pool.begin().await.map_err(|e| save_failed(&e))?;

        let inserted = sqlx::query(
            "INSERT INTO registrations (user_id, event_id, event_name, event_location, event_date, registered_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (user_id, event_id) DO NOTHING",
        )
        .bind(registration.user_id.0)
        .bind(registration.event_id.as_uuid())
        .bind(&registration.event_name)
        .bind(&registration.event_location)
        .bind(registration.event_date)
        .bind(registration.registered_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| save_failed(&e))?
        .rows_affected()
            == 1;

        if !inserted {
            // A concurrent insert blocks on the conflicting row until the
            // winner commits, so the existing row is visible here.
            let existing: RegistrationRow = sqlx::query_as(
                "SELECT user_id, event_id, event_name, event_location, event_date, registered_at
                 FROM registrations WHERE user_id = $1 AND event_id = $2",
            )
            .bind(registration.user_id.0)
            .bind(registration.event_id.as_uuid())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| save_failed(&e))?;
            tx.rollback().await.map_err(|e| save_failed(&e))?;
            return Ok(ClaimOutcome::AlreadyRegistered(existing.into()));
        }

        sqlx::query(
            "INSERT INTO user_registrations (user_id, event_id, event_name, event_location, event_date, registered_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(registration.user_id.0)
        .bind(registration.event_id.as_uuid())
        .bind(&registration.event_name)
        .bind(&registration.event_location)
        .bind(registration.event_date)
        .bind(registration.registered_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| save_failed(&e))?;

        tx.commit().await.map_err(|e| save_failed(&e))?;
        Ok(ClaimOutcome::Created(registration.clone()))
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Registration>> {
        let rows: Vec<RegistrationRow> = sqlx::query_as(
            "SELECT user_id, event_id, event_name, event_location, event_date, registered_at
             FROM user_registrations WHERE user_id = $1
             ORDER BY registered_at DESC",
        )
        .bind(user_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| EventsError::LoadFailed(format!("Failed to list registrations: {e}")))?;
        Ok(rows.into_iter().map(Registration::from).collect())
    }
}
