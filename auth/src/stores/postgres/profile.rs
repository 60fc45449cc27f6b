//! `PostgreSQL` profile repository (`users` table).

use super::db_error;
use crate::error::{AuthError, Result};
use crate::providers::ProfileRepository;
use crate::state::{Role, UserProfile};
use chrono::{DateTime, Utc};
use event_vibe_core::UserId;
use sqlx::PgPool;
use uuid::Uuid;

type ProfileRow = (Uuid, String, String, String, String, DateTime<Utc>);

fn profile_from_row((uid, email, name, role, location, created_at): ProfileRow) -> Result<UserProfile> {
    Ok(UserProfile {
        uid: UserId(uid),
        email,
        name,
        role: role.parse::<Role>()?,
        location,
        created_at,
    })
}

/// Profile documents in `PostgreSQL`.
#[derive(Clone)]
pub struct PostgresProfileRepository {
    pool: PgPool,
}

impl PostgresProfileRepository {
    /// Create a repository on `pool`.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl ProfileRepository for PostgresProfileRepository {
    async fn create_profile(&self, profile: &UserProfile) -> Result<()> {
        sqlx::query(
            "INSERT INTO users (uid, email, name, role, location, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(profile.uid.0)
        .bind(&profile.email)
        .bind(&profile.name)
        .bind(profile.role.as_str())
        .bind(&profile.location)
        .bind(profile.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to create profile", &e))?;
        Ok(())
    }

    async fn get_profile(&self, uid: UserId) -> Result<Option<UserProfile>> {
        let row: Option<ProfileRow> = sqlx::query_as(
            "SELECT uid, email, name, role, location, created_at FROM users WHERE uid = $1",
        )
        .bind(uid.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load profile", &e))?;

        row.map(profile_from_row).transpose()
    }

    async fn update_name(&self, uid: UserId, name: &str) -> Result<UserProfile> {
        let row: Option<ProfileRow> = sqlx::query_as(
            "UPDATE users SET name = $2 WHERE uid = $1
             RETURNING uid, email, name, role, location, created_at",
        )
        .bind(uid.0)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update profile", &e))?;

        row.map(profile_from_row)
            .transpose()?
            .ok_or(AuthError::ProfileNotFound)
    }
}
