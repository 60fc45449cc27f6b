//! `PostgreSQL` event repository.
//!
//! # Example
//!
//! ```no_run
//! use event_vibe_events::postgres::{migrate, PostgresEventRepository};
//! use sqlx::PgPool;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = PgPool::connect("postgresql://localhost/event_vibe").await?;
//! migrate(&pool).await?;
//! let events = PostgresEventRepository::new(pool);
//! # Ok(())
//! # }
//! ```

use crate::error::{EventsError, Result};
use crate::repository::EventRepository;
use crate::types::{Event, EventCategory};
use chrono::{DateTime, Utc};
use event_vibe_core::{EventId, UserId};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

const SELECT_EVENT: &str = "SELECT id, name, category, start_time, end_time, location, description, created_by, created_at FROM events";

#[derive(FromRow)]
struct EventRow {
    id: Uuid,
    name: String,
    category: String,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    location: String,
    description: String,
    created_by: Uuid,
    created_at: DateTime<Utc>,
}

impl TryFrom<EventRow> for Event {
    type Error = EventsError;

    fn try_from(row: EventRow) -> Result<Self> {
        let category: EventCategory = row
            .category
            .parse()
            .map_err(|_| EventsError::LoadFailed(format!("Unknown category: {}", row.category)))?;
        Ok(Self {
            id: EventId::from_uuid(row.id),
            name: row.name,
            category,
            start_time: row.start_time,
            end_time: row.end_time,
            location: row.location,
            description: row.description,
            created_by: UserId(row.created_by),
            created_at: row.created_at,
        })
    }
}

/// Events in `PostgreSQL`.
#[derive(Clone)]
pub struct PostgresEventRepository {
    pool: PgPool,
}

impl PostgresEventRepository {
    /// Create a repository on `pool`.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn list(&self, order_by: &str) -> Result<Vec<Event>> {
        let rows: Vec<EventRow> = sqlx::query_as(&format!("{SELECT_EVENT} ORDER BY {order_by}"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| EventsError::LoadFailed(format!("Failed to list events: {e}")))?;
        rows.into_iter().map(Event::try_from).collect()
    }
}

impl EventRepository for PostgresEventRepository {
    async fn create_event(&self, event: &Event) -> Result<()> {
        sqlx::query(
            "INSERT INTO events (id, name, category, start_time, end_time, location, description, created_by, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(event.id.as_uuid())
        .bind(&event.name)
        .bind(event.category.label())
        .bind(event.start_time)
        .bind(event.end_time)
        .bind(&event.location)
        .bind(&event.description)
        .bind(event.created_by.0)
        .bind(event.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| EventsError::SaveFailed(format!("Failed to create event: {e}")))?;

        tracing::info!(event_id = %event.id, created_by = %event.created_by, "Event created");
        Ok(())
    }

    async fn get_event(&self, id: EventId) -> Result<Option<Event>> {
        let row: Option<EventRow> = sqlx::query_as(&format!("{SELECT_EVENT} WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| EventsError::LoadFailed(format!("Failed to load event: {e}")))?;
        row.map(Event::try_from).transpose()
    }

    async fn list_upcoming(&self) -> Result<Vec<Event>> {
        self.list("start_time ASC, created_at ASC").await
    }

    async fn list_recent(&self) -> Result<Vec<Event>> {
        self.list("created_at DESC").await
    }
}
