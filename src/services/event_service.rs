// Event service - community awareness events managed by admins
use uuid::Uuid;

use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::{Event, EventInput};

pub struct EventService {
    db: Database,
}

impl EventService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Published events, soonest first; past events only when asked for.
    pub async fn list_published(&self, include_past: bool, limit: i64, offset: i64) -> Result<(Vec<Event>, i64)> {
        let events: Vec<Event> = sqlx::query_as(
            r#"
            SELECT * FROM events
            WHERE is_published = true
              AND ($1 OR COALESCE(ends_at, starts_at) >= NOW())
            ORDER BY starts_at ASC
            LIMIT $2 OFFSET $3
            "#
        )
        .bind(include_past)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db.pg)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM events WHERE is_published = true AND ($1 OR COALESCE(ends_at, starts_at) >= NOW())"
        )
        .bind(include_past)
        .fetch_one(&self.db.pg)
        .await?;

        Ok((events, total))
    }

    pub async fn get_published(&self, id: Uuid) -> Result<Event> {
        sqlx::query_as("SELECT * FROM events WHERE id = $1 AND is_published = true")
            .bind(id)
            .fetch_optional(&self.db.pg)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event {} not found", id)))
    }

    pub async fn create(&self, input: EventInput, admin_id: Uuid) -> Result<Event> {
        input.validate_schedule().map_err(AppError::BadRequest)?;

        let event: Event = sqlx::query_as(
            r#"
            INSERT INTO events (id, title, description, location, starts_at, ends_at, is_published, created_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW(), NOW())
            RETURNING *
            "#
        )
        .bind(Uuid::new_v4())
        .bind(input.title.trim())
        .bind(input.description.trim())
        .bind(input.location)
        .bind(input.starts_at)
        .bind(input.ends_at)
        .bind(input.is_published)
        .bind(admin_id)
        .fetch_one(&self.db.pg)
        .await?;

        tracing::info!(event_id = %event.id, "Event created");
        Ok(event)
    }

    pub async fn update(&self, id: Uuid, input: EventInput) -> Result<Event> {
        input.validate_schedule().map_err(AppError::BadRequest)?;

        let event: Option<Event> = sqlx::query_as(
            r#"
            UPDATE events
            SET title = $2,
                description = $3,
                location = $4,
                starts_at = $5,
                ends_at = $6,
                is_published = $7,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(id)
        .bind(input.title.trim())
        .bind(input.description.trim())
        .bind(input.location)
        .bind(input.starts_at)
        .bind(input.ends_at)
        .bind(input.is_published)
        .fetch_optional(&self.db.pg)
        .await?;

        event.ok_or_else(|| AppError::NotFound(format!("Event {} not found", id)))
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.db.pg)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Event {} not found", id)));
        }

        Ok(())
    }
}
