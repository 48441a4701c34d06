// Volunteer service - registrations and their review
use uuid::Uuid;

use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::{ModerationStatus, NewVolunteer, PublicVolunteer, Volunteer};
use crate::services::report_service::review_conflict;

pub struct VolunteerService {
    db: Database,
}

impl VolunteerService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Register a volunteer; one registration per email address.
    pub async fn register(&self, new: NewVolunteer) -> Result<Volunteer> {
        let volunteer: Option<Volunteer> = sqlx::query_as(
            r#"
            INSERT INTO volunteers (id, full_name, email, phone, specialty, motivation, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, 'pending', NOW(), NOW())
            ON CONFLICT (email) DO NOTHING
            RETURNING *
            "#
        )
        .bind(Uuid::new_v4())
        .bind(new.full_name.trim())
        .bind(new.email.trim().to_lowercase())
        .bind(new.phone.trim())
        .bind(new.specialty.trim())
        .bind(new.motivation)
        .fetch_optional(&self.db.pg)
        .await?;

        let volunteer = volunteer.ok_or_else(|| {
            AppError::BadRequest("This email is already registered as a volunteer".to_string())
        })?;

        tracing::info!(volunteer_id = %volunteer.id, "Volunteer registered");
        Ok(volunteer)
    }

    pub async fn list(
        &self,
        status: Option<ModerationStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Volunteer>, i64)> {
        let volunteers: Vec<Volunteer> = sqlx::query_as(
            r#"
            SELECT * FROM volunteers
            WHERE ($1::moderation_status IS NULL OR status = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        )
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db.pg)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM volunteers WHERE ($1::moderation_status IS NULL OR status = $1)"
        )
        .bind(status)
        .fetch_one(&self.db.pg)
        .await?;

        Ok((volunteers, total))
    }

    pub async fn list_approved(&self) -> Result<Vec<PublicVolunteer>> {
        let volunteers: Vec<Volunteer> = sqlx::query_as(
            "SELECT * FROM volunteers WHERE status = 'approved' ORDER BY reviewed_at DESC NULLS LAST"
        )
        .fetch_all(&self.db.pg)
        .await?;

        Ok(volunteers.into_iter().map(PublicVolunteer::from).collect())
    }

    pub async fn approve(&self, id: Uuid, admin_id: Uuid, notes: Option<&str>) -> Result<Volunteer> {
        self.review(id, admin_id, ModerationStatus::Approved, notes).await
    }

    pub async fn reject(&self, id: Uuid, admin_id: Uuid, notes: Option<&str>) -> Result<Volunteer> {
        self.review(id, admin_id, ModerationStatus::Rejected, notes).await
    }

    async fn review(
        &self,
        id: Uuid,
        admin_id: Uuid,
        decision: ModerationStatus,
        notes: Option<&str>,
    ) -> Result<Volunteer> {
        let current: ModerationStatus =
            sqlx::query_scalar("SELECT status FROM volunteers WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.db.pg)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Volunteer {} not found", id)))?;

        if !current.can_transition_to(decision) {
            return Err(review_conflict(
                "Volunteer",
                current.as_str(),
                decision.as_str(),
                current.is_terminal(),
            ));
        }

        let volunteer: Volunteer = sqlx::query_as(
            r#"
            UPDATE volunteers
            SET status = $2,
                reviewed_by = $3,
                reviewed_at = NOW(),
                notes = COALESCE($4, notes),
                updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#
        )
        .bind(id)
        .bind(decision)
        .bind(admin_id)
        .bind(notes)
        .fetch_optional(&self.db.pg)
        .await?
        .ok_or_else(|| AppError::BadRequest("Volunteer has already been reviewed".to_string()))?;

        tracing::info!(
            volunteer_id = %volunteer.id,
            admin_id = %admin_id,
            decision = decision.as_str(),
            "Volunteer reviewed"
        );

        Ok(volunteer)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM volunteers WHERE id = $1")
            .bind(id)
            .execute(&self.db.pg)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Volunteer {} not found", id)));
        }

        Ok(())
    }
}
