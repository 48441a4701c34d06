// Report service - submission, duplicate detection and the moderation workflow
use uuid::Uuid;

use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::{
    BlacklistEntry, DangerLevel, DuplicateCheck, NewBlacklistEntry, NewReport, Report, ReportStatus,
};
use crate::services::blacklist_service::insert_entry;

pub struct ReportService {
    db: Database,
}

impl ReportService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Persist a new pending report, flagging it when another report on the
    /// same normalized URL is still open.
    pub async fn create(&self, new: NewReport) -> Result<Report> {
        let existing_open: Option<Uuid> = sqlx::query_scalar(
            r#"
            SELECT id FROM reports
            WHERE normalized_url = $1 AND status IN ('pending', 'processing')
            ORDER BY created_at ASC
            LIMIT 1
            "#
        )
        .bind(&new.normalized_url)
        .fetch_optional(&self.db.pg)
        .await?;

        let duplicate = DuplicateCheck::from_existing(existing_open);
        let reporter = new.reporter.sanitized();

        let report: Report = sqlx::query_as(
            r#"
            INSERT INTO reports (
                id, url, normalized_url, reason, scam_type, reporter_id,
                reporter_name, reporter_email, reporter_phone, is_anonymous,
                status, priority, is_duplicate, duplicate_of, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'pending', $11, $12, $13, NOW(), NOW())
            RETURNING *
            "#
        )
        .bind(Uuid::new_v4())
        .bind(&new.url)
        .bind(&new.normalized_url)
        .bind(&new.reason)
        .bind(new.scam_type)
        .bind(new.reporter_id)
        .bind(reporter.name)
        .bind(reporter.email)
        .bind(reporter.phone)
        .bind(reporter.is_anonymous)
        .bind(duplicate.priority)
        .bind(duplicate.is_duplicate)
        .bind(duplicate.duplicate_of)
        .fetch_one(&self.db.pg)
        .await?;

        tracing::info!(
            report_id = %report.id,
            normalized_url = %report.normalized_url,
            is_duplicate = report.is_duplicate,
            "Report submitted"
        );

        Ok(report)
    }

    pub async fn get(&self, id: Uuid) -> Result<Report> {
        sqlx::query_as("SELECT * FROM reports WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db.pg)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))
    }

    pub async fn list(
        &self,
        status: Option<ReportStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Report>, i64)> {
        let reports: Vec<Report> = sqlx::query_as(
            r#"
            SELECT * FROM reports
            WHERE ($1::report_status IS NULL OR status = $1)
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
            "SELECT COUNT(*) FROM reports WHERE ($1::report_status IS NULL OR status = $1)"
        )
        .bind(status)
        .fetch_one(&self.db.pg)
        .await?;

        Ok((reports, total))
    }

    pub async fn list_by_reporter(&self, reporter_id: Uuid) -> Result<Vec<Report>> {
        let reports: Vec<Report> = sqlx::query_as(
            "SELECT * FROM reports WHERE reporter_id = $1 ORDER BY created_at DESC"
        )
        .bind(reporter_id)
        .fetch_all(&self.db.pg)
        .await?;

        Ok(reports)
    }

    /// Approve a pending report and blacklist its URL in one transaction.
    /// Fails without side effects when the URL is already blacklisted.
    pub async fn approve(
        &self,
        id: Uuid,
        admin_id: Uuid,
        danger_level: Option<DangerLevel>,
        notes: Option<&str>,
    ) -> Result<(Report, BlacklistEntry)> {
        let mut tx = self.db.pg.begin().await?;

        let current: Option<ReportStatus> =
            sqlx::query_scalar("SELECT status FROM reports WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        check_transition(id, current, ReportStatus::Approved)?;

        let report: Report = sqlx::query_as(
            r#"
            UPDATE reports
            SET status = 'approved',
                reviewed_by = $2,
                reviewed_at = NOW(),
                admin_notes = COALESCE($3, admin_notes),
                updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#
        )
        .bind(id)
        .bind(admin_id)
        .bind(notes)
        .fetch_one(&mut *tx)
        .await?;

        let report_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM reports WHERE normalized_url = $1"
        )
        .bind(&report.normalized_url)
        .fetch_one(&mut *tx)
        .await?;

        let new_entry = NewBlacklistEntry {
            url: report.url.clone(),
            normalized_url: report.normalized_url.clone(),
            scam_type: report.scam_type,
            danger_level: danger_level.unwrap_or_else(|| DangerLevel::default_for(report.scam_type)),
            description: Some(report.reason.clone()),
            report_count: i32::try_from(report_count).unwrap_or(i32::MAX),
            source_report_id: Some(report.id),
            added_by: Some(admin_id),
        };

        let entry = match insert_entry(&mut *tx, &new_entry).await? {
            Some(entry) => entry,
            None => {
                tx.rollback().await?;
                return Err(AppError::BadRequest("URL already exists in blacklist".to_string()));
            }
        };

        tx.commit().await?;

        tracing::info!(
            report_id = %report.id,
            admin_id = %admin_id,
            blacklist_id = %entry.id,
            "Report approved and URL blacklisted"
        );

        Ok((report, entry))
    }

    pub async fn reject(&self, id: Uuid, admin_id: Uuid, notes: Option<&str>) -> Result<Report> {
        let current: Option<ReportStatus> = sqlx::query_scalar("SELECT status FROM reports WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db.pg)
            .await?;
        check_transition(id, current, ReportStatus::Rejected)?;

        let report: Report = sqlx::query_as(
            r#"
            UPDATE reports
            SET status = 'rejected',
                reviewed_by = $2,
                reviewed_at = NOW(),
                admin_notes = COALESCE($3, admin_notes),
                updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#
        )
        .bind(id)
        .bind(admin_id)
        .bind(notes)
        .fetch_optional(&self.db.pg)
        .await?
        .ok_or_else(|| AppError::BadRequest("Report has already been reviewed".to_string()))?;

        tracing::info!(report_id = %report.id, admin_id = %admin_id, "Report rejected");
        Ok(report)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM reports WHERE id = $1")
            .bind(id)
            .execute(&self.db.pg)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Report {} not found", id)));
        }

        tracing::info!(report_id = %id, "Report deleted");
        Ok(())
    }
}

fn check_transition(id: Uuid, current: Option<ReportStatus>, target: ReportStatus) -> Result<()> {
    match current {
        None => Err(AppError::NotFound(format!("Report {} not found", id))),
        Some(status) if !status.can_transition_to(target) => Err(review_conflict(
            "Report",
            status.as_str(),
            target.as_str(),
            status.is_terminal(),
        )),
        Some(_) => Ok(()),
    }
}

/// 400 for a review attempted from a non-pending state
pub fn review_conflict(resource: &str, current: &str, target: &str, reviewed: bool) -> AppError {
    if reviewed {
        AppError::BadRequest(format!("{} has already been reviewed ({})", resource, current))
    } else {
        AppError::BadRequest(format!(
            "{} cannot move from {} to {}",
            resource, current, target
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn review_conflict_messages() {
        let err = review_conflict("Report", "approved", "approved", true);
        assert_eq!(err.to_string(), "Report has already been reviewed (approved)");

        let err = review_conflict("Report", "processing", "rejected", false);
        assert_eq!(err.to_string(), "Report cannot move from processing to rejected");
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn only_pending_reports_can_be_reviewed() {
        let id = Uuid::new_v4();
        assert!(check_transition(id, Some(ReportStatus::Pending), ReportStatus::Approved).is_ok());
        assert!(matches!(
            check_transition(id, None, ReportStatus::Approved),
            Err(AppError::NotFound(_))
        ));

        let err = check_transition(id, Some(ReportStatus::Rejected), ReportStatus::Approved).unwrap_err();
        assert_eq!(err.to_string(), "Report has already been reviewed (rejected)");

        let err = check_transition(id, Some(ReportStatus::Processing), ReportStatus::Rejected).unwrap_err();
        assert_eq!(err.to_string(), "Report cannot move from processing to rejected");
    }
}
