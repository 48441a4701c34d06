// Blacklist service - confirmed scam URLs keyed by normalized URL
use uuid::Uuid;

use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::{BlacklistChanges, BlacklistEntry, NewBlacklistEntry, ScamType};
use crate::utils::url::normalize_url;

pub struct BlacklistService {
    db: Database,
}

/// Outcome of an exact blacklist lookup
#[derive(Debug, Clone)]
pub struct UrlLookup {
    pub normalized_url: String,
    pub entry: Option<BlacklistEntry>,
}

/// Conditional insert; `None` when the normalized URL is already listed.
/// The unique index on `normalized_url` makes this safe under concurrent
/// approvals.
pub async fn insert_entry<'e, E>(executor: E, entry: &NewBlacklistEntry) -> Result<Option<BlacklistEntry>>
where
    E: sqlx::PgExecutor<'e>,
{
    let inserted: Option<BlacklistEntry> = sqlx::query_as(
        r#"
        INSERT INTO blacklist (
            id, url, normalized_url, scam_type, danger_level, description,
            report_count, source_report_id, added_by, is_active, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, true, NOW(), NOW())
        ON CONFLICT (normalized_url) DO NOTHING
        RETURNING *
        "#
    )
    .bind(Uuid::new_v4())
    .bind(&entry.url)
    .bind(&entry.normalized_url)
    .bind(entry.scam_type)
    .bind(entry.danger_level)
    .bind(&entry.description)
    .bind(entry.report_count)
    .bind(entry.source_report_id)
    .bind(entry.added_by)
    .fetch_optional(executor)
    .await?;

    Ok(inserted)
}

impl BlacklistService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Exact match on the normalized URL among active entries
    pub async fn find_active(&self, normalized_url: &str) -> Result<Option<BlacklistEntry>> {
        let entry: Option<BlacklistEntry> = sqlx::query_as(
            "SELECT * FROM blacklist WHERE normalized_url = $1 AND is_active = true"
        )
        .bind(normalized_url)
        .fetch_optional(&self.db.pg)
        .await?;

        Ok(entry)
    }

    pub async fn search_url(&self, raw_url: &str) -> Result<UrlLookup> {
        let normalized_url = normalize_url(raw_url)?;
        let entry = self.find_active(&normalized_url).await?;

        tracing::debug!(
            normalized_url = %normalized_url,
            found = entry.is_some(),
            "Blacklist lookup"
        );

        Ok(UrlLookup { normalized_url, entry })
    }

    pub async fn list_active(
        &self,
        scam_type: Option<ScamType>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<BlacklistEntry>, i64)> {
        let entries: Vec<BlacklistEntry> = sqlx::query_as(
            r#"
            SELECT * FROM blacklist
            WHERE is_active = true
              AND ($1::scam_type IS NULL OR scam_type = $1)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#
        )
        .bind(scam_type)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db.pg)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM blacklist WHERE is_active = true AND ($1::scam_type IS NULL OR scam_type = $1)"
        )
        .bind(scam_type)
        .fetch_one(&self.db.pg)
        .await?;

        Ok((entries, total))
    }

    pub async fn get(&self, id: Uuid) -> Result<BlacklistEntry> {
        sqlx::query_as("SELECT * FROM blacklist WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db.pg)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Blacklist entry {} not found", id)))
    }

    /// Direct admin creation
    pub async fn create(&self, entry: NewBlacklistEntry) -> Result<BlacklistEntry> {
        let created = insert_entry(&self.db.pg, &entry)
            .await?
            .ok_or_else(|| AppError::BadRequest("URL already exists in blacklist".to_string()))?;

        tracing::info!(
            entry_id = %created.id,
            normalized_url = %created.normalized_url,
            "Blacklist entry created"
        );

        Ok(created)
    }

    pub async fn update(&self, id: Uuid, changes: BlacklistChanges) -> Result<BlacklistEntry> {
        if changes.is_empty() {
            return Err(AppError::BadRequest("No changes supplied".to_string()));
        }

        let updated: Option<BlacklistEntry> = sqlx::query_as(
            r#"
            UPDATE blacklist
            SET danger_level = COALESCE($2, danger_level),
                description = COALESCE($3, description),
                is_active = COALESCE($4, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#
        )
        .bind(id)
        .bind(changes.danger_level)
        .bind(changes.description)
        .bind(changes.is_active)
        .fetch_optional(&self.db.pg)
        .await?;

        updated.ok_or_else(|| AppError::NotFound(format!("Blacklist entry {} not found", id)))
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM blacklist WHERE id = $1")
            .bind(id)
            .execute(&self.db.pg)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Blacklist entry {} not found", id)));
        }

        tracing::info!(entry_id = %id, "Blacklist entry deleted");
        Ok(())
    }
}
