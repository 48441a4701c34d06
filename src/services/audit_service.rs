use uuid::Uuid;

use crate::db::Database;
use crate::error::Result;
use crate::models::{AuditLog, CreateAuditLog};

pub struct AuditService {
    db: Database,
}

impl AuditService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn log(&self, entry: CreateAuditLog) -> Result<AuditLog> {
        let log: AuditLog = sqlx::query_as(
            r#"
            INSERT INTO audit_logs (id, admin_id, action, resource_type, resource_id, details, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            RETURNING *
            "#
        )
        .bind(Uuid::new_v4())
        .bind(entry.admin_id)
        .bind(entry.action.as_str())
        .bind(entry.resource_type.as_str())
        .bind(entry.resource_id)
        .bind(entry.details)
        .fetch_one(&self.db.pg)
        .await?;

        Ok(log)
    }

    /// Audit writes never fail the admin action that triggered them.
    pub async fn record(&self, entry: CreateAuditLog) {
        let action = entry.action.as_str();
        if let Err(e) = self.log(entry).await {
            tracing::warn!(action, error = %e, "Failed to write audit log");
        }
    }

    pub async fn list_recent(&self, limit: i64, offset: i64) -> Result<(Vec<AuditLog>, i64)> {
        let logs: Vec<AuditLog> = sqlx::query_as(
            "SELECT * FROM audit_logs ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db.pg)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audit_logs")
            .fetch_one(&self.db.pg)
            .await?;

        Ok((logs, total))
    }

    /// History of one resource, newest first
    pub async fn list_by_resource(
        &self,
        resource_type: &str,
        resource_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<AuditLog>, i64)> {
        let logs: Vec<AuditLog> = sqlx::query_as(
            r#"
            SELECT * FROM audit_logs
            WHERE resource_type = $1 AND resource_id = $2
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#
        )
        .bind(resource_type)
        .bind(resource_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db.pg)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM audit_logs WHERE resource_type = $1 AND resource_id = $2"
        )
        .bind(resource_type)
        .bind(resource_id)
        .fetch_one(&self.db.pg)
        .await?;

        Ok((logs, total))
    }
}
