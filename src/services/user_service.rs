// User service - admin-side user queries and role management
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::UserRole;
use crate::services::feed_service::like_pattern;

pub struct UserService {
    db: Database,
}

/// User summary for list views
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub reports_count: i64,
    pub posts_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct ListUsersParams {
    pub limit: i64,
    pub offset: i64,
    pub role: Option<UserRole>,
    pub search: Option<String>,
}

impl UserService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// List users with pagination and filters
    pub async fn list_users(&self, params: ListUsersParams) -> Result<(Vec<UserSummary>, i64)> {
        let search = params
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(like_pattern);

        let users: Vec<UserSummary> = sqlx::query_as(
            r#"
            SELECT
                u.id,
                u.name,
                u.email,
                u.role,
                (SELECT COUNT(*) FROM reports r WHERE r.reporter_id = u.id) AS reports_count,
                (SELECT COUNT(*) FROM posts p WHERE p.user_id = u.id) AS posts_count,
                u.created_at
            FROM users u
            WHERE ($1::user_role IS NULL OR u.role = $1)
              AND ($2::text IS NULL OR u.name ILIKE $2 OR u.email ILIKE $2)
            ORDER BY u.created_at DESC
            LIMIT $3 OFFSET $4
            "#
        )
        .bind(params.role)
        .bind(&search)
        .bind(params.limit)
        .bind(params.offset)
        .fetch_all(&self.db.pg)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM users u
            WHERE ($1::user_role IS NULL OR u.role = $1)
              AND ($2::text IS NULL OR u.name ILIKE $2 OR u.email ILIKE $2)
            "#
        )
        .bind(params.role)
        .bind(&search)
        .fetch_one(&self.db.pg)
        .await?;

        Ok((users, total))
    }

    /// Change a user's role. Admins cannot demote themselves.
    pub async fn update_role(&self, user_id: Uuid, role: UserRole, admin_id: Uuid) -> Result<UserSummary> {
        if user_id == admin_id && role != UserRole::Admin {
            return Err(AppError::BadRequest("You cannot remove your own admin role".to_string()));
        }

        let result = sqlx::query("UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .bind(role)
            .execute(&self.db.pg)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {} not found", user_id)));
        }

        tracing::info!(user_id = %user_id, admin_id = %admin_id, role = role.as_str(), "User role updated");

        let user: UserSummary = sqlx::query_as(
            r#"
            SELECT
                u.id, u.name, u.email, u.role,
                (SELECT COUNT(*) FROM reports r WHERE r.reporter_id = u.id) AS reports_count,
                (SELECT COUNT(*) FROM posts p WHERE p.user_id = u.id) AS posts_count,
                u.created_at
            FROM users u WHERE u.id = $1
            "#
        )
        .bind(user_id)
        .fetch_one(&self.db.pg)
        .await?;

        Ok(user)
    }
}
