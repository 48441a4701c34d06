// Post service - community warnings and their moderation
use uuid::Uuid;

use crate::db::Database;
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::models::{ModerationStatus, Post, PostWithAuthor};
use crate::services::report_service::review_conflict;

pub struct PostService {
    db: Database,
}

const POST_WITH_AUTHOR: &str = r#"
    SELECT
        p.id,
        p.user_id,
        COALESCE(u.name, 'Unknown') AS author_name,
        p.title,
        p.content,
        p.status,
        p.approved_at,
        p.created_at
    FROM posts p
    LEFT JOIN users u ON u.id = p.user_id
"#;

impl PostService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn create(&self, user_id: Uuid, title: &str, content: &str) -> Result<Post> {
        let post: Post = sqlx::query_as(
            r#"
            INSERT INTO posts (id, user_id, title, content, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, 'pending', NOW(), NOW())
            RETURNING *
            "#
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(title.trim())
        .bind(content.trim())
        .fetch_one(&self.db.pg)
        .await?;

        tracing::info!(post_id = %post.id, user_id = %user_id, "Post submitted for review");

        Ok(post)
    }

    /// Public feed: approved posts only
    pub async fn list_approved(&self, limit: i64, offset: i64) -> Result<(Vec<PostWithAuthor>, i64)> {
        self.list(Some(ModerationStatus::Approved), limit, offset).await
    }

    pub async fn get_approved(&self, id: Uuid) -> Result<PostWithAuthor> {
        let query = format!("{} WHERE p.id = $1 AND p.status = 'approved'", POST_WITH_AUTHOR);

        sqlx::query_as(&query)
            .bind(id)
            .fetch_optional(&self.db.pg)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Post {} not found", id)))
    }

    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Post>> {
        let posts: Vec<Post> = sqlx::query_as(
            "SELECT * FROM posts WHERE user_id = $1 ORDER BY created_at DESC"
        )
        .bind(user_id)
        .fetch_all(&self.db.pg)
        .await?;

        Ok(posts)
    }

    pub async fn list(
        &self,
        status: Option<ModerationStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<PostWithAuthor>, i64)> {
        let query = format!(
            "{} WHERE ($1::moderation_status IS NULL OR p.status = $1) ORDER BY p.created_at DESC LIMIT $2 OFFSET $3",
            POST_WITH_AUTHOR
        );

        let posts: Vec<PostWithAuthor> = sqlx::query_as(&query)
            .bind(status)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.db.pg)
            .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM posts WHERE ($1::moderation_status IS NULL OR status = $1)"
        )
        .bind(status)
        .fetch_one(&self.db.pg)
        .await?;

        Ok((posts, total))
    }

    pub async fn approve(&self, id: Uuid, admin_id: Uuid, note: Option<&str>) -> Result<Post> {
        self.review(id, admin_id, ModerationStatus::Approved, note).await
    }

    pub async fn reject(&self, id: Uuid, admin_id: Uuid, note: Option<&str>) -> Result<Post> {
        self.review(id, admin_id, ModerationStatus::Rejected, note).await
    }

    async fn review(
        &self,
        id: Uuid,
        admin_id: Uuid,
        decision: ModerationStatus,
        note: Option<&str>,
    ) -> Result<Post> {
        let current: ModerationStatus = sqlx::query_scalar("SELECT status FROM posts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db.pg)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Post {} not found", id)))?;

        if !current.can_transition_to(decision) {
            return Err(review_conflict(
                "Post",
                current.as_str(),
                decision.as_str(),
                current.is_terminal(),
            ));
        }

        let post: Post = sqlx::query_as(
            r#"
            UPDATE posts
            SET status = $2,
                approved_by = $3,
                approved_at = CASE WHEN $2 = 'approved'::moderation_status THEN NOW() ELSE NULL END,
                admin_note = COALESCE($4, admin_note),
                updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#
        )
        .bind(id)
        .bind(decision)
        .bind(admin_id)
        .bind(note)
        .fetch_optional(&self.db.pg)
        .await?
        .ok_or_else(|| AppError::BadRequest("Post has already been reviewed".to_string()))?;

        tracing::info!(
            post_id = %post.id,
            admin_id = %admin_id,
            decision = decision.as_str(),
            "Post reviewed"
        );

        Ok(post)
    }

    /// Admins delete any post; authors only their own while still pending.
    /// The rule is applied by the DELETE itself; the row is read only to
    /// explain a refusal.
    pub async fn delete(&self, id: Uuid, caller: &CurrentUser) -> Result<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM posts
            WHERE id = $1
              AND ($2 OR (user_id = $3 AND status = 'pending'))
            "#
        )
        .bind(id)
        .bind(caller.is_admin())
        .bind(caller.id)
        .execute(&self.db.pg)
        .await?;

        if result.rows_affected() == 0 {
            let post: Post = sqlx::query_as("SELECT * FROM posts WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.db.pg)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Post {} not found", id)))?;

            check_delete_permission(&post, caller)?;
            return Err(AppError::BadRequest("Post changed during deletion, retry".to_string()));
        }

        tracing::info!(post_id = %id, deleted_by = %caller.id, "Post deleted");
        Ok(())
    }
}

fn check_delete_permission(post: &Post, caller: &CurrentUser) -> Result<()> {
    if caller.is_admin() {
        return Ok(());
    }
    if post.user_id != caller.id {
        return Err(AppError::Forbidden);
    }
    if post.status != ModerationStatus::Pending {
        return Err(AppError::BadRequest(
            "Only pending posts can be deleted by their author".to_string(),
        ));
    }
    Ok(())
}
