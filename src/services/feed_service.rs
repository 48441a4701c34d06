// Feed service - public newsfeed and keyword search
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::{BlacklistEntry, DangerLevel, PostWithAuthor};
use crate::utils::preview;
use crate::utils::url::normalize_url;

pub struct FeedService {
    db: Database,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedItem {
    Post {
        id: Uuid,
        title: String,
        summary: String,
        author_name: String,
        published_at: DateTime<Utc>,
    },
    Blacklist {
        id: Uuid,
        url: String,
        danger_level: DangerLevel,
        published_at: DateTime<Utc>,
    },
}

impl FeedItem {
    pub fn published_at(&self) -> DateTime<Utc> {
        match self {
            FeedItem::Post { published_at, .. } | FeedItem::Blacklist { published_at, .. } => *published_at,
        }
    }
}

impl From<PostWithAuthor> for FeedItem {
    fn from(post: PostWithAuthor) -> Self {
        FeedItem::Post {
            id: post.id,
            summary: preview(&post.content, 160),
            title: post.title,
            author_name: post.author_name,
            published_at: post.approved_at.unwrap_or(post.created_at),
        }
    }
}

impl From<BlacklistEntry> for FeedItem {
    fn from(entry: BlacklistEntry) -> Self {
        FeedItem::Blacklist {
            id: entry.id,
            url: entry.normalized_url,
            danger_level: entry.danger_level,
            published_at: entry.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub query: String,
    pub blacklist: Vec<BlacklistEntry>,
    pub posts: Vec<PostWithAuthor>,
}

impl FeedService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Newest approved posts and blacklist additions, merged by time
    pub async fn newsfeed(&self, limit: i64) -> Result<Vec<FeedItem>> {
        let posts: Vec<PostWithAuthor> = sqlx::query_as(
            r#"
            SELECT p.id, p.user_id, COALESCE(u.name, 'Unknown') AS author_name,
                   p.title, p.content, p.status, p.approved_at, p.created_at
            FROM posts p
            LEFT JOIN users u ON u.id = p.user_id
            WHERE p.status = 'approved'
            ORDER BY COALESCE(p.approved_at, p.created_at) DESC
            LIMIT $1
            "#
        )
        .bind(limit)
        .fetch_all(&self.db.pg)
        .await?;

        let entries: Vec<BlacklistEntry> = sqlx::query_as(
            "SELECT * FROM blacklist WHERE is_active = true ORDER BY created_at DESC LIMIT $1"
        )
        .bind(limit)
        .fetch_all(&self.db.pg)
        .await?;

        Ok(merge_feed(posts, entries, limit as usize))
    }

    /// Case-insensitive substring search over active blacklist URLs and
    /// approved posts
    pub async fn search(&self, query: &str, limit: i64) -> Result<SearchResults> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::BadRequest("Search query is required".to_string()));
        }

        let url_term = normalize_url(query).unwrap_or_else(|_| query.to_lowercase());
        let url_pattern = like_pattern(&url_term);
        let text_pattern = like_pattern(query);

        let blacklist: Vec<BlacklistEntry> = sqlx::query_as(
            r#"
            SELECT * FROM blacklist
            WHERE is_active = true
              AND (normalized_url ILIKE $1 ESCAPE '\' OR description ILIKE $2 ESCAPE '\')
            ORDER BY created_at DESC
            LIMIT $3
            "#
        )
        .bind(&url_pattern)
        .bind(&text_pattern)
        .bind(limit)
        .fetch_all(&self.db.pg)
        .await?;

        let posts: Vec<PostWithAuthor> = sqlx::query_as(
            r#"
            SELECT p.id, p.user_id, COALESCE(u.name, 'Unknown') AS author_name,
                   p.title, p.content, p.status, p.approved_at, p.created_at
            FROM posts p
            LEFT JOIN users u ON u.id = p.user_id
            WHERE p.status = 'approved'
              AND (p.title ILIKE $1 ESCAPE '\' OR p.content ILIKE $1 ESCAPE '\')
            ORDER BY p.created_at DESC
            LIMIT $2
            "#
        )
        .bind(&text_pattern)
        .bind(limit)
        .fetch_all(&self.db.pg)
        .await?;

        tracing::debug!(
            query,
            blacklist_hits = blacklist.len(),
            post_hits = posts.len(),
            "Search completed"
        );

        Ok(SearchResults {
            query: query.to_string(),
            blacklist,
            posts,
        })
    }
}

fn merge_feed(posts: Vec<PostWithAuthor>, entries: Vec<BlacklistEntry>, limit: usize) -> Vec<FeedItem> {
    let mut items: Vec<FeedItem> = posts
        .into_iter()
        .map(FeedItem::from)
        .chain(entries.into_iter().map(FeedItem::from))
        .collect();

    items.sort_by(|a, b| b.published_at().cmp(&a.published_at()));
    items.truncate(limit);
    items
}

/// `%term%` with LIKE wildcards in the term escaped
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ModerationStatus, ScamType};
    use chrono::Duration;

    fn post_at(minutes_ago: i64) -> PostWithAuthor {
        let at = Utc::now() - Duration::minutes(minutes_ago);
        PostWithAuthor {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            author_name: "Minh".to_string(),
            title: "Fake delivery SMS".to_string(),
            content: "A parcel fee link is circulating".to_string(),
            status: ModerationStatus::Approved,
            approved_at: Some(at),
            created_at: at - Duration::hours(1),
        }
    }

    fn entry_at(minutes_ago: i64) -> BlacklistEntry {
        let at = Utc::now() - Duration::minutes(minutes_ago);
        BlacklistEntry {
            id: Uuid::new_v4(),
            url: "https://bank-verify.top/login".to_string(),
            normalized_url: "bank-verify.top/login".to_string(),
            scam_type: ScamType::Phishing,
            danger_level: DangerLevel::High,
            description: None,
            report_count: 2,
            source_report_id: None,
            added_by: None,
            is_active: true,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn feed_is_newest_first_and_truncated() {
        let feed = merge_feed(
            vec![post_at(30), post_at(5)],
            vec![entry_at(10), entry_at(60)],
            3,
        );

        assert_eq!(feed.len(), 3);
        assert!(matches!(feed[0], FeedItem::Post { .. }));
        assert!(matches!(feed[1], FeedItem::Blacklist { .. }));
        assert!(matches!(feed[2], FeedItem::Post { .. }));
        assert!(feed[0].published_at() >= feed[1].published_at());
    }

    #[test]
    fn feed_items_serialize_with_kind_tag() {
        let item = FeedItem::from(entry_at(1));
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["kind"], "blacklist");
        assert_eq!(json["url"], "bank-verify.top/login");
        assert_eq!(json["danger_level"], "high");
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("bank"), "%bank%");
        assert_eq!(like_pattern("100%_off"), "%100\\%\\_off%");
    }
}
