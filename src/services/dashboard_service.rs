// Dashboard service - public counters and admin statistics
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::db::Database;
use crate::error::Result;

pub struct DashboardService {
    db: Database,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PublicStats {
    pub total_reports: i64,
    pub approved_reports: i64,
    pub blacklisted_urls: i64,
    pub approved_posts: i64,
    pub approved_volunteers: i64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PendingCounts {
    pub reports: i64,
    pub posts: i64,
    pub volunteers: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    #[serde(flatten)]
    pub public: PublicStats,
    pub pending: PendingCounts,
    pub total_users: i64,
    pub admin_users: i64,
    pub reports_today: i64,
    pub admin_actions_today: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChartDataPoint {
    pub date: String,
    pub value: i64,
}

impl DashboardService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn public_stats(&self) -> Result<PublicStats> {
        let stats: PublicStats = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM reports) AS total_reports,
                (SELECT COUNT(*) FROM reports WHERE status = 'approved') AS approved_reports,
                (SELECT COUNT(*) FROM blacklist WHERE is_active = true) AS blacklisted_urls,
                (SELECT COUNT(*) FROM posts WHERE status = 'approved') AS approved_posts,
                (SELECT COUNT(*) FROM volunteers WHERE status = 'approved') AS approved_volunteers
            "#
        )
        .fetch_one(&self.db.pg)
        .await?;

        Ok(stats)
    }

    pub async fn get_stats(&self) -> Result<DashboardStats> {
        let public = self.public_stats().await?;

        let pending: PendingCounts = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM reports WHERE status IN ('pending', 'processing')) AS reports,
                (SELECT COUNT(*) FROM posts WHERE status = 'pending') AS posts,
                (SELECT COUNT(*) FROM volunteers WHERE status = 'pending') AS volunteers
            "#
        )
        .fetch_one(&self.db.pg)
        .await?;

        let (total_users, admin_users): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE role = 'admin') FROM users"
        )
        .fetch_one(&self.db.pg)
        .await?;

        let reports_today: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM reports WHERE created_at >= date_trunc('day', NOW())"
        )
        .fetch_one(&self.db.pg)
        .await?;

        let admin_actions_today: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM audit_logs WHERE created_at >= date_trunc('day', NOW())"
        )
        .fetch_one(&self.db.pg)
        .await?;

        Ok(DashboardStats {
            public,
            pending,
            total_users,
            admin_users,
            reports_today,
            admin_actions_today,
        })
    }

    /// Reports submitted per day over the last `days` days, oldest first
    pub async fn get_report_chart(&self, days: i64) -> Result<Vec<ChartDataPoint>> {
        let today = Utc::now().date_naive();
        let (since, window_start) = chart_window(today, days);

        let rows: Vec<(NaiveDate, i64)> = sqlx::query_as(
            r#"
            SELECT (created_at AT TIME ZONE 'UTC')::date AS day, COUNT(*)
            FROM reports
            WHERE created_at >= $1
            GROUP BY day
            "#
        )
        .bind(window_start)
        .fetch_all(&self.db.pg)
        .await?;

        Ok(fill_daily_series(since, today, &rows))
    }
}

/// First charted day and the UTC midnight it starts at
fn chart_window(today: NaiveDate, days: i64) -> (NaiveDate, DateTime<Utc>) {
    let since = today - Duration::days(days - 1);
    (since, since.and_time(NaiveTime::MIN).and_utc())
}

/// One point per day in `[since, until]`, zero where no row exists
fn fill_daily_series(since: NaiveDate, until: NaiveDate, rows: &[(NaiveDate, i64)]) -> Vec<ChartDataPoint> {
    since
        .iter_days()
        .take_while(|d| *d <= until)
        .map(|date| ChartDataPoint {
            date: date.format("%Y-%m-%d").to_string(),
            value: rows
                .iter()
                .find(|(day, _)| *day == date)
                .map_or(0, |(_, count)| *count),
        })
        .collect()
}
