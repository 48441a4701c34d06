// Read-only public endpoints: counters, newsfeed, keyword search
use axum::{
    extract::State,
    routing::get,
    Router,
};
use serde::Deserialize;

use super::{ApiQuery, ApiResponse, ApiResult};
use crate::error::AppError;
use crate::services::dashboard_service::PublicStats;
use crate::services::feed_service::{FeedItem, SearchResults};
use crate::services::{DashboardService, FeedService};
use crate::AppState;

const DEFAULT_FEED_LIMIT: i64 = 20;
const MAX_FEED_LIMIT: i64 = 50;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(public_stats))
        .route("/newsfeed", get(newsfeed))
        .route("/search", get(search))
}

async fn public_stats(State(state): State<AppState>) -> ApiResult<PublicStats> {
    let dashboard_service = DashboardService::new(state.db.clone());
    let stats = dashboard_service.public_stats().await?;

    Ok(ApiResponse::ok(stats))
}

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub limit: Option<i64>,
}

async fn newsfeed(State(state): State<AppState>, ApiQuery(query): ApiQuery<FeedQuery>) -> ApiResult<Vec<FeedItem>> {
    let limit = query.limit.unwrap_or(DEFAULT_FEED_LIMIT).clamp(1, MAX_FEED_LIMIT);

    let feed_service = FeedService::new(state.db.clone());
    let feed = feed_service.newsfeed(limit).await?;

    Ok(ApiResponse::ok(feed))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub limit: Option<i64>,
}

async fn search(State(state): State<AppState>, ApiQuery(query): ApiQuery<SearchQuery>) -> ApiResult<SearchResults> {
    let q = query
        .q
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Search query is required".to_string()))?;
    let limit = query.limit.unwrap_or(DEFAULT_FEED_LIMIT).clamp(1, MAX_FEED_LIMIT);

    let feed_service = FeedService::new(state.db.clone());
    let results = feed_service.search(&q, limit).await?;

    Ok(ApiResponse::ok(results))
}
