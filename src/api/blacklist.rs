use axum::{
    extract::State,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};

use super::{parse_filter, ApiQuery, ApiResponse, ApiResult, Page, PageQuery};
use crate::error::AppError;
use crate::models::{BlacklistEntry, ScamType};
use crate::services::BlacklistService;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_blacklist))
        .route("/search", get(search_url))
}

#[derive(Debug, Deserialize)]
pub struct BlacklistFilter {
    pub scam_type: Option<String>,
}

async fn list_blacklist(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageQuery>,
    ApiQuery(filter): ApiQuery<BlacklistFilter>,
) -> ApiResult<Page<BlacklistEntry>> {
    let scam_type = parse_filter::<ScamType>(filter.scam_type.as_deref())?;

    let blacklist_service = BlacklistService::new(state.db.clone());
    let (entries, total) = blacklist_service
        .list_active(scam_type, i64::from(page.limit()), page.offset())
        .await?;

    Ok(ApiResponse::ok(Page::new(entries, total, &page)))
}

#[derive(Debug, Deserialize)]
pub struct SearchUrlQuery {
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchUrlResponse {
    pub found: bool,
    pub normalized_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<BlacklistEntry>,
}

async fn search_url(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<SearchUrlQuery>,
) -> ApiResult<SearchUrlResponse> {
    let url = query
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("url query parameter is required".to_string()))?;

    let blacklist_service = BlacklistService::new(state.db.clone());
    let lookup = blacklist_service.search_url(&url).await?;

    Ok(ApiResponse::ok(SearchUrlResponse {
        found: lookup.entry.is_some(),
        normalized_url: lookup.normalized_url,
        entry: lookup.entry,
    }))
}
