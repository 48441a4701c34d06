use axum::{extract::State, routing::post, Router};
use serde::Deserialize;
use validator::Validate;

use super::{ApiJson, ApiResponse, ApiResult};
use crate::services::url_checker::UrlCheckResult;
use crate::services::UrlCheckerService;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/check", post(check_url))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CheckUrlRequest {
    #[serde(default)]
    #[validate(
        length(max = 2048),
        custom(function = "crate::utils::not_blank", message = "url is required")
    )]
    pub url: String,
}

async fn check_url(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CheckUrlRequest>,
) -> ApiResult<UrlCheckResult> {
    payload.validate()?;

    let checker = UrlCheckerService::new(
        state.db.clone(),
        state.reputation.clone(),
        state.llm.clone(),
        state.config.virustotal.cache_ttl_secs,
    );
    let result = checker.check(&payload.url).await?;

    tracing::info!(
        normalized_url = %result.normalized_url,
        safe = result.safe,
        "URL checked"
    );

    Ok(ApiResponse::ok(result))
}
