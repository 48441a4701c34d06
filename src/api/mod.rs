mod admin;
mod auth;
mod blacklist;
mod events;
mod posts;
mod public;
mod quiz;
mod reports;
mod url_checker;
mod volunteers;

use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRequest, FromRequestParts, Query, Request,
    },
    http::request::Parts,
    Json, Router,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::routes(state))
        .nest("/reports", reports::routes(state))
        .nest("/blacklist", blacklist::routes())
        .nest("/posts", posts::routes(state))
        .nest("/volunteers", volunteers::routes())
        .nest("/events", events::routes())
        .nest("/quiz", quiz::routes())
        .nest("/url-checker", url_checker::routes())
        .nest("/admin", admin::routes(state))
        .merge(public::routes())
}

/// Success envelope; failures are rendered by `AppError`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
            message: None,
        })
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            data,
            message: Some(message.into()),
        })
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>>;

/// `?page=&limit=`; page is 1-based, limit is capped at 100.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageQuery {
    pub const DEFAULT_LIMIT: u32 = 20;
    pub const MAX_LIMIT: u32 = 100;

    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(Self::DEFAULT_LIMIT).clamp(1, Self::MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page() - 1) * i64::from(self.limit())
    }
}

#[derive(Debug, Serialize)]
pub struct Page<T: Serialize> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
}

impl<T: Serialize> Page<T> {
    pub fn new(items: Vec<T>, total: i64, query: &PageQuery) -> Self {
        Self {
            items,
            total,
            page: query.page(),
            limit: query.limit(),
        }
    }
}

/// `Json` whose rejections (bad syntax, wrong types) use the error envelope
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| AppError::BadRequest(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// `Query` whose rejections (non-numeric page, bad flags) use the error envelope
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> std::result::Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection: QueryRejection| AppError::BadRequest(rejection.body_text()))?;
        Ok(Self(value))
    }
}

pub(crate) fn parse_id(raw: &str, resource: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest(format!("Invalid {} ID", resource)))
}

/// Optional enum filter from a query string; blank means no filter.
pub(crate) fn parse_filter<T>(raw: Option<&str>) -> Result<Option<T>>
where
    T: FromStr<Err = String>,
{
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<T>().map_err(AppError::BadRequest))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReportStatus;

    #[test]
    fn page_query_clamps() {
        let q = PageQuery { page: Some(0), limit: Some(500) };
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), 100);
        assert_eq!(q.offset(), 0);

        let q = PageQuery { page: Some(3), limit: None };
        assert_eq!(q.offset(), 40);
    }

    #[test]
    fn filters_parse_or_reject() {
        assert_eq!(parse_filter::<ReportStatus>(None).unwrap(), None);
        assert_eq!(parse_filter::<ReportStatus>(Some("  ")).unwrap(), None);
        assert_eq!(
            parse_filter::<ReportStatus>(Some("Pending")).unwrap(),
            Some(ReportStatus::Pending)
        );
        assert!(matches!(
            parse_filter::<ReportStatus>(Some("archived")),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn envelope_omits_empty_message() {
        let Json(body) = ApiResponse::ok(vec![1, 2]);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], serde_json::json!([1, 2]));
        assert!(json.get("message").is_none());
    }
}
