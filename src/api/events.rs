use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};
use serde::Deserialize;

use super::{parse_id, ApiQuery, ApiResponse, ApiResult, Page, PageQuery};
use crate::models::Event;
use crate::services::EventService;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_events))
        .route("/:id", get(get_event))
}

#[derive(Debug, Deserialize)]
pub struct EventFilter {
    #[serde(default)]
    pub include_past: bool,
}

async fn list_events(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageQuery>,
    ApiQuery(filter): ApiQuery<EventFilter>,
) -> ApiResult<Page<Event>> {
    let event_service = EventService::new(state.db.clone());
    let (events, total) = event_service
        .list_published(filter.include_past, i64::from(page.limit()), page.offset())
        .await?;

    Ok(ApiResponse::ok(Page::new(events, total, &page)))
}

async fn get_event(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Event> {
    let event_id = parse_id(&id, "event")?;

    let event_service = EventService::new(state.db.clone());
    let event = event_service.get_published(event_id).await?;

    Ok(ApiResponse::ok(event))
}
