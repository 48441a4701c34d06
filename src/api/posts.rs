use axum::{
    extract::{Path, State},
    middleware::from_fn_with_state,
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use validator::Validate;

use super::{parse_id, ApiJson, ApiQuery, ApiResponse, ApiResult, Page, PageQuery};
use crate::middleware::{protect, CurrentUser};
use crate::models::{AuditAction, CreateAuditLog, Post, PostWithAuthor, ResourceType};
use crate::services::{AuditService, PostService};
use crate::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(list_posts))
        .route("/:id", get(get_post));

    let protected = Router::new()
        .route("/", post(create_post))
        .route("/mine", get(my_posts))
        .route("/:id", delete(delete_post))
        .route_layer(from_fn_with_state(state.clone(), protect));

    public.merge(protected)
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    #[serde(default)]
    #[validate(
        length(max = 200),
        custom(function = "crate::utils::not_blank", message = "title is required")
    )]
    pub title: String,
    #[serde(default)]
    #[validate(
        length(max = 10000),
        custom(function = "crate::utils::not_blank", message = "content is required")
    )]
    pub content: String,
}

async fn list_posts(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> ApiResult<Page<PostWithAuthor>> {
    let post_service = PostService::new(state.db.clone());
    let (posts, total) = post_service
        .list_approved(i64::from(page.limit()), page.offset())
        .await?;

    Ok(ApiResponse::ok(Page::new(posts, total, &page)))
}

async fn get_post(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<PostWithAuthor> {
    let post_id = parse_id(&id, "post")?;

    let post_service = PostService::new(state.db.clone());
    let post = post_service.get_approved(post_id).await?;

    Ok(ApiResponse::ok(post))
}

async fn create_post(
    State(state): State<AppState>,
    current_user: CurrentUser,
    ApiJson(payload): ApiJson<CreatePostRequest>,
) -> ApiResult<Post> {
    payload.validate()?;

    let post_service = PostService::new(state.db.clone());
    let post = post_service
        .create(current_user.id, &payload.title, &payload.content)
        .await?;

    Ok(ApiResponse::with_message(post, "Post submitted for review"))
}

async fn my_posts(State(state): State<AppState>, current_user: CurrentUser) -> ApiResult<Vec<Post>> {
    let post_service = PostService::new(state.db.clone());
    let posts = post_service.list_by_user(current_user.id).await?;

    Ok(ApiResponse::ok(posts))
}

async fn delete_post(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let post_id = parse_id(&id, "post")?;

    let post_service = PostService::new(state.db.clone());
    post_service.delete(post_id, &current_user).await?;

    if current_user.is_admin() {
        AuditService::new(state.db.clone())
            .record(CreateAuditLog {
                admin_id: current_user.id,
                action: AuditAction::DeletePost,
                resource_type: ResourceType::Post,
                resource_id: Some(id),
                details: None,
            })
            .await;
    }

    Ok(ApiResponse::with_message((), "Post deleted"))
}
