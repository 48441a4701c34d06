use axum::{
    extract::State,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{ApiJson, ApiResponse, ApiResult};
use crate::middleware::{protect, CurrentUser};
use crate::models::UserProfile;
use crate::services::AuthService;
use crate::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/register", post(register))
        .route("/login", post(login));

    let protected = Router::new()
        .route("/me", get(me))
        .route_layer(from_fn_with_state(state.clone(), protect));

    public.merge(protected)
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(
        length(max = 100),
        custom(function = "crate::utils::not_blank", message = "Name is required")
    )]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthPayload {
    pub token: String,
    pub user: UserProfile,
}

async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> ApiResult<AuthPayload> {
    payload.validate()?;

    let auth_service = AuthService::new(state.db.clone(), state.config.clone());
    let (user, token) = auth_service
        .register(&payload.name, &payload.email, &payload.password)
        .await?;

    Ok(ApiResponse::with_message(
        AuthPayload {
            token,
            user: user.into(),
        },
        "Registration successful",
    ))
}

async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> ApiResult<AuthPayload> {
    payload.validate()?;

    let auth_service = AuthService::new(state.db.clone(), state.config.clone());
    let (user, token) = auth_service
        .authenticate(&payload.email, &payload.password)
        .await?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(ApiResponse::ok(AuthPayload {
        token,
        user: user.into(),
    }))
}

async fn me(State(state): State<AppState>, current_user: CurrentUser) -> ApiResult<UserProfile> {
    let auth_service = AuthService::new(state.db.clone(), state.config.clone());
    let user = auth_service.find_user(current_user.id).await?;

    Ok(ApiResponse::ok(user.into()))
}
