use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::Database;
use crate::error::AppError;
use crate::models::UserRole;
use crate::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,       // User ID
    pub email: String,
    pub role: UserRole,
    pub exp: usize,        // Expiration time
    pub iat: usize,        // Issued at
}

#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Reads the caller placed in extensions by `protect` / `optional_auth`.
/// Use `Option<CurrentUser>` behind `optional_auth`.
#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

pub fn decode_token(token: &str, secret: &str) -> Result<CurrentUser, AppError> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer token");
        AppError::Unauthorized
    })?
    .claims;

    let id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::Unauthorized)?;

    Ok(CurrentUser {
        id,
        email: claims.email,
        role: claims.role,
    })
}

/// The token's subject as currently stored; role and existence come from
/// the users table, not from the claims.
pub async fn load_current_user(db: &Database, user_id: Uuid) -> Result<CurrentUser, AppError> {
    let row: Option<(Uuid, String, UserRole)> =
        sqlx::query_as("SELECT id, email, role FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&db.pg)
            .await?;

    let (id, email, role) = row.ok_or_else(|| {
        tracing::debug!(user_id = %user_id, "Token subject no longer exists");
        AppError::Unauthorized
    })?;

    Ok(CurrentUser { id, email, role })
}

async fn authenticate(state: &AppState, token: &str) -> Result<CurrentUser, AppError> {
    let claimed = decode_token(token, &state.config.jwt.secret)?;
    load_current_user(&state.db, claimed.id).await
}

/// Requires a valid bearer token for an existing user; the caller lands in
/// request extensions.
pub async fn protect(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(AppError::Unauthorized)?;
    let current_user = authenticate(&state, bearer.token()).await?;

    request.extensions_mut().insert(current_user);

    Ok(next.run(request).await)
}

/// Like `protect`, but anonymous requests pass through untouched.
pub async fn optional_auth(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(TypedHeader(Authorization(bearer))) = bearer {
        match authenticate(&state, bearer.token()).await {
            Ok(current_user) => {
                request.extensions_mut().insert(current_user);
            }
            Err(e) => tracing::debug!(error = %e, "Ignoring bearer token on optional route"),
        }
    }

    next.run(request).await
}

/// Must run inside `protect`.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AppError> {
    let current_user = request
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AppError::Unauthorized)?;

    if !current_user.is_admin() {
        tracing::warn!(user_id = %current_user.id, path = %request.uri().path(), "Non-admin denied");
        return Err(AppError::Forbidden);
    }

    Ok(next.run(request).await)
}
