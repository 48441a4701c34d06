use axum::{
    extract::State,
    routing::get,
    Router,
};
use serde::Deserialize;
use validator::Validate;

use super::{ApiJson, ApiResponse, ApiResult};
use crate::models::{NewVolunteer, PublicVolunteer, Volunteer};
use crate::services::VolunteerService;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(list_approved).post(register_volunteer))
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterVolunteerRequest {
    #[serde(default, alias = "fullName")]
    #[validate(
        length(max = 100),
        custom(function = "crate::utils::not_blank", message = "full_name is required")
    )]
    pub full_name: String,
    #[serde(default)]
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    #[serde(default)]
    #[validate(
        length(min = 6, max = 20),
        custom(function = "crate::utils::not_blank", message = "A valid phone number is required")
    )]
    pub phone: String,
    #[serde(default)]
    #[validate(
        length(max = 100),
        custom(function = "crate::utils::not_blank", message = "specialty is required")
    )]
    pub specialty: String,
    #[validate(length(max = 2000))]
    pub motivation: Option<String>,
}

async fn register_volunteer(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterVolunteerRequest>,
) -> ApiResult<Volunteer> {
    payload.validate()?;

    let volunteer_service = VolunteerService::new(state.db.clone());
    let volunteer = volunteer_service
        .register(NewVolunteer {
            full_name: payload.full_name.trim().to_string(),
            email: payload.email,
            phone: payload.phone.trim().to_string(),
            specialty: payload.specialty.trim().to_string(),
            motivation: payload.motivation,
        })
        .await?;

    Ok(ApiResponse::with_message(
        volunteer,
        "Registration received. An admin will review it shortly",
    ))
}

async fn list_approved(State(state): State<AppState>) -> ApiResult<Vec<PublicVolunteer>> {
    let volunteer_service = VolunteerService::new(state.db.clone());
    let volunteers = volunteer_service.list_approved().await?;

    Ok(ApiResponse::ok(volunteers))
}
