use axum::{
    extract::State,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use validator::Validate;

use super::{ApiJson, ApiResponse, ApiResult};
use crate::error::AppError;
use crate::middleware::{optional_auth, protect, CurrentUser};
use crate::models::{NewReport, Report, ReporterInfo, ScamType};
use crate::services::ReportService;
use crate::utils::url::{normalize_url, parse_absolute};
use crate::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", post(create_report))
        .route_layer(from_fn_with_state(state.clone(), optional_auth));

    let protected = Router::new()
        .route("/mine", get(my_reports))
        .route_layer(from_fn_with_state(state.clone(), protect));

    public.merge(protected)
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReportRequest {
    #[serde(default)]
    #[validate(
        length(max = 2048),
        custom(function = "crate::utils::not_blank", message = "url is required")
    )]
    pub url: String,
    #[serde(default)]
    #[validate(
        length(max = 5000),
        custom(function = "crate::utils::not_blank", message = "reason is required")
    )]
    pub reason: String,
    #[serde(default, alias = "scamType")]
    #[validate(custom(function = "crate::utils::not_blank", message = "scam_type is required"))]
    pub scam_type: String,
    #[serde(alias = "reporterName")]
    #[validate(length(max = 100))]
    pub reporter_name: Option<String>,
    #[serde(alias = "reporterEmail")]
    #[validate(email(message = "reporter_email must be a valid email"))]
    pub reporter_email: Option<String>,
    #[serde(alias = "reporterPhone")]
    #[validate(length(max = 20))]
    pub reporter_phone: Option<String>,
    #[serde(default, alias = "isAnonymous")]
    pub is_anonymous: bool,
}

async fn create_report(
    State(state): State<AppState>,
    current_user: Option<CurrentUser>,
    ApiJson(payload): ApiJson<CreateReportRequest>,
) -> ApiResult<Report> {
    payload.validate()?;

    let scam_type: ScamType = payload.scam_type.parse().map_err(AppError::BadRequest)?;
    let normalized_url = normalize_url(&payload.url)?;
    // Rejects inputs that normalize but are not URLs at all
    parse_absolute(&payload.url)?;

    let report_service = ReportService::new(state.db.clone());
    let report = report_service
        .create(NewReport {
            url: payload.url.trim().to_string(),
            normalized_url,
            reason: payload.reason.trim().to_string(),
            scam_type,
            reporter: ReporterInfo {
                name: payload.reporter_name,
                email: payload.reporter_email,
                phone: payload.reporter_phone,
                is_anonymous: payload.is_anonymous,
            },
            reporter_id: current_user.map(|u| u.id),
        })
        .await?;

    let message = if report.is_duplicate {
        "Report received. This URL is already under review"
    } else {
        "Report submitted for review"
    };

    Ok(ApiResponse::with_message(report, message))
}

async fn my_reports(State(state): State<AppState>, current_user: CurrentUser) -> ApiResult<Vec<Report>> {
    let report_service = ReportService::new(state.db.clone());
    let reports = report_service.list_by_reporter(current_user.id).await?;

    Ok(ApiResponse::ok(reports))
}
