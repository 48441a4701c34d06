use axum::{
    extract::{Path, State},
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use super::{parse_filter, parse_id, ApiJson, ApiQuery, ApiResponse, ApiResult, Page, PageQuery};
use crate::error::AppError;
use crate::middleware::{protect, require_admin, CurrentUser};
use crate::models::{
    AuditAction, AuditLog, BlacklistChanges, BlacklistEntry, CreateAuditLog, DangerLevel, Event,
    EventInput, ModerationStatus, NewBlacklistEntry, Post, PostWithAuthor, Report, ReportStatus,
    ResourceType, ScamType, UserRole, Volunteer,
};
use crate::services::dashboard_service::{ChartDataPoint, DashboardStats};
use crate::services::user_service::{ListUsersParams, UserSummary};
use crate::services::{
    AuditService, BlacklistService, DashboardService, EventService, PostService, ReportService,
    UserService, VolunteerService,
};
use crate::utils::url::{normalize_url, parse_absolute};
use crate::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/dashboard/charts/reports", get(report_chart))
        // Reports
        .route("/reports", get(list_reports))
        .route("/reports/:id", get(get_report).delete(delete_report))
        .route("/reports/:id/approve", put(approve_report))
        .route("/reports/:id/reject", put(reject_report))
        // Blacklist
        .route("/blacklist", get(list_blacklist).post(create_blacklist_entry))
        .route(
            "/blacklist/:id",
            get(get_blacklist_entry)
                .put(update_blacklist_entry)
                .delete(delete_blacklist_entry),
        )
        // Posts
        .route("/posts", get(list_posts))
        .route("/posts/:id/approve", put(approve_post))
        .route("/posts/:id/reject", put(reject_post))
        // Volunteers
        .route("/volunteers", get(list_volunteers))
        .route("/volunteers/:id", delete(delete_volunteer))
        .route("/volunteers/:id/approve", put(approve_volunteer))
        .route("/volunteers/:id/reject", put(reject_volunteer))
        // Events
        .route("/events", post(create_event))
        .route("/events/:id", put(update_event).delete(delete_event))
        // Users
        .route("/users", get(list_users))
        .route("/users/:id/role", put(update_user_role))
        .route("/audit-logs", get(list_audit_logs))
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state.clone(), protect))
}

async fn audit(
    state: &AppState,
    admin: &CurrentUser,
    action: AuditAction,
    resource_type: ResourceType,
    resource_id: Uuid,
    details: Option<serde_json::Value>,
) {
    AuditService::new(state.db.clone())
        .record(CreateAuditLog {
            admin_id: admin.id,
            action,
            resource_type,
            resource_id: Some(resource_id.to_string()),
            details,
        })
        .await;
}

#[derive(Debug, Default, Deserialize)]
pub struct StatusFilter {
    pub status: Option<String>,
}

/// Optional body for approve/reject actions
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ReviewRequest {
    #[serde(alias = "note", alias = "adminNotes")]
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    #[serde(alias = "dangerLevel")]
    pub danger_level: Option<String>,
}

fn review_body(payload: Option<ApiJson<ReviewRequest>>) -> Result<ReviewRequest, AppError> {
    let review = payload.map(|ApiJson(r)| r).unwrap_or_default();
    review.validate()?;
    Ok(review)
}

// ---- Dashboard ----

async fn dashboard(State(state): State<AppState>) -> ApiResult<DashboardStats> {
    let dashboard_service = DashboardService::new(state.db.clone());
    let stats = dashboard_service.get_stats().await?;

    Ok(ApiResponse::ok(stats))
}

#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    pub days: Option<i64>,
}

async fn report_chart(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ChartQuery>,
) -> ApiResult<Vec<ChartDataPoint>> {
    let days = query.days.unwrap_or(7).clamp(1, 90);

    let dashboard_service = DashboardService::new(state.db.clone());
    let chart = dashboard_service.get_report_chart(days).await?;

    Ok(ApiResponse::ok(chart))
}

// ---- Reports ----

async fn list_reports(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageQuery>,
    ApiQuery(filter): ApiQuery<StatusFilter>,
) -> ApiResult<Page<Report>> {
    let status = parse_filter::<ReportStatus>(filter.status.as_deref())?;

    let report_service = ReportService::new(state.db.clone());
    let (reports, total) = report_service
        .list(status, i64::from(page.limit()), page.offset())
        .await?;

    Ok(ApiResponse::ok(Page::new(reports, total, &page)))
}

async fn get_report(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Report> {
    let report_id = parse_id(&id, "report")?;

    let report_service = ReportService::new(state.db.clone());
    let report = report_service.get(report_id).await?;

    Ok(ApiResponse::ok(report))
}

#[derive(Debug, serde::Serialize)]
pub struct ApprovedReport {
    pub report: Report,
    pub blacklist_entry: BlacklistEntry,
}

async fn approve_report(
    State(state): State<AppState>,
    admin: CurrentUser,
    Path(id): Path<String>,
    payload: Option<ApiJson<ReviewRequest>>,
) -> ApiResult<ApprovedReport> {
    let report_id = parse_id(&id, "report")?;
    let review = review_body(payload)?;
    let danger_level = parse_filter::<DangerLevel>(review.danger_level.as_deref())?;

    let report_service = ReportService::new(state.db.clone());
    let (report, blacklist_entry) = report_service
        .approve(report_id, admin.id, danger_level, review.notes.as_deref())
        .await?;

    audit(
        &state,
        &admin,
        AuditAction::ApproveReport,
        ResourceType::Report,
        report.id,
        Some(json!({
            "normalized_url": report.normalized_url,
            "blacklist_id": blacklist_entry.id,
            "danger_level": blacklist_entry.danger_level,
        })),
    )
    .await;

    Ok(ApiResponse::with_message(
        ApprovedReport {
            report,
            blacklist_entry,
        },
        "Report approved and URL added to blacklist",
    ))
}

async fn reject_report(
    State(state): State<AppState>,
    admin: CurrentUser,
    Path(id): Path<String>,
    payload: Option<ApiJson<ReviewRequest>>,
) -> ApiResult<Report> {
    let report_id = parse_id(&id, "report")?;
    let review = review_body(payload)?;

    let report_service = ReportService::new(state.db.clone());
    let report = report_service
        .reject(report_id, admin.id, review.notes.as_deref())
        .await?;

    audit(
        &state,
        &admin,
        AuditAction::RejectReport,
        ResourceType::Report,
        report.id,
        review.notes.map(|notes| json!({ "notes": notes })),
    )
    .await;

    Ok(ApiResponse::with_message(report, "Report rejected"))
}

async fn delete_report(
    State(state): State<AppState>,
    admin: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let report_id = parse_id(&id, "report")?;

    let report_service = ReportService::new(state.db.clone());
    report_service.delete(report_id).await?;

    audit(&state, &admin, AuditAction::DeleteReport, ResourceType::Report, report_id, None).await;

    Ok(ApiResponse::with_message((), "Report deleted"))
}

// ---- Blacklist ----

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBlacklistRequest {
    #[serde(default)]
    #[validate(
        length(max = 2048),
        custom(function = "crate::utils::not_blank", message = "url is required")
    )]
    pub url: String,
    #[serde(default, alias = "scamType")]
    #[validate(custom(function = "crate::utils::not_blank", message = "scam_type is required"))]
    pub scam_type: String,
    #[serde(alias = "dangerLevel")]
    pub danger_level: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBlacklistRequest {
    #[serde(alias = "dangerLevel")]
    pub danger_level: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[serde(alias = "isActive")]
    pub is_active: Option<bool>,
}

async fn list_blacklist(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageQuery>,
) -> ApiResult<Page<BlacklistEntry>> {
    let blacklist_service = BlacklistService::new(state.db.clone());
    let (entries, total) = blacklist_service
        .list_active(None, i64::from(page.limit()), page.offset())
        .await?;

    Ok(ApiResponse::ok(Page::new(entries, total, &page)))
}

async fn get_blacklist_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<BlacklistEntry> {
    let entry_id = parse_id(&id, "blacklist entry")?;

    let blacklist_service = BlacklistService::new(state.db.clone());
    let entry = blacklist_service.get(entry_id).await?;

    Ok(ApiResponse::ok(entry))
}

async fn create_blacklist_entry(
    State(state): State<AppState>,
    admin: CurrentUser,
    ApiJson(payload): ApiJson<CreateBlacklistRequest>,
) -> ApiResult<BlacklistEntry> {
    payload.validate()?;

    let scam_type: ScamType = payload.scam_type.parse().map_err(AppError::BadRequest)?;
    let danger_level = parse_filter::<DangerLevel>(payload.danger_level.as_deref())?
        .unwrap_or_else(|| DangerLevel::default_for(scam_type));
    let normalized_url = normalize_url(&payload.url)?;
    parse_absolute(&payload.url)?;

    let blacklist_service = BlacklistService::new(state.db.clone());
    let entry = blacklist_service
        .create(NewBlacklistEntry {
            url: payload.url.trim().to_string(),
            normalized_url,
            scam_type,
            danger_level,
            description: payload.description,
            report_count: 0,
            source_report_id: None,
            added_by: Some(admin.id),
        })
        .await?;

    audit(
        &state,
        &admin,
        AuditAction::CreateBlacklistEntry,
        ResourceType::Blacklist,
        entry.id,
        Some(json!({ "normalized_url": entry.normalized_url })),
    )
    .await;

    Ok(ApiResponse::with_message(entry, "URL added to blacklist"))
}

async fn update_blacklist_entry(
    State(state): State<AppState>,
    admin: CurrentUser,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<UpdateBlacklistRequest>,
) -> ApiResult<BlacklistEntry> {
    let entry_id = parse_id(&id, "blacklist entry")?;
    payload.validate()?;

    let changes = BlacklistChanges {
        danger_level: parse_filter::<DangerLevel>(payload.danger_level.as_deref())?,
        description: payload.description,
        is_active: payload.is_active,
    };

    let blacklist_service = BlacklistService::new(state.db.clone());
    let entry = blacklist_service.update(entry_id, changes).await?;

    audit(
        &state,
        &admin,
        AuditAction::UpdateBlacklistEntry,
        ResourceType::Blacklist,
        entry.id,
        Some(json!({
            "danger_level": entry.danger_level,
            "is_active": entry.is_active,
        })),
    )
    .await;

    Ok(ApiResponse::ok(entry))
}

async fn delete_blacklist_entry(
    State(state): State<AppState>,
    admin: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let entry_id = parse_id(&id, "blacklist entry")?;

    let blacklist_service = BlacklistService::new(state.db.clone());
    blacklist_service.delete(entry_id).await?;

    audit(&state, &admin, AuditAction::DeleteBlacklistEntry, ResourceType::Blacklist, entry_id, None).await;

    Ok(ApiResponse::with_message((), "Blacklist entry deleted"))
}

// ---- Posts ----

async fn list_posts(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageQuery>,
    ApiQuery(filter): ApiQuery<StatusFilter>,
) -> ApiResult<Page<PostWithAuthor>> {
    let status = parse_filter::<ModerationStatus>(filter.status.as_deref())?;

    let post_service = PostService::new(state.db.clone());
    let (posts, total) = post_service
        .list(status, i64::from(page.limit()), page.offset())
        .await?;

    Ok(ApiResponse::ok(Page::new(posts, total, &page)))
}

async fn approve_post(
    State(state): State<AppState>,
    admin: CurrentUser,
    Path(id): Path<String>,
    payload: Option<ApiJson<ReviewRequest>>,
) -> ApiResult<Post> {
    let post_id = parse_id(&id, "post")?;
    let review = review_body(payload)?;

    let post_service = PostService::new(state.db.clone());
    let post = post_service
        .approve(post_id, admin.id, review.notes.as_deref())
        .await?;

    audit(&state, &admin, AuditAction::ApprovePost, ResourceType::Post, post.id, None).await;

    Ok(ApiResponse::with_message(post, "Post approved"))
}

async fn reject_post(
    State(state): State<AppState>,
    admin: CurrentUser,
    Path(id): Path<String>,
    payload: Option<ApiJson<ReviewRequest>>,
) -> ApiResult<Post> {
    let post_id = parse_id(&id, "post")?;
    let review = review_body(payload)?;

    let post_service = PostService::new(state.db.clone());
    let post = post_service
        .reject(post_id, admin.id, review.notes.as_deref())
        .await?;

    audit(
        &state,
        &admin,
        AuditAction::RejectPost,
        ResourceType::Post,
        post.id,
        review.notes.map(|notes| json!({ "notes": notes })),
    )
    .await;

    Ok(ApiResponse::with_message(post, "Post rejected"))
}

// ---- Volunteers ----

async fn list_volunteers(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageQuery>,
    ApiQuery(filter): ApiQuery<StatusFilter>,
) -> ApiResult<Page<Volunteer>> {
    let status = parse_filter::<ModerationStatus>(filter.status.as_deref())?;

    let volunteer_service = VolunteerService::new(state.db.clone());
    let (volunteers, total) = volunteer_service
        .list(status, i64::from(page.limit()), page.offset())
        .await?;

    Ok(ApiResponse::ok(Page::new(volunteers, total, &page)))
}

async fn approve_volunteer(
    State(state): State<AppState>,
    admin: CurrentUser,
    Path(id): Path<String>,
    payload: Option<ApiJson<ReviewRequest>>,
) -> ApiResult<Volunteer> {
    let volunteer_id = parse_id(&id, "volunteer")?;
    let review = review_body(payload)?;

    let volunteer_service = VolunteerService::new(state.db.clone());
    let volunteer = volunteer_service
        .approve(volunteer_id, admin.id, review.notes.as_deref())
        .await?;

    audit(&state, &admin, AuditAction::ApproveVolunteer, ResourceType::Volunteer, volunteer.id, None).await;

    Ok(ApiResponse::with_message(volunteer, "Volunteer approved"))
}

async fn reject_volunteer(
    State(state): State<AppState>,
    admin: CurrentUser,
    Path(id): Path<String>,
    payload: Option<ApiJson<ReviewRequest>>,
) -> ApiResult<Volunteer> {
    let volunteer_id = parse_id(&id, "volunteer")?;
    let review = review_body(payload)?;

    let volunteer_service = VolunteerService::new(state.db.clone());
    let volunteer = volunteer_service
        .reject(volunteer_id, admin.id, review.notes.as_deref())
        .await?;

    audit(
        &state,
        &admin,
        AuditAction::RejectVolunteer,
        ResourceType::Volunteer,
        volunteer.id,
        review.notes.map(|notes| json!({ "notes": notes })),
    )
    .await;

    Ok(ApiResponse::with_message(volunteer, "Volunteer rejected"))
}

async fn delete_volunteer(
    State(state): State<AppState>,
    admin: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let volunteer_id = parse_id(&id, "volunteer")?;

    let volunteer_service = VolunteerService::new(state.db.clone());
    volunteer_service.delete(volunteer_id).await?;

    audit(&state, &admin, AuditAction::DeleteVolunteer, ResourceType::Volunteer, volunteer_id, None).await;

    Ok(ApiResponse::with_message((), "Volunteer deleted"))
}

// ---- Events ----

#[derive(Debug, Deserialize, Validate)]
pub struct EventRequest {
    #[serde(default)]
    #[validate(
        length(max = 200),
        custom(function = "crate::utils::not_blank", message = "title is required")
    )]
    pub title: String,
    #[serde(default)]
    #[validate(
        length(max = 10000),
        custom(function = "crate::utils::not_blank", message = "description is required")
    )]
    pub description: String,
    #[validate(length(max = 300))]
    pub location: Option<String>,
    #[serde(alias = "startsAt")]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(alias = "endsAt")]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default = "default_published", alias = "isPublished")]
    pub is_published: bool,
}

fn default_published() -> bool {
    true
}

impl EventRequest {
    fn into_input(self) -> Result<EventInput, AppError> {
        self.validate()?;
        let starts_at = self
            .starts_at
            .ok_or_else(|| AppError::BadRequest("starts_at is required".to_string()))?;

        Ok(EventInput {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            location: self.location,
            starts_at,
            ends_at: self.ends_at,
            is_published: self.is_published,
        })
    }
}

async fn create_event(
    State(state): State<AppState>,
    admin: CurrentUser,
    ApiJson(payload): ApiJson<EventRequest>,
) -> ApiResult<Event> {
    let input = payload.into_input()?;

    let event_service = EventService::new(state.db.clone());
    let event = event_service.create(input, admin.id).await?;

    audit(&state, &admin, AuditAction::CreateEvent, ResourceType::Event, event.id, None).await;

    Ok(ApiResponse::with_message(event, "Event created"))
}

async fn update_event(
    State(state): State<AppState>,
    admin: CurrentUser,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<EventRequest>,
) -> ApiResult<Event> {
    let event_id = parse_id(&id, "event")?;
    let input = payload.into_input()?;

    let event_service = EventService::new(state.db.clone());
    let event = event_service.update(event_id, input).await?;

    audit(&state, &admin, AuditAction::UpdateEvent, ResourceType::Event, event.id, None).await;

    Ok(ApiResponse::ok(event))
}

async fn delete_event(
    State(state): State<AppState>,
    admin: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let event_id = parse_id(&id, "event")?;

    let event_service = EventService::new(state.db.clone());
    event_service.delete(event_id).await?;

    audit(&state, &admin, AuditAction::DeleteEvent, ResourceType::Event, event_id, None).await;

    Ok(ApiResponse::with_message((), "Event deleted"))
}

// ---- Users ----

#[derive(Debug, Deserialize)]
pub struct UserFilter {
    pub role: Option<String>,
    pub search: Option<String>,
}

async fn list_users(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageQuery>,
    ApiQuery(filter): ApiQuery<UserFilter>,
) -> ApiResult<Page<UserSummary>> {
    let role = parse_filter::<UserRole>(filter.role.as_deref())?;

    let user_service = UserService::new(state.db.clone());
    let (users, total) = user_service
        .list_users(ListUsersParams {
            limit: i64::from(page.limit()),
            offset: page.offset(),
            role,
            search: filter.search.filter(|s| !s.trim().is_empty()),
        })
        .await?;

    Ok(ApiResponse::ok(Page::new(users, total, &page)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    #[serde(default)]
    pub role: String,
}

async fn update_user_role(
    State(state): State<AppState>,
    admin: CurrentUser,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<UpdateRoleRequest>,
) -> ApiResult<UserSummary> {
    let user_id = parse_id(&id, "user")?;
    let role: UserRole = payload.role.parse().map_err(AppError::BadRequest)?;

    let user_service = UserService::new(state.db.clone());
    let user = user_service.update_role(user_id, role, admin.id).await?;

    audit(
        &state,
        &admin,
        AuditAction::UpdateUserRole,
        ResourceType::User,
        user.id,
        Some(json!({ "role": role.as_str() })),
    )
    .await;

    Ok(ApiResponse::with_message(user, "Role updated"))
}

// ---- Audit log ----

#[derive(Debug, Deserialize)]
pub struct AuditFilter {
    pub resource_type: Option<String>,
    pub resource_id: Option<String>,
}

async fn list_audit_logs(
    State(state): State<AppState>,
    ApiQuery(page): ApiQuery<PageQuery>,
    ApiQuery(filter): ApiQuery<AuditFilter>,
) -> ApiResult<Page<AuditLog>> {
    let audit_service = AuditService::new(state.db.clone());

    match (filter.resource_type.as_deref(), filter.resource_id.as_deref()) {
        (Some(resource_type), Some(resource_id)) => {
            let (logs, total) = audit_service
                .list_by_resource(resource_type, resource_id, i64::from(page.limit()), page.offset())
                .await?;
            Ok(ApiResponse::ok(Page::new(logs, total, &page)))
        }
        (None, None) => {
            let (logs, total) = audit_service
                .list_recent(i64::from(page.limit()), page.offset())
                .await?;
            Ok(ApiResponse::ok(Page::new(logs, total, &page)))
        }
        _ => Err(AppError::BadRequest(
            "resource_type and resource_id must be given together".to_string(),
        )),
    }
}
