// Audit log model - every admin moderation action is recorded here

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: Uuid,
    pub admin_id: Uuid,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub details: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct CreateAuditLog {
    pub admin_id: Uuid,
    pub action: AuditAction,
    pub resource_type: ResourceType,
    pub resource_id: Option<String>,
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    // Reports
    ApproveReport,
    RejectReport,
    DeleteReport,
    // Blacklist
    CreateBlacklistEntry,
    UpdateBlacklistEntry,
    DeleteBlacklistEntry,
    // Posts
    ApprovePost,
    RejectPost,
    DeletePost,
    // Volunteers
    ApproveVolunteer,
    RejectVolunteer,
    DeleteVolunteer,
    // Events
    CreateEvent,
    UpdateEvent,
    DeleteEvent,
    // Users
    UpdateUserRole,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::ApproveReport => "approve_report",
            AuditAction::RejectReport => "reject_report",
            AuditAction::DeleteReport => "delete_report",
            AuditAction::CreateBlacklistEntry => "create_blacklist_entry",
            AuditAction::UpdateBlacklistEntry => "update_blacklist_entry",
            AuditAction::DeleteBlacklistEntry => "delete_blacklist_entry",
            AuditAction::ApprovePost => "approve_post",
            AuditAction::RejectPost => "reject_post",
            AuditAction::DeletePost => "delete_post",
            AuditAction::ApproveVolunteer => "approve_volunteer",
            AuditAction::RejectVolunteer => "reject_volunteer",
            AuditAction::DeleteVolunteer => "delete_volunteer",
            AuditAction::CreateEvent => "create_event",
            AuditAction::UpdateEvent => "update_event",
            AuditAction::DeleteEvent => "delete_event",
            AuditAction::UpdateUserRole => "update_user_role",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Report,
    Blacklist,
    Post,
    Volunteer,
    Event,
    User,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Report => "report",
            ResourceType::Blacklist => "blacklist",
            ResourceType::Post => "post",
            ResourceType::Volunteer => "volunteer",
            ResourceType::Event => "event",
            ResourceType::User => "user",
        }
    }
}
