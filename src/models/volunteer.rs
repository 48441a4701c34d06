use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::ModerationStatus;
use crate::utils::{mask_email, mask_phone};

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Volunteer {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub specialty: String,
    pub motivation: Option<String>,
    pub status: ModerationStatus,
    pub notes: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewVolunteer {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub specialty: String,
    pub motivation: Option<String>,
}

/// Public listing entry for an approved volunteer; contact details masked.
#[derive(Debug, Clone, Serialize)]
pub struct PublicVolunteer {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub specialty: String,
    pub joined_at: Option<DateTime<Utc>>,
}

impl From<Volunteer> for PublicVolunteer {
    fn from(v: Volunteer) -> Self {
        Self {
            id: v.id,
            full_name: v.full_name,
            email: mask_email(&v.email),
            phone: mask_phone(&v.phone),
            specialty: v.specialty,
            joined_at: v.reviewed_at,
        }
    }
}
