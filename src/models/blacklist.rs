use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

use super::ScamType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "danger_level", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DangerLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl DangerLevel {
    /// Default danger level for a confirmed scam of the given type.
    pub fn default_for(scam_type: ScamType) -> Self {
        match scam_type {
            ScamType::Malware => DangerLevel::Critical,
            ScamType::Phishing | ScamType::Impersonation | ScamType::Investment => DangerLevel::High,
            ScamType::FakeShop | ScamType::Lottery | ScamType::JobScam | ScamType::Romance => {
                DangerLevel::Medium
            }
            ScamType::Other => DangerLevel::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DangerLevel::Low => "low",
            DangerLevel::Medium => "medium",
            DangerLevel::High => "high",
            DangerLevel::Critical => "critical",
        }
    }
}

impl FromStr for DangerLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(DangerLevel::Low),
            "medium" => Ok(DangerLevel::Medium),
            "high" => Ok(DangerLevel::High),
            "critical" => Ok(DangerLevel::Critical),
            other => Err(format!("Unknown danger level: {}", other)),
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BlacklistEntry {
    pub id: Uuid,
    pub url: String,
    pub normalized_url: String,
    pub scam_type: ScamType,
    pub danger_level: DangerLevel,
    pub description: Option<String>,
    pub report_count: i32,
    pub source_report_id: Option<Uuid>,
    pub added_by: Option<Uuid>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewBlacklistEntry {
    pub url: String,
    pub normalized_url: String,
    pub scam_type: ScamType,
    pub danger_level: DangerLevel,
    pub description: Option<String>,
    pub report_count: i32,
    pub source_report_id: Option<Uuid>,
    pub added_by: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct BlacklistChanges {
    pub danger_level: Option<DangerLevel>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl BlacklistChanges {
    pub fn is_empty(&self) -> bool {
        self.danger_level.is_none() && self.description.is_none() && self.is_active.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn danger_level_defaults_follow_scam_type() {
        assert_eq!(DangerLevel::default_for(ScamType::Malware), DangerLevel::Critical);
        assert_eq!(DangerLevel::default_for(ScamType::Phishing), DangerLevel::High);
        assert_eq!(DangerLevel::default_for(ScamType::FakeShop), DangerLevel::Medium);
        assert_eq!(DangerLevel::default_for(ScamType::Other), DangerLevel::Low);
    }

    #[test]
    fn danger_levels_are_ordered() {
        assert!(DangerLevel::Critical > DangerLevel::High);
        assert!(DangerLevel::Low < DangerLevel::Medium);
    }

    #[test]
    fn empty_changes_are_detected() {
        assert!(BlacklistChanges::default().is_empty());
        let changes = BlacklistChanges {
            is_active: Some(false),
            ..Default::default()
        };
        assert!(!changes.is_empty());
    }
}
