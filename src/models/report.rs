use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

use super::ReportStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "scam_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ScamType {
    Phishing,
    FakeShop,
    Investment,
    Lottery,
    Impersonation,
    Malware,
    JobScam,
    Romance,
    Other,
}

impl ScamType {
    pub const ALL: [ScamType; 9] = [
        ScamType::Phishing,
        ScamType::FakeShop,
        ScamType::Investment,
        ScamType::Lottery,
        ScamType::Impersonation,
        ScamType::Malware,
        ScamType::JobScam,
        ScamType::Romance,
        ScamType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScamType::Phishing => "phishing",
            ScamType::FakeShop => "fake_shop",
            ScamType::Investment => "investment",
            ScamType::Lottery => "lottery",
            ScamType::Impersonation => "impersonation",
            ScamType::Malware => "malware",
            ScamType::JobScam => "job_scam",
            ScamType::Romance => "romance",
            ScamType::Other => "other",
        }
    }
}

impl FromStr for ScamType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace(['-', ' '], "_");
        ScamType::ALL
            .into_iter()
            .find(|t| t.as_str() == key)
            .ok_or_else(|| format!("Unknown scam type: {}", s.trim()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "report_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReportPriority {
    Low,
    Normal,
    High,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Report {
    pub id: Uuid,
    pub url: String,
    pub normalized_url: String,
    pub reason: String,
    pub scam_type: ScamType,
    pub reporter_id: Option<Uuid>,
    pub reporter_name: Option<String>,
    pub reporter_email: Option<String>,
    pub reporter_phone: Option<String>,
    pub is_anonymous: bool,
    pub status: ReportStatus,
    pub priority: ReportPriority,
    pub is_duplicate: bool,
    pub duplicate_of: Option<Uuid>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated report submission, ready to persist.
#[derive(Debug, Clone)]
pub struct NewReport {
    pub url: String,
    pub normalized_url: String,
    pub reason: String,
    pub scam_type: ScamType,
    pub reporter: ReporterInfo,
    pub reporter_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReporterInfo {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_anonymous: bool,
}

impl ReporterInfo {
    /// Anonymous submissions keep no contact details.
    pub fn sanitized(self) -> Self {
        if self.is_anonymous {
            return Self {
                is_anonymous: true,
                ..Self::default()
            };
        }
        self
    }
}

/// Where a new report lands relative to reports already open on its URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicateCheck {
    pub is_duplicate: bool,
    pub duplicate_of: Option<Uuid>,
    pub priority: ReportPriority,
}

impl DuplicateCheck {
    pub fn from_existing(existing_open: Option<Uuid>) -> Self {
        match existing_open {
            Some(id) => Self {
                is_duplicate: true,
                duplicate_of: Some(id),
                priority: ReportPriority::Low,
            },
            None => Self {
                is_duplicate: false,
                duplicate_of: None,
                priority: ReportPriority::Normal,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scam_type_variants() {
        assert_eq!("phishing".parse::<ScamType>(), Ok(ScamType::Phishing));
        assert_eq!("Fake Shop".parse::<ScamType>(), Ok(ScamType::FakeShop));
        assert_eq!("job-scam".parse::<ScamType>(), Ok(ScamType::JobScam));
        assert!("pyramid".parse::<ScamType>().is_err());
    }

    #[test]
    fn anonymous_reporter_drops_contact_details() {
        let info = ReporterInfo {
            name: Some("Lan".to_string()),
            email: Some("lan@example.com".to_string()),
            phone: Some("0901234567".to_string()),
            is_anonymous: true,
        };
        let sanitized = info.sanitized();
        assert!(sanitized.is_anonymous);
        assert!(sanitized.name.is_none());
        assert!(sanitized.email.is_none());
        assert!(sanitized.phone.is_none());
    }

    #[test]
    fn duplicate_reports_get_low_priority() {
        let original = Uuid::new_v4();
        let dup = DuplicateCheck::from_existing(Some(original));
        assert!(dup.is_duplicate);
        assert_eq!(dup.duplicate_of, Some(original));
        assert_eq!(dup.priority, ReportPriority::Low);

        let fresh = DuplicateCheck::from_existing(None);
        assert!(!fresh.is_duplicate);
        assert_eq!(fresh.priority, ReportPriority::Normal);
    }
}
