use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Moderation status shared by posts and volunteers.
///
/// Every record starts `Pending` and moves exactly once to a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "moderation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ModerationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ModerationStatus {
    /// pending -> approved/rejected only
    pub fn can_transition_to(&self, new_status: ModerationStatus) -> bool {
        matches!(
            (self, new_status),
            (ModerationStatus::Pending, ModerationStatus::Approved)
                | (ModerationStatus::Pending, ModerationStatus::Rejected)
        )
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, ModerationStatus::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationStatus::Pending => "pending",
            ModerationStatus::Approved => "approved",
            ModerationStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for ModerationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(ModerationStatus::Pending),
            "approved" => Ok(ModerationStatus::Approved),
            "rejected" => Ok(ModerationStatus::Rejected),
            other => Err(format!("Unknown status: {}", other)),
        }
    }
}

/// Report status. `Processing` marks a report an admin has picked up; it
/// still counts as open for duplicate detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "report_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Pending,
    Processing,
    Approved,
    Rejected,
}

impl ReportStatus {
    /// Reports are reviewed from `Pending` only.
    pub fn can_transition_to(&self, new_status: ReportStatus) -> bool {
        matches!(
            (self, new_status),
            (ReportStatus::Pending, ReportStatus::Approved)
                | (ReportStatus::Pending, ReportStatus::Rejected)
        )
    }

    /// Open reports are the ones a new submission is considered a duplicate of.
    pub fn is_open(&self) -> bool {
        matches!(self, ReportStatus::Pending | ReportStatus::Processing)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_open()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Processing => "processing",
            ReportStatus::Approved => "approved",
            ReportStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(ReportStatus::Pending),
            "processing" => Ok(ReportStatus::Processing),
            "approved" => Ok(ReportStatus::Approved),
            "rejected" => Ok(ReportStatus::Rejected),
            other => Err(format!("Unknown status: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moderation_status_transitions() {
        assert!(ModerationStatus::Pending.can_transition_to(ModerationStatus::Approved));
        assert!(ModerationStatus::Pending.can_transition_to(ModerationStatus::Rejected));
        assert!(!ModerationStatus::Pending.can_transition_to(ModerationStatus::Pending));
        assert!(!ModerationStatus::Approved.can_transition_to(ModerationStatus::Rejected));
        assert!(!ModerationStatus::Approved.can_transition_to(ModerationStatus::Approved));
        assert!(!ModerationStatus::Rejected.can_transition_to(ModerationStatus::Approved));
    }

    #[test]
    fn test_report_status_transitions() {
        assert!(ReportStatus::Pending.can_transition_to(ReportStatus::Approved));
        assert!(ReportStatus::Pending.can_transition_to(ReportStatus::Rejected));
        assert!(!ReportStatus::Processing.can_transition_to(ReportStatus::Approved));
        assert!(!ReportStatus::Approved.can_transition_to(ReportStatus::Approved));
        assert!(!ReportStatus::Rejected.can_transition_to(ReportStatus::Approved));
    }

    #[test]
    fn test_open_report_statuses() {
        assert!(ReportStatus::Pending.is_open());
        assert!(ReportStatus::Processing.is_open());
        assert!(!ReportStatus::Approved.is_open());
        assert!(!ReportStatus::Rejected.is_open());
        assert!(ReportStatus::Approved.is_terminal());
        assert!(!ReportStatus::Processing.is_terminal());
        assert!(ModerationStatus::Rejected.is_terminal());
        assert!(!ModerationStatus::Pending.is_terminal());
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("Approved".parse::<ModerationStatus>(), Ok(ModerationStatus::Approved));
        assert_eq!(" processing ".parse::<ReportStatus>(), Ok(ReportStatus::Processing));
        assert!("processing".parse::<ModerationStatus>().is_err());
        assert_eq!(
            serde_json::to_string(&ReportStatus::Rejected).unwrap(),
            "\"rejected\""
        );
    }
}
