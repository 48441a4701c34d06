use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub is_published: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct EventInput {
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub is_published: bool,
}

impl EventInput {
    /// An event cannot end before it starts.
    pub fn validate_schedule(&self) -> Result<(), String> {
        match self.ends_at {
            Some(ends_at) if ends_at < self.starts_at => {
                Err("Event end time must not precede its start time".to_string())
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn input(ends_in_hours: Option<i64>) -> EventInput {
        let starts_at = Utc::now();
        EventInput {
            title: "Scam awareness workshop".to_string(),
            description: "How to spot phishing pages".to_string(),
            location: Some("Community hall".to_string()),
            starts_at,
            ends_at: ends_in_hours.map(|h| starts_at + Duration::hours(h)),
            is_published: true,
        }
    }

    #[test]
    fn schedule_accepts_open_or_forward_ranges() {
        assert!(input(None).validate_schedule().is_ok());
        assert!(input(Some(2)).validate_schedule().is_ok());
        assert!(input(Some(0)).validate_schedule().is_ok());
    }

    #[test]
    fn schedule_rejects_end_before_start() {
        assert!(input(Some(-1)).validate_schedule().is_err());
    }
}
