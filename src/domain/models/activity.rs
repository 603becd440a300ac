use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

pub const ACTION_ATTENDANCE_MARKED: &str = "attendance_marked";
pub const ACTION_EVENT_REGISTERED: &str = "event_registered";
pub const ACTION_PAYMENT_COMPLETED: &str = "payment_completed";
pub const ACTION_PROJECT_JOIN_REQUESTED: &str = "project_join_requested";
pub const ACTION_PROFILE_UPDATED: &str = "profile_updated";

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct ActivityLog {
    pub id: String,
    pub student_id: String,
    pub action: String,
    pub details: String,
    pub created_at: DateTime<Utc>,
}

impl ActivityLog {
    pub fn new(student_id: &str, action: &str, details: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            student_id: student_id.to_string(),
            action: action.to_string(),
            details: details.into(),
            created_at: Utc::now(),
        }
    }
}
