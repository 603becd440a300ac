use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;
use rand::{distributions::Alphanumeric, Rng};

pub const STATUS_PRESENT: &str = "present";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkedBy {
    Manual,
    Qr,
    Admin,
}

impl MarkedBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkedBy::Manual => "manual",
            MarkedBy::Qr => "qr",
            MarkedBy::Admin => "admin",
        }
    }

    fn token_prefix(&self) -> &'static str {
        match self {
            MarkedBy::Manual => "MANUAL_",
            MarkedBy::Qr => "QR_",
            MarkedBy::Admin => "ADMIN_",
        }
    }

    /// Opaque token stored with the row: method prefix plus 16 random alphanumerics.
    pub fn generate_token(&self) -> String {
        let suffix: String = rand::thread_rng().sample_iter(&Alphanumeric).take(16).map(char::from).collect();
        format!("{}{}", self.token_prefix(), suffix)
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Attendance {
    pub id: String,
    pub event_id: String,
    pub student_id: String,
    pub qr_token: String,
    pub status: String,
    pub marked_by: String,
    pub scan_time: DateTime<Utc>,
}

impl Attendance {
    pub fn new(event_id: &str, student_id: &str, marked_by: MarkedBy) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event_id: event_id.to_string(),
            student_id: student_id.to_string(),
            qr_token: marked_by.generate_token(),
            status: STATUS_PRESENT.to_string(),
            marked_by: marked_by.as_str().to_string(),
            scan_time: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, FromRow, Clone)]
pub struct AttendanceWithEvent {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub attendance: Attendance,
    pub event_title: String,
    pub event_date: NaiveDateTime,
    pub event_location: String,
}

#[derive(Debug, Serialize, FromRow, Clone)]
pub struct AttendanceWithStudent {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub attendance: Attendance,
    pub first_name: String,
    pub last_name: String,
    pub prn: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_carry_method_prefix() {
        let manual = MarkedBy::Manual.generate_token();
        assert!(manual.starts_with("MANUAL_"));
        assert_eq!(manual.len(), "MANUAL_".len() + 16);
        assert!(MarkedBy::Qr.generate_token().starts_with("QR_"));
    }

    #[test]
    fn new_rows_are_present() {
        let row = Attendance::new("e1", "s1", MarkedBy::Admin);
        assert_eq!(row.status, STATUS_PRESENT);
        assert_eq!(row.marked_by, "admin");
    }
}
