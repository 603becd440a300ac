use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
    NotRequired,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::NotRequired => "not_required",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(PaymentStatus::Pending),
            "completed" => Some(PaymentStatus::Completed),
            "failed" => Some(PaymentStatus::Failed),
            "refunded" => Some(PaymentStatus::Refunded),
            "not_required" => Some(PaymentStatus::NotRequired),
            _ => None,
        }
    }
}

pub const ATTENDANCE_REGISTERED: &str = "registered";
pub const ATTENDANCE_PRESENT: &str = "present";

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Registration {
    pub id: String,
    pub event_id: String,
    pub student_id: String,
    pub payment_status: String,
    pub attendance_status: String,
    pub payment_order_id: Option<String>,
    pub payment_id: Option<String>,
    pub amount_paid: f64,
    pub registration_date: DateTime<Utc>,
}

impl Registration {
    pub fn new(event_id: &str, student_id: &str, payment_status: PaymentStatus) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event_id: event_id.to_string(),
            student_id: student_id.to_string(),
            payment_status: payment_status.as_str().to_string(),
            attendance_status: ATTENDANCE_REGISTERED.to_string(),
            payment_order_id: None,
            payment_id: None,
            amount_paid: 0.0,
            registration_date: Utc::now(),
        }
    }

    pub fn payment(&self) -> Option<PaymentStatus> {
        PaymentStatus::parse(&self.payment_status)
    }

    /// Orders may only be (re)created while the seat is unpaid.
    pub fn awaiting_payment(&self) -> bool {
        matches!(self.payment(), Some(PaymentStatus::Pending | PaymentStatus::Failed))
    }
}

/// A student's registration joined with the event it belongs to.
#[derive(Debug, Serialize, FromRow, Clone)]
pub struct RegistrationWithEvent {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub registration: Registration,
    pub event_title: String,
    pub event_date: NaiveDateTime,
    pub event_location: String,
    pub event_fee: f64,
}

/// An event's registration joined with the registering student.
#[derive(Debug, Serialize, FromRow, Clone)]
pub struct RegistrationWithStudent {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub registration: Registration,
    pub first_name: String,
    pub last_name: String,
    pub prn: String,
    pub email: String,
    pub department: String,
}
