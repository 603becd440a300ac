use crate::error::AppError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const INVALID_ACTION: &str = "Invalid action";

// Query strings. Every field is optional; blank values are normalized by the handlers.

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PageQuery {
    pub page: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EventListQuery {
    pub page: Option<String>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub timeframe: Option<String>,
}

/// Gallery and team listings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CategoryListQuery {
    pub page: Option<String>,
    pub search: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OpportunityListQuery {
    pub page: Option<String>,
    pub search: Option<String>,
    #[serde(rename = "type")]
    pub opportunity_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResearchListQuery {
    pub page: Option<String>,
    pub search: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    pub page: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CalendarQuery {
    pub view: Option<String>,
    pub date: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ExportQuery {
    pub month: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TokenQuery {
    pub token: String,
}

// Forms. Serialized back into the template when a form is re-rendered; secrets are skipped.

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RegisterForm {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub prn: String,
    pub email: String,
    pub contact_number: String,
    pub department: String,
    pub year_of_study: String,
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(skip_serializing)]
    pub confirm_password: String,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LoginForm {
    pub identifier: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub remember: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EmailForm {
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResetPasswordForm {
    pub token: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ProfileForm {
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub contact_number: String,
    pub department: String,
    pub year_of_study: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChangePasswordForm {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AttendanceForm {
    pub event_id: String,
    pub access_code: String,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct EventForm {
    pub title: String,
    pub description: String,
    pub event_date: String,
    pub location: String,
    pub fee: String,
    pub category: String,
    pub capacity: String,
    pub manual_access_code: String,
    pub banner_image: String,
    pub registration_deadline: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StatusForm {
    pub status: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PrnForm {
    pub prn: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RoleForm {
    pub role: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProjectForm {
    pub title: String,
    pub description: String,
    pub tech_stack: String,
    pub max_members: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OpportunityForm {
    pub title: String,
    pub description: String,
    pub opportunity_type: String,
    pub organizer: String,
    pub location: String,
    pub tech_stack: String,
    pub start_date: String,
    pub end_date: String,
    pub apply_link: String,
    pub is_featured: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TeamForm {
    pub name: String,
    pub position: String,
    pub category: String,
    pub bio: String,
    pub linkedin: String,
    pub github: String,
    pub instagram: String,
    pub email: String,
    pub display_order: String,
}

// JSON endpoints. Each body carries an `action` discriminator.

/// A JSON body dispatched on its `action` field.
pub trait ActionRequest: DeserializeOwned {
    const ACTIONS: &'static [&'static str];
}

/// Unknown or missing actions map to "Invalid action"; a known action with bad fields
/// is reported separately.
pub fn parse_action<T: ActionRequest>(body: Value) -> Result<T, AppError> {
    let known = body
        .get("action")
        .and_then(Value::as_str)
        .is_some_and(|action| T::ACTIONS.contains(&action));
    if !known {
        return Err(AppError::Validation(INVALID_ACTION.into()));
    }
    serde_json::from_value(body).map_err(|_| AppError::Validation("Missing or invalid fields".into()))
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AttendanceRequest {
    MarkManual { event_id: String, access_code: String },
    VerifyQr { qr_data: String },
}

impl ActionRequest for AttendanceRequest {
    const ACTIONS: &'static [&'static str] = &["mark_manual", "verify_qr"];
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PaymentRequest {
    CreateOrder {
        event_id: String,
    },
    VerifyPayment {
        event_id: String,
        razorpay_order_id: String,
        razorpay_payment_id: String,
        razorpay_signature: String,
    },
}

impl ActionRequest for PaymentRequest {
    const ACTIONS: &'static [&'static str] = &["create_order", "verify_payment"];
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ResearchRequest {
    Join {
        project_id: String,
        #[serde(default)]
        message: Option<String>,
    },
    Leave {
        project_id: String,
    },
}

impl ActionRequest for ResearchRequest {
    const ACTIONS: &'static [&'static str] = &["join", "leave"];
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn actions_dispatch_by_tag() {
        let parsed: AttendanceRequest = parse_action(json!({"action": "verify_qr", "qr_data": "SPARK:e:c"})).unwrap();
        assert!(matches!(parsed, AttendanceRequest::VerifyQr { qr_data } if qr_data == "SPARK:e:c"));

        let parsed: ResearchRequest = parse_action(json!({"action": "join", "project_id": "p1"})).unwrap();
        assert!(matches!(parsed, ResearchRequest::Join { message: None, .. }));
    }

    #[test]
    fn unknown_actions_and_bad_fields_are_distinguished() {
        let err = parse_action::<AttendanceRequest>(json!({"action": "teleport"})).unwrap_err();
        assert_eq!(err.user_message(), INVALID_ACTION);
        let err = parse_action::<AttendanceRequest>(json!({"event_id": "e"})).unwrap_err();
        assert_eq!(err.user_message(), INVALID_ACTION);
        let err = parse_action::<PaymentRequest>(json!({"action": "create_order"})).unwrap_err();
        assert_eq!(err.user_message(), "Missing or invalid fields");
    }
}
