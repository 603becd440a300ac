use crate::domain::models::activity::{ActivityLog, ACTION_ATTENDANCE_MARKED};
use crate::domain::models::attendance::{Attendance, MarkedBy};
use crate::domain::models::event::Event;
use crate::domain::models::student::Student;
use crate::domain::services::validation::normalize_prn;
use crate::error::AppError;
use crate::state::AppState;
use tracing::{info, warn};

pub const QR_PREFIX: &str = "SPARK";

pub const EVENT_NOT_FOUND: &str = "Event not found";
pub const INVALID_ACCESS_CODE: &str = "Invalid access code";
pub const ALREADY_MARKED: &str = "Attendance already marked for this event";
pub const MARKED: &str = "Attendance marked successfully";
pub const INVALID_QR: &str = "Invalid QR code";
pub const STUDENT_NOT_FOUND: &str = "Student not found";

/// Text encoded in the event's attendance QR code: `SPARK:<event_id>:<access_code>`.
pub fn qr_payload(event: &Event) -> String {
    format!("{}:{}:{}", QR_PREFIX, event.id, event.manual_access_code)
}

/// Splits a scanned payload into event id and access code.
pub fn parse_qr_payload(data: &str) -> Option<(String, String)> {
    let mut parts = data.trim().splitn(3, ':');
    if parts.next()? != QR_PREFIX {
        return None;
    }
    let event_id = parts.next()?.trim();
    let code = parts.next()?.trim();
    if event_id.is_empty() || code.is_empty() {
        return None;
    }
    Some((event_id.to_string(), code.to_string()))
}

async fn record(state: &AppState, event: &Event, student_id: &str, marked_by: MarkedBy) -> Result<Attendance, AppError> {
    if state.attendance_repo.exists(&event.id, student_id).await? {
        warn!(event_id = %event.id, student_id, "Attendance already marked");
        return Err(AppError::Conflict(ALREADY_MARKED.into()));
    }

    let attendance = Attendance::new(&event.id, student_id, marked_by);
    let activity = ActivityLog::new(student_id, ACTION_ATTENDANCE_MARKED, format!("Attended {}", event.title));
    let saved = state.attendance_repo.mark(&attendance, &activity).await?;

    info!(event_id = %event.id, student_id, marked_by = marked_by.as_str(), "Attendance marked");
    Ok(saved)
}

/// Student self check-in with the event's access code, typed in or read from the QR code.
pub async fn mark_with_code(
    state: &AppState,
    student: &Student,
    event_id: &str,
    access_code: &str,
    marked_by: MarkedBy,
) -> Result<Attendance, AppError> {
    let event = state
        .event_repo
        .find_by_id(event_id.trim())
        .await?
        .ok_or_else(|| AppError::NotFound(EVENT_NOT_FOUND.into()))?;

    if access_code.trim() != event.manual_access_code {
        warn!(event_id = %event.id, student_id = %student.id, "Attendance refused: wrong access code");
        return Err(AppError::Validation(INVALID_ACCESS_CODE.into()));
    }

    record(state, &event, &student.id, marked_by).await
}

pub async fn mark_from_qr(state: &AppState, student: &Student, qr_data: &str) -> Result<Attendance, AppError> {
    let (event_id, code) = parse_qr_payload(qr_data).ok_or_else(|| AppError::Validation(INVALID_QR.into()))?;
    mark_with_code(state, student, &event_id, &code, MarkedBy::Qr).await
}

/// Admin override: no access code, the student is looked up by PRN.
pub async fn mark_by_admin(state: &AppState, event_id: &str, prn: &str) -> Result<Student, AppError> {
    let event = state
        .event_repo
        .find_by_id(event_id)
        .await?
        .ok_or_else(|| AppError::NotFound(EVENT_NOT_FOUND.into()))?;

    let student = state
        .student_repo
        .find_by_prn(&normalize_prn(prn))
        .await?
        .ok_or_else(|| AppError::NotFound(STUDENT_NOT_FOUND.into()))?;

    record(state, &event, &student.id, MarkedBy::Admin).await?;
    Ok(student)
}
