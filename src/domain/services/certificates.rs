use crate::domain::models::certificate::Certificate;
use crate::error::AppError;
use crate::state::AppState;
use tracing::info;

/// Issues a certificate to every attendee of the event who does not hold one yet.
/// Returns the number of certificates written.
pub async fn issue_for_event(state: &AppState, event_id: &str) -> Result<u64, AppError> {
    let event = state
        .event_repo
        .find_by_id(event_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".into()))?;

    let certificates: Vec<Certificate> = state
        .certificate_repo
        .list_missing(&event.id)
        .await?
        .iter()
        .map(|student_id| Certificate::issue(&event.id, student_id, &state.config.base_url))
        .collect();

    if certificates.is_empty() {
        return Ok(0);
    }

    let issued = state.certificate_repo.create_batch(&certificates).await?;
    info!(event_id = %event.id, issued, "Certificates issued");
    Ok(issued)
}
