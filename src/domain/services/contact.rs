use crate::domain::models::contact::ContactMessage;
use crate::domain::services::formatting::sanitize;
use crate::domain::services::notifications::send_email;
use crate::domain::services::validation::{normalize_email, validate_contact};
use crate::error::AppError;
use crate::state::AppState;
use tera::Context;
use tracing::info;

pub const CONTACT_THANKS: &str = "Thank you for contacting us! We will get back to you soon.";

/// Stores the message, then notifies the club inbox.
pub async fn submit(state: &AppState, name: &str, email: &str, subject: &str, message: &str) -> Result<ContactMessage, AppError> {
    validate_contact(name, email, subject, message)?;

    let saved = state
        .contact_repo
        .create(&ContactMessage::new(sanitize(name), normalize_email(email), sanitize(subject), sanitize(message)))
        .await?;
    info!(message_id = %saved.id, "Contact message received");

    let mut ctx = Context::new();
    ctx.insert("message", &saved);
    send_email(
        state,
        &state.config.contact_inbox,
        &format!("[SPARK Contact] {}", saved.subject),
        "emails/contact_notification.html",
        &ctx,
        None,
    )
    .await;

    Ok(saved)
}
