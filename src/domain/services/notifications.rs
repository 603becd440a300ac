use crate::state::AppState;
use tera::Context;
use tracing::{info, warn};

/// Renders and sends an email. Delivery problems are logged and swallowed; callers
/// have already committed their writes.
pub async fn send_email(
    state: &AppState,
    recipient: &str,
    subject: &str,
    template: &str,
    context: &Context,
    attachment: Option<(&str, &[u8])>,
) {
    let body = match state.templates.render(template, context) {
        Ok(body) => body,
        Err(e) => {
            warn!(template, error = ?e, "Email template failed to render");
            return;
        }
    };

    let (name, data) = match attachment {
        Some((name, data)) => (Some(name), Some(data)),
        None => (None, None),
    };

    match state.email_service.send(recipient, subject, &body, name, data).await {
        Ok(()) => info!(recipient, subject, "Email sent"),
        Err(e) => warn!(recipient, subject, error = %e, "Email delivery failed"),
    }
}
