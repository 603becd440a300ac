use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Invalid input: {}", .0.join("; "))]
    ValidationErrors(Vec<String>),
    #[error("Internal server error")]
    Internal,
    #[error("Internal server error: {0}")]
    InternalWithMsg(String),
}

pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again.";

impl AppError {
    /// Text shown to the student. Lookup and business-rule failures carry their own
    /// message verbatim; infrastructure failures never leak details.
    pub fn user_message(&self) -> String {
        match self {
            AppError::NotFound(msg)
            | AppError::Forbidden(msg)
            | AppError::Conflict(msg)
            | AppError::Validation(msg) => msg.clone(),
            AppError::ValidationErrors(msgs) => msgs.join(" "),
            AppError::Unauthorized => "Please log in to continue".to_string(),
            AppError::Database(_) | AppError::Internal | AppError::InternalWithMsg(_) => {
                GENERIC_ERROR_MESSAGE.to_string()
            }
        }
    }

    /// Every message this error should surface as a separate flash entry.
    pub fn user_messages(&self) -> Vec<String> {
        match self {
            AppError::ValidationErrors(msgs) => msgs.clone(),
            other => vec![other.user_message()],
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::Internal | AppError::InternalWithMsg(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) | AppError::ValidationErrors(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Logs infrastructure failures once, at the boundary where they turn into a response.
    pub fn log(&self) {
        match self {
            AppError::Database(e) => error!("Database error: {:?}", e),
            AppError::InternalWithMsg(msg) => error!("Internal error: {}", msg),
            AppError::Internal => error!("Internal error"),
            _ => {}
        }
    }
}

/// 2067 = SQLite unique constraint, 1555 = SQLite primary key, 23505 = PostgreSQL unique violation.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err.as_database_error() {
        Some(db_err) => {
            let code = db_err.code().unwrap_or_default();
            db_err.is_unique_violation() || code == "2067" || code == "1555" || code == "23505"
        }
        None => false,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();

        if matches!(self, AppError::Unauthorized) {
            return Redirect::to("/login").into_response();
        }

        let status = self.status_code();
        let message = tera::escape_html(&self.user_message());

        let body = format!(
            "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{code} | SPARK</title></head>\
             <body><main class=\"error-page\"><h1>{code}</h1><p>{message}</p>\
             <p><a href=\"/\">Back to home</a></p></main></body></html>",
            code = status.as_u16(),
            message = message,
        );

        (status, Html(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_messages_are_shown_verbatim() {
        let err = AppError::Conflict("Attendance already marked for this event".into());
        assert_eq!(err.user_message(), "Attendance already marked for this event");
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn internal_errors_hide_details() {
        let err = AppError::InternalWithMsg("smtp relay refused connection".into());
        assert_eq!(err.user_message(), GENERIC_ERROR_MESSAGE);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn validation_errors_split_into_flash_entries() {
        let err = AppError::ValidationErrors(vec!["First name is required".into(), "Invalid email address".into()]);
        assert_eq!(err.user_messages().len(), 2);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unauthorized_pages_redirect_to_login() {
        let response = AppError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get("location").unwrap(), "/login");
    }

    #[tokio::test]
    async fn error_pages_escape_the_message() {
        let response = AppError::NotFound("<script>alert('x')</script>".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(!body.contains("<script>"));
        assert!(body.contains("&lt;script&gt;alert(&#x27;x&#x27;)&lt;&#x2F;script&gt;"));
    }
}
