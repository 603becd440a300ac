use crate::domain::services::event_registration::OrderDetails;
use crate::error::AppError;
use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Envelope returned by every JSON endpoint.
#[derive(Debug, Serialize)]
pub struct ApiMessage {
    pub success: bool,
    pub message: String,
}

impl ApiMessage {
    pub fn ok(message: impl Into<String>) -> Json<Self> {
        Json(Self { success: true, message: message.into() })
    }
}

#[derive(Debug, Serialize)]
pub struct OrderCreated {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub order: OrderDetails,
}

/// `AppError` rendered as `{success: false, message}` with the matching status.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.0.log();
        let body = ApiMessage { success: false, message: self.0.user_message() };
        (self.0.status_code(), Json(body)).into_response()
    }
}
