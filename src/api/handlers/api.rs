use crate::api::dtos::requests::{parse_action, AttendanceRequest, PaymentRequest, ResearchRequest};
use crate::api::dtos::responses::{ApiError, ApiMessage, OrderCreated};
use crate::api::extractors::session::CurrentStudent;
use crate::domain::models::attendance::MarkedBy;
use crate::domain::services::attendance::{self, MARKED};
use crate::domain::services::event_registration::{self, PaymentConfirmation, PAYMENT_VERIFIED};
use crate::domain::services::research::{self, JOIN_REQUESTED, LEFT_PROJECT};
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

fn json_body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        debug!(error = %rejection, "Rejected JSON body");
        ApiError(AppError::Validation("Invalid request body".into()))
    })
}

/// `POST /api/attendance`: `mark_manual` or `verify_qr`.
pub async fn attendance(
    State(state): State<Arc<AppState>>,
    CurrentStudent(student): CurrentStudent,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiMessage>, ApiError> {
    match parse_action::<AttendanceRequest>(json_body(payload)?)? {
        AttendanceRequest::MarkManual { event_id, access_code } => {
            attendance::mark_with_code(&state, &student, &event_id, &access_code, MarkedBy::Manual).await?;
        }
        AttendanceRequest::VerifyQr { qr_data } => {
            attendance::mark_from_qr(&state, &student, &qr_data).await?;
        }
    }
    Ok(ApiMessage::ok(MARKED))
}

/// `POST /api/payment`: `create_order` or `verify_payment`.
pub async fn payment(
    State(state): State<Arc<AppState>>,
    CurrentStudent(student): CurrentStudent,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    match parse_action::<PaymentRequest>(json_body(payload)?)? {
        PaymentRequest::CreateOrder { event_id } => {
            let order = event_registration::create_payment_order(&state, &student, &event_id).await?;
            Ok(Json(OrderCreated { success: true, message: "Order created".into(), order }).into_response())
        }
        PaymentRequest::VerifyPayment { event_id, razorpay_order_id, razorpay_payment_id, razorpay_signature } => {
            let confirmation = PaymentConfirmation {
                event_id: &event_id,
                order_id: &razorpay_order_id,
                payment_id: &razorpay_payment_id,
                signature: &razorpay_signature,
            };
            event_registration::verify_payment(&state, &student, &confirmation).await?;
            Ok(ApiMessage::ok(PAYMENT_VERIFIED).into_response())
        }
    }
}

/// `POST /api/research`: `join` or `leave`.
pub async fn research(
    State(state): State<Arc<AppState>>,
    CurrentStudent(student): CurrentStudent,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ApiMessage>, ApiError> {
    let message = match parse_action::<ResearchRequest>(json_body(payload)?)? {
        ResearchRequest::Join { project_id, message } => {
            research::request_join(&state, &student, &project_id, message).await?;
            JOIN_REQUESTED
        }
        ResearchRequest::Leave { project_id } => {
            research::leave(&state, &student, &project_id).await?;
            LEFT_PROJECT
        }
    };
    Ok(ApiMessage::ok(message))
}
