use crate::domain::models::activity::{ActivityLog, ACTION_EVENT_REGISTERED, ACTION_PAYMENT_COMPLETED};
use crate::domain::models::event::Event;
use crate::domain::models::registration::{PaymentStatus, Registration};
use crate::domain::models::student::Student;
use crate::domain::services::calendar::{generate_ics, google_calendar_url};
use crate::domain::services::clock::local_now;
use crate::domain::services::formatting::format_inr;
use crate::domain::services::notifications::send_email;
use crate::error::AppError;
use crate::state::AppState;
use serde::Serialize;
use tera::Context;
use tracing::{info, warn};

pub const CURRENCY: &str = "INR";

pub const REGISTRATION_CLOSED: &str = "Registration is closed for past events";
pub const DEADLINE_PASSED: &str = "Registration deadline has passed";
pub const EVENT_FULL: &str = "Event is full";
pub const ALREADY_REGISTERED: &str = "You are already registered for this event";
pub const PAYMENT_VERIFIED: &str = "Payment verified successfully";
pub const PAYMENT_FAILED: &str = "Payment verification failed";
pub const NO_PAYMENT_PENDING: &str = "No payment is pending for this registration";

#[derive(Debug)]
pub struct RegistrationOutcome {
    pub registration: Registration,
    pub message: String,
    /// Only for free events, which are confirmed straight away.
    pub google_calendar_url: Option<String>,
}

async fn load_event(state: &AppState, event_id: &str) -> Result<Event, AppError> {
    state
        .event_repo
        .find_by_id(event_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".into()))
}

pub async fn register_for_event(state: &AppState, student: &Student, event_id: &str) -> Result<RegistrationOutcome, AppError> {
    let event = load_event(state, event_id).await?;
    let now = local_now(state.config.timezone);

    if event.is_past(now) {
        return Err(AppError::Validation(REGISTRATION_CLOSED.into()));
    }
    if event.deadline_passed(now) {
        return Err(AppError::Validation(DEADLINE_PASSED.into()));
    }
    if let Some(capacity) = event.capacity
        && state.registration_repo.count_for_event(&event.id).await? >= capacity as i64
    {
        warn!(event_id = %event.id, "Registration refused: event full");
        return Err(AppError::Conflict(EVENT_FULL.into()));
    }
    if state.registration_repo.find(&event.id, &student.id).await?.is_some() {
        return Err(AppError::Conflict(ALREADY_REGISTERED.into()));
    }

    let status = if event.is_paid() { PaymentStatus::Pending } else { PaymentStatus::NotRequired };
    let registration = Registration::new(&event.id, &student.id, status);
    let activity = ActivityLog::new(&student.id, ACTION_EVENT_REGISTERED, format!("Registered for {}", event.title));
    let registration = state.registration_repo.register(&registration, event.capacity, &activity).await?;

    info!(event_id = %event.id, student_id = %student.id, payment_status = status.as_str(), "Event registration created");

    if event.is_paid() {
        return Ok(RegistrationOutcome {
            registration,
            message: format!(
                "Registration created. Please complete the payment of {} to confirm your seat.",
                format_inr(event.fee)
            ),
            google_calendar_url: None,
        });
    }

    let calendar_url = google_calendar_url(&event, state.config.timezone);
    send_confirmation(state, student, &event, &calendar_url).await;

    Ok(RegistrationOutcome {
        registration,
        message: format!("Successfully registered for {}!", event.title),
        google_calendar_url: Some(calendar_url),
    })
}

async fn send_confirmation(state: &AppState, student: &Student, event: &Event, calendar_url: &str) {
    let mut ctx = Context::new();
    ctx.insert("name", &student.first_name);
    ctx.insert("event", event);
    ctx.insert("google_calendar_url", calendar_url);
    let ics = generate_ics(std::slice::from_ref(event), state.config.timezone, &state.config.ical_uid_domain);
    send_email(
        state,
        &student.email,
        &format!("You're registered: {}", event.title),
        "emails/registration_confirmed.html",
        &ctx,
        Some(("event.ics", ics.as_bytes())),
    )
    .await;
}

#[derive(Debug, Serialize)]
pub struct OrderDetails {
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
    pub key_id: String,
    pub event_title: String,
}

/// Opens a gateway order for the student's unpaid registration.
pub async fn create_payment_order(state: &AppState, student: &Student, event_id: &str) -> Result<OrderDetails, AppError> {
    let event = load_event(state, event_id).await?;
    let registration = state
        .registration_repo
        .find(&event.id, &student.id)
        .await?
        .ok_or_else(|| AppError::NotFound("You are not registered for this event".into()))?;

    if !event.is_paid() || !registration.awaiting_payment() {
        return Err(AppError::Validation(NO_PAYMENT_PENDING.into()));
    }

    let order = state.payment_gateway.create_order(event.fee_paise(), CURRENCY, &registration.id).await?;
    state.registration_repo.set_order(&registration.id, &order.id).await?;
    info!(registration_id = %registration.id, order_id = %order.id, "Payment order created");

    Ok(OrderDetails {
        order_id: order.id,
        amount: order.amount,
        currency: order.currency,
        key_id: state.payment_gateway.key_id(),
        event_title: event.title,
    })
}

pub struct PaymentConfirmation<'a> {
    pub event_id: &'a str,
    pub order_id: &'a str,
    pub payment_id: &'a str,
    pub signature: &'a str,
}

/// Confirms the gateway callback. A mismatch marks a still-unpaid registration failed.
pub async fn verify_payment(state: &AppState, student: &Student, confirmation: &PaymentConfirmation<'_>) -> Result<(), AppError> {
    let event = load_event(state, confirmation.event_id).await?;
    let registration = state
        .registration_repo
        .find(&event.id, &student.id)
        .await?
        .ok_or_else(|| AppError::NotFound("You are not registered for this event".into()))?;

    if !registration.awaiting_payment() {
        return Err(AppError::Validation(NO_PAYMENT_PENDING.into()));
    }

    let order_matches = registration.payment_order_id.as_deref() == Some(confirmation.order_id);
    let signature_ok = order_matches
        && state
            .payment_gateway
            .verify_signature(confirmation.order_id, confirmation.payment_id, confirmation.signature);

    if !signature_ok {
        state.registration_repo.fail_pending_payment(&registration.id).await?;
        warn!(registration_id = %registration.id, order_matches, "Payment verification failed");
        return Err(AppError::Validation(PAYMENT_FAILED.into()));
    }

    let activity = ActivityLog::new(&student.id, ACTION_PAYMENT_COMPLETED, format!("Paid {} for {}", format_inr(event.fee), event.title));
    state
        .registration_repo
        .complete_payment(&registration.id, confirmation.payment_id, event.fee, &activity)
        .await?;
    info!(registration_id = %registration.id, payment_id = confirmation.payment_id, "Payment completed");

    let calendar_url = google_calendar_url(&event, state.config.timezone);
    send_confirmation(state, student, &event, &calendar_url).await;
    Ok(())
}
