use crate::api::dtos::requests::{EventForm, PrnForm, StatusForm};
use crate::api::extractors::session::PageContext;
use crate::api::flash::Flash;
use crate::api::handlers::{render, render_form_error};
use crate::domain::models::event::Event;
use crate::domain::models::registration::PaymentStatus;
use crate::domain::services::attendance::{self, qr_payload};
use crate::domain::services::certificates;
use crate::domain::services::content::{validate_event, EventInput, DATETIME_LOCAL_FORMAT};
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Form, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tera::Context;
use tracing::info;

const EVENT_FORM: &str = "admin/event_form.html";

async fn load_event(state: &AppState, event_id: &str) -> Result<Event, AppError> {
    state
        .event_repo
        .find_by_id(event_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".into()))
}

fn event_input(form: &EventForm) -> EventInput<'_> {
    EventInput {
        title: &form.title,
        description: &form.description,
        event_date: &form.event_date,
        location: &form.location,
        fee: &form.fee,
        category: &form.category,
        capacity: &form.capacity,
        manual_access_code: &form.manual_access_code,
        banner_image: &form.banner_image,
        registration_deadline: &form.registration_deadline,
    }
}

fn event_form(event: &Event) -> EventForm {
    EventForm {
        title: event.title.clone(),
        description: event.description.clone(),
        event_date: event.event_date.format(DATETIME_LOCAL_FORMAT).to_string(),
        location: event.location.clone(),
        fee: event.fee.to_string(),
        category: event.category.clone(),
        capacity: event.capacity.map(|c| c.to_string()).unwrap_or_default(),
        manual_access_code: event.manual_access_code.clone(),
        banner_image: event.banner_image.clone().unwrap_or_default(),
        registration_deadline: event
            .registration_deadline
            .map(|d| d.format(DATETIME_LOCAL_FORMAT).to_string())
            .unwrap_or_default(),
    }
}

fn form_context(page: &PageContext, form: &EventForm, action: &str) -> Context {
    let mut ctx = page.context();
    ctx.insert("form", form);
    ctx.insert("action", action);
    ctx
}

pub async fn list(State(state): State<Arc<AppState>>, page: PageContext) -> Result<Html<String>, AppError> {
    let mut ctx = page.context();
    ctx.insert("events", &state.event_repo.list_all().await?);
    render(&state, "admin/events.html", &ctx)
}

pub async fn new_form(State(state): State<Arc<AppState>>, page: PageContext) -> Result<Html<String>, AppError> {
    let ctx = form_context(&page, &EventForm::default(), "/admin/events/new");
    render(&state, EVENT_FORM, &ctx)
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Form(form): Form<EventForm>,
) -> Result<Response, AppError> {
    let draft = match validate_event(&event_input(&form)) {
        Ok(draft) => draft,
        Err(err) => return render_form_error(&state, EVENT_FORM, form_context(&page, &form, "/admin/events/new"), err),
    };
    let event = state.event_repo.create(&Event::new(draft)).await?;
    info!(event_id = %event.id, title = %event.title, "Event created");
    Ok(page.redirect("/admin/events", Flash::success(format!("Event \"{}\" created", event.title))).into_response())
}

pub async fn edit_form(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Path(event_id): Path<String>,
) -> Result<Html<String>, AppError> {
    let event = load_event(&state, &event_id).await?;
    let mut ctx = form_context(&page, &event_form(&event), &format!("/admin/events/{}/edit", event.id));
    ctx.insert("event", &event);
    render(&state, EVENT_FORM, &ctx)
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Path(event_id): Path<String>,
    Form(form): Form<EventForm>,
) -> Result<Response, AppError> {
    let mut event = load_event(&state, &event_id).await?;
    let draft = match validate_event(&event_input(&form)) {
        Ok(draft) => draft,
        Err(err) => {
            let mut ctx = form_context(&page, &form, &format!("/admin/events/{}/edit", event.id));
            ctx.insert("event", &event);
            return render_form_error(&state, EVENT_FORM, ctx, err);
        }
    };
    event.apply(draft);
    let event = state.event_repo.update(&event).await?;
    info!(event_id = %event.id, "Event updated");
    Ok(page.redirect("/admin/events", Flash::success(format!("Event \"{}\" updated", event.title))).into_response())
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Path(event_id): Path<String>,
) -> Result<Redirect, AppError> {
    let flash = match state.event_repo.delete(&event_id).await {
        Ok(()) => {
            info!(event_id = %event_id, "Event deleted");
            Flash::success("Event deleted")
        }
        Err(err) => Flash::from_error(&err),
    };
    Ok(page.redirect("/admin/events", flash))
}

pub async fn registrations(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Path(event_id): Path<String>,
) -> Result<Html<String>, AppError> {
    let event = load_event(&state, &event_id).await?;
    let mut ctx = page.context();
    ctx.insert("registrations", &state.registration_repo.list_for_event(&event.id).await?);
    ctx.insert("statuses", &["pending", "completed", "failed", "refunded", "not_required"]);
    ctx.insert("event", &event);
    render(&state, "admin/registrations.html", &ctx)
}

pub async fn set_payment_status(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Path(registration_id): Path<String>,
    Form(form): Form<StatusForm>,
) -> Result<Redirect, AppError> {
    let registration = state
        .registration_repo
        .find_by_id(&registration_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Registration not found".into()))?;
    let back = format!("/admin/events/{}/registrations", registration.event_id);

    let Some(status) = PaymentStatus::parse(form.status.trim()) else {
        return Ok(page.redirect(&back, Flash::error("Invalid payment status")));
    };
    state.registration_repo.set_payment_status(&registration.id, status).await?;
    info!(registration_id = %registration.id, status = status.as_str(), "Payment status set by admin");
    Ok(page.redirect(&back, Flash::success("Payment status updated")))
}

pub async fn attendance_page(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Path(event_id): Path<String>,
) -> Result<Html<String>, AppError> {
    let event = load_event(&state, &event_id).await?;
    let mut ctx = page.context();
    ctx.insert("records", &state.attendance_repo.list_for_event(&event.id).await?);
    ctx.insert("qr_payload", &qr_payload(&event));
    ctx.insert("access_code", &event.manual_access_code);
    ctx.insert("event", &event);
    render(&state, "admin/attendance.html", &ctx)
}

pub async fn mark_attendance(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Path(event_id): Path<String>,
    Form(form): Form<PrnForm>,
) -> Result<Redirect, AppError> {
    let back = format!("/admin/events/{}/attendance", event_id);
    let flash = match attendance::mark_by_admin(&state, &event_id, &form.prn).await {
        Ok(student) => Flash::success(format!("Attendance marked for {} ({})", student.full_name(), student.prn)),
        Err(err) => Flash::from_error(&err),
    };
    Ok(page.redirect(&back, flash))
}

pub async fn issue_certificates(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Path(event_id): Path<String>,
) -> Result<Redirect, AppError> {
    let back = format!("/admin/events/{}/attendance", event_id);
    let flash = match certificates::issue_for_event(&state, &event_id).await {
        Ok(0) => Flash::success("Every attendee already has a certificate"),
        Ok(issued) => Flash::success(format!("{} certificate(s) issued", issued)),
        Err(err) => Flash::from_error(&err),
    };
    Ok(page.redirect(&back, flash))
}
