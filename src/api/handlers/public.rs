use crate::api::dtos::requests::{
    CalendarQuery, CategoryListQuery, ContactForm, EventListQuery, ExportQuery, OpportunityListQuery,
};
use crate::api::extractors::session::PageContext;
use crate::api::flash::Flash;
use crate::api::handlers::{insert_pager, render, render_form_error};
use crate::domain::models::event::{Event, EventFilter, EventTimeframe};
use crate::domain::models::gallery::GalleryFilter;
use crate::domain::models::opportunity::{OpportunityFilter, OPPORTUNITY_TYPES};
use crate::domain::models::team::TeamFilter;
use crate::domain::services::calendar::{
    day_columns, generate_ics, google_calendar_url, ics_filename, important_dates, month_grid, navigation,
    parse_month, window, CalendarView,
};
use crate::domain::services::clock::{local_now, local_today};
use crate::domain::services::contact::{self, CONTACT_THANKS};
use crate::domain::services::pagination::{PageRequest, Pager};
use crate::domain::services::validation::normalize;
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Form, Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};
use chrono::{Datelike, NaiveDate};
use std::sync::Arc;
use tracing::{debug, info};

pub const EVENTS_PER_PAGE: i64 = 9;
pub const GALLERY_PER_PAGE: i64 = 12;
pub const OPPORTUNITIES_PER_PAGE: i64 = 9;
pub const TEAM_PER_PAGE: i64 = 12;

const HOME_EVENTS: i64 = 3;
const HOME_OPPORTUNITIES: i64 = 3;

pub async fn home(State(state): State<Arc<AppState>>, page: PageContext) -> Result<Html<String>, AppError> {
    let now = local_now(state.config.timezone);
    let events = state.event_repo.list_upcoming(now, HOME_EVENTS).await?;
    let opportunities = state.opportunity_repo.list_featured(HOME_OPPORTUNITIES).await?;

    let mut ctx = page.context();
    ctx.insert("events", &events);
    ctx.insert("opportunities", &opportunities);
    render(&state, "pages/home.html", &ctx)
}

pub async fn list_events(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Query(query): Query<EventListQuery>,
) -> Result<Html<String>, AppError> {
    let filter = EventFilter {
        search: normalize(query.search),
        category: normalize(query.category),
        timeframe: EventTimeframe::parse(query.timeframe.as_deref()),
    };
    let request = PageRequest::new(query.page.as_deref(), EVENTS_PER_PAGE);
    let now = local_now(state.config.timezone);

    let (events, total) = state.event_repo.search(&filter, now, &request).await?;
    debug!(total, page = request.page, "Event listing");

    let pager = Pager::build(
        &request,
        total,
        "/events",
        &[
            ("search", filter.search.clone()),
            ("category", filter.category.clone()),
            ("timeframe", Some(filter.timeframe.as_str().to_string())),
        ],
    );

    let mut ctx = page.context();
    ctx.insert("events", &events);
    ctx.insert("categories", &state.event_repo.list_categories().await?);
    ctx.insert("search", &filter.search);
    ctx.insert("category", &filter.category);
    ctx.insert("timeframe", filter.timeframe.as_str());
    insert_pager(&mut ctx, &pager);
    render(&state, "pages/events.html", &ctx)
}

pub async fn event_detail(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Path(event_id): Path<String>,
) -> Result<Html<String>, AppError> {
    let event = state
        .event_repo
        .find_by_id(&event_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".into()))?;

    let now = local_now(state.config.timezone);
    let registered_count = state.registration_repo.count_for_event(&event.id).await?;
    let registration = match &page.student {
        Some(student) => state.registration_repo.find(&event.id, &student.id).await?,
        None => None,
    };
    let is_full = event.capacity.is_some_and(|capacity| registered_count >= capacity as i64);

    let mut ctx = page.context();
    ctx.insert("google_calendar_url", &google_calendar_url(&event, state.config.timezone));
    ctx.insert("is_past", &event.is_past(now));
    ctx.insert("deadline_passed", &event.deadline_passed(now));
    ctx.insert("is_full", &is_full);
    ctx.insert("registered_count", &registered_count);
    ctx.insert("awaiting_payment", &registration.as_ref().is_some_and(|r| event.is_paid() && r.awaiting_payment()));
    ctx.insert("registration", &registration);
    ctx.insert("event", &event);
    render(&state, "pages/event_detail.html", &ctx)
}

pub async fn calendar(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Query(query): Query<CalendarQuery>,
) -> Result<Html<String>, AppError> {
    let tz = state.config.timezone;
    let now = local_now(tz);
    let today = now.date();

    let view = CalendarView::parse(query.view.as_deref());
    let date = query
        .date
        .as_deref()
        .and_then(|raw| NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok())
        .unwrap_or(today);
    let category = normalize(query.category);

    let (start, end) = window(view, date);
    let student_id = page.student.as_ref().map(|s| s.id.as_str());
    let events = state
        .event_repo
        .list_in_window(start, end, category.as_deref(), student_id)
        .await?;
    let (prev_date, next_date) = navigation(view, date);

    let mut ctx = page.context();
    match view {
        CalendarView::Month => ctx.insert("grid", &month_grid(date.year(), date.month(), today, &events)),
        CalendarView::Week => ctx.insert("days", &day_columns(start.date(), 7, today, &events)),
        CalendarView::Day => ctx.insert("days", &day_columns(start.date(), 1, today, &events)),
    }

    let deadlines = state.event_repo.list_open_deadlines(now).await?;
    let paid = state.event_repo.list_upcoming_paid(now).await?;

    ctx.insert("view", view.as_str());
    ctx.insert("date", &date);
    ctx.insert("prev_date", &prev_date);
    ctx.insert("next_date", &next_date);
    ctx.insert("today", &today);
    ctx.insert("category", &category);
    ctx.insert("categories", &state.event_repo.list_categories().await?);
    ctx.insert("events", &events);
    ctx.insert("important_dates", &important_dates(&deadlines, &paid, now));
    ctx.insert("export_month", &date.format("%Y-%m").to_string());
    render(&state, "pages/calendar.html", &ctx)
}

/// `GET /calendar/export?month=YYYY-MM`: an attachment with one VEVENT per event of the month.
pub async fn calendar_export(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, AppError> {
    let tz = state.config.timezone;
    let month = match normalize(query.month) {
        Some(raw) => parse_month(&raw).ok_or_else(|| AppError::Validation("Invalid month. Use the YYYY-MM format".into()))?,
        None => {
            let today = local_today(tz);
            today.with_day(1).unwrap_or(today)
        }
    };

    let (start, end) = window(CalendarView::Month, month);
    let events: Vec<Event> = state
        .event_repo
        .list_in_window(start, end, None, None)
        .await?
        .into_iter()
        .map(|entry| entry.event)
        .collect();

    info!(month = %month.format("%Y-%m"), events = events.len(), "Calendar exported");

    let body = generate_ics(&events, tz, &state.config.ical_uid_domain);
    let headers = [
        (header::CONTENT_TYPE, "text/calendar; charset=utf-8".to_string()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", ics_filename(month))),
    ];
    Ok((headers, body).into_response())
}

pub async fn verify_certificate(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Path(certificate_id): Path<String>,
) -> Result<Response, AppError> {
    let certificate = state.certificate_repo.find_details(certificate_id.trim()).await?;
    let status = if certificate.is_some() { StatusCode::OK } else { StatusCode::NOT_FOUND };

    let mut ctx = page.context();
    ctx.insert("certificate_id", certificate_id.trim());
    ctx.insert("certificate", &certificate);
    Ok((status, render(&state, "pages/certificate_verify.html", &ctx)?).into_response())
}

pub async fn list_opportunities(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Query(query): Query<OpportunityListQuery>,
) -> Result<Html<String>, AppError> {
    let filter = OpportunityFilter {
        search: normalize(query.search),
        opportunity_type: normalize(query.opportunity_type).map(|t| t.to_lowercase()),
    };
    let request = PageRequest::new(query.page.as_deref(), OPPORTUNITIES_PER_PAGE);
    let (opportunities, total) = state.opportunity_repo.search(&filter, &request).await?;
    let pager = Pager::build(
        &request,
        total,
        "/opportunities",
        &[("search", filter.search.clone()), ("type", filter.opportunity_type.clone())],
    );

    let mut ctx = page.context();
    ctx.insert("opportunities", &opportunities);
    ctx.insert("types", &OPPORTUNITY_TYPES);
    ctx.insert("search", &filter.search);
    ctx.insert("opportunity_type", &filter.opportunity_type);
    insert_pager(&mut ctx, &pager);
    render(&state, "pages/opportunities.html", &ctx)
}

pub async fn gallery(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Query(query): Query<CategoryListQuery>,
) -> Result<Html<String>, AppError> {
    let filter = GalleryFilter {
        search: normalize(query.search),
        category: normalize(query.category),
    };
    let request = PageRequest::new(query.page.as_deref(), GALLERY_PER_PAGE);
    let (images, total) = state.gallery_repo.search(&filter, &request).await?;
    let pager = Pager::build(
        &request,
        total,
        "/gallery",
        &[("search", filter.search.clone()), ("category", filter.category.clone())],
    );

    let mut ctx = page.context();
    ctx.insert("images", &images);
    ctx.insert("categories", &state.gallery_repo.list_categories().await?);
    ctx.insert("search", &filter.search);
    ctx.insert("category", &filter.category);
    insert_pager(&mut ctx, &pager);
    render(&state, "pages/gallery.html", &ctx)
}

pub async fn team(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Query(query): Query<CategoryListQuery>,
) -> Result<Html<String>, AppError> {
    let filter = TeamFilter {
        search: normalize(query.search),
        category: normalize(query.category),
    };
    let request = PageRequest::new(query.page.as_deref(), TEAM_PER_PAGE);
    let (members, total) = state.team_repo.search(&filter, &request).await?;
    let pager = Pager::build(
        &request,
        total,
        "/team",
        &[("search", filter.search.clone()), ("category", filter.category.clone())],
    );

    let mut ctx = page.context();
    ctx.insert("members", &members);
    ctx.insert("search", &filter.search);
    ctx.insert("category", &filter.category);
    insert_pager(&mut ctx, &pager);
    render(&state, "pages/team.html", &ctx)
}

pub async fn contact_page(State(state): State<Arc<AppState>>, page: PageContext) -> Result<Html<String>, AppError> {
    let mut ctx = page.context();
    let form = ContactForm {
        name: page.student.as_ref().map(|s| s.full_name()).unwrap_or_default(),
        email: page.student.as_ref().map(|s| s.email.clone()).unwrap_or_default(),
        ..Default::default()
    };
    ctx.insert("form", &form);
    render(&state, "pages/contact.html", &ctx)
}

pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Form(form): Form<ContactForm>,
) -> Result<Response, AppError> {
    match contact::submit(&state, &form.name, &form.email, &form.subject, &form.message).await {
        Ok(_) => Ok(page.redirect("/contact", Flash::success(CONTACT_THANKS)).into_response()),
        Err(err) => {
            let mut ctx = page.context();
            ctx.insert("form", &form);
            render_form_error(&state, "pages/contact.html", ctx, err)
        }
    }
}
