use crate::api::dtos::requests::{PageQuery, RoleForm, SearchQuery};
use crate::api::extractors::session::PageContext;
use crate::api::flash::Flash;
use crate::api::handlers::{insert_pager, render};
use crate::domain::models::registration::PaymentStatus;
use crate::domain::models::student::{ROLE_ADMIN, ROLE_STUDENT};
use crate::domain::services::pagination::{PageRequest, Pager};
use crate::domain::services::validation::normalize;
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Form, Path, Query, State},
    response::{Html, Redirect},
};
use std::sync::Arc;
use tracing::{info, warn};

pub const ADMIN_PER_PAGE: i64 = 20;
pub const OWN_ROLE: &str = "You cannot change your own role";

pub async fn dashboard(State(state): State<Arc<AppState>>, page: PageContext) -> Result<Html<String>, AppError> {
    let mut ctx = page.context();
    ctx.insert("student_count", &state.student_repo.count().await?);
    ctx.insert("event_count", &state.event_repo.count().await?);
    ctx.insert("registration_count", &state.registration_repo.count().await?);
    ctx.insert(
        "pending_payments",
        &state.registration_repo.count_by_payment_status(PaymentStatus::Pending).await?,
    );
    ctx.insert("message_count", &state.contact_repo.count().await?);
    render(&state, "admin/dashboard.html", &ctx)
}

pub async fn messages(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, AppError> {
    let request = PageRequest::new(query.page.as_deref(), ADMIN_PER_PAGE);
    let (messages, total) = state.contact_repo.list(&request).await?;
    let pager = Pager::build(&request, total, "/admin/messages", &[]);

    let mut ctx = page.context();
    ctx.insert("messages", &messages);
    insert_pager(&mut ctx, &pager);
    render(&state, "admin/messages.html", &ctx)
}

pub async fn students(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Query(query): Query<SearchQuery>,
) -> Result<Html<String>, AppError> {
    let search = normalize(query.search);
    let request = PageRequest::new(query.page.as_deref(), ADMIN_PER_PAGE);
    let (students, total) = state.student_repo.search(search.as_deref(), &request).await?;
    let pager = Pager::build(&request, total, "/admin/students", &[("search", search.clone())]);

    let mut ctx = page.context();
    ctx.insert("students", &students);
    ctx.insert("search", &search);
    insert_pager(&mut ctx, &pager);
    render(&state, "admin/students.html", &ctx)
}

pub async fn set_role(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Path(student_id): Path<String>,
    Form(form): Form<RoleForm>,
) -> Result<Redirect, AppError> {
    let admin = page.student()?;

    let role = form.role.trim().to_uppercase();
    if role != ROLE_STUDENT && role != ROLE_ADMIN {
        return Ok(page.redirect("/admin/students", Flash::error("Invalid role")));
    }
    if student_id == admin.id {
        warn!(admin_id = %admin.id, "Admin tried to change their own role");
        return Ok(page.redirect("/admin/students", Flash::error(OWN_ROLE)));
    }

    let Some(target) = state.student_repo.find_by_id(&student_id).await? else {
        return Ok(page.redirect("/admin/students", Flash::error("Student not found")));
    };
    state.student_repo.set_role(&target.id, &role).await?;
    info!(admin_id = %admin.id, student_id = %target.id, role = %role, "Role changed");

    let flash = Flash::success(format!("{} is now {}", target.full_name(), role));
    Ok(page.redirect("/admin/students", flash))
}
