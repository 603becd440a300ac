use crate::api::dtos::requests::{AttendanceForm, ChangePasswordForm, ProfileForm, ResearchListQuery};
use crate::api::extractors::session::PageContext;
use crate::api::flash::Flash;
use crate::api::handlers::{insert_pager, read_upload, render, render_form_error};
use crate::domain::models::attendance::MarkedBy;
use crate::domain::models::research::{MemberStatus, ResearchFilter};
use crate::domain::models::student::Student;
use crate::domain::services::attendance::{self, MARKED};
use crate::domain::services::clock::local_now;
use crate::domain::services::event_registration;
use crate::domain::services::pagination::{PageRequest, Pager};
use crate::domain::services::validation::{normalize, ProfileInput};
use crate::domain::services::account;
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Form, Multipart, Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use std::sync::Arc;

pub const RESEARCH_PER_PAGE: i64 = 6;
const DASHBOARD_UPCOMING: i64 = 5;
const DASHBOARD_ACTIVITY: i64 = 5;

pub const PROFILE_UPDATED: &str = "Profile updated successfully";
pub const PASSWORD_CHANGED: &str = "Password changed successfully";
pub const PHOTO_UPDATED: &str = "Profile picture updated";

pub async fn dashboard(State(state): State<Arc<AppState>>, page: PageContext) -> Result<Html<String>, AppError> {
    let student = page.student()?;
    let now = local_now(state.config.timezone);

    let mut ctx = page.context();
    ctx.insert("registration_count", &state.registration_repo.count_for_student(&student.id).await?);
    ctx.insert("attended_count", &state.attendance_repo.count_for_student(&student.id).await?);
    ctx.insert("certificate_count", &state.certificate_repo.count_for_student(&student.id).await?);
    ctx.insert("project_count", &state.research_repo.count_accepted_for_student(&student.id).await?);
    ctx.insert(
        "upcoming",
        &state
            .registration_repo
            .list_upcoming_for_student(&student.id, now, DASHBOARD_UPCOMING)
            .await?,
    );
    ctx.insert("activities", &state.activity_repo.list_recent(&student.id, DASHBOARD_ACTIVITY).await?);
    render(&state, "pages/dashboard.html", &ctx)
}

pub async fn register_for_event(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Path(event_id): Path<String>,
) -> Result<Redirect, AppError> {
    let student = page.student()?;
    let back = format!("/events/{}", event_id);

    match event_registration::register_for_event(&state, student, &event_id).await {
        Ok(outcome) => {
            let flash = Flash::success(outcome.message).with_calendar_url(outcome.google_calendar_url);
            Ok(page.redirect(&back, flash))
        }
        Err(err @ AppError::NotFound(_)) => Ok(page.redirect("/events", Flash::from_error(&err))),
        Err(err) => Ok(page.redirect(&back, Flash::from_error(&err))),
    }
}

pub async fn attendance_page(State(state): State<Arc<AppState>>, page: PageContext) -> Result<Html<String>, AppError> {
    let student = page.student()?;
    let mut ctx = page.context();
    ctx.insert("records", &state.attendance_repo.list_for_student(&student.id).await?);
    render(&state, "pages/attendance.html", &ctx)
}

pub async fn mark_attendance(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Form(form): Form<AttendanceForm>,
) -> Result<Redirect, AppError> {
    let student = page.student()?;
    let flash = match attendance::mark_with_code(&state, student, &form.event_id, &form.access_code, MarkedBy::Manual).await {
        Ok(_) => Flash::success(MARKED),
        Err(err) => Flash::from_error(&err),
    };
    Ok(page.redirect("/attendance", flash))
}

pub async fn certificates(State(state): State<Arc<AppState>>, page: PageContext) -> Result<Html<String>, AppError> {
    let student = page.student()?;
    let mut ctx = page.context();
    ctx.insert("certificates", &state.certificate_repo.list_for_student(&student.id).await?);
    render(&state, "pages/certificates.html", &ctx)
}

pub async fn research(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Query(query): Query<ResearchListQuery>,
) -> Result<Html<String>, AppError> {
    page.student()?;
    let filter = ResearchFilter {
        search: normalize(query.search),
        status: normalize(query.status),
    };
    let request = PageRequest::new(query.page.as_deref(), RESEARCH_PER_PAGE);
    let (projects, total) = state.research_repo.search(&filter, &request).await?;
    let pager = Pager::build(
        &request,
        total,
        "/research",
        &[("search", filter.search.clone()), ("status", filter.status.clone())],
    );

    let mut ctx = page.context();
    ctx.insert("projects", &projects);
    ctx.insert("search", &filter.search);
    ctx.insert("status", &filter.status);
    insert_pager(&mut ctx, &pager);
    render(&state, "pages/research.html", &ctx)
}

pub async fn research_detail(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Path(project_id): Path<String>,
) -> Result<Html<String>, AppError> {
    let student = page.student()?;
    let project = state
        .research_repo
        .find_by_id(&project_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".into()))?;

    let members = state.research_repo.list_members(&project.id, Some(MemberStatus::Accepted)).await?;
    let membership = state.research_repo.find_membership(&project.id, &student.id).await?;

    let mut ctx = page.context();
    ctx.insert("is_full", &(members.len() as i64 >= project.max_members as i64));
    ctx.insert("accepting", &project.is_accepting_members());
    ctx.insert("project", &project);
    ctx.insert("members", &members);
    ctx.insert("membership", &membership);
    render(&state, "pages/research_detail.html", &ctx)
}

fn profile_form(student: &Student) -> ProfileForm {
    ProfileForm {
        first_name: student.first_name.clone(),
        middle_name: student.middle_name.clone().unwrap_or_default(),
        last_name: student.last_name.clone(),
        contact_number: student.contact_number.clone(),
        department: student.department.clone(),
        year_of_study: student.year_of_study.to_string(),
    }
}

pub async fn profile_page(State(state): State<Arc<AppState>>, page: PageContext) -> Result<Html<String>, AppError> {
    let student = page.student()?;
    let mut ctx = page.context();
    ctx.insert("form", &profile_form(student));
    render(&state, "pages/profile.html", &ctx)
}

pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Form(form): Form<ProfileForm>,
) -> Result<Response, AppError> {
    let student = page.student()?;
    let input = ProfileInput {
        first_name: &form.first_name,
        middle_name: &form.middle_name,
        last_name: &form.last_name,
        contact_number: &form.contact_number,
        department: &form.department,
        year_of_study: &form.year_of_study,
    };

    match account::update_profile(&state, student, &input).await {
        Ok(_) => Ok(page.redirect("/profile", Flash::success(PROFILE_UPDATED)).into_response()),
        Err(err) => {
            let mut ctx = page.context();
            ctx.insert("form", &form);
            render_form_error(&state, "pages/profile.html", ctx, err)
        }
    }
}

pub async fn change_password(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Form(form): Form<ChangePasswordForm>,
) -> Result<Redirect, AppError> {
    let student = page.student()?;
    let flash = match account::change_password(&state, student, &form.current_password, &form.new_password, &form.confirm_password).await {
        Ok(()) => Flash::success(PASSWORD_CHANGED),
        Err(err) => Flash::from_error(&err),
    };
    Ok(page.redirect("/profile", flash))
}

pub async fn upload_profile_image(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    multipart: Multipart,
) -> Result<Redirect, AppError> {
    let student = page.student()?;
    let result = match read_upload(multipart, "profile_image").await {
        Ok(upload) => account::update_profile_image(&state, student, &upload.file).await,
        Err(err) => Err(err),
    };
    let flash = match result {
        Ok(_) => Flash::success(PHOTO_UPDATED),
        Err(err) => Flash::from_error(&err),
    };
    Ok(page.redirect("/profile", flash))
}
