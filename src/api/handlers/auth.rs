use crate::api::dtos::requests::{EmailForm, LoginForm, RegisterForm, ResetPasswordForm, TokenQuery};
use crate::api::extractors::session::{clear_session_cookies, set_session_cookies, PageContext};
use crate::api::flash::Flash;
use crate::api::handlers::{render, render_form_error};
use crate::domain::models::student::Student;
use crate::domain::services::account;
use crate::domain::services::validation::{ProfileInput, RegistrationInput};
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Form, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tower_cookies::cookie::SameSite;
use tower_cookies::{Cookie, Cookies};
use tracing::info;

pub const REMEMBER_COOKIE: &str = "remember_email";
const REMEMBER_DAYS: i64 = 30;

pub const REGISTERED: &str = "Registration successful! Please check your email to verify your account.";
pub const VERIFIED: &str = "Email verified successfully! You can now log in.";
pub const VERIFICATION_RESENT: &str =
    "If an unverified account exists for that email, a new verification link has been sent.";
pub const RESET_LINK_SENT: &str = "If an account exists for that email, a password reset link has been sent.";
pub const PASSWORD_RESET: &str = "Your password has been reset. You can now log in.";
pub const LOGGED_OUT: &str = "You have been logged out.";

fn landing_page(student: &Student) -> &'static str {
    if student.is_admin() { "/admin" } else { "/dashboard" }
}

fn remember_identifier(cookies: &Cookies, identifier: Option<&str>) {
    match identifier {
        Some(identifier) => {
            let mut cookie = Cookie::new(REMEMBER_COOKIE, identifier.to_string());
            cookie.set_http_only(true);
            cookie.set_same_site(SameSite::Lax);
            cookie.set_path("/");
            cookie.set_max_age(time::Duration::days(REMEMBER_DAYS));
            cookies.add(cookie);
        }
        None => cookies.remove(Cookie::build((REMEMBER_COOKIE, "")).path("/").into()),
    }
}

pub async fn register_page(State(state): State<Arc<AppState>>, page: PageContext) -> Result<Response, AppError> {
    if let Some(student) = &page.student {
        return Ok(Redirect::to(landing_page(student)).into_response());
    }
    let mut ctx = page.context();
    ctx.insert("form", &RegisterForm::default());
    Ok(render(&state, "pages/register.html", &ctx)?.into_response())
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    let input = RegistrationInput {
        profile: ProfileInput {
            first_name: &form.first_name,
            middle_name: &form.middle_name,
            last_name: &form.last_name,
            contact_number: &form.contact_number,
            department: &form.department,
            year_of_study: &form.year_of_study,
        },
        prn: &form.prn,
        email: &form.email,
        password: &form.password,
        confirm_password: &form.confirm_password,
    };

    match account::register_student(&state, &input).await {
        Ok(_) => Ok(page.redirect("/login", Flash::success(REGISTERED)).into_response()),
        Err(err) => {
            let mut ctx = page.context();
            ctx.insert("form", &form);
            render_form_error(&state, "pages/register.html", ctx, err)
        }
    }
}

pub async fn verify_email(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Query(query): Query<TokenQuery>,
) -> Redirect {
    match account::verify_email(&state, &query.token).await {
        Ok(_) => page.redirect("/login", Flash::success(VERIFIED)),
        Err(err) => page.redirect("/login", Flash::from_error(&err)),
    }
}

pub async fn resend_verification(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Form(form): Form<EmailForm>,
) -> Redirect {
    match account::resend_verification(&state, &form.email).await {
        Ok(()) => page.redirect("/login", Flash::success(VERIFICATION_RESENT)),
        Err(err) => page.redirect("/login", Flash::from_error(&err)),
    }
}

pub async fn login_page(
    State(state): State<Arc<AppState>>,
    page: PageContext,
) -> Result<Response, AppError> {
    if let Some(student) = &page.student {
        return Ok(Redirect::to(landing_page(student)).into_response());
    }
    let remembered = page.cookies.get(REMEMBER_COOKIE).map(|c| c.value().to_string());

    let mut ctx = page.context();
    ctx.insert(
        "form",
        &LoginForm {
            remember: remembered.as_ref().map(|_| "on".to_string()),
            identifier: remembered.unwrap_or_default(),
            ..Default::default()
        },
    );
    Ok(render(&state, "pages/login.html", &ctx)?.into_response())
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let student = match account::authenticate(&state, &form.identifier, &form.password).await {
        Ok(student) => student,
        Err(err) => {
            let mut ctx = page.context();
            ctx.insert("form", &form);
            return render_form_error(&state, "pages/login.html", ctx, err);
        }
    };

    let (token, csrf) = state.auth_service.issue_session(&student)?;
    set_session_cookies(&page.cookies, &token, &csrf, state.config.session_ttl_hours);
    remember_identifier(&page.cookies, form.remember.is_some().then(|| form.identifier.trim()));

    let flash = Flash::success(format!("Welcome back, {}!", student.first_name));
    Ok(page.redirect(landing_page(&student), flash).into_response())
}

pub async fn logout(page: PageContext) -> Redirect {
    if let Some(student) = &page.student {
        info!(student_id = %student.id, "Student logged out");
    }
    clear_session_cookies(&page.cookies);
    page.redirect("/login", Flash::success(LOGGED_OUT))
}

pub async fn forgot_password_page(State(state): State<Arc<AppState>>, page: PageContext) -> Result<Html<String>, AppError> {
    render(&state, "pages/forgot_password.html", &page.context())
}

pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Form(form): Form<EmailForm>,
) -> Redirect {
    match account::forgot_password(&state, &form.email).await {
        Ok(()) => page.redirect("/login", Flash::success(RESET_LINK_SENT)),
        Err(err) => page.redirect("/forgot-password", Flash::from_error(&err)),
    }
}

pub async fn reset_password_page(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Query(query): Query<TokenQuery>,
) -> Result<Response, AppError> {
    if let Err(err) = account::check_reset_token(&state, &query.token).await {
        return Ok(page.redirect("/forgot-password", Flash::from_error(&err)).into_response());
    }
    let mut ctx = page.context();
    ctx.insert("token", query.token.trim());
    Ok(render(&state, "pages/reset_password.html", &ctx)?.into_response())
}

pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    page: PageContext,
    Form(form): Form<ResetPasswordForm>,
) -> Result<Response, AppError> {
    match account::reset_password(&state, &form.token, &form.password, &form.confirm_password).await {
        Ok(()) => Ok(page.redirect("/login", Flash::success(PASSWORD_RESET)).into_response()),
        Err(err @ AppError::Validation(_)) => Ok(page.redirect("/forgot-password", Flash::from_error(&err)).into_response()),
        Err(err) => {
            let mut ctx = page.context();
            ctx.insert("token", form.token.trim());
            render_form_error(&state, "pages/reset_password.html", ctx, err)
        }
    }
}
