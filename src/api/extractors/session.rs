use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, Method},
    response::{IntoResponse, Redirect, Response},
};
use crate::api::dtos::responses::ApiError;
use crate::api::flash::{redirect_with, take_flash, Flash};
use crate::domain::models::auth::Claims;
use crate::domain::models::student::Student;
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;
use tera::Context;
use tower_cookies::{Cookie, Cookies};
use tower_cookies::cookie::SameSite;
use tracing::{debug, warn, Span};

pub const SESSION_COOKIE: &str = "spark_session";
pub const CSRF_COOKIE: &str = "spark_csrf";
pub const CSRF_HEADER: &str = "X-CSRF-Token";
pub const ADMIN_REQUIRED: &str = "Admin access required";

pub fn set_session_cookies(cookies: &Cookies, token: &str, csrf: &str, ttl_hours: i64) {
    let mut session = Cookie::new(SESSION_COOKIE, token.to_string());
    session.set_http_only(true);
    session.set_secure(true);
    session.set_same_site(SameSite::Strict);
    session.set_path("/");
    session.set_max_age(time::Duration::hours(ttl_hours));
    cookies.add(session);

    // Not HttpOnly: the inline scripts echo it back in the CSRF header.
    let mut csrf_cookie = Cookie::new(CSRF_COOKIE, csrf.to_string());
    csrf_cookie.set_http_only(false);
    csrf_cookie.set_secure(true);
    csrf_cookie.set_same_site(SameSite::Strict);
    csrf_cookie.set_path("/");
    csrf_cookie.set_max_age(time::Duration::hours(ttl_hours));
    cookies.add(csrf_cookie);
}

pub fn clear_session_cookies(cookies: &Cookies) {
    cookies.remove(Cookie::build((SESSION_COOKIE, "")).path("/").into());
    cookies.remove(Cookie::build((CSRF_COOKIE, "")).path("/").into());
}

#[derive(Clone)]
struct Session {
    student: Student,
    claims: Claims,
}

/// Per-request cache so stacked extractors hit the database once.
#[derive(Clone)]
struct LoadedSession(Option<Session>);

fn cookies_from(parts: &Parts) -> Result<Cookies, AppError> {
    parts
        .extensions
        .get::<Cookies>()
        .cloned()
        .ok_or_else(|| AppError::InternalWithMsg("CookieManagerLayer missing".into()))
}

/// Decodes the session cookie and reloads the student it names.
async fn load_session(parts: &mut Parts, state: &AppState) -> Result<Option<Session>, AppError> {
    if let Some(LoadedSession(session)) = parts.extensions.get::<LoadedSession>() {
        return Ok(session.clone());
    }

    let cookies = cookies_from(parts)?;
    let session = match cookies.get(SESSION_COOKIE).map(|c| c.value().to_string()) {
        None => None,
        Some(token) => match state.auth_service.decode_session(&token) {
            None => {
                debug!("Ignoring invalid or expired session cookie");
                None
            }
            Some(claims) => match state.student_repo.find_by_id(&claims.sub).await? {
                Some(student) => {
                    Span::current().record("user_id", student.id.as_str());
                    Some(Session { student, claims })
                }
                None => {
                    warn!(student_id = %claims.sub, "Session names a student that no longer exists");
                    None
                }
            },
        },
    };

    parts.extensions.insert(LoadedSession(session.clone()));
    Ok(session)
}

fn csrf_matches(parts: &Parts, claims: &Claims) -> bool {
    if matches!(parts.method, Method::GET | Method::HEAD | Method::OPTIONS) {
        return true;
    }
    parts
        .headers
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == claims.csrf)
}

/// A logged-in student calling a JSON endpoint. Answers 401 JSON without a session and
/// 403 JSON when a write lacks the matching CSRF header.
pub struct CurrentStudent(pub Student);

impl<S> FromRequestParts<S> for CurrentStudent
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);
        let Some(Session { student, claims }) = load_session(parts, &app_state).await? else {
            return Err(ApiError(AppError::Unauthorized));
        };
        if !csrf_matches(parts, &claims) {
            warn!(student_id = %student.id, "Rejected API write with missing or mismatched CSRF token");
            return Err(ApiError(AppError::Forbidden("Invalid CSRF token".into())));
        }
        Ok(CurrentStudent(student))
    }
}

/// Gate for the admin panel: visitors go to `/login`, students get 403.
pub struct AdminUser(pub Student);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);
        let session = load_session(parts, &app_state).await.map_err(IntoResponse::into_response)?;
        let Some(Session { student, .. }) = session else {
            return Err(AppError::Unauthorized.into_response());
        };
        if !student.is_admin() {
            warn!(student_id = %student.id, path = %parts.uri.path(), "Non-admin tried to reach the admin panel");
            return Err(AppError::Forbidden(ADMIN_REQUIRED.into()).into_response());
        }
        Ok(AdminUser(student))
    }
}

/// Everything a rendered page needs from the request: the viewer, their CSRF token
/// and the flash left by the previous redirect.
pub struct PageContext {
    pub student: Option<Student>,
    pub csrf_token: Option<String>,
    pub flash: Flash,
    pub cookies: Cookies,
}

impl PageContext {
    /// Base template context shared by every page.
    pub fn context(&self) -> Context {
        let mut ctx = Context::new();
        ctx.insert("current_student", &self.student);
        ctx.insert("is_admin", &self.student.as_ref().is_some_and(Student::is_admin));
        ctx.insert("csrf_token", &self.csrf_token);
        ctx.insert("flash", &self.flash);
        ctx
    }

    /// The logged-in student, or `Unauthorized` (rendered as a redirect to `/login`).
    pub fn student(&self) -> Result<&Student, AppError> {
        self.student.as_ref().ok_or(AppError::Unauthorized)
    }

    pub fn redirect(&self, to: &str, flash: Flash) -> Redirect {
        redirect_with(&self.cookies, to, flash)
    }
}

impl<S> FromRequestParts<S> for PageContext
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);
        let session = load_session(parts, &app_state).await?;
        let cookies = cookies_from(parts)?;
        let flash = take_flash(&cookies);
        let (student, csrf_token) = match session {
            Some(Session { student, claims }) => (Some(student), Some(claims.csrf)),
            None => (None, None),
        };
        Ok(PageContext { student, csrf_token, flash, cookies })
    }
}
