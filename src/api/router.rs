use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Request},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::api::extractors::session::AdminUser;
use crate::api::handlers::{admin, admin_content, admin_events, api, auth, health, public, student};
use crate::domain::services::uploads::MAX_UPLOAD_BYTES;
use crate::state::AppState;
use tower_http::{
    classify::ServerErrorsFailureClass,
    services::ServeDir,
    trace::TraceLayer,
};
use tower_cookies::CookieManagerLayer;
use tracing::{error, info, info_span, Span};
use uuid::Uuid;

/// Room for the multipart framing and text fields around a maximum-size image.
const BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 256 * 1024;

fn admin_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin", get(admin::dashboard))

        // Events
        .route("/admin/events", get(admin_events::list))
        .route("/admin/events/new", get(admin_events::new_form).post(admin_events::create))
        .route("/admin/events/{id}/edit", get(admin_events::edit_form).post(admin_events::update))
        .route("/admin/events/{id}/delete", post(admin_events::delete))
        .route("/admin/events/{id}/registrations", get(admin_events::registrations))
        .route("/admin/registrations/{id}/payment", post(admin_events::set_payment_status))
        .route("/admin/events/{id}/attendance", get(admin_events::attendance_page).post(admin_events::mark_attendance))
        .route("/admin/events/{id}/certificates", post(admin_events::issue_certificates))

        // Research
        .route("/admin/research", get(admin_content::research).post(admin_content::create_project))
        .route("/admin/research/{id}/status", post(admin_content::set_project_status))
        .route("/admin/research/{id}/members", get(admin_content::project_members))
        .route("/admin/research/{id}/members/{member_id}", post(admin_content::set_member_status))

        // Content
        .route("/admin/opportunities", get(admin_content::opportunities).post(admin_content::create_opportunity))
        .route("/admin/opportunities/{id}/delete", post(admin_content::delete_opportunity))
        .route("/admin/gallery", get(admin_content::gallery).post(admin_content::upload_gallery_image))
        .route("/admin/gallery/{id}/delete", post(admin_content::delete_gallery_image))
        .route("/admin/team", get(admin_content::team).post(admin_content::create_team_member))
        .route("/admin/team/{id}/delete", post(admin_content::delete_team_member))

        // People
        .route("/admin/messages", get(admin::messages))
        .route("/admin/students", get(admin::students))
        .route("/admin/students/{id}/role", post(admin::set_role))

        .route_layer(middleware::from_extractor_with_state::<AdminUser, _>(state))
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let uploads = ServeDir::new(&state.config.upload_dir);

    Router::new()
        .route("/health", get(health::health_check))

        // Public pages
        .route("/", get(public::home))
        .route("/events", get(public::list_events))
        .route("/events/{id}", get(public::event_detail))
        .route("/calendar", get(public::calendar))
        .route("/calendar/export", get(public::calendar_export))
        .route("/certificates/verify/{certificate_id}", get(public::verify_certificate))
        .route("/opportunities", get(public::list_opportunities))
        .route("/gallery", get(public::gallery))
        .route("/team", get(public::team))
        .route("/contact", get(public::contact_page).post(public::submit_contact))

        // Accounts
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/verify", get(auth::verify_email))
        .route("/verify/resend", post(auth::resend_verification))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/forgot-password", get(auth::forgot_password_page).post(auth::forgot_password))
        .route("/reset-password", get(auth::reset_password_page).post(auth::reset_password))

        // Student pages
        .route("/dashboard", get(student::dashboard))
        .route("/events/{id}/register", post(student::register_for_event))
        .route("/attendance", get(student::attendance_page).post(student::mark_attendance))
        .route("/certificates", get(student::certificates))
        .route("/research", get(student::research))
        .route("/research/{id}", get(student::research_detail))
        .route("/profile", get(student::profile_page).post(student::update_profile))
        .route("/profile/password", post(student::change_password))
        .route("/profile/image", post(student::upload_profile_image))

        // JSON endpoints
        .route("/api/attendance", post(api::attendance))
        .route("/api/payment", post(api::payment))
        .route("/api/research", post(api::research))

        .merge(admin_routes(state.clone()))
        .nest_service("/uploads", uploads)

        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .layer(CookieManagerLayer::new())
        .with_state(state)
}
