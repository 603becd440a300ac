use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use anyhow::Context;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::ConnectOptions;
use tracing::{info, warn};
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::domain::models::student::ROLE_ADMIN;
use crate::domain::services::auth_service::AuthService;
use crate::domain::services::validation::normalize_prn;
use crate::infra::email::http_email_service::HttpEmailService;
use crate::infra::payment::razorpay::RazorpayGateway;
use crate::infra::repositories::{
    postgres_activity_repo::PostgresActivityRepo, postgres_attendance_repo::PostgresAttendanceRepo,
    postgres_certificate_repo::PostgresCertificateRepo, postgres_contact_repo::PostgresContactRepo,
    postgres_event_repo::PostgresEventRepo, postgres_gallery_repo::PostgresGalleryRepo,
    postgres_opportunity_repo::PostgresOpportunityRepo, postgres_registration_repo::PostgresRegistrationRepo,
    postgres_research_repo::PostgresResearchRepo, postgres_student_repo::PostgresStudentRepo,
    postgres_team_repo::PostgresTeamRepo,
    sqlite_activity_repo::SqliteActivityRepo, sqlite_attendance_repo::SqliteAttendanceRepo,
    sqlite_certificate_repo::SqliteCertificateRepo, sqlite_contact_repo::SqliteContactRepo,
    sqlite_event_repo::SqliteEventRepo, sqlite_gallery_repo::SqliteGalleryRepo,
    sqlite_opportunity_repo::SqliteOpportunityRepo, sqlite_registration_repo::SqliteRegistrationRepo,
    sqlite_research_repo::SqliteResearchRepo, sqlite_student_repo::SqliteStudentRepo,
    sqlite_team_repo::SqliteTeamRepo,
};
use crate::infra::templates::load_templates;
use crate::state::AppState;

pub fn is_postgres_url(database_url: &str) -> bool {
    database_url.starts_with("postgres://") || database_url.starts_with("postgresql://")
}

/// Connects to the configured database, runs migrations and wires every adapter.
pub async fn bootstrap_state(config: &Config) -> anyhow::Result<AppState> {
    let database_url = &config.database_url;
    let email_service = Arc::new(HttpEmailService::new(
        config.mail_service_url.clone(),
        config.mail_service_token.clone(),
    ));
    let payment_gateway = Arc::new(RazorpayGateway::new(
        config.razorpay_key_id.clone(),
        config.razorpay_key_secret.clone(),
    ));
    let templates = Arc::new(load_templates(config.timezone).context("Failed to load templates")?);
    let auth_service = Arc::new(AuthService::new(config));

    let state = if is_postgres_url(database_url) {
        info!("Initializing PostgreSQL connection...");

        let opts = PgConnectOptions::from_str(database_url)
            .context("Invalid Postgres URL")?
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .context("Failed to connect to Postgres")?;

        sqlx::migrate!("./migrations/postgres")
            .run(&pool)
            .await
            .context("Failed to run Postgres migrations")?;

        AppState {
            config: config.clone(),
            student_repo: Arc::new(PostgresStudentRepo::new(pool.clone())),
            event_repo: Arc::new(PostgresEventRepo::new(pool.clone())),
            registration_repo: Arc::new(PostgresRegistrationRepo::new(pool.clone())),
            attendance_repo: Arc::new(PostgresAttendanceRepo::new(pool.clone())),
            certificate_repo: Arc::new(PostgresCertificateRepo::new(pool.clone())),
            research_repo: Arc::new(PostgresResearchRepo::new(pool.clone())),
            opportunity_repo: Arc::new(PostgresOpportunityRepo::new(pool.clone())),
            gallery_repo: Arc::new(PostgresGalleryRepo::new(pool.clone())),
            team_repo: Arc::new(PostgresTeamRepo::new(pool.clone())),
            contact_repo: Arc::new(PostgresContactRepo::new(pool.clone())),
            activity_repo: Arc::new(PostgresActivityRepo::new(pool)),
            auth_service,
            email_service,
            payment_gateway,
            templates,
        }
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .context("Invalid SQLite connection string")?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .context("Failed to connect to SQLite")?;

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .context("Failed to run SQLite migrations")?;

        AppState {
            config: config.clone(),
            student_repo: Arc::new(SqliteStudentRepo::new(pool.clone())),
            event_repo: Arc::new(SqliteEventRepo::new(pool.clone())),
            registration_repo: Arc::new(SqliteRegistrationRepo::new(pool.clone())),
            attendance_repo: Arc::new(SqliteAttendanceRepo::new(pool.clone())),
            certificate_repo: Arc::new(SqliteCertificateRepo::new(pool.clone())),
            research_repo: Arc::new(SqliteResearchRepo::new(pool.clone())),
            opportunity_repo: Arc::new(SqliteOpportunityRepo::new(pool.clone())),
            gallery_repo: Arc::new(SqliteGalleryRepo::new(pool.clone())),
            team_repo: Arc::new(SqliteTeamRepo::new(pool.clone())),
            contact_repo: Arc::new(SqliteContactRepo::new(pool.clone())),
            activity_repo: Arc::new(SqliteActivityRepo::new(pool)),
            auth_service,
            email_service,
            payment_gateway,
            templates,
        }
    };

    promote_bootstrap_admin(&state).await?;
    Ok(state)
}

/// Grants ADMIN to the student named by `BOOTSTRAP_ADMIN_PRN`, if they have registered.
async fn promote_bootstrap_admin(state: &AppState) -> anyhow::Result<()> {
    let Some(prn) = state.config.bootstrap_admin_prn.as_deref() else {
        return Ok(());
    };
    let prn = normalize_prn(prn);
    match state.student_repo.find_by_prn(&prn).await? {
        Some(student) if student.is_admin() => {}
        Some(student) => {
            state.student_repo.set_role(&student.id, ROLE_ADMIN).await?;
            info!(prn = %prn, "Promoted bootstrap admin");
        }
        None => warn!(prn = %prn, "BOOTSTRAP_ADMIN_PRN does not match any student yet"),
    }
    Ok(())
}
