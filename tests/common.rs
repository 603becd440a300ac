use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{Duration, NaiveDateTime, Utc};
use serde_json::Value;
use spark_portal::{
    api::{extractors::session::CSRF_COOKIE, flash::{Flash, FLASH_COOKIE}, router::create_router},
    config::Config,
    domain::{
        models::{
            event::{Event, EventDraft},
            student::{NewStudentParams, Student, ROLE_ADMIN},
        },
        ports::{EmailService, PaymentGateway, PaymentOrder},
        services::auth_service::AuthService,
    },
    error::AppError,
    infra::{
        payment::razorpay::signature_matches,
        repositories::{
            sqlite_activity_repo::SqliteActivityRepo, sqlite_attendance_repo::SqliteAttendanceRepo,
            sqlite_certificate_repo::SqliteCertificateRepo, sqlite_contact_repo::SqliteContactRepo,
            sqlite_event_repo::SqliteEventRepo, sqlite_gallery_repo::SqliteGalleryRepo,
            sqlite_opportunity_repo::SqliteOpportunityRepo, sqlite_registration_repo::SqliteRegistrationRepo,
            sqlite_research_repo::SqliteResearchRepo, sqlite_student_repo::SqliteStudentRepo,
            sqlite_team_repo::SqliteTeamRepo,
        },
        templates::load_templates,
    },
    state::AppState,
};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Sqlite};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use uuid::Uuid;

pub const PASSWORD: &str = "Password123";
pub const PAYMENT_SECRET: &str = "test_payment_secret";
pub const CONTACT_INBOX: &str = "club@example.edu";

#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct SentEmail {
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub attachment_name: Option<String>,
}

#[derive(Default)]
pub struct MockEmailService {
    pub sent: Mutex<Vec<SentEmail>>,
    /// When set, every send is refused like an unreachable relay.
    pub fail: AtomicBool,
}

#[async_trait]
impl EmailService for MockEmailService {
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        html_body: &str,
        attachment_name: Option<&str>,
        _attachment_data: Option<&[u8]>
    ) -> Result<(), AppError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::InternalWithMsg(format!("relay refused mail to {}", recipient)));
        }
        self.sent.lock().unwrap().push(SentEmail {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            body: html_body.to_string(),
            attachment_name: attachment_name.map(str::to_string),
        });
        Ok(())
    }
}

pub struct MockPaymentGateway;

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    fn key_id(&self) -> String {
        "rzp_test_key".to_string()
    }

    async fn create_order(&self, amount: i64, currency: &str, _receipt: &str) -> Result<PaymentOrder, AppError> {
        Ok(PaymentOrder {
            id: format!("order_{}", Uuid::new_v4().simple()),
            amount,
            currency: currency.to_string(),
        })
    }

    fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        signature_matches(PAYMENT_SECRET, order_id, payment_id, signature)
    }
}

/// Status, redirect target, cookies set and body of one response.
#[allow(dead_code)]
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub content_type: Option<String>,
    pub set_cookies: Vec<String>,
    pub body: String,
}

#[allow(dead_code)]
impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or_else(|e| panic!("not JSON ({}): {}", e, self.body))
    }

    pub fn flash(&self) -> Flash {
        self.cookie(FLASH_COOKIE)
            .and_then(|raw| Flash::decode(&raw))
            .unwrap_or_default()
    }

    pub fn cookie(&self, name: &str) -> Option<String> {
        let prefix = format!("{}=", name);
        self.set_cookies
            .iter()
            .find(|c| c.starts_with(&prefix))
            .map(|c| c[prefix.len()..].split(';').next().unwrap_or_default().to_string())
    }

    pub fn assert_redirect(&self, to: &str) {
        assert_eq!(self.status, StatusCode::SEE_OTHER, "body: {}", self.body);
        assert_eq!(self.location.as_deref(), Some(to));
    }
}

/// A cookie-carrying client, so tests read like a browser session.
#[derive(Clone)]
pub struct Browser {
    router: Router,
    cookies: HashMap<String, String>,
}

#[allow(dead_code)]
impl Browser {
    pub fn csrf(&self) -> Option<&str> {
        self.cookies.get(CSRF_COOKIE).map(String::as_str)
    }

    pub fn has_cookie(&self, name: &str) -> bool {
        self.cookies.contains_key(name)
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let request = self.builder("GET", uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let request = self
            .builder("POST", uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(encode_form(fields)))
            .unwrap();
        self.send(request).await
    }

    /// Posts JSON with the session's CSRF header, as the inline scripts do.
    pub async fn post_json(&mut self, uri: &str, payload: Value) -> TestResponse {
        let mut builder = self.builder("POST", uri).header(header::CONTENT_TYPE, "application/json");
        if let Some(csrf) = self.csrf() {
            builder = builder.header("X-CSRF-Token", csrf.to_string());
        }
        let request = builder.body(Body::from(payload.to_string())).unwrap();
        self.send(request).await
    }

    pub async fn post_json_without_csrf(&mut self, uri: &str, payload: Value) -> TestResponse {
        let request = self
            .builder("POST", uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn post_raw(&mut self, uri: &str, content_type: &str, body: Vec<u8>) -> TestResponse {
        let request = self
            .builder("POST", uri)
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    fn builder(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        let mut builder = Request::builder().method(method).uri(uri);
        if !self.cookies.is_empty() {
            let jar = self
                .cookies
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("; ");
            builder = builder.header(header::COOKIE, jar);
        }
        builder
    }

    async fn send(&mut self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let set_cookies: Vec<String> = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|h| h.to_str().unwrap().to_string())
            .collect();

        for raw in &set_cookies {
            let pair = raw.split(';').next().unwrap_or_default();
            let Some((name, value)) = pair.split_once('=') else { continue };
            if value.is_empty() || raw.contains("Max-Age=0") {
                self.cookies.remove(name);
            } else {
                self.cookies.insert(name.to_string(), value.to_string());
            }
        }

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        TestResponse {
            status,
            location,
            content_type,
            set_cookies,
            body: String::from_utf8_lossy(&bytes).to_string(),
        }
    }
}

pub fn encode_form(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", urlencode(k), urlencode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn urlencode(value: &str) -> String {
    let mut out = String::new();
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => out.push(byte as char),
            b' ' => out.push('+'),
            other => out.push_str(&format!("%{:02X}", other)),
        }
    }
    out
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub upload_dir: String,
    pub state: Arc<AppState>,
    pub email: Arc<MockEmailService>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        let id = Uuid::new_v4();
        let db_filename = format!("test_{}.db", id);
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);
        let upload_dir = format!("test_uploads_{}", id);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            base_url: "http://localhost:3000".to_string(),
            timezone: chrono_tz::Asia::Kolkata,
            jwt_secret: "integration-test-secret".to_string(),
            session_ttl_hours: 12,
            mail_service_url: "http://localhost".to_string(),
            mail_service_token: "token".to_string(),
            contact_inbox: CONTACT_INBOX.to_string(),
            upload_dir: upload_dir.clone(),
            razorpay_key_id: "rzp_test_key".to_string(),
            razorpay_key_secret: PAYMENT_SECRET.to_string(),
            ical_uid_domain: "spark-club.test".to_string(),
            bootstrap_admin_prn: None,
        };

        let email = Arc::new(MockEmailService::default());
        let templates = Arc::new(load_templates(config.timezone).expect("templates load"));

        let state = Arc::new(AppState {
            auth_service: Arc::new(AuthService::new(&config)),
            config,
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
            activity_repo: Arc::new(SqliteActivityRepo::new(pool.clone())),
            email_service: email.clone(),
            payment_gateway: Arc::new(MockPaymentGateway),
            templates,
        });

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            upload_dir,
            state,
            email,
        }
    }

    pub fn browser(&self) -> Browser {
        Browser { router: self.router.clone(), cookies: HashMap::new() }
    }

    pub fn sent_emails(&self) -> Vec<SentEmail> {
        self.email.sent.lock().unwrap().clone()
    }

    #[allow(dead_code)]
    pub fn fail_emails(&self) {
        self.email.fail.store(true, Ordering::SeqCst);
    }

    /// Inserts a verified student with [`PASSWORD`].
    pub async fn create_student(&self, prn: &str, email: &str) -> Student {
        let student = Student::new(NewStudentParams {
            first_name: "Asha".to_string(),
            middle_name: None,
            last_name: "Patil".to_string(),
            prn: prn.to_string(),
            email: email.to_string(),
            contact_number: "9876543210".to_string(),
            department: "Computer Engineering".to_string(),
            year_of_study: 2,
            password_hash: self.state.auth_service.hash_password(PASSWORD).unwrap(),
            verification_token_hash: self.state.auth_service.hash_token(&Uuid::new_v4().to_string()),
        });
        let student = self.state.student_repo.create(&student).await.unwrap();
        self.state.student_repo.mark_verified(&student.id).await.unwrap();
        student
    }

    pub async fn create_admin(&self, prn: &str, email: &str) -> Student {
        let admin = self.create_student(prn, email).await;
        self.state.student_repo.set_role(&admin.id, ROLE_ADMIN).await.unwrap();
        admin
    }

    /// A browser holding a fresh session for `identifier`.
    pub async fn login(&self, identifier: &str) -> Browser {
        let mut browser = self.browser();
        let res = browser
            .post_form("/login", &[("identifier", identifier), ("password", PASSWORD)])
            .await;
        assert_eq!(res.status, StatusCode::SEE_OTHER, "login failed for {}: {}", identifier, res.body);
        assert!(browser.csrf().is_some(), "no CSRF cookie after login");
        browser
    }

    pub async fn create_event(&self, title: &str, starts_in: Duration, fee: f64, capacity: Option<i32>) -> Event {
        self.create_event_at(title, local_now() + starts_in, fee, capacity, "Workshop").await
    }

    pub async fn create_event_at(
        &self,
        title: &str,
        event_date: NaiveDateTime,
        fee: f64,
        capacity: Option<i32>,
        category: &str,
    ) -> Event {
        let event = Event::new(EventDraft {
            title: title.to_string(),
            description: format!("All about {}", title),
            event_date,
            location: "Seminar Hall".to_string(),
            fee,
            category: category.to_string(),
            capacity,
            manual_access_code: "ABC123".to_string(),
            banner_image: None,
            registration_deadline: None,
        });
        self.state.event_repo.create(&event).await.unwrap()
    }
}

/// Wall-clock time in the club's timezone, matching what the handlers compare against.
pub fn local_now() -> NaiveDateTime {
    Utc::now().with_timezone(&chrono_tz::Asia::Kolkata).naive_local()
}

/// Pulls the `token=` value out of an emailed link.
#[allow(dead_code)]
pub fn token_from(body: &str) -> String {
    let start = body.find("token=").expect("no token in email") + "token=".len();
    body[start..].chars().take_while(|c| c.is_ascii_alphanumeric()).collect()
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
        let _ = std::fs::remove_dir_all(&self.upload_dir);
    }
}
