use chrono_tz::Tz;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub base_url: String,
    pub timezone: Tz,
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
    pub mail_service_url: String,
    pub mail_service_token: String,
    pub contact_inbox: String,
    pub upload_dir: String,
    pub razorpay_key_id: String,
    pub razorpay_key_secret: String,
    pub ical_uid_domain: String,
    pub bootstrap_admin_prn: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://spark.db?mode=rwc".to_string()),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            base_url: env::var("APP_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string())
                .trim_end_matches('/')
                .to_string(),
            timezone: env::var("APP_TIMEZONE")
                .unwrap_or_else(|_| "Asia/Kolkata".to_string())
                .parse()
                .expect("APP_TIMEZONE must be a valid IANA timezone"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            session_ttl_hours: env::var("SESSION_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(12),
            mail_service_url: env::var("MAIL_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8000/api/v1/send".to_string()),
            mail_service_token: env::var("MAIL_SERVICE_TOKEN").unwrap_or_default(),
            contact_inbox: env::var("CONTACT_INBOX").unwrap_or_else(|_| "spark.club@example.edu".to_string()),
            upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string()),
            razorpay_key_id: env::var("RAZORPAY_KEY_ID").unwrap_or_default(),
            razorpay_key_secret: env::var("RAZORPAY_KEY_SECRET").unwrap_or_default(),
            ical_uid_domain: env::var("ICAL_UID_DOMAIN").unwrap_or_else(|_| "spark-club.local".to_string()),
            bootstrap_admin_prn: env::var("BOOTSTRAP_ADMIN_PRN").ok().filter(|v| !v.trim().is_empty()),
        }
    }
}
