use serde::{Deserialize, Serialize};
use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;
use rand::Rng;

const CERT_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Certificate {
    pub id: String,
    pub event_id: String,
    pub student_id: String,
    pub certificate_id: String,
    pub issue_date: DateTime<Utc>,
    pub verification_link: String,
}

impl Certificate {
    pub fn issue(event_id: &str, student_id: &str, base_url: &str) -> Self {
        let now = Utc::now();
        let certificate_id = generate_certificate_id(now.year());
        Self {
            id: Uuid::new_v4().to_string(),
            event_id: event_id.to_string(),
            student_id: student_id.to_string(),
            verification_link: format!("{}/certificates/verify/{}", base_url, certificate_id),
            certificate_id,
            issue_date: now,
        }
    }
}

/// `SPARK-<year>-<8 uppercase alphanumerics>`
pub fn generate_certificate_id(year: i32) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..8)
        .map(|_| CERT_ALPHABET[rng.gen_range(0..CERT_ALPHABET.len())] as char)
        .collect();
    format!("SPARK-{}-{}", year, suffix)
}

#[derive(Debug, Serialize, FromRow, Clone)]
pub struct CertificateWithEvent {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub certificate: Certificate,
    pub event_title: String,
    pub event_date: NaiveDateTime,
}

/// Everything the public verification page shows.
#[derive(Debug, Serialize, FromRow, Clone)]
pub struct CertificateDetails {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub certificate: Certificate,
    pub event_title: String,
    pub event_date: NaiveDateTime,
    pub first_name: String,
    pub last_name: String,
    pub prn: String,
}
