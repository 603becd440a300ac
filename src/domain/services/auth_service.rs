use crate::config::Config;
use crate::domain::models::auth::{Claims, SESSION_AUDIENCE, SESSION_ISSUER};
use crate::domain::models::student::Student;
use crate::error::AppError;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::{distributions::Alphanumeric, Rng};
use sha2::{Digest, Sha256};

/// Length of the random tokens mailed out for verification and password reset.
pub const EMAIL_TOKEN_LEN: usize = 48;
const CSRF_TOKEN_LEN: usize = 32;

pub struct AuthService {
    session_ttl_hours: i64,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AuthService {
    pub fn new(config: &Config) -> Self {
        Self {
            session_ttl_hours: config.session_ttl_hours,
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        }
    }

    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut rand::rngs::OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::InternalWithMsg(format!("Password hashing failed: {}", e)))
    }

    pub fn verify_password(&self, password: &str, password_hash: &str) -> bool {
        match PasswordHash::new(password_hash) {
            Ok(parsed) => Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok(),
            Err(_) => false,
        }
    }

    /// Signs a session for the student. Returns the JWT and the CSRF token embedded in it.
    pub fn issue_session(&self, student: &Student) -> Result<(String, String), AppError> {
        let csrf = random_token(CSRF_TOKEN_LEN);
        let now = Utc::now();

        let claims = Claims {
            iss: SESSION_ISSUER.to_string(),
            sub: student.id.clone(),
            aud: SESSION_AUDIENCE.to_string(),
            exp: (now + Duration::hours(self.session_ttl_hours)).timestamp() as usize,
            iat: now.timestamp() as usize,
            role: student.role.clone(),
            csrf: csrf.clone(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("JWT encoding failed: {}", e);
            AppError::Internal
        })?;

        Ok((token, csrf))
    }

    /// `None` for tampered, expired or foreign tokens.
    pub fn decode_session(&self, token: &str) -> Option<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[SESSION_AUDIENCE]);
        validation.set_issuer(&[SESSION_ISSUER]);
        decode::<Claims>(token, &self.decoding_key, &validation).ok().map(|data| data.claims)
    }

    pub fn generate_email_token(&self) -> String {
        random_token(EMAIL_TOKEN_LEN)
    }

    pub fn hash_token(&self, token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }
}

pub fn random_token(len: usize) -> String {
    rand::thread_rng().sample_iter(&Alphanumeric).take(len).map(char::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::student::NewStudentParams;

    fn config() -> Config {
        Config {
            database_url: "sqlite::memory:".into(),
            port: 0,
            base_url: "http://localhost:3000".into(),
            timezone: chrono_tz::Asia::Kolkata,
            jwt_secret: "unit-test-secret".into(),
            session_ttl_hours: 12,
            mail_service_url: "http://localhost".into(),
            mail_service_token: String::new(),
            contact_inbox: "club@example.edu".into(),
            upload_dir: "./uploads".into(),
            razorpay_key_id: String::new(),
            razorpay_key_secret: String::new(),
            ical_uid_domain: "spark-club.local".into(),
            bootstrap_admin_prn: None,
        }
    }

    fn student() -> Student {
        Student::new(NewStudentParams {
            first_name: "Kiran".into(),
            middle_name: None,
            last_name: "Rao".into(),
            prn: "PRN123456".into(),
            email: "kiran@example.edu".into(),
            contact_number: "9999999999".into(),
            department: "IT".into(),
            year_of_study: 3,
            password_hash: String::new(),
            verification_token_hash: String::new(),
        })
    }

    #[test]
    fn passwords_verify_against_their_hash() {
        let service = AuthService::new(&config());
        let hash = service.hash_password("correct horse").unwrap();
        assert!(service.verify_password("correct horse", &hash));
        assert!(!service.verify_password("wrong horse", &hash));
        assert!(!service.verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn sessions_round_trip_and_reject_other_secrets() {
        let service = AuthService::new(&config());
        let s = student();
        let (token, csrf) = service.issue_session(&s).unwrap();
        let claims = service.decode_session(&token).unwrap();
        assert_eq!(claims.sub, s.id);
        assert_eq!(claims.csrf, csrf);
        assert_eq!(claims.role, "STUDENT");

        let mut other = config();
        other.jwt_secret = "different".into();
        assert!(AuthService::new(&other).decode_session(&token).is_none());
    }

    #[test]
    fn token_hash_is_hex_sha256() {
        let service = AuthService::new(&config());
        let token = service.generate_email_token();
        assert_eq!(token.len(), EMAIL_TOKEN_LEN);
        let hash = service.hash_token(&token);
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, service.hash_token(&token));
    }
}
