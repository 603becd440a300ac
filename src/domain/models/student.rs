use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

pub const ROLE_STUDENT: &str = "STUDENT";
pub const ROLE_ADMIN: &str = "ADMIN";

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Student {
    pub id: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub prn: String,
    pub email: String,
    pub contact_number: String,
    pub department: String,
    pub year_of_study: i32,
    pub role: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub profile_image: Option<String>,
    pub email_verified: bool,
    #[serde(skip_serializing, default)]
    pub verification_token_hash: Option<String>,
    #[serde(skip_serializing, default)]
    pub reset_token_hash: Option<String>,
    #[serde(skip_serializing, default)]
    pub reset_token_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lifecycle of an account, derived from the stored row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountState {
    Unverified,
    Active,
    PasswordResetPending,
}

pub struct NewStudentParams {
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub prn: String,
    pub email: String,
    pub contact_number: String,
    pub department: String,
    pub year_of_study: i32,
    pub password_hash: String,
    pub verification_token_hash: String,
}

/// Editable profile fields; identity fields (PRN, email) are fixed after registration.
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub contact_number: String,
    pub department: String,
    pub year_of_study: i32,
}

impl Student {
    pub fn new(params: NewStudentParams) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            first_name: params.first_name,
            middle_name: params.middle_name,
            last_name: params.last_name,
            prn: params.prn,
            email: params.email,
            contact_number: params.contact_number,
            department: params.department,
            year_of_study: params.year_of_study,
            role: ROLE_STUDENT.to_string(),
            password_hash: params.password_hash,
            profile_image: None,
            email_verified: false,
            verification_token_hash: Some(params.verification_token_hash),
            reset_token_hash: None,
            reset_token_expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn full_name(&self) -> String {
        match &self.middle_name {
            Some(middle) if !middle.is_empty() => format!("{} {} {}", self.first_name, middle, self.last_name),
            _ => format!("{} {}", self.first_name, self.last_name),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }

    pub fn account_state(&self, now: DateTime<Utc>) -> AccountState {
        if !self.email_verified {
            return AccountState::Unverified;
        }
        match (&self.reset_token_hash, self.reset_token_expires_at) {
            (Some(_), Some(expires_at)) if expires_at > now => AccountState::PasswordResetPending,
            _ => AccountState::Active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn student() -> Student {
        Student::new(NewStudentParams {
            first_name: "Asha".into(),
            middle_name: None,
            last_name: "Patil".into(),
            prn: "PRN2024CS001".into(),
            email: "a@b.edu".into(),
            contact_number: "9876543210".into(),
            department: "Computer".into(),
            year_of_study: 2,
            password_hash: "hash".into(),
            verification_token_hash: "token-hash".into(),
        })
    }

    #[test]
    fn new_accounts_start_unverified() {
        let s = student();
        assert_eq!(s.role, ROLE_STUDENT);
        assert_eq!(s.account_state(Utc::now()), AccountState::Unverified);
    }

    #[test]
    fn reset_pending_only_until_expiry() {
        let mut s = student();
        s.email_verified = true;
        assert_eq!(s.account_state(Utc::now()), AccountState::Active);

        s.reset_token_hash = Some("h".into());
        s.reset_token_expires_at = Some(Utc::now() + Duration::hours(1));
        assert_eq!(s.account_state(Utc::now()), AccountState::PasswordResetPending);
        assert_eq!(s.account_state(Utc::now() + Duration::hours(2)), AccountState::Active);
    }

    #[test]
    fn full_name_includes_middle_name_when_present() {
        let mut s = student();
        assert_eq!(s.full_name(), "Asha Patil");
        s.middle_name = Some("R".into());
        assert_eq!(s.full_name(), "Asha R Patil");
    }
}
