use crate::domain::models::student::ProfileUpdate;
use crate::error::AppError;
use lazy_static::lazy_static;
use regex::Regex;

pub const MIN_PASSWORD_LEN: usize = 8;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    static ref PRN_RE: Regex = Regex::new(r"^[A-Z0-9]{6,20}$").unwrap();
    static ref CONTACT_RE: Regex = Regex::new(r"^[0-9]{10}$").unwrap();
}

/// Trims a query/form value and drops it when nothing is left.
pub fn normalize(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn normalize_prn(prn: &str) -> String {
    prn.trim().to_uppercase()
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_valid_prn(prn: &str) -> bool {
    PRN_RE.is_match(prn)
}

pub fn is_valid_contact(contact: &str) -> bool {
    CONTACT_RE.is_match(contact)
}

pub fn check_new_password(password: &str, confirm: &str, errors: &mut Vec<String>) {
    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(format!("Password must be at least {} characters", MIN_PASSWORD_LEN));
    }
    if password != confirm {
        errors.push("Passwords do not match".to_string());
    }
}

pub fn validate_new_password(password: &str, confirm: &str) -> Result<(), AppError> {
    let mut errors = Vec::new();
    check_new_password(password, confirm, &mut errors);
    into_result(errors)
}

#[derive(Debug, Clone, Copy)]
pub struct ProfileInput<'a> {
    pub first_name: &'a str,
    pub middle_name: &'a str,
    pub last_name: &'a str,
    pub contact_number: &'a str,
    pub department: &'a str,
    pub year_of_study: &'a str,
}

pub(crate) fn require(value: &str, label: &str, errors: &mut Vec<String>) -> bool {
    if value.trim().is_empty() {
        errors.push(format!("{} is required", label));
        false
    } else {
        true
    }
}

/// Appends every problem to `errors`; returns the cleaned profile only when the input is valid.
pub fn check_profile(input: &ProfileInput<'_>, errors: &mut Vec<String>) -> Option<ProfileUpdate> {
    let before = errors.len();

    require(input.first_name, "First name", errors);
    require(input.last_name, "Last name", errors);
    require(input.department, "Department", errors);

    let contact = input.contact_number.trim();
    if require(contact, "Contact number", errors) && !is_valid_contact(contact) {
        errors.push("Contact number must be exactly 10 digits".to_string());
    }

    let mut year = None;
    if require(input.year_of_study, "Year of study", errors) {
        match input.year_of_study.trim().parse::<i32>() {
            Ok(y) if (1..=5).contains(&y) => year = Some(y),
            _ => errors.push("Year of study must be between 1 and 5".to_string()),
        }
    }

    if errors.len() > before {
        return None;
    }

    Some(ProfileUpdate {
        first_name: input.first_name.trim().to_string(),
        middle_name: Some(input.middle_name.trim().to_string()).filter(|m| !m.is_empty()),
        last_name: input.last_name.trim().to_string(),
        contact_number: contact.to_string(),
        department: input.department.trim().to_string(),
        year_of_study: year?,
    })
}

pub fn validate_profile(input: &ProfileInput<'_>) -> Result<ProfileUpdate, AppError> {
    let mut errors = Vec::new();
    match check_profile(input, &mut errors) {
        Some(profile) if errors.is_empty() => Ok(profile),
        _ => Err(AppError::ValidationErrors(errors)),
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RegistrationInput<'a> {
    pub profile: ProfileInput<'a>,
    pub prn: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub confirm_password: &'a str,
}

#[derive(Debug, Clone)]
pub struct ValidRegistration {
    pub profile: ProfileUpdate,
    pub prn: String,
    pub email: String,
}

/// Collects every error before failing so the form can show them together.
pub fn validate_registration(input: &RegistrationInput<'_>) -> Result<ValidRegistration, AppError> {
    let mut errors = Vec::new();

    let profile = check_profile(&input.profile, &mut errors);

    let prn = normalize_prn(input.prn);
    if require(&prn, "PRN", &mut errors) && !is_valid_prn(&prn) {
        errors.push("PRN must be 6-20 letters or digits".to_string());
    }

    let email = normalize_email(input.email);
    if require(&email, "Email", &mut errors) && !is_valid_email(&email) {
        errors.push("Invalid email address".to_string());
    }

    if require(input.password, "Password", &mut errors) {
        check_new_password(input.password, input.confirm_password, &mut errors);
    }

    match profile {
        Some(profile) if errors.is_empty() => Ok(ValidRegistration { profile, prn, email }),
        _ => Err(AppError::ValidationErrors(errors)),
    }
}

fn check_length(value: &str, label: &str, min: usize, max: usize, errors: &mut Vec<String>) {
    let len = value.chars().count();
    if len < min || len > max {
        errors.push(format!("{} must be between {} and {} characters", label, min, max));
    }
}

pub fn validate_contact(name: &str, email: &str, subject: &str, message: &str) -> Result<(), AppError> {
    let mut errors = Vec::new();
    check_length(name.trim(), "Name", 2, 100, &mut errors);
    if !is_valid_email(&normalize_email(email)) {
        errors.push("Invalid email address".to_string());
    }
    check_length(subject.trim(), "Subject", 3, 200, &mut errors);
    check_length(message.trim(), "Message", 10, 5000, &mut errors);
    into_result(errors)
}

pub(crate) fn into_result(errors: Vec<String>) -> Result<(), AppError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::ValidationErrors(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile<'a>() -> ProfileInput<'a> {
        ProfileInput {
            first_name: "Asha",
            middle_name: "",
            last_name: "Patil",
            contact_number: "9876543210",
            department: "Computer Engineering",
            year_of_study: "2",
        }
    }

    fn registration<'a>() -> RegistrationInput<'a> {
        RegistrationInput {
            profile: profile(),
            prn: " prn2024cs01 ",
            email: " Asha.Patil@College.EDU ",
            password: "supersecret",
            confirm_password: "supersecret",
        }
    }

    fn messages(err: AppError) -> Vec<String> {
        err.user_messages()
    }

    #[test]
    fn registration_normalizes_identity_fields() {
        let valid = validate_registration(&registration()).unwrap();
        assert_eq!(valid.prn, "PRN2024CS01");
        assert_eq!(valid.email, "asha.patil@college.edu");
        assert_eq!(valid.profile.year_of_study, 2);
        assert!(valid.profile.middle_name.is_none());
    }

    #[test]
    fn registration_collects_all_errors() {
        let mut input = registration();
        input.prn = "AB-1";
        input.email = "not-an-email";
        input.profile.contact_number = "12345";
        input.profile.year_of_study = "9";
        input.confirm_password = "different";

        let errors = messages(validate_registration(&input).unwrap_err());
        assert!(errors.contains(&"PRN must be 6-20 letters or digits".to_string()));
        assert!(errors.contains(&"Invalid email address".to_string()));
        assert!(errors.contains(&"Contact number must be exactly 10 digits".to_string()));
        assert!(errors.contains(&"Year of study must be between 1 and 5".to_string()));
        assert!(errors.contains(&"Passwords do not match".to_string()));
    }

    #[test]
    fn missing_fields_are_reported_as_required() {
        let mut input = registration();
        input.profile.first_name = "  ";
        input.password = "";
        let errors = messages(validate_registration(&input).unwrap_err());
        assert!(errors.contains(&"First name is required".to_string()));
        assert!(errors.contains(&"Password is required".to_string()));
    }

    #[test]
    fn short_passwords_are_rejected() {
        let errors = messages(validate_new_password("short", "short").unwrap_err());
        assert_eq!(errors, vec!["Password must be at least 8 characters".to_string()]);
        assert!(validate_new_password("longenough", "longenough").is_ok());
    }

    #[test]
    fn contact_form_bounds() {
        assert!(validate_contact("Ravi", "ravi@example.com", "Workshop", "When is the next workshop?").is_ok());
        let errors = messages(validate_contact("R", "ravi", "Hi", "short").unwrap_err());
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn empty_filters_normalize_to_none() {
        assert_eq!(normalize(Some("   ".into())), None);
        assert_eq!(normalize(None), None);
        assert_eq!(normalize(Some(" Workshop ".into())), Some("Workshop".into()));
    }
}
