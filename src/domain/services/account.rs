use crate::domain::models::activity::{ActivityLog, ACTION_PROFILE_UPDATED};
use crate::domain::models::student::{NewStudentParams, Student};
use crate::domain::services::notifications::send_email;
use crate::domain::services::uploads::{remove_upload, store_image};
use crate::domain::services::validation::{
    normalize_email, validate_new_password, validate_profile, validate_registration, ProfileInput, RegistrationInput,
};
use crate::error::AppError;
use crate::state::AppState;
use chrono::{Duration, Utc};
use tera::Context;
use tracing::{info, warn};

pub const DUPLICATE_STUDENT: &str = "A student with this PRN or email already exists";
pub const INVALID_CREDENTIALS: &str = "Invalid email/PRN or password";
pub const EMAIL_NOT_VERIFIED: &str = "Please verify your email address before logging in";
pub const INVALID_VERIFICATION_LINK: &str = "Invalid or expired verification link";
pub const INVALID_RESET_LINK: &str = "Invalid or expired reset link";
pub const WRONG_CURRENT_PASSWORD: &str = "Current password is incorrect";

const RESET_WINDOW_HOURS: i64 = 1;

pub async fn register_student(state: &AppState, input: &RegistrationInput<'_>) -> Result<Student, AppError> {
    let valid = validate_registration(input)?;

    if state.student_repo.exists_by_prn_or_email(&valid.prn, &valid.email).await? {
        warn!(prn = %valid.prn, "Registration rejected: duplicate PRN or email");
        return Err(AppError::Conflict(DUPLICATE_STUDENT.into()));
    }

    let token = state.auth_service.generate_email_token();
    let student = Student::new(NewStudentParams {
        first_name: valid.profile.first_name,
        middle_name: valid.profile.middle_name,
        last_name: valid.profile.last_name,
        prn: valid.prn,
        email: valid.email,
        contact_number: valid.profile.contact_number,
        department: valid.profile.department,
        year_of_study: valid.profile.year_of_study,
        password_hash: state.auth_service.hash_password(input.password)?,
        verification_token_hash: state.auth_service.hash_token(&token),
    });

    let created = state.student_repo.create(&student).await?;
    info!(student_id = %created.id, prn = %created.prn, "Student registered");

    send_verification_email(state, &created, &token).await;
    Ok(created)
}

async fn send_verification_email(state: &AppState, student: &Student, token: &str) {
    let mut ctx = Context::new();
    ctx.insert("name", &student.first_name);
    ctx.insert("link", &format!("{}/verify?token={}", state.config.base_url, token));
    send_email(state, &student.email, "Verify your SPARK account", "emails/verify_email.html", &ctx, None).await;
}

pub async fn verify_email(state: &AppState, token: &str) -> Result<Student, AppError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(AppError::Validation(INVALID_VERIFICATION_LINK.into()));
    }
    let student = state
        .student_repo
        .find_by_verification_hash(&state.auth_service.hash_token(token))
        .await?
        .ok_or_else(|| AppError::Validation(INVALID_VERIFICATION_LINK.into()))?;

    state.student_repo.mark_verified(&student.id).await?;
    info!(student_id = %student.id, "Email verified");
    Ok(student)
}

/// Succeeds whether or not the account exists.
pub async fn resend_verification(state: &AppState, email: &str) -> Result<(), AppError> {
    let Some(student) = state.student_repo.find_by_identifier(&normalize_email(email)).await? else {
        return Ok(());
    };
    if student.email_verified {
        return Ok(());
    }
    let token = state.auth_service.generate_email_token();
    state.student_repo.set_verification_token(&student.id, &state.auth_service.hash_token(&token)).await?;
    send_verification_email(state, &student, &token).await;
    Ok(())
}

/// Checks credentials for an email or PRN. The password is checked before the
/// verification state.
pub async fn authenticate(state: &AppState, identifier: &str, password: &str) -> Result<Student, AppError> {
    let identifier = identifier.trim();
    if identifier.is_empty() || password.is_empty() {
        return Err(AppError::Validation(INVALID_CREDENTIALS.into()));
    }

    let student = match state.student_repo.find_by_identifier(identifier).await? {
        Some(s) => s,
        None => {
            warn!("Login failed: unknown identifier");
            return Err(AppError::Validation(INVALID_CREDENTIALS.into()));
        }
    };

    if !state.auth_service.verify_password(password, &student.password_hash) {
        warn!(student_id = %student.id, "Login failed: wrong password");
        return Err(AppError::Validation(INVALID_CREDENTIALS.into()));
    }

    if !student.email_verified {
        warn!(student_id = %student.id, "Login refused: email not verified");
        return Err(AppError::Forbidden(EMAIL_NOT_VERIFIED.into()));
    }

    info!(student_id = %student.id, role = %student.role, "Student logged in");
    Ok(student)
}

/// Issues a reset link for verified accounts. The caller shows the same message either way.
pub async fn forgot_password(state: &AppState, email: &str) -> Result<(), AppError> {
    let Some(student) = state.student_repo.find_by_identifier(&normalize_email(email)).await? else {
        return Ok(());
    };
    if !student.email_verified {
        return Ok(());
    }

    let token = state.auth_service.generate_email_token();
    let expires_at = Utc::now() + Duration::hours(RESET_WINDOW_HOURS);
    state
        .student_repo
        .set_reset_token(&student.id, &state.auth_service.hash_token(&token), expires_at)
        .await?;
    info!(student_id = %student.id, "Password reset requested");

    let mut ctx = Context::new();
    ctx.insert("name", &student.first_name);
    ctx.insert("link", &format!("{}/reset-password?token={}", state.config.base_url, token));
    send_email(state, &student.email, "Reset your SPARK password", "emails/reset_password.html", &ctx, None).await;
    Ok(())
}

/// Returns the account a still-valid reset token belongs to.
pub async fn check_reset_token(state: &AppState, token: &str) -> Result<Student, AppError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(AppError::Validation(INVALID_RESET_LINK.into()));
    }
    state
        .student_repo
        .find_by_reset_hash(&state.auth_service.hash_token(token), Utc::now())
        .await?
        .ok_or_else(|| AppError::Validation(INVALID_RESET_LINK.into()))
}

pub async fn reset_password(state: &AppState, token: &str, password: &str, confirm: &str) -> Result<(), AppError> {
    let student = check_reset_token(state, token).await?;
    validate_new_password(password, confirm)?;
    let hash = state.auth_service.hash_password(password)?;
    state.student_repo.update_password(&student.id, &hash).await?;
    info!(student_id = %student.id, "Password reset completed");
    Ok(())
}

pub async fn change_password(state: &AppState, student: &Student, current: &str, password: &str, confirm: &str) -> Result<(), AppError> {
    if !state.auth_service.verify_password(current, &student.password_hash) {
        warn!(student_id = %student.id, "Password change refused: wrong current password");
        return Err(AppError::Validation(WRONG_CURRENT_PASSWORD.into()));
    }
    validate_new_password(password, confirm)?;
    let hash = state.auth_service.hash_password(password)?;
    state.student_repo.update_password(&student.id, &hash).await?;
    info!(student_id = %student.id, "Password changed");
    Ok(())
}

pub async fn update_profile(state: &AppState, student: &Student, input: &ProfileInput<'_>) -> Result<Student, AppError> {
    let profile = validate_profile(input)?;
    let updated = state.student_repo.update_profile(&student.id, &profile).await?;
    state
        .activity_repo
        .record(&ActivityLog::new(&student.id, ACTION_PROFILE_UPDATED, "Updated profile details"))
        .await?;
    info!(student_id = %student.id, "Profile updated");
    Ok(updated)
}

/// Stores the new picture, points the row at it, then removes the previous file.
pub async fn update_profile_image(state: &AppState, student: &Student, bytes: &[u8]) -> Result<String, AppError> {
    let path = store_image(&state.config.upload_dir, "profiles", bytes).await?;
    if let Err(e) = state.student_repo.update_profile_image(&student.id, &path).await {
        remove_upload(&state.config.upload_dir, &path).await;
        return Err(e);
    }
    if let Some(previous) = &student.profile_image {
        remove_upload(&state.config.upload_dir, previous).await;
    }
    info!(student_id = %student.id, "Profile image updated");
    Ok(path)
}
