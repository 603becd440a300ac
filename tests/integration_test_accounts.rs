mod common;

use axum::http::StatusCode;
use common::{token_from, TestApp, PASSWORD};
use spark_portal::api::extractors::session::SESSION_COOKIE;
use spark_portal::api::handlers::auth::{LOGGED_OUT, REGISTERED, REMEMBER_COOKIE, VERIFIED};
use spark_portal::domain::services::account::{DUPLICATE_STUDENT, EMAIL_NOT_VERIFIED, INVALID_VERIFICATION_LINK};

fn registration<'a>(prn: &'a str, email: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("first_name", "Meera"),
        ("middle_name", ""),
        ("last_name", "Kulkarni"),
        ("prn", prn),
        ("email", email),
        ("contact_number", "9123456780"),
        ("department", "Information Technology"),
        ("year_of_study", "3"),
        ("password", PASSWORD),
        ("confirm_password", PASSWORD),
    ]
}

#[tokio::test]
async fn test_register_verify_then_login() {
    let app = TestApp::new().await;
    let mut browser = app.browser();

    let res = browser.post_form("/register", &registration("prn2024001", "Meera@Example.edu")).await;
    res.assert_redirect("/login");
    assert_eq!(res.flash().success, vec![REGISTERED.to_string()]);

    let stored = app.state.student_repo.find_by_prn("PRN2024001").await.unwrap().expect("student stored");
    assert_eq!(stored.email, "meera@example.edu");
    assert!(!stored.email_verified);

    // Unverified accounts are refused even with the right password.
    let res = browser
        .post_form("/login", &[("identifier", "meera@example.edu"), ("password", PASSWORD)])
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert!(res.body.contains(EMAIL_NOT_VERIFIED));
    assert!(!browser.has_cookie(SESSION_COOKIE));

    let emails = app.sent_emails();
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].recipient, "meera@example.edu");
    let token = token_from(&emails[0].body);

    let res = browser.get(&format!("/verify?token={}", token)).await;
    res.assert_redirect("/login");
    assert_eq!(res.flash().success, vec![VERIFIED.to_string()]);

    // The token is single-use.
    let res = browser.get(&format!("/verify?token={}", token)).await;
    assert_eq!(res.flash().errors, vec![INVALID_VERIFICATION_LINK.to_string()]);

    // PRN works as an identifier too, in any case.
    let res = browser
        .post_form("/login", &[("identifier", "prn2024001"), ("password", PASSWORD)])
        .await;
    res.assert_redirect("/dashboard");
    assert!(browser.has_cookie(SESSION_COOKIE));

    let res = browser.get("/dashboard").await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("Welcome back, Meera!"));
}

#[tokio::test]
async fn test_duplicate_prn_or_email_is_rejected() {
    let app = TestApp::new().await;
    app.create_student("PRN2024002", "first@example.edu").await;
    let mut browser = app.browser();

    let res = browser.post_form("/register", &registration("prn2024002", "second@example.edu")).await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert!(res.body.contains(DUPLICATE_STUDENT));
    // The form keeps what was typed.
    assert!(res.body.contains("second@example.edu"));

    let res = browser.post_form("/register", &registration("PRN2024003", "FIRST@example.edu")).await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert!(app.state.student_repo.find_by_prn("PRN2024003").await.unwrap().is_none());
}

#[tokio::test]
async fn test_registration_survives_mail_failure() {
    let app = TestApp::new().await;
    app.fail_emails();
    let mut browser = app.browser();

    let res = browser.post_form("/register", &registration("PRN2024010", "offline@example.edu")).await;
    res.assert_redirect("/login");
    assert_eq!(res.flash().success, vec![REGISTERED.to_string()]);

    let stored = app.state.student_repo.find_by_prn("PRN2024010").await.unwrap().expect("student stored");
    assert!(!stored.email_verified);
    assert!(app.sent_emails().is_empty());
}

#[tokio::test]
async fn test_registration_reports_every_invalid_field() {
    let app = TestApp::new().await;
    let mut browser = app.browser();

    let mut fields = registration("AB", "not-an-email");
    fields.retain(|(k, _)| *k != "contact_number" && *k != "confirm_password");
    fields.push(("contact_number", "12345"));
    fields.push(("confirm_password", "Different123"));

    let res = browser.post_form("/register", &fields).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body.contains("PRN must be 6-20 letters or digits"));
    assert!(res.body.contains("Invalid email address"));
    assert!(res.body.contains("Contact number must be exactly 10 digits"));
    assert!(res.body.contains("Passwords do not match"));
    assert!(app.sent_emails().is_empty());
}

#[tokio::test]
async fn test_wrong_password_and_unknown_user_look_the_same() {
    let app = TestApp::new().await;
    app.create_student("PRN2024004", "asha@example.edu").await;
    let mut browser = app.browser();

    let wrong = browser
        .post_form("/login", &[("identifier", "asha@example.edu"), ("password", "nope-nope")])
        .await;
    let unknown = browser
        .post_form("/login", &[("identifier", "ghost@example.edu"), ("password", PASSWORD)])
        .await;

    assert_eq!(wrong.status, StatusCode::BAD_REQUEST);
    assert_eq!(unknown.status, StatusCode::BAD_REQUEST);
    assert!(wrong.body.contains("Invalid email"));
    assert!(unknown.body.contains("Invalid email"));
    assert!(!browser.has_cookie(SESSION_COOKIE));
}

#[tokio::test]
async fn test_remember_me_prefills_login_and_logout_clears_session() {
    let app = TestApp::new().await;
    app.create_student("PRN2024005", "remember@example.edu").await;
    let mut browser = app.browser();

    let res = browser
        .post_form(
            "/login",
            &[("identifier", "PRN2024005"), ("password", PASSWORD), ("remember", "on")],
        )
        .await;
    res.assert_redirect("/dashboard");
    assert_eq!(res.cookie(REMEMBER_COOKIE).as_deref(), Some("PRN2024005"));

    let res = browser.post_form("/logout", &[]).await;
    res.assert_redirect("/login");
    assert_eq!(res.flash().success, vec![LOGGED_OUT.to_string()]);
    assert!(!browser.has_cookie(SESSION_COOKIE));

    let res = browser.get("/login").await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("value=\"PRN2024005\""));

    // Student pages send visitors back to the login form.
    browser.get("/dashboard").await.assert_redirect("/login");
}

#[tokio::test]
async fn test_password_reset_flow() {
    let app = TestApp::new().await;
    app.create_student("PRN2024006", "reset@example.edu").await;
    let mut browser = app.browser();

    let res = browser.post_form("/forgot-password", &[("email", "reset@example.edu")]).await;
    res.assert_redirect("/login");

    // Unknown addresses get the same answer and no email.
    let res = browser.post_form("/forgot-password", &[("email", "nobody@example.edu")]).await;
    res.assert_redirect("/login");

    let emails = app.sent_emails();
    assert_eq!(emails.len(), 1);
    let token = token_from(&emails[0].body);

    let res = browser.get(&format!("/reset-password?token={}", token)).await;
    assert_eq!(res.status, StatusCode::OK);

    let res = browser
        .post_form(
            "/reset-password",
            &[("token", token.as_str()), ("password", "BrandNew123"), ("confirm_password", "BrandNew123")],
        )
        .await;
    res.assert_redirect("/login");

    let res = browser
        .post_form("/login", &[("identifier", "reset@example.edu"), ("password", "BrandNew123")])
        .await;
    res.assert_redirect("/dashboard");

    // A used token no longer opens the form.
    let res = browser.get(&format!("/reset-password?token={}", token)).await;
    res.assert_redirect("/forgot-password");
}
