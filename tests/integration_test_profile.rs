mod common;

use axum::http::StatusCode;
use common::{TestApp, PASSWORD};
use spark_portal::api::handlers::student::{PASSWORD_CHANGED, PHOTO_UPDATED, PROFILE_UPDATED};
use spark_portal::domain::services::account::WRONG_CURRENT_PASSWORD;

const BOUNDARY: &str = "spark-test-boundary";
const PNG_HEADER: [u8; 16] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D, 0x49, 0x48, 0x44, 0x52];

fn profile_fields<'a>(contact_number: &'a str, year: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("first_name", "Asha"),
        ("middle_name", "R"),
        ("last_name", "Patil"),
        ("contact_number", contact_number),
        ("department", "Electronics"),
        ("year_of_study", year),
    ]
}

fn multipart_file(field: &str, filename: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

#[tokio::test]
async fn test_profile_update_round_trips() {
    let app = TestApp::new().await;
    let student = app.create_student("PRN5000001", "profile@example.edu").await;
    let mut browser = app.login("PRN5000001").await;

    let res = browser.post_form("/profile", &profile_fields("9000011111", "4")).await;
    res.assert_redirect("/profile");
    assert_eq!(res.flash().success, vec![PROFILE_UPDATED.to_string()]);

    let stored = app.state.student_repo.find_by_id(&student.id).await.unwrap().unwrap();
    assert_eq!(stored.contact_number, "9000011111");
    assert_eq!(stored.department, "Electronics");
    assert_eq!(stored.year_of_study, 4);
    assert_eq!(stored.middle_name.as_deref(), Some("R"));

    let page = browser.get("/profile").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("9000011111"));
}

#[tokio::test]
async fn test_invalid_profile_is_rerendered_with_errors() {
    let app = TestApp::new().await;
    let student = app.create_student("PRN5000002", "badprofile@example.edu").await;
    let mut browser = app.login("PRN5000002").await;

    let res = browser.post_form("/profile", &profile_fields("98765", "9")).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body.contains("Contact number must be exactly 10 digits"));
    assert!(res.body.contains("Year of study must be between 1 and 5"));

    let stored = app.state.student_repo.find_by_id(&student.id).await.unwrap().unwrap();
    assert_eq!(stored.contact_number, "9876543210");
}

#[tokio::test]
async fn test_change_password_requires_current_password() {
    let app = TestApp::new().await;
    app.create_student("PRN5000003", "pw@example.edu").await;
    let mut browser = app.login("PRN5000003").await;

    let res = browser
        .post_form(
            "/profile/password",
            &[("current_password", "not-it-at-all"), ("new_password", "Another123"), ("confirm_password", "Another123")],
        )
        .await;
    assert_eq!(res.flash().errors, vec![WRONG_CURRENT_PASSWORD.to_string()]);

    let res = browser
        .post_form(
            "/profile/password",
            &[("current_password", PASSWORD), ("new_password", "Another123"), ("confirm_password", "Another123")],
        )
        .await;
    res.assert_redirect("/profile");
    assert_eq!(res.flash().success, vec![PASSWORD_CHANGED.to_string()]);

    let mut fresh = app.browser();
    fresh
        .post_form("/login", &[("identifier", "PRN5000003"), ("password", "Another123")])
        .await
        .assert_redirect("/dashboard");
}

#[tokio::test]
async fn test_profile_image_upload_is_served() {
    let app = TestApp::new().await;
    let student = app.create_student("PRN5000004", "photo@example.edu").await;
    let mut browser = app.login("PRN5000004").await;
    let content_type = format!("multipart/form-data; boundary={BOUNDARY}");

    let res = browser
        .post_raw("/profile/image", &content_type, multipart_file("profile_image", "notes.pdf", b"%PDF-1.7 nope"))
        .await;
    assert_eq!(res.flash().errors, vec!["Only JPEG, PNG, GIF or WebP images are allowed".to_string()]);

    let res = browser
        .post_raw("/profile/image", &content_type, multipart_file("profile_image", "me.png", &PNG_HEADER))
        .await;
    res.assert_redirect("/profile");
    assert_eq!(res.flash().success, vec![PHOTO_UPDATED.to_string()]);

    let stored = app.state.student_repo.find_by_id(&student.id).await.unwrap().unwrap();
    let path = stored.profile_image.expect("profile image stored");
    assert!(path.starts_with("/uploads/profiles/"));

    let served = browser.get(&path).await;
    assert_eq!(served.status, StatusCode::OK);
}
