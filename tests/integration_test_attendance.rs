mod common;

use axum::http::StatusCode;
use chrono::Duration;
use common::TestApp;
use serde_json::json;
use spark_portal::api::dtos::requests::INVALID_ACTION;
use spark_portal::domain::services::attendance::{qr_payload, ALREADY_MARKED, EVENT_NOT_FOUND, INVALID_ACCESS_CODE, INVALID_QR, MARKED};

#[tokio::test]
async fn test_manual_attendance_marks_once() {
    let app = TestApp::new().await;
    let event = app.create_event("Lab Session", Duration::hours(-1), 0.0, None).await;
    let student = app.create_student("PRN4000001", "lab@example.edu").await;
    let mut browser = app.login("PRN4000001").await;

    let res = browser
        .post_json("/api/attendance", json!({"action": "mark_manual", "event_id": event.id, "access_code": "ABC123"}))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["success"], true);
    assert_eq!(res.json()["message"], MARKED);
    assert!(app.state.attendance_repo.exists(&event.id, &student.id).await.unwrap());

    let res = browser
        .post_json("/api/attendance", json!({"action": "mark_manual", "event_id": event.id, "access_code": "ABC123"}))
        .await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.json()["message"], ALREADY_MARKED);
}

#[tokio::test]
async fn test_attendance_rejects_bad_code_and_unknown_event() {
    let app = TestApp::new().await;
    let event = app.create_event("Guest Lecture", Duration::hours(1), 0.0, None).await;
    let student = app.create_student("PRN4000002", "lecture@example.edu").await;
    let mut browser = app.login("PRN4000002").await;

    let res = browser
        .post_json("/api/attendance", json!({"action": "mark_manual", "event_id": event.id, "access_code": "WRONG1"}))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["message"], INVALID_ACCESS_CODE);

    let res = browser
        .post_json("/api/attendance", json!({"action": "mark_manual", "event_id": "no-such-event", "access_code": "ABC123"}))
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.json()["message"], EVENT_NOT_FOUND);

    assert!(!app.state.attendance_repo.exists(&event.id, &student.id).await.unwrap());
}

#[tokio::test]
async fn test_qr_check_in() {
    let app = TestApp::new().await;
    let event = app.create_event("Hack Night", Duration::hours(-2), 0.0, None).await;
    let student = app.create_student("PRN4000003", "qr@example.edu").await;
    let mut browser = app.login("PRN4000003").await;

    let res = browser
        .post_json("/api/attendance", json!({"action": "verify_qr", "qr_data": "not a spark code"}))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["message"], INVALID_QR);

    let res = browser
        .post_json("/api/attendance", json!({"action": "verify_qr", "qr_data": qr_payload(&event)}))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(app.state.attendance_repo.exists(&event.id, &student.id).await.unwrap());

    let records = app.state.attendance_repo.list_for_student(&student.id).await.unwrap();
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn test_attendance_endpoint_guards() {
    let app = TestApp::new().await;
    let event = app.create_event("Guarded", Duration::hours(1), 0.0, None).await;
    app.create_student("PRN4000004", "guard@example.edu").await;
    let body = json!({"action": "mark_manual", "event_id": event.id, "access_code": "ABC123"});

    let mut visitor = app.browser();
    let res = visitor.post_json("/api/attendance", body.clone()).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.json()["success"], false);

    let mut browser = app.login("PRN4000004").await;
    let res = browser.post_json_without_csrf("/api/attendance", body).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.json()["message"], "Invalid CSRF token");

    for payload in [json!({"event_id": event.id}), json!({"action": "teleport"})] {
        let res = browser.post_json("/api/attendance", payload).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.json()["message"], INVALID_ACTION);
    }

    let res = browser.post_raw("/api/attendance", "application/json", b"{not json".to_vec()).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_attendance_form_redirects_with_flash() {
    let app = TestApp::new().await;
    let event = app.create_event("Form Check-in", Duration::minutes(-30), 0.0, None).await;
    app.create_student("PRN4000005", "form@example.edu").await;
    let mut browser = app.login("PRN4000005").await;

    let res = browser
        .post_form("/attendance", &[("event_id", event.id.as_str()), ("access_code", "ABC123")])
        .await;
    res.assert_redirect("/attendance");
    assert_eq!(res.flash().success, vec![MARKED.to_string()]);

    let page = browser.get("/attendance").await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Form Check-in"));
}
