mod common;

use axum::http::StatusCode;
use chrono::Duration;
use common::{local_now, TestApp, PAYMENT_SECRET};
use serde_json::json;
use spark_portal::domain::models::registration::PaymentStatus;
use spark_portal::domain::services::event_registration::{
    ALREADY_REGISTERED, EVENT_FULL, NO_PAYMENT_PENDING, PAYMENT_FAILED, PAYMENT_VERIFIED, REGISTRATION_CLOSED,
};
use spark_portal::infra::payment::razorpay::sign;

const CARD: &str = "<article class=\"card\">";

#[tokio::test]
async fn test_event_listing_paginates_nine_per_page() {
    let app = TestApp::new().await;
    for i in 1..=11 {
        app.create_event(&format!("Upcoming Session {:02}", i), Duration::days(i), 0.0, None).await;
    }
    app.create_event("Old Meetup", Duration::days(-3), 0.0, None).await;
    let mut browser = app.browser();

    let page_one = browser.get("/events").await;
    assert_eq!(page_one.status, StatusCode::OK);
    assert_eq!(page_one.body.matches(CARD).count(), 9);
    // Soonest first, past events hidden.
    assert!(page_one.body.contains("Upcoming Session 01"));
    assert!(!page_one.body.contains("Upcoming Session 10"));
    assert!(!page_one.body.contains("Old Meetup"));
    assert!(page_one.body.contains("Page 1 of 2"));

    let page_two = browser.get("/events?page=2").await;
    assert_eq!(page_two.body.matches(CARD).count(), 2);
    assert!(page_two.body.contains("Upcoming Session 11"));

    // Out-of-range and junk page numbers fall back to sensible pages.
    let junk = browser.get("/events?page=abc").await;
    assert_eq!(junk.status, StatusCode::OK);
    assert_eq!(junk.body.matches(CARD).count(), 9);

    let past = browser.get("/events?timeframe=past").await;
    assert_eq!(past.body.matches(CARD).count(), 1);
    assert!(past.body.contains("Old Meetup"));
}

#[tokio::test]
async fn test_event_listing_filters_by_search_and_category() {
    let app = TestApp::new().await;
    let now = local_now();
    app.create_event_at("Rust Workshop", now + Duration::days(2), 0.0, None, "Workshop").await;
    app.create_event_at("Robotics Hackathon", now + Duration::days(3), 0.0, None, "Hackathon").await;
    app.create_event_at("Cloud Seminar", now + Duration::days(4), 0.0, None, "Seminar").await;
    let mut browser = app.browser();

    let res = browser.get("/events?search=rust").await;
    assert_eq!(res.body.matches(CARD).count(), 1);
    assert!(res.body.contains("Rust Workshop"));

    let res = browser.get("/events?category=Hackathon").await;
    assert_eq!(res.body.matches(CARD).count(), 1);
    assert!(res.body.contains("Robotics Hackathon"));

    let res = browser.get("/events?search=nothing-matches-this").await;
    assert_eq!(res.body.matches(CARD).count(), 0);
    assert!(res.body.contains("No events match your filters."));

    // Search and category narrow together.
    let res = browser.get("/events?search=rust&category=Hackathon").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body.matches(CARD).count(), 0);

    let res = browser.get("/events?category=Workshop&search=rust").await;
    assert_eq!(res.body.matches(CARD).count(), 1);
    assert!(res.body.contains("Rust Workshop"));
    assert!(!res.body.contains("Robotics Hackathon"));
}

#[tokio::test]
async fn test_event_listing_page_past_the_end_is_empty() {
    let app = TestApp::new().await;
    app.create_event("Only Session", Duration::days(1), 0.0, None).await;
    let mut browser = app.browser();

    let res = browser.get("/events?page=99").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body.matches(CARD).count(), 0);
    assert!(res.body.contains("No events match your filters."));

    let res = browser.get("/events?page=9223372036854775807").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body.matches(CARD).count(), 0);
}

#[tokio::test]
async fn test_unknown_event_is_not_found() {
    let app = TestApp::new().await;
    let mut browser = app.browser();

    let res = browser.get("/events/does-not-exist").await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert!(res.body.contains("Event not found"));
}

#[tokio::test]
async fn test_free_registration_confirms_and_blocks_duplicates() {
    let app = TestApp::new().await;
    let event = app.create_event("Intro to Git", Duration::days(5), 0.0, None).await;
    app.create_student("PRN3000001", "git@example.edu").await;
    let mut browser = app.login("PRN3000001").await;
    let detail = format!("/events/{}", event.id);

    let res = browser.post_form(&format!("{}/register", detail), &[]).await;
    res.assert_redirect(&detail);
    let flash = res.flash();
    assert_eq!(flash.success, vec!["Successfully registered for Intro to Git!".to_string()]);
    assert!(flash.google_calendar_url.unwrap().starts_with("https://calendar.google.com/"));

    let emails = app.sent_emails();
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].attachment_name.as_deref(), Some("event.ics"));

    let page = browser.get(&detail).await;
    assert!(page.body.contains("You are registered"));

    let res = browser.post_form(&format!("{}/register", detail), &[]).await;
    assert_eq!(res.flash().errors, vec![ALREADY_REGISTERED.to_string()]);
    assert_eq!(app.state.registration_repo.count_for_event(&event.id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_registration_rules_for_full_and_past_events() {
    let app = TestApp::new().await;
    let full = app.create_event("Tiny Room", Duration::days(2), 0.0, Some(1)).await;
    let past = app.create_event("Yesterday", Duration::days(-1), 0.0, None).await;
    app.create_student("PRN3000002", "first@example.edu").await;
    app.create_student("PRN3000003", "second@example.edu").await;

    let mut first = app.login("PRN3000002").await;
    first.post_form(&format!("/events/{}/register", full.id), &[]).await;

    let mut second = app.login("PRN3000003").await;
    let res = second.post_form(&format!("/events/{}/register", full.id), &[]).await;
    assert_eq!(res.flash().errors, vec![EVENT_FULL.to_string()]);

    let res = second.post_form(&format!("/events/{}/register", past.id), &[]).await;
    assert_eq!(res.flash().errors, vec![REGISTRATION_CLOSED.to_string()]);

    let res = second.post_form("/events/missing/register", &[]).await;
    res.assert_redirect("/events");

    // Visitors are sent to log in.
    let mut visitor = app.browser();
    visitor
        .post_form(&format!("/events/{}/register", full.id), &[])
        .await
        .assert_redirect("/login");
}

#[tokio::test]
async fn test_paid_event_payment_flow() {
    let app = TestApp::new().await;
    let event = app.create_event("Paid Bootcamp", Duration::days(7), 499.0, None).await;
    let student = app.create_student("PRN3000004", "payer@example.edu").await;
    let mut browser = app.login("PRN3000004").await;

    let res = browser.post_form(&format!("/events/{}/register", event.id), &[]).await;
    assert!(res.flash().success[0].contains("complete the payment"));
    // Nothing is mailed until the payment goes through.
    assert!(app.sent_emails().is_empty());

    let registration = app.state.registration_repo.find(&event.id, &student.id).await.unwrap().unwrap();
    assert_eq!(registration.payment_status, PaymentStatus::Pending.as_str());

    let res = browser.post_json("/api/payment", json!({"action": "create_order", "event_id": event.id})).await;
    assert_eq!(res.status, StatusCode::OK);
    let order = res.json();
    assert_eq!(order["success"], true);
    assert_eq!(order["amount"], 49900);
    assert_eq!(order["currency"], "INR");
    let order_id = order["order_id"].as_str().unwrap().to_string();

    let signature = sign(PAYMENT_SECRET, &order_id, "pay_001").unwrap();
    let res = browser
        .post_json(
            "/api/payment",
            json!({
                "action": "verify_payment",
                "event_id": event.id,
                "razorpay_order_id": order_id,
                "razorpay_payment_id": "pay_001",
                "razorpay_signature": signature,
            }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["message"], PAYMENT_VERIFIED);

    let registration = app.state.registration_repo.find(&event.id, &student.id).await.unwrap().unwrap();
    assert_eq!(registration.payment_status, PaymentStatus::Completed.as_str());
    assert_eq!(registration.payment_id.as_deref(), Some("pay_001"));
    assert_eq!(registration.amount_paid, 499.0);
    assert_eq!(app.sent_emails().len(), 1);

    // A settled payment cannot be knocked back to failed or paid twice.
    let res = browser
        .post_json(
            "/api/payment",
            json!({
                "action": "verify_payment",
                "event_id": event.id,
                "razorpay_order_id": order_id,
                "razorpay_payment_id": "pay_999",
                "razorpay_signature": "deadbeef",
            }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["message"], NO_PAYMENT_PENDING);

    let registration = app.state.registration_repo.find(&event.id, &student.id).await.unwrap().unwrap();
    assert_eq!(registration.payment_status, PaymentStatus::Completed.as_str());
    assert_eq!(registration.payment_id.as_deref(), Some("pay_001"));

    let res = browser
        .post_json("/api/payment", json!({"action": "create_order", "event_id": event.id}))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["message"], NO_PAYMENT_PENDING);
    assert_eq!(app.sent_emails().len(), 1);
}

#[tokio::test]
async fn test_bad_payment_signature_marks_payment_failed() {
    let app = TestApp::new().await;
    let event = app.create_event("Paid Talk", Duration::days(3), 100.0, None).await;
    let student = app.create_student("PRN3000005", "tamper@example.edu").await;
    let mut browser = app.login("PRN3000005").await;

    browser.post_form(&format!("/events/{}/register", event.id), &[]).await;
    let order = browser
        .post_json("/api/payment", json!({"action": "create_order", "event_id": event.id}))
        .await
        .json();

    let res = browser
        .post_json(
            "/api/payment",
            json!({
                "action": "verify_payment",
                "event_id": event.id,
                "razorpay_order_id": order["order_id"],
                "razorpay_payment_id": "pay_002",
                "razorpay_signature": "deadbeef",
            }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.json()["success"], false);
    assert_eq!(res.json()["message"], PAYMENT_FAILED);

    let registration = app.state.registration_repo.find(&event.id, &student.id).await.unwrap().unwrap();
    assert_eq!(registration.payment_status, PaymentStatus::Failed.as_str());
}
