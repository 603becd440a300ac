mod common;

use axum::http::StatusCode;
use chrono::{NaiveDate, NaiveTime};
use common::{TestApp, CONTACT_INBOX};
use spark_portal::domain::models::gallery::GalleryImage;
use spark_portal::domain::services::contact::CONTACT_THANKS;
use spark_portal::domain::services::pagination::PageRequest;

const PHOTO: &str = "<figure>";

fn at(year: i32, month: u32, day: u32, hour: u32) -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap())
}

#[tokio::test]
async fn test_health_and_home() {
    let app = TestApp::new().await;
    let mut browser = app.browser();

    let res = browser.get("/health").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, "ok");

    app.create_event("Open House", chrono::Duration::days(1), 0.0, None).await;
    let res = browser.get("/").await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("Open House"));
}

#[tokio::test]
async fn test_calendar_export() {
    let app = TestApp::new().await;
    app.create_event_at("Spring Robotics Expo", at(2031, 3, 15, 10), 0.0, None, "Exhibition").await;
    let mut browser = app.browser();

    let res = browser.get("/calendar/export?month=2031-07").await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.content_type.as_deref().unwrap().starts_with("text/calendar"));
    assert!(res.body.contains("BEGIN:VCALENDAR"));
    assert!(!res.body.contains("BEGIN:VEVENT"));

    let res = browser.get("/calendar/export?month=2031-03").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body.matches("BEGIN:VEVENT").count(), 1);
    assert!(res.body.contains("SUMMARY:Spring Robotics Expo"));

    for bad in ["2031-13", "March", "2031-3"] {
        let res = browser.get(&format!("/calendar/export?month={}", bad)).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "{bad}");
    }
}

#[tokio::test]
async fn test_calendar_views() {
    let app = TestApp::new().await;
    app.create_event_at("Spring Robotics Expo", at(2031, 3, 15, 10), 0.0, None, "Exhibition").await;
    app.create_event_at("Quiz Night", at(2031, 3, 20, 18), 0.0, None, "Social").await;
    let mut browser = app.browser();

    let res = browser.get("/calendar?date=2031-03-01").await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("Spring Robotics Expo"));
    assert!(res.body.contains("Quiz Night"));

    let res = browser.get("/calendar?date=2031-03-01&category=Social").await;
    assert!(!res.body.contains("Spring Robotics Expo"));
    assert!(res.body.contains("Quiz Night"));

    let res = browser.get("/calendar?view=day&date=2031-03-15").await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("Spring Robotics Expo"));
    assert!(!res.body.contains("Quiz Night"));

    // Unknown views and dates fall back instead of failing.
    let res = browser.get("/calendar?view=year&date=someday").await;
    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn test_contact_form() {
    let app = TestApp::new().await;
    let mut browser = app.browser();

    let res = browser
        .post_form(
            "/contact",
            &[
                ("name", "Ravi Deshmukh"),
                ("email", "Ravi@Example.com"),
                ("subject", "Sponsorship"),
                ("message", "We would like to sponsor the next hackathon."),
            ],
        )
        .await;
    res.assert_redirect("/contact");
    assert_eq!(res.flash().success, vec![CONTACT_THANKS.to_string()]);

    let (messages, total) = app.state.contact_repo.list(&PageRequest::new(None, 20)).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(messages[0].email, "ravi@example.com");

    let emails = app.sent_emails();
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].recipient, CONTACT_INBOX);
    assert_eq!(emails[0].subject, "[SPARK Contact] Sponsorship");

    let res = browser
        .post_form("/contact", &[("name", "R"), ("email", "nope"), ("subject", "Hi"), ("message", "short")])
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body.contains("Name must be between 2 and 100 characters"));
    assert!(res.body.contains("Invalid email address"));
    assert!(res.body.contains("Message must be between 10 and 5000 characters"));
    assert_eq!(app.sent_emails().len(), 1);
}

#[tokio::test]
async fn test_opportunities_and_team_pages() {
    let app = TestApp::new().await;
    app.create_admin("PRN8000001", "content@example.edu").await;
    let mut admin = app.login("PRN8000001").await;

    let res = admin
        .post_form(
            "/admin/opportunities",
            &[
                ("title", "Summer Internship"),
                ("description", "Ten weeks on the storage team"),
                ("opportunity_type", "Internship"),
                ("organizer", "Acme Systems"),
                ("location", "Pune"),
                ("tech_stack", "Rust, SQL"),
                ("apply_link", "https://acme.example/apply"),
                ("is_featured", "on"),
            ],
        )
        .await;
    res.assert_redirect("/admin/opportunities");
    admin
        .post_form(
            "/admin/opportunities",
            &[("title", "Winter Hackathon"), ("description", "48 hours"), ("opportunity_type", "hackathon"), ("organizer", "SPARK")],
        )
        .await;

    let res = admin
        .post_form("/admin/opportunities", &[("title", "Bad"), ("description", "x"), ("opportunity_type", "party"), ("organizer", "Me")])
        .await;
    assert_eq!(res.flash().errors, vec!["Invalid opportunity type".to_string()]);

    admin
        .post_form(
            "/admin/team",
            &[("name", "Kiran Joshi"), ("position", "President"), ("category", "Core"), ("display_order", "1")],
        )
        .await
        .assert_redirect("/admin/team");

    let mut visitor = app.browser();
    let res = visitor.get("/opportunities?type=hackathon").await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("Winter Hackathon"));
    assert!(!res.body.contains("Summer Internship"));

    // Featured opportunities appear on the home page.
    let res = visitor.get("/").await;
    assert!(res.body.contains("Summer Internship"));

    let res = visitor.get("/team").await;
    assert!(res.body.contains("Kiran Joshi"));

    let res = visitor.get("/gallery").await;
    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn test_gallery_paginates_and_filters() {
    let app = TestApp::new().await;
    for i in 1..=13 {
        let image = GalleryImage::new(
            format!("Annual Fest {:02}", i),
            None,
            "Events".to_string(),
            r#"["fest","stage"]"#.to_string(),
            format!("/uploads/gallery/fest-{:02}.jpg", i),
            None,
        );
        app.state.gallery_repo.create(&image).await.unwrap();
    }
    let bench = GalleryImage::new(
        "Bench Session".to_string(),
        Some("Soldering night".to_string()),
        "Workshops".to_string(),
        r#"["robotics","arduino"]"#.to_string(),
        "/uploads/gallery/bench.jpg".to_string(),
        None,
    );
    app.state.gallery_repo.create(&bench).await.unwrap();
    let mut visitor = app.browser();

    let res = visitor.get("/gallery").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body.matches(PHOTO).count(), 12);

    let res = visitor.get("/gallery?page=2").await;
    assert_eq!(res.body.matches(PHOTO).count(), 2);

    let res = visitor.get("/gallery?category=Workshops").await;
    assert_eq!(res.body.matches(PHOTO).count(), 1);
    assert!(res.body.contains("Bench Session"));

    // Tags are searchable.
    let res = visitor.get("/gallery?search=ARDUINO").await;
    assert_eq!(res.body.matches(PHOTO).count(), 1);
    assert!(res.body.contains("Bench Session"));

    let res = visitor.get("/gallery?search=arduino&category=Events").await;
    assert_eq!(res.body.matches(PHOTO).count(), 0);
    assert!(res.body.contains("No photos found."));
}

#[tokio::test]
async fn test_contact_message_is_kept_when_mail_fails() {
    let app = TestApp::new().await;
    app.fail_emails();
    let mut browser = app.browser();

    let res = browser
        .post_form(
            "/contact",
            &[
                ("name", "Nisha Kulkarni"),
                ("email", "nisha@example.com"),
                ("subject", "Workshop venue"),
                ("message", "Can the club host a session in our auditorium?"),
            ],
        )
        .await;
    res.assert_redirect("/contact");
    assert_eq!(res.flash().success, vec![CONTACT_THANKS.to_string()]);

    let (messages, total) = app.state.contact_repo.list(&PageRequest::new(None, 20)).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(messages[0].subject, "Workshop venue");
    assert!(app.sent_emails().is_empty());
}
