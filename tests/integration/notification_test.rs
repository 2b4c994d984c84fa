//! Integration tests for notification fan-out and the inbox.

use http::StatusCode;
use serde_json::json;

use crate::helpers::{Caller, TestApp, str_field};

async fn post_notes(app: &TestApp, faculty: &Caller) {
    app.create_resource(
        faculty,
        json!({
            "kind": "material",
            "department": "CSE",
            "year": "2nd",
            "title": "DS Notes",
        }),
    )
    .await;
}

#[tokio::test]
async fn test_new_material_notifies_its_cohort() {
    let app = TestApp::new();
    let faculty = Caller::faculty("CSE");
    let first = app.enroll("CSE", "2nd").await;
    let second = app.enroll("CSE", "2nd").await;
    let other_year = app.enroll("CSE", "3rd").await;

    post_notes(&app, &faculty).await;

    for student in [&first, &second] {
        let response = app
            .request("GET", "/api/notifications", None, Some(student))
            .await;
        assert_eq!(response.status, StatusCode::OK);
        let items = response.data()["items"].as_array().expect("items");
        assert_eq!(items.len(), 1);
        assert_eq!(str_field(&items[0], "kind"), "resource_created");
        assert_eq!(response.data()["unread_count"], 1);
    }

    let response = app
        .request("GET", "/api/notifications", None, Some(&other_year))
        .await;
    assert!(response.data()["items"].as_array().expect("items").is_empty());
    assert_eq!(app.db.notification_count().await, 2);
}

#[tokio::test]
async fn test_mark_read_clears_unread_count() {
    let app = TestApp::new();
    let faculty = Caller::faculty("CSE");
    let student = app.enroll("CSE", "2nd").await;
    post_notes(&app, &faculty).await;
    post_notes(&app, &faculty).await;

    let inbox = app
        .request("GET", "/api/notifications?unread_only=true", None, Some(&student))
        .await;
    let items = inbox.data()["items"].as_array().expect("items");
    assert_eq!(items.len(), 2);
    let first_id = str_field(&items[0], "id").to_string();

    let marked = app
        .request(
            "PUT",
            "/api/notifications/read",
            Some(json!({ "ids": [first_id] })),
            Some(&student),
        )
        .await;
    assert_eq!(marked.status, StatusCode::OK);
    assert_eq!(marked.data()["marked"], 1);

    let count = app
        .request("GET", "/api/notifications/unread-count", None, Some(&student))
        .await;
    assert_eq!(count.data()["count"], 1);

    let rest = app
        .request(
            "PUT",
            "/api/notifications/read",
            Some(json!({ "all": true })),
            Some(&student),
        )
        .await;
    assert_eq!(rest.data()["marked"], 1);

    let count = app
        .request("GET", "/api/notifications/unread-count", None, Some(&student))
        .await;
    assert_eq!(count.data()["count"], 0);
}

#[tokio::test]
async fn test_empty_mark_read_is_rejected() {
    let app = TestApp::new();
    let student = app.enroll("CSE", "2nd").await;

    let response = app
        .request(
            "PUT",
            "/api/notifications/read",
            Some(json!({ "ids": [] })),
            Some(&student),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_inbox_is_private() {
    let app = TestApp::new();
    let student = app.enroll("CSE", "2nd").await;
    let classmate = app.enroll("CSE", "2nd").await;

    let response = app
        .request(
            "GET",
            &format!("/api/notifications?recipient={}", classmate.id),
            None,
            Some(&student),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}
