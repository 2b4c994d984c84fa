//! Integration tests for status transitions and submissions.

use http::StatusCode;
use serde_json::json;

use crate::helpers::{Caller, TestApp, str_field};

async fn create(app: &TestApp, owner: &Caller, kind: &str, title: &str) -> String {
    let created = app
        .create_resource(
            owner,
            json!({
                "kind": kind,
                "department": "CSE",
                "year": "2nd",
                "title": title,
            }),
        )
        .await;
    str_field(&created, "id").to_string()
}

#[tokio::test]
async fn test_exam_moves_forward_only() {
    let app = TestApp::new();
    let faculty = Caller::faculty("CSE");
    let id = create(&app, &faculty, "exam", "Data Structures Midterm").await;
    let path = format!("/api/resources/{id}/transition");

    let published = app
        .request("POST", &path, Some(json!({ "status": "published" })), Some(&faculty))
        .await;
    assert_eq!(published.status, StatusCode::OK);
    assert_eq!(str_field(published.data(), "status"), "published");
    assert_eq!(
        str_field(published.data(), "status_changed_by"),
        faculty.id.to_string()
    );

    let back = app
        .request("POST", &path, Some(json!({ "status": "draft" })), Some(&faculty))
        .await;
    assert_eq!(back.status, StatusCode::CONFLICT);
    assert_eq!(back.error_code(), "INVALID_TRANSITION");
}

#[tokio::test]
async fn test_rejection_requires_reason() {
    let app = TestApp::new();
    let faculty = Caller::faculty("CSE");
    let id = create(&app, &faculty, "leave", "Medical leave, 3 days").await;
    let path = format!("/api/resources/{id}/transition");

    let bare = app
        .request("POST", &path, Some(json!({ "status": "rejected" })), Some(&faculty))
        .await;
    assert_eq!(bare.status, StatusCode::BAD_REQUEST);

    let with_reason = app
        .request(
            "POST",
            &path,
            Some(json!({ "status": "rejected", "reason": "Missing certificate" })),
            Some(&faculty),
        )
        .await;
    assert_eq!(with_reason.status, StatusCode::OK);
    assert_eq!(str_field(with_reason.data(), "status"), "rejected");
    assert_eq!(
        str_field(with_reason.data(), "status_reason"),
        "Missing certificate"
    );
}

#[tokio::test]
async fn test_only_owner_may_transition() {
    let app = TestApp::new();
    let faculty = Caller::faculty("CSE");
    let id = create(&app, &faculty, "exam", "Data Structures Midterm").await;

    let response = app
        .request(
            "POST",
            &format!("/api/resources/{id}/transition"),
            Some(json!({ "status": "published" })),
            Some(&Caller::student("CSE", "2nd")),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_submit_and_grade_assignment() {
    let app = TestApp::new();
    let faculty = Caller::faculty("CSE");
    let student = app.enroll("CSE", "2nd").await;
    let id = create(&app, &faculty, "assignment", "Linked Lists").await;

    let early = app
        .request(
            "POST",
            &format!("/api/resources/{id}/submissions"),
            Some(json!({ "content": "https://git.example.edu/lists" })),
            Some(&student),
        )
        .await;
    assert_eq!(early.status, StatusCode::CONFLICT, "drafts are closed");

    let opened = app
        .request(
            "POST",
            &format!("/api/resources/{id}/transition"),
            Some(json!({ "status": "published" })),
            Some(&faculty),
        )
        .await;
    assert_eq!(opened.status, StatusCode::OK);

    let submitted = app
        .request(
            "POST",
            &format!("/api/resources/{id}/submissions"),
            Some(json!({ "content": "https://git.example.edu/lists" })),
            Some(&student),
        )
        .await;
    assert_eq!(submitted.status, StatusCode::CREATED);
    assert_eq!(str_field(submitted.data(), "status"), "submitted");
    assert_eq!(submitted.data()["is_late"], false);
    let submission_id = str_field(submitted.data(), "id").to_string();

    let listed = app
        .request(
            "GET",
            &format!("/api/resources/{id}/submissions"),
            None,
            Some(&faculty),
        )
        .await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.data().as_array().expect("submissions").len(), 1);

    let peek = app
        .request(
            "GET",
            &format!("/api/resources/{id}/submissions"),
            None,
            Some(&student),
        )
        .await;
    assert_eq!(peek.status, StatusCode::FORBIDDEN);

    let graded = app
        .request(
            "POST",
            &format!("/api/submissions/{submission_id}/grade"),
            Some(json!({ "grade": "A", "feedback": "Clean pointer handling" })),
            Some(&faculty),
        )
        .await;
    assert_eq!(graded.status, StatusCode::OK);
    assert_eq!(str_field(graded.data(), "status"), "graded");
    assert_eq!(str_field(graded.data(), "grade"), "A");

    let again = app
        .request(
            "POST",
            &format!("/api/submissions/{submission_id}/grade"),
            Some(json!({ "grade": "B" })),
            Some(&faculty),
        )
        .await;
    assert_eq!(again.status, StatusCode::CONFLICT);

    let inbox = app
        .request("GET", "/api/notifications", None, Some(&student))
        .await;
    let kinds: Vec<&str> = inbox.data()["items"]
        .as_array()
        .expect("items")
        .iter()
        .map(|n| str_field(n, "kind"))
        .collect();
    assert!(kinds.contains(&"submission_graded"));
}
