//! Integration tests for scoped resource operations.

use http::StatusCode;
use serde_json::json;

use crate::helpers::{Caller, TestApp, str_field};

fn ds_notes() -> serde_json::Value {
    json!({
        "kind": "material",
        "department": "CSE",
        "year": "2nd",
        "subject": "Data Structures",
        "title": "DS Notes",
    })
}

#[tokio::test]
async fn test_material_is_listed_for_its_cohort_only() {
    let app = TestApp::new();
    let faculty = Caller::faculty("CSE");
    let second = Caller::student("CSE", "2nd");
    let third = Caller::student("CSE", "3rd");

    let created = app.create_resource(&faculty, ds_notes()).await;
    assert_eq!(str_field(&created, "status"), "published");
    assert_eq!(created["scope"]["department"], "CSE");
    assert_eq!(created["scope"]["year"], "2nd");

    let response = app
        .request(
            "GET",
            "/api/resources?department=CSE&year=2nd",
            None,
            Some(&second),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let items = response.data()["items"].as_array().expect("items");
    assert_eq!(items.len(), 1);
    assert_eq!(str_field(&items[0], "title"), "DS Notes");

    let response = app
        .request(
            "GET",
            "/api/resources?department=CSE&year=3rd",
            None,
            Some(&third),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.data()["items"].as_array().expect("items").is_empty());
}

#[tokio::test]
async fn test_get_enforces_scope() {
    let app = TestApp::new();
    let faculty = Caller::faculty("CSE");
    let created = app.create_resource(&faculty, ds_notes()).await;
    let path = format!("/api/resources/{}", str_field(&created, "id"));

    let inside = app
        .request("GET", &path, None, Some(&Caller::student("CSE", "2nd")))
        .await;
    assert_eq!(inside.status, StatusCode::OK);
    assert!(inside.data()["attachments"].as_array().expect("attachments").is_empty());

    let outside = app
        .request("GET", &path, None, Some(&Caller::student("ECE", "2nd")))
        .await;
    assert_eq!(outside.status, StatusCode::FORBIDDEN);
    assert_eq!(outside.error_code(), "FORBIDDEN");
}

#[tokio::test]
async fn test_missing_principal_is_unauthorized() {
    let app = TestApp::new();

    let response = app
        .request("GET", "/api/resources?department=CSE&year=2nd", None, None)
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_unknown_resource_is_not_found() {
    let app = TestApp::new();

    let response = app
        .request(
            "GET",
            &format!("/api/resources/{}", uuid::Uuid::new_v4()),
            None,
            Some(&Caller::faculty("CSE")),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_rejects_blank_title() {
    let app = TestApp::new();
    let mut body = ds_notes();
    body["title"] = json!("   ");

    let response = app
        .request("POST", "/api/resources", Some(body), Some(&Caller::faculty("CSE")))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_scope_cannot_be_patched() {
    let app = TestApp::new();
    let faculty = Caller::faculty("CSE");
    let created = app.create_resource(&faculty, ds_notes()).await;
    let path = format!("/api/resources/{}", str_field(&created, "id"));

    let response = app
        .request("PATCH", &path, Some(json!({ "department": "ECE" })), Some(&faculty))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let current = app.request("GET", &path, None, Some(&faculty)).await;
    assert_eq!(current.data()["scope"]["department"], "CSE");
}

#[tokio::test]
async fn test_patch_uses_optimistic_concurrency() {
    let app = TestApp::new();
    let faculty = Caller::faculty("CSE");
    let created = app.create_resource(&faculty, ds_notes()).await;
    let path = format!("/api/resources/{}", str_field(&created, "id"));
    let original = str_field(&created, "updated_at").to_string();

    let first = app
        .request(
            "PATCH",
            &path,
            Some(json!({ "title": "DS Notes v2", "expected_updated_at": original })),
            Some(&faculty),
        )
        .await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(str_field(first.data(), "title"), "DS Notes v2");
    assert_ne!(str_field(first.data(), "updated_at"), original);

    let stale = app
        .request(
            "PATCH",
            &path,
            Some(json!({ "title": "DS Notes v3", "expected_updated_at": original })),
            Some(&faculty),
        )
        .await;
    assert_eq!(stale.status, StatusCode::CONFLICT);
    assert_eq!(stale.error_code(), "CONFLICT");
}

#[tokio::test]
async fn test_only_owner_may_update_or_delete() {
    let app = TestApp::new();
    let faculty = Caller::faculty("CSE");
    let student = Caller::student("CSE", "2nd");
    let created = app.create_resource(&faculty, ds_notes()).await;
    let path = format!("/api/resources/{}", str_field(&created, "id"));

    let patch = app
        .request("PATCH", &path, Some(json!({ "title": "Mine now" })), Some(&student))
        .await;
    assert_eq!(patch.status, StatusCode::FORBIDDEN);

    let delete = app.request("DELETE", &path, None, Some(&student)).await;
    assert_eq!(delete.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_published_exam_cannot_be_deleted() {
    let app = TestApp::new();
    let faculty = Caller::faculty("CSE");
    let exam = app
        .create_resource(
            &faculty,
            json!({
                "kind": "exam",
                "department": "CSE",
                "year": "2nd",
                "title": "Data Structures Midterm",
                "status": "published",
            }),
        )
        .await;
    let path = format!("/api/resources/{}", str_field(&exam, "id"));

    let response = app.request("DELETE", &path, None, Some(&faculty)).await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    let still_there = app.request("GET", &path, None, Some(&faculty)).await;
    assert_eq!(still_there.status, StatusCode::OK);
}

#[tokio::test]
async fn test_draft_exam_delete_succeeds() {
    let app = TestApp::new();
    let faculty = Caller::faculty("CSE");
    let exam = app
        .create_resource(
            &faculty,
            json!({
                "kind": "exam",
                "department": "CSE",
                "year": "2nd",
                "title": "Data Structures Midterm",
            }),
        )
        .await;
    assert_eq!(str_field(&exam, "status"), "draft");
    let path = format!("/api/resources/{}", str_field(&exam, "id"));

    let response = app.request("DELETE", &path, None, Some(&faculty)).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let gone = app.request("GET", &path, None, Some(&faculty)).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_mine_filters_by_kind() {
    let app = TestApp::new();
    let faculty = Caller::faculty("CSE");
    app.create_resource(&faculty, ds_notes()).await;
    app.create_resource(
        &faculty,
        json!({
            "kind": "exam",
            "department": "CSE",
            "year": "3rd",
            "title": "Algorithms Final",
        }),
    )
    .await;
    app.create_resource(&Caller::faculty("CSE"), ds_notes()).await;

    let all = app
        .request("GET", "/api/resources/mine", None, Some(&faculty))
        .await;
    assert_eq!(all.status, StatusCode::OK);
    assert_eq!(all.data()["total_items"], 2);

    let exams = app
        .request("GET", "/api/resources/mine?kind=exam", None, Some(&faculty))
        .await;
    let items = exams.data()["items"].as_array().expect("items");
    assert_eq!(items.len(), 1);
    assert_eq!(str_field(&items[0], "title"), "Algorithms Final");
}

#[tokio::test]
async fn test_health_reports_memory_backends() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    let data = response.data();
    assert_eq!(str_field(data, "status"), "ok");
    assert_eq!(data["database"]["backend"], "memory");
    assert_eq!(data["storage"]["healthy"], true);
}
