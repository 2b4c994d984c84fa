//! Integration tests for attachment upload, download and delete.

use http::StatusCode;
use serde_json::json;

use campus_core::config::{AppConfig, UploadPolicy};

use crate::helpers::{Caller, TestApp, str_field};

async fn ds_notes(app: &TestApp, faculty: &Caller) -> String {
    let created = app
        .create_resource(
            faculty,
            json!({
                "kind": "material",
                "department": "CSE",
                "year": "2nd",
                "title": "DS Notes",
            }),
        )
        .await;
    str_field(&created, "id").to_string()
}

#[tokio::test]
async fn test_upload_and_download_notes() {
    let app = TestApp::new();
    let faculty = Caller::faculty("CSE");
    let id = ds_notes(&app, &faculty).await;
    let contents = vec![7u8; 2_000_000];

    let response = app
        .upload(
            &format!("/api/resources/{id}/attachments"),
            &faculty,
            "notes.pdf",
            "application/pdf",
            &contents,
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    let attachment = &response.data()["attachment"];
    assert_eq!(attachment["size_bytes"], 2_000_000);
    assert_eq!(str_field(attachment, "file_name"), "notes.pdf");
    assert!(response.data()["derived"].is_null());
    assert_eq!(app.blobs.len().await, 1);

    let student = Caller::student("CSE", "2nd");
    let detail = app
        .request("GET", &format!("/api/resources/{id}"), None, Some(&student))
        .await;
    assert_eq!(detail.data()["attachments"].as_array().expect("attachments").len(), 1);

    let download = app
        .request(
            "GET",
            &format!("/api/attachments/{}/download", str_field(attachment, "id")),
            None,
            Some(&student),
        )
        .await;
    assert_eq!(download.status, StatusCode::OK);
    assert_eq!(download.raw.len(), 2_000_000);
    let disposition = download
        .headers
        .get(http::header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .expect("content-disposition");
    assert!(disposition.contains("notes.pdf"));
}

#[tokio::test]
async fn test_oversized_upload_is_rejected_without_side_effects() {
    let mut config = AppConfig::default();
    config
        .upload
        .policies
        .insert("documents".to_string(), UploadPolicy::new(1024, &["pdf"]));
    let app = TestApp::with_config(config);
    let faculty = Caller::faculty("CSE");
    let id = ds_notes(&app, &faculty).await;

    let response = app
        .upload(
            &format!("/api/resources/{id}/attachments"),
            &faculty,
            "notes.pdf",
            "application/pdf",
            &[0u8; 2048],
        )
        .await;

    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.error_code(), "PAYLOAD_TOO_LARGE");
    assert!(app.blobs.is_empty().await);
    assert_eq!(app.db.attachment_count().await, 0);
}

#[tokio::test]
async fn test_body_over_server_limit_is_payload_too_large() {
    let mut config = AppConfig::default();
    config.server.body_limit_bytes = 1024 * 1024;
    let app = TestApp::with_config(config);
    let faculty = Caller::faculty("CSE");
    let id = ds_notes(&app, &faculty).await;

    let response = app
        .upload(
            &format!("/api/resources/{id}/attachments"),
            &faculty,
            "notes.pdf",
            "application/pdf",
            &vec![0u8; 2 * 1024 * 1024],
        )
        .await;

    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.error_code(), "PAYLOAD_TOO_LARGE");
    assert!(app.blobs.is_empty().await);
    assert_eq!(app.db.attachment_count().await, 0);
}

#[tokio::test]
async fn test_disallowed_extension_is_rejected() {
    let app = TestApp::new();
    let faculty = Caller::faculty("CSE");
    let id = ds_notes(&app, &faculty).await;

    let response = app
        .upload(
            &format!("/api/resources/{id}/attachments"),
            &faculty,
            "setup.exe",
            "application/octet-stream",
            b"MZ",
        )
        .await;

    assert_eq!(response.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(app.blobs.is_empty().await);
}

#[tokio::test]
async fn test_named_policy_is_applied() {
    let app = TestApp::new();
    let faculty = Caller::faculty("CSE");
    let id = ds_notes(&app, &faculty).await;

    let image = app
        .upload(
            &format!("/api/resources/{id}/attachments?policy=images"),
            &faculty,
            "board.png",
            "image/png",
            b"\x89PNG",
        )
        .await;
    assert_eq!(image.status, StatusCode::CREATED);

    let unknown = app
        .upload(
            &format!("/api/resources/{id}/attachments?policy=video"),
            &faculty,
            "lecture.mp4",
            "video/mp4",
            b"....",
        )
        .await;
    assert_eq!(unknown.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_only_owner_may_upload() {
    let app = TestApp::new();
    let faculty = Caller::faculty("CSE");
    let id = ds_notes(&app, &faculty).await;

    let response = app
        .upload(
            &format!("/api/resources/{id}/attachments"),
            &Caller::student("CSE", "2nd"),
            "answers.pdf",
            "application/pdf",
            b"%PDF-1.7",
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert!(app.blobs.is_empty().await);
}

#[tokio::test]
async fn test_delete_attachment_removes_blob_and_row() {
    let app = TestApp::new();
    let faculty = Caller::faculty("CSE");
    let id = ds_notes(&app, &faculty).await;
    let uploaded = app
        .upload(
            &format!("/api/resources/{id}/attachments"),
            &faculty,
            "notes.pdf",
            "application/pdf",
            b"%PDF-1.7",
        )
        .await;
    let path = format!(
        "/api/attachments/{}",
        str_field(&uploaded.data()["attachment"], "id")
    );

    let response = app.request("DELETE", &path, None, Some(&faculty)).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert!(app.blobs.is_empty().await);

    let gone = app.request("GET", &path, None, Some(&faculty)).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleting_resource_removes_its_files() {
    let app = TestApp::new();
    let faculty = Caller::faculty("CSE");
    let id = ds_notes(&app, &faculty).await;
    for name in ["week1.pdf", "week2.pdf"] {
        let response = app
            .upload(
                &format!("/api/resources/{id}/attachments"),
                &faculty,
                name,
                "application/pdf",
                b"%PDF-1.7",
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
    }
    assert_eq!(app.blobs.len().await, 2);

    let response = app
        .request("DELETE", &format!("/api/resources/{id}"), None, Some(&faculty))
        .await;

    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert!(app.blobs.is_empty().await);
    assert_eq!(app.db.attachment_count().await, 0);
}
