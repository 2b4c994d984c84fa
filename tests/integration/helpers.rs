//! Shared test helpers for integration tests.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use bytes::Bytes;
use http::{HeaderMap, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use campus_api::{AppState, build_app};
use campus_core::config::AppConfig;
use campus_core::types::UserId;
use campus_database::Repositories;
use campus_database::repositories::RecipientDirectory;
use campus_database::repositories::memory::MemoryDatabase;
use campus_entity::profile::{Profile, ProfileRole};
use campus_storage::{MemoryStorageProvider, StorageManager};

const BOUNDARY: &str = "campus-test-boundary";

/// Test application context
pub struct TestApp {
    /// The Axum app for making test requests
    pub router: Router,
    /// In-memory metadata store for direct assertions
    pub db: Arc<MemoryDatabase>,
    /// In-memory blob store for direct assertions
    pub blobs: Arc<MemoryStorageProvider>,
}

/// The principal a request is sent as.
#[derive(Debug, Clone)]
pub struct Caller {
    pub id: Uuid,
    pub department: Option<String>,
    pub year: Option<String>,
}

impl Caller {
    /// A faculty member of `department`, without a year.
    pub fn faculty(department: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            department: Some(department.to_string()),
            year: None,
        }
    }

    /// A student of one cohort. Not registered in the directory.
    pub fn student(department: &str, year: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            department: Some(department.to_string()),
            year: Some(year.to_string()),
        }
    }
}

impl TestApp {
    /// Create a new test application with default configuration
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create a test application with custom configuration
    pub fn with_config(mut config: AppConfig) -> Self {
        config.upload.retry_backoff_ms = 1;

        let db = Arc::new(MemoryDatabase::new());
        let blobs = Arc::new(MemoryStorageProvider::new());
        let storage = StorageManager::new(blobs.clone(), config.storage.delete_retries);
        let repositories = Repositories::memory(db.clone());

        let state = AppState::build(config, repositories, storage, None);
        let router = build_app(state);

        Self { router, db, blobs }
    }

    /// Register a student in the recipient directory and return it
    pub async fn enroll(&self, department: &str, year: &str) -> Caller {
        let caller = Caller::student(department, year);
        let profile = Profile {
            user_id: UserId::from(caller.id),
            role: ProfileRole::Student,
            department: caller.department.clone(),
            year: caller.year.clone(),
        };
        self.db
            .upsert(&profile)
            .await
            .expect("Failed to register student");
        caller
    }

    /// Make a JSON request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        caller: Option<&Caller>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let req = with_caller(Request::builder().method(method).uri(path), caller)
            .header("Content-Type", "application/json")
            .body(Body::from(body_str))
            .expect("Failed to build request");

        self.send(req).await
    }

    /// Upload one file as the multipart field `file`
    pub async fn upload(
        &self,
        path: &str,
        caller: &Caller,
        file_name: &str,
        content_type: &str,
        contents: &[u8],
    ) -> TestResponse {
        let req = with_caller(Request::builder().method("POST").uri(path), Some(caller))
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(file_name, content_type, contents)))
            .expect("Failed to build request");

        self.send(req).await
    }

    /// Create a resource and return the `data` object of the response
    pub async fn create_resource(&self, caller: &Caller, body: Value) -> Value {
        let response = self
            .request("POST", "/api/resources", Some(body), Some(caller))
            .await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "Create failed: {:?}",
            response.body
        );
        response.data().clone()
    }

    async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let raw = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&raw).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
            raw,
        }
    }
}

fn with_caller(mut req: http::request::Builder, caller: Option<&Caller>) -> http::request::Builder {
    if let Some(caller) = caller {
        req = req.header("x-user-id", caller.id.to_string());
        if let Some(department) = &caller.department {
            req = req.header("x-user-department", department);
        }
        if let Some(year) = &caller.year {
            req = req.header("x-user-year", year);
        }
    }
    req
}

fn multipart_body(file_name: &str, content_type: &str, contents: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(contents.len() + 256);
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Parsed JSON body, `Null` for non-JSON bodies
    pub body: Value,
    /// Raw body bytes
    pub raw: Bytes,
}

impl TestResponse {
    /// The `data` field of a successful envelope
    pub fn data(&self) -> &Value {
        self.body.get("data").expect("No data in response")
    }

    /// The `error` code of a failed response
    pub fn error_code(&self) -> &str {
        self.body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }
}

/// Read a string field from a JSON object
pub fn str_field<'a>(value: &'a Value, key: &str) -> &'a str {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_else(|| panic!("Missing string field '{key}' in {value}"))
}
