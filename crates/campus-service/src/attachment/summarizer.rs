//! Document summarizer used to produce derived attachments.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use tracing::debug;

use campus_core::config::SummarizerConfig;
use campus_core::error::{AppError, ErrorKind};
use campus_core::result::AppResult;

/// Produces a plain-text summary of an uploaded document.
#[async_trait]
pub trait Summarizer: Send + Sync + std::fmt::Debug + 'static {
    /// Whether files with this lowercase extension can be summarized.
    fn supports(&self, extension: &str) -> bool;

    /// Summarize the given document.
    async fn summarize(&self, file_name: &str, mime_type: &str, bytes: Bytes) -> AppResult<String>;
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    summary: String,
}

/// Summarizer backed by an HTTP endpoint.
///
/// The document is posted as the multipart field `file`; the endpoint
/// answers with `{"summary": "..."}`.
#[derive(Debug, Clone)]
pub struct HttpSummarizer {
    client: reqwest::Client,
    endpoint: String,
    extensions: Vec<String>,
}

impl HttpSummarizer {
    /// Build a summarizer from configuration, or `None` when disabled.
    pub fn from_config(config: &SummarizerConfig) -> AppResult<Option<Self>> {
        if !config.enabled {
            return Ok(None);
        }
        if config.endpoint.trim().is_empty() {
            return Err(AppError::configuration(
                "summarizer.endpoint is required when the summarizer is enabled",
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    format!("Failed to build summarizer client: {e}"),
                    e,
                )
            })?;

        Ok(Some(Self {
            client,
            endpoint: config.endpoint.trim().to_string(),
            extensions: config.extensions.iter().map(|e| e.to_lowercase()).collect(),
        }))
    }
}

fn external(context: &str, err: reqwest::Error) -> AppError {
    AppError::with_source(
        ErrorKind::ExternalService,
        format!("Summarizer {context}: {err}"),
        err,
    )
}

#[async_trait]
impl Summarizer for HttpSummarizer {
    fn supports(&self, extension: &str) -> bool {
        self.extensions.iter().any(|e| e == extension)
    }

    async fn summarize(&self, file_name: &str, mime_type: &str, bytes: Bytes) -> AppResult<String> {
        let part = reqwest::multipart::Part::bytes(bytes.to_vec())
            .file_name(file_name.to_string())
            .mime_str(mime_type)
            .map_err(|e| external("rejected the MIME type", e))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| external("request failed", e))?
            .error_for_status()
            .map_err(|e| external("returned an error", e))?;

        let body: SummaryResponse = response
            .json()
            .await
            .map_err(|e| external("returned an unreadable body", e))?;

        let summary = body.summary.trim();
        if summary.is_empty() {
            return Err(AppError::external_service("Summarizer returned an empty summary"));
        }
        debug!(file_name, chars = summary.len(), "Summary received");
        Ok(summary.to_string())
    }
}
