//! Attachment upload configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

const MB: u64 = 1024 * 1024;

/// Size and type policy applied to a single upload call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadPolicy {
    /// Largest accepted payload in bytes.
    pub max_size_bytes: u64,
    /// Accepted file extensions, lowercase and without the leading dot.
    pub allowed_extensions: Vec<String>,
}

impl UploadPolicy {
    /// Build a policy from a size limit and a list of extensions.
    pub fn new(max_size_bytes: u64, extensions: &[&str]) -> Self {
        Self {
            max_size_bytes,
            allowed_extensions: extensions.iter().map(|e| e.to_lowercase()).collect(),
        }
    }

    /// Office and PDF documents (study materials, assignment briefs).
    pub fn documents() -> Self {
        Self::new(
            25 * MB,
            &["pdf", "doc", "docx", "ppt", "pptx", "txt", "md"],
        )
    }

    /// Images (notice boards, profile pictures, scanned leave letters).
    pub fn images() -> Self {
        Self::new(5 * MB, &["png", "jpg", "jpeg", "gif", "webp"])
    }

    /// Office formats including spreadsheets (result sheets, timetables).
    pub fn office() -> Self {
        Self::new(
            50 * MB,
            &["pdf", "doc", "docx", "xls", "xlsx", "csv", "ppt", "pptx"],
        )
    }
}

/// Upload pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Name of the policy used when the caller does not pick one.
    #[serde(default = "default_policy_name")]
    pub default_policy: String,
    /// Named policies selectable per call.
    #[serde(default = "default_policies")]
    pub policies: BTreeMap<String, UploadPolicy>,
    /// How many times the metadata insert is attempted before the blob is rolled back.
    #[serde(default = "default_metadata_retries")]
    pub metadata_retries: u32,
    /// Linear backoff step between metadata attempts, in milliseconds.
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,
    /// Deadline applied when the caller supplies none, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl UploadConfig {
    /// Resolve a policy by name, falling back to the default policy.
    pub fn policy(&self, name: Option<&str>) -> Option<&UploadPolicy> {
        self.policies.get(name.unwrap_or(&self.default_policy))
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            default_policy: default_policy_name(),
            policies: default_policies(),
            metadata_retries: default_metadata_retries(),
            retry_backoff_ms: default_retry_backoff(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_policy_name() -> String {
    "documents".to_string()
}

fn default_policies() -> BTreeMap<String, UploadPolicy> {
    BTreeMap::from([
        ("documents".to_string(), UploadPolicy::documents()),
        ("images".to_string(), UploadPolicy::images()),
        ("office".to_string(), UploadPolicy::office()),
    ])
}

fn default_metadata_retries() -> u32 {
    3
}

fn default_retry_backoff() -> u64 {
    50
}

fn default_timeout() -> u64 {
    60
}
