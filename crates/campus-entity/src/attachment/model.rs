//! Attachment entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use campus_core::types::{AttachmentId, ResourceId, UserId};

/// Metadata row for a blob attached to a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Attachment {
    /// Unique attachment identifier.
    pub id: AttachmentId,
    /// The owning resource.
    pub resource_id: ResourceId,
    /// Original file name as uploaded.
    pub file_name: String,
    /// MIME type reported by the client.
    pub mime_type: String,
    /// Payload size in bytes.
    pub size_bytes: i64,
    /// Blob path inside the storage provider.
    pub storage_ref: String,
    /// Primary attachment this one was generated from (summaries).
    pub derived_from: Option<AttachmentId>,
    /// When the attachment was stored.
    pub created_at: DateTime<Utc>,
}

impl Attachment {
    /// Build the blob path `<owner>/<resource>/<attachment>/<sanitized name>`.
    pub fn storage_ref_for(
        owner_id: UserId,
        resource_id: ResourceId,
        attachment_id: AttachmentId,
        file_name: &str,
    ) -> String {
        format!(
            "{owner_id}/{resource_id}/{attachment_id}/{}",
            sanitize_file_name(file_name)
        )
    }

    /// Lowercase extension of the file name, if any.
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.file_name)
    }

    /// Whether this attachment was generated from another one.
    pub fn is_derived(&self) -> bool {
        self.derived_from.is_some()
    }
}

/// Lowercase extension of `file_name`, without the dot.
///
/// A leading dot (`.env`) or a trailing dot (`notes.`) is not an extension.
pub fn extension_of(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

/// File name without its extension.
pub fn stem_of(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    }
}

/// Reduce a client-supplied name to a single safe path segment.
pub fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name)
        .trim();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}
