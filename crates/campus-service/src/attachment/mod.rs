//! Attachment upload, listing, download and deletion.

pub mod policy;
pub mod service;
pub mod summarizer;

pub use service::{AttachmentService, FileUpload, UploadOutcome};
pub use summarizer::{HttpSummarizer, Summarizer};
