//! File attachments owned by a resource.

pub mod model;

pub use model::{Attachment, extension_of, sanitize_file_name, stem_of};
