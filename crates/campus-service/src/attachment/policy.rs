//! Per-call upload policy enforcement.

use campus_core::config::UploadPolicy;
use campus_core::error::AppError;
use campus_entity::attachment::extension_of;

/// Check a pending upload against `policy` before anything is written.
///
/// The size check runs first so an oversized file with a bad extension
/// reports the size problem.
pub fn enforce(policy: &UploadPolicy, file_name: &str, size_bytes: u64) -> Result<(), AppError> {
    if size_bytes > policy.max_size_bytes {
        return Err(AppError::payload_too_large(format!(
            "'{file_name}' is {size_bytes} bytes; the limit is {} bytes",
            policy.max_size_bytes
        )));
    }

    let Some(extension) = extension_of(file_name) else {
        return Err(AppError::unsupported_media_type(format!(
            "'{file_name}' has no file extension"
        )));
    };
    let allowed = policy
        .allowed_extensions
        .iter()
        .any(|e| e.eq_ignore_ascii_case(&extension));
    if !allowed {
        return Err(AppError::unsupported_media_type(format!(
            "'.{extension}' files are not accepted (allowed: {})",
            policy.allowed_extensions.join(", ")
        )));
    }
    Ok(())
}
