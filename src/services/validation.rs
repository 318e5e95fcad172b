//! Per-file accept/reject decisions.
//!
//! Rules run in a fixed order (size, extension, MIME type) and the first
//! failing rule supplies the reason, so the same input always yields the
//! same outcome regardless of mode.

use crate::config::PolicySettings;
use crate::models::{FilePart, ValidationResult};

/// Decide whether a part may be stored.
pub fn validate(part: &FilePart, policy: &PolicySettings) -> ValidationResult {
    if let Some(reason) = check_size(part.size(), policy) {
        return ValidationResult::failed(reason);
    }

    let extension = part.extension();
    if !is_valid_extension(&extension, policy) {
        return ValidationResult::failed(if extension.is_empty() {
            "Files without an extension are not allowed".to_string()
        } else {
            format!("File extension '.{}' is not allowed", extension)
        });
    }

    let mime_type = part.mime_type();
    if !is_valid_mime_type(&mime_type, policy) {
        return ValidationResult::failed(format!("MIME type '{}' is not allowed", mime_type));
    }

    ValidationResult::accepted()
}

fn check_size(size: u64, policy: &PolicySettings) -> Option<String> {
    match policy.max_file_size {
        Some(max) if size > max => Some(format!(
            "File size of {} bytes exceeds maximum allowed size of {} bytes",
            size, max
        )),
        _ => None,
    }
}

/// Check an extension (with or without leading dot) against the block and allow lists.
///
/// A blocked extension always fails; a non-empty allow-list admits only its entries.
pub fn is_valid_extension(extension: &str, policy: &PolicySettings) -> bool {
    let ext = extension.trim().trim_start_matches('.').to_lowercase();

    if policy.blocked_extensions.iter().any(|blocked| *blocked == ext) {
        return false;
    }

    policy.allowed_extensions.is_empty()
        || policy.allowed_extensions.iter().any(|allowed| *allowed == ext)
}

/// Check a MIME type against the block and allow lists, ignoring parameters.
pub fn is_valid_mime_type(mime_type: &str, policy: &PolicySettings) -> bool {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase();

    if policy.blocked_mime_types.iter().any(|blocked| *blocked == essence) {
        return false;
    }

    policy.allowed_mime_types.is_empty()
        || policy.allowed_mime_types.iter().any(|allowed| *allowed == essence)
}
