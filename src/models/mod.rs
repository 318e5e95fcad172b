//! Domain models for the upload handler.

pub mod upload;

// Re-export commonly used types
pub use upload::{
    FilePart, FileReport, FileStatus, UploadMode, UploadReport, UploadRequest, ValidationResult,
};
