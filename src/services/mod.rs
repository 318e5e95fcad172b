//! Business logic services.

pub mod cleanup;
pub mod multipart;
pub mod render;
pub mod storage;
pub mod upload;
pub mod validation;

pub use cleanup::{CleanupConfig, start_cleanup_task};
pub use multipart::{ParseLimits, limited_multipart, parse_upload};
pub use render::render_html;
pub use storage::{LocalStorage, StorageBackend, StorageError, StorageWriter};
pub use upload::UploadHandler;
