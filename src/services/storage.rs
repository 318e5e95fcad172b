//! Storage for accepted uploads.
//!
//! `StorageBackend` is the filesystem collaborator (write/exists/read by
//! stored name). `StorageWriter` sits on top of it, derives collision-resistant
//! names and retries when a name is already taken. No lock is shared between
//! requests: uniqueness comes from the names and from backends refusing to
//! overwrite.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::FilePart;

/// Hidden subdirectory of the storage root holding in-flight writes.
pub const TEMP_DIR_NAME: &str = ".upload_temp";

/// Suffix of in-flight temp files.
pub const TEMP_FILE_SUFFIX: &str = ".part";

/// Prefix of every generated stored name.
const STORED_NAME_PREFIX: &str = "upload_";

/// Attempts at finding a free name before giving up.
const MAX_NAME_ATTEMPTS: usize = 5;

/// Longest client extension carried over into a stored name.
const MAX_STORED_EXTENSION_LEN: usize = 16;

/// Storage operation errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("File already exists: {0}")]
    AlreadyExists(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid stored name: {0}")]
    InvalidName(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Byte store addressed by stored name.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Create `name` holding exactly `data`.
    ///
    /// Either the complete content becomes visible under `name` or nothing
    /// does. Fails with `AlreadyExists` instead of replacing an existing file.
    async fn write(&self, name: &str, data: &[u8]) -> StorageResult<()>;

    /// Check whether `name` is stored.
    async fn exists(&self, name: &str) -> StorageResult<bool>;

    /// Read back the content stored under `name`.
    async fn read(&self, name: &str) -> StorageResult<Vec<u8>>;
}

/// A stored name is a single path segment that is not hidden.
pub fn is_valid_stored_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 255
        && !name.starts_with('.')
        && !name.contains(['/', '\\', '\0'])
}

/// Get the content type for a file based on its extension.
pub fn content_type_for_extension(ext: &str) -> &'static str {
    match ext.trim_start_matches('.').to_lowercase().as_str() {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "xml" => "application/xml",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        _ => "application/octet-stream",
    }
}

/// Build a fresh stored name: `upload_<date>_<time>_<random hex><.ext>`.
pub fn generate_stored_name(extension: &str) -> String {
    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    let random = Uuid::new_v4().simple();
    let extension = storable_extension(extension);

    if extension.is_empty() {
        format!("{}{}_{}", STORED_NAME_PREFIX, timestamp, random)
    } else {
        format!("{}{}_{}.{}", STORED_NAME_PREFIX, timestamp, random, extension)
    }
}

/// Client extensions are kept only when short and plain alphanumeric.
fn storable_extension(extension: &str) -> &str {
    let extension = extension.trim_start_matches('.');
    if extension.len() <= MAX_STORED_EXTENSION_LEN
        && extension.chars().all(|c| c.is_ascii_alphanumeric())
    {
        extension
    } else {
        ""
    }
}

/// Local filesystem backend rooted at the upload directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
    temp_dir: PathBuf,
}

impl LocalStorage {
    /// Create the storage root (and its temp subdirectory) if missing.
    pub async fn new(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        let temp_dir = root.join(TEMP_DIR_NAME);

        tokio::fs::create_dir_all(&temp_dir).await?;

        debug!("Local storage initialized: {}", root.display());

        Ok(Self { root, temp_dir })
    }

    /// Storage root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding in-flight writes.
    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    fn path_for(&self, name: &str) -> StorageResult<PathBuf> {
        if !is_valid_stored_name(name) {
            return Err(StorageError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(name))
    }

    async fn write_temp(&self, temp_path: &Path, data: &[u8]) -> std::io::Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(temp_path)
            .await?;
        file.write_all(data).await?;
        file.flush().await?;
        file.sync_all().await?;
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for LocalStorage {
    async fn write(&self, name: &str, data: &[u8]) -> StorageResult<()> {
        let final_path = self.path_for(name)?;

        if tokio::fs::try_exists(&final_path).await? {
            return Err(StorageError::AlreadyExists(name.to_string()));
        }

        let temp_path = self
            .temp_dir
            .join(format!("{}{}", Uuid::new_v4().simple(), TEMP_FILE_SUFFIX));

        // hard_link refuses an existing target, rename would replace it
        let result = match self.write_temp(&temp_path, data).await {
            Ok(()) => tokio::fs::hard_link(&temp_path, &final_path)
                .await
                .map_err(|e| match e.kind() {
                    ErrorKind::AlreadyExists => StorageError::AlreadyExists(name.to_string()),
                    _ => StorageError::Io(e),
                }),
            Err(e) => Err(StorageError::Io(e)),
        };

        if let Err(e) = tokio::fs::remove_file(&temp_path).await
            && e.kind() != ErrorKind::NotFound
        {
            warn!("Failed to remove temp file {}: {}", temp_path.display(), e);
        }

        if result.is_ok() {
            debug!("Stored {} ({} bytes)", name, data.len());
        }

        result
    }

    async fn exists(&self, name: &str) -> StorageResult<bool> {
        let path = self.path_for(name)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }

    async fn read(&self, name: &str) -> StorageResult<Vec<u8>> {
        let path = self.path_for(name)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound(name.to_string()))
            }
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}

/// Persists accepted parts under unique names.
#[derive(Clone)]
pub struct StorageWriter {
    backend: Arc<dyn StorageBackend>,
}

impl StorageWriter {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// Underlying backend, for retrieval.
    pub fn backend(&self) -> &dyn StorageBackend {
        self.backend.as_ref()
    }

    /// Store a validated part and return its stored name.
    pub async fn store(&self, part: &FilePart) -> StorageResult<String> {
        let extension = part.extension();

        for attempt in 1..=MAX_NAME_ATTEMPTS {
            let name = generate_stored_name(&extension);
            if name == part.base_name() || self.backend.exists(&name).await? {
                debug!("Stored name {} unavailable, generating another", name);
                continue;
            }

            match self.backend.write(&name, &part.content).await {
                Ok(()) => return Ok(name),
                Err(StorageError::AlreadyExists(_)) => {
                    warn!(
                        "Stored name {} already taken (attempt {}/{})",
                        name, attempt, MAX_NAME_ATTEMPTS
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Err(StorageError::AlreadyExists(format!(
            "no free name found after {} attempts",
            MAX_NAME_ATTEMPTS
        )))
    }
}
