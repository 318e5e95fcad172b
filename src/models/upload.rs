//! Upload request and report models.

use serde::{Deserialize, Serialize};

use crate::services::storage::content_type_for_extension;

/// Processing path selected by the `action` form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadMode {
    /// One file, stored, single pass/fail message.
    Simple,
    /// Any number of files, stored, one table row per file.
    Multiple,
    /// Metadata only, nothing stored.
    Info,
}

impl UploadMode {
    /// Parse a mode name, ignoring case and surrounding whitespace.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "simple" => Some(Self::Simple),
            "multiple" => Some(Self::Multiple),
            "info" => Some(Self::Info),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Multiple => "multiple",
            Self::Info => "info",
        }
    }
}

impl std::fmt::Display for UploadMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One submitted file.
///
/// `original_name` and `declared_mime_type` come straight from the client and
/// are only ever used for reporting and validation, never as a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub field_name: String,
    pub original_name: String,
    pub declared_mime_type: Option<String>,
    pub content: Vec<u8>,
}

impl FilePart {
    /// Payload length in bytes.
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }

    /// Final path segment of the client name, with either separator style stripped.
    pub fn base_name(&self) -> &str {
        let name = self.original_name.trim();
        name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(name)
    }

    /// Lowercase text after the final `.` of the base name, or empty.
    pub fn extension(&self) -> String {
        self.base_name()
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default()
    }

    /// Declared MIME type, or one inferred from the extension when absent.
    pub fn mime_type(&self) -> String {
        match self.declared_mime_type.as_deref().map(str::trim) {
            Some(declared) if !declared.is_empty() => declared.to_lowercase(),
            _ => content_type_for_extension(&self.extension()).to_string(),
        }
    }
}

/// Parsed multipart submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub mode: UploadMode,
    /// File parts in submission order.
    pub parts: Vec<FilePart>,
}

/// Per-file outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileStatus {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "FAILED")]
    Failed,
}

/// Decision for one file: `reason` is set only on failure, `stored_name`
/// only once the bytes are durably stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stored_name: Option<String>,
}

impl ValidationResult {
    /// Passed validation, not stored (yet).
    pub fn accepted() -> Self {
        Self {
            status: FileStatus::Ok,
            reason: None,
            stored_name: None,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            status: FileStatus::Failed,
            reason: Some(reason.into()),
            stored_name: None,
        }
    }

    pub fn stored(stored_name: impl Into<String>) -> Self {
        Self {
            status: FileStatus::Ok,
            reason: None,
            stored_name: Some(stored_name.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == FileStatus::Ok
    }
}

/// Metadata and outcome reported for one submitted file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    pub field_name: String,
    pub original_name: String,
    pub size: u64,
    pub mime_type: String,
    pub extension: String,
    #[serde(flatten)]
    pub result: ValidationResult,
    /// SHA-256 (hex) of the stored bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

impl FileReport {
    /// Describe a part with the given outcome.
    pub fn new(part: &FilePart, result: ValidationResult) -> Self {
        Self {
            field_name: part.field_name.clone(),
            original_name: part.base_name().to_string(),
            size: part.size(),
            mime_type: part.mime_type(),
            extension: part.extension(),
            result,
            sha256: None,
        }
    }
}

/// Outcome of one request, files in submission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReport {
    pub mode: UploadMode,
    pub files: Vec<FileReport>,
    /// Request-level problem that prevented per-file processing
    /// (e.g. no file submitted in simple mode).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadReport {
    pub fn new(mode: UploadMode, files: Vec<FileReport>) -> Self {
        Self {
            mode,
            files,
            error: None,
        }
    }

    pub fn rejected(mode: UploadMode, error: impl Into<String>) -> Self {
        Self {
            mode,
            files: Vec::new(),
            error: Some(error.into()),
        }
    }

    /// Number of files whose status is OK.
    pub fn ok_count(&self) -> usize {
        self.files.iter().filter(|f| f.result.is_ok()).count()
    }

    /// Number of files whose status is FAILED.
    pub fn failed_count(&self) -> usize {
        self.files.len() - self.ok_count()
    }
}
