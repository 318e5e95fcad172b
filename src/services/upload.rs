//! Per-request upload pipeline.
//!
//! A parsed [`UploadRequest`] runs through validation and, for storing modes,
//! the storage writer. Failures stay attached to the file they concern: one
//! bad file never stops its siblings and never turns into a request error.

use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::config::PolicySettings;
use crate::models::{FilePart, FileReport, UploadMode, UploadReport, UploadRequest, ValidationResult};
use crate::services::storage::StorageWriter;
use crate::services::validation::validate;

/// Reported when a storing or info request carries no file at all.
pub const NO_FILE_SUBMITTED: &str = "No file was submitted";

/// Validation policy plus storage writer shared by all requests.
#[derive(Clone)]
pub struct UploadHandler {
    policy: PolicySettings,
    writer: StorageWriter,
}

impl UploadHandler {
    pub fn new(policy: PolicySettings, writer: StorageWriter) -> Self {
        Self { policy, writer }
    }

    pub fn writer(&self) -> &StorageWriter {
        &self.writer
    }

    /// Produce the report for one request.
    pub async fn process(&self, request: UploadRequest) -> UploadReport {
        let UploadRequest { mode, parts } = request;

        match mode {
            UploadMode::Simple => match parts.as_slice() {
                [] => UploadReport::rejected(mode, NO_FILE_SUBMITTED),
                [part] => UploadReport::new(mode, vec![self.process_part(part).await]),
                _ => {
                    warn!("Simple upload received {} files, expected one", parts.len());
                    UploadReport::rejected(
                        mode,
                        format!("Expected exactly one file, received {}", parts.len()),
                    )
                }
            },
            UploadMode::Multiple => {
                let mut files = Vec::with_capacity(parts.len());
                for part in &parts {
                    files.push(self.process_part(part).await);
                }
                UploadReport::new(mode, files)
            }
            UploadMode::Info => {
                if parts.is_empty() {
                    return UploadReport::rejected(mode, NO_FILE_SUBMITTED);
                }
                let files = parts
                    .iter()
                    .map(|part| FileReport::new(part, validate(part, &self.policy)))
                    .collect();
                UploadReport::new(mode, files)
            }
        }
    }

    /// Validate, then store; a storage failure becomes the file's reason.
    async fn process_part(&self, part: &FilePart) -> FileReport {
        let decision = validate(part, &self.policy);
        if !decision.is_ok() {
            warn!(
                "Rejected {} ({} bytes): {}",
                part.base_name(),
                part.size(),
                decision.reason.as_deref().unwrap_or_default()
            );
            return FileReport::new(part, decision);
        }

        match self.writer.store(part).await {
            Ok(stored_name) => {
                info!(
                    "Stored {} as {} ({} bytes)",
                    part.base_name(),
                    stored_name,
                    part.size()
                );
                let mut report = FileReport::new(part, ValidationResult::stored(stored_name));
                report.sha256 = Some(hex::encode(Sha256::digest(&part.content)));
                report
            }
            Err(e) => {
                warn!("Failed to store {}: {}", part.base_name(), e);
                FileReport::new(part, ValidationResult::failed(format!("Storage error: {}", e)))
            }
        }
    }
}
