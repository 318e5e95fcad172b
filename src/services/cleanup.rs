//! Cleanup service for abandoned temp files.
//!
//! Writes that die between creating their temp file and linking it into
//! place (crash, kill) leave a `.part` file behind in the temp directory.
//! Those files are never visible as stored uploads; this task only reclaims
//! their space.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::time::interval;
use tracing::{debug, error, info, warn};

use crate::services::storage::TEMP_FILE_SUFFIX;

/// Configuration for the cleanup service.
#[derive(Debug, Clone)]
pub struct CleanupConfig {
    /// Directory holding in-flight writes
    pub temp_dir: PathBuf,
    /// Age after which a temp file counts as abandoned
    pub retention_secs: u64,
    /// How often to run cleanup (in seconds)
    pub interval_secs: u64,
}

/// Start the cleanup background task.
///
/// The first sweep runs immediately, then once per interval.
pub fn start_cleanup_task(config: CleanupConfig) {
    tokio::spawn(async move {
        info!(
            "Starting cleanup service (retention: {} seconds, interval: {} seconds)",
            config.retention_secs, config.interval_secs
        );

        let mut ticker = interval(Duration::from_secs(config.interval_secs.max(1)));
        let max_age = Duration::from_secs(config.retention_secs);

        loop {
            ticker.tick().await;

            match sweep_temp_files(&config.temp_dir, max_age).await {
                Ok(0) => debug!("Cleanup found no abandoned temp files"),
                Ok(removed) => info!("Removed {} abandoned temp files", removed),
                Err(e) => error!("Cleanup task error: {}", e),
            }
        }
    });
}

/// Remove temp files older than `max_age`; returns how many were deleted.
pub async fn sweep_temp_files(temp_dir: &Path, max_age: Duration) -> std::io::Result<usize> {
    let mut removed = 0;
    let mut entries = match tokio::fs::read_dir(temp_dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_temp_file = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(TEMP_FILE_SUFFIX));
        if !is_temp_file {
            continue;
        }

        let metadata = entry.metadata().await?;
        let expired = metadata
            .modified()
            .ok()
            .and_then(|modified| modified.elapsed().ok())
            .is_some_and(|age| age >= max_age);
        if !metadata.is_file() || !expired {
            continue;
        }

        match tokio::fs::remove_file(&path).await {
            Ok(()) => removed += 1,
            Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
        }
    }

    Ok(removed)
}
