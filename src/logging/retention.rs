//! Log file retention management
//!
//! Handles cleanup of old log files (active files and rotated backups) based on age.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::error::{Error, Result};

/// Default retention period in days
pub const DEFAULT_RETENTION_DAYS: u64 = 30;

/// Outcome of a cleanup pass
#[derive(Debug, Default)]
pub struct CleanupReport {
    /// Files that were deleted
    pub removed: Vec<PathBuf>,
    /// Files that were old enough but could not be deleted
    pub failed: Vec<(PathBuf, io::Error)>,
}

impl CleanupReport {
    /// Number of files deleted
    pub fn removed_count(&self) -> usize {
        self.removed.len()
    }

    /// Whether every expired file was deleted
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Whether a file name matches the `*.log*` glob
///
/// Like a shell glob, `*` does not match a leading dot.
pub fn is_log_file_name(name: &str) -> bool {
    !name.starts_with('.') && name.contains(".log")
}

/// Delete `*.log*` entries in `logs_dir` last modified before now minus `retention_days`
///
/// Deletion is best effort: a file that cannot be deleted is recorded in the
/// report and left in place. A missing directory has nothing to clean; failing
/// to read an existing one is an error.
pub fn cleanup_old_logs(logs_dir: &Path, retention_days: u64) -> Result<CleanupReport> {
    let retention_duration = Duration::from_secs(retention_days.saturating_mul(24 * 60 * 60));
    let cutoff = SystemTime::now()
        .checked_sub(retention_duration)
        .unwrap_or(SystemTime::UNIX_EPOCH);
    cleanup_logs_before(logs_dir, cutoff)
}

/// Delete `*.log*` entries in `logs_dir` last modified before `cutoff`
pub fn cleanup_logs_before(logs_dir: &Path, cutoff: SystemTime) -> Result<CleanupReport> {
    let read_dir_error = |source| Error::ReadDir {
        path: logs_dir.to_path_buf(),
        source,
    };

    let mut report = CleanupReport::default();
    if !logs_dir.exists() {
        return Ok(report);
    }

    for entry in fs::read_dir(logs_dir).map_err(read_dir_error)? {
        let entry = entry.map_err(read_dir_error)?;
        let path = entry.path();

        match path.file_name().and_then(|n| n.to_str()) {
            Some(name) if is_log_file_name(name) => {}
            _ => continue,
        }

        // Check file modification time
        let modified = match entry.metadata().and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(e) => {
                report.failed.push((path, e));
                continue;
            }
        };

        if modified < cutoff {
            match fs::remove_file(&path) {
                Ok(()) => report.removed.push(path),
                Err(e) => report.failed.push((path, e)),
            }
        }
    }

    report.removed.sort();
    Ok(report)
}
