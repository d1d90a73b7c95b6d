//! Size-rotated log file
//!
//! The active file is appended to until the next record would push it to the
//! size limit. At that point the backups shift up by one (`app.log.1` becomes
//! `app.log.2`, and so on), the active file becomes `app.log.1`, and a fresh
//! active file is opened. The oldest generation past `backup_count` is dropped.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Default size limit before rotation (10 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Default number of rotated generations kept
pub const DEFAULT_BACKUP_COUNT: usize = 5;

/// Path of the `generation`-th backup of `path` (`<path>.<generation>`)
pub fn backup_path(path: &Path, generation: usize) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(format!(".{}", generation));
    PathBuf::from(name)
}

/// Append-only file that rotates by size
#[derive(Debug)]
pub struct RotatingFileWriter {
    path: PathBuf,
    file: File,
    /// Bytes currently in the active file
    size: u64,
    /// Rotation threshold; 0 disables rotation
    max_bytes: u64,
    /// Generations kept; 0 disables rotation
    backup_count: usize,
}

impl RotatingFileWriter {
    /// Open (or create) the active file for appending
    pub fn open(path: impl Into<PathBuf>, max_bytes: u64, backup_count: usize) -> io::Result<Self> {
        let path = path.into();
        let file = open_append(&path)?;
        let size = file.metadata()?.len();

        Ok(Self {
            path,
            file,
            size,
            max_bytes,
            backup_count,
        })
    }

    /// Path of the active file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes currently in the active file
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    pub fn backup_count(&self) -> usize {
        self.backup_count
    }

    /// Append one already-formatted record, rotating first if it would not fit
    pub fn write_record(&mut self, record: &str) -> io::Result<()> {
        if self.should_rollover(record.len() as u64) {
            self.rollover()?;
        }

        self.file.write_all(record.as_bytes())?;
        self.file.flush()?;
        self.size += record.len() as u64;
        Ok(())
    }

    fn should_rollover(&self, incoming: u64) -> bool {
        // An empty file is never rotated, so an oversized record still lands somewhere
        self.max_bytes > 0
            && self.backup_count > 0
            && self.size > 0
            && self.size + incoming >= self.max_bytes
    }

    /// Shift every generation up by one and start a fresh active file
    pub fn rollover(&mut self) -> io::Result<()> {
        self.file.flush()?;

        for generation in (1..self.backup_count).rev() {
            let src = backup_path(&self.path, generation);
            if src.exists() {
                let dst = backup_path(&self.path, generation + 1);
                remove_if_exists(&dst)?;
                fs::rename(&src, &dst)?;
            }
        }

        let first = backup_path(&self.path, 1);
        remove_if_exists(&first)?;
        if self.path.exists() {
            fs::rename(&self.path, &first)?;
        }

        self.file = open_append(&self.path)?;
        self.size = self.file.metadata()?.len();
        Ok(())
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
