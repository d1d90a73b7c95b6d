//! The logger facade
//!
//! Builds the sink set (size-rotated file plus optional console) for one
//! named logger and keeps the configuration it was built from.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::LoggerConfig;
use crate::error::{Error, Result};
use crate::logging::file_writer::RotatingFileWriter;
use crate::logging::level::Severity;
use crate::logging::logger::{self, Logger};
use crate::logging::retention::{self, CleanupReport};
use crate::logging::sink::Sink;

/// A configured logger: one file sink and an optional console sink
#[derive(Debug)]
pub struct LoggerFacade {
    config: LoggerConfig,
    directory: PathBuf,
    log_file: PathBuf,
    logger: Logger,
}

impl LoggerFacade {
    /// Create the log directory and attach fresh sinks to the named logger
    ///
    /// Any sinks previously attached to the same name are removed first.
    pub fn new(config: LoggerConfig) -> Result<Self> {
        let directory = config.resolved_directory();
        fs::create_dir_all(&directory).map_err(|source| Error::CreateDir {
            path: directory.clone(),
            source,
        })?;

        let log_file = directory.join(config.log_file_name());
        let writer = RotatingFileWriter::open(&log_file, config.max_file_size, config.backup_count)
            .map_err(|source| Error::OpenLogFile {
                path: log_file.clone(),
                source,
            })?;

        let level = config.level;
        let mut sinks = vec![Sink::file(writer, level, config.file_format.clone())];
        if config.console {
            sinks.push(Sink::console(
                config.console_stream,
                level,
                config.console_format.clone(),
            ));
        }

        let logger = logger::logger(&config.name);
        logger.replace_sinks(level, sinks);

        Ok(Self {
            config,
            directory,
            log_file,
            logger,
        })
    }

    /// Change the threshold of the logger and every attached sink
    pub fn set_level(&mut self, level: Severity) {
        self.config.level = level;
        self.logger.set_level(level);
    }

    /// Like [`set_level`](Self::set_level), parsing the name with an INFO fallback
    pub fn set_level_str(&mut self, level: &str) {
        self.set_level(Severity::parse(level));
    }

    /// Delete log files in the directory not modified within `retention_days`
    ///
    /// Each deleted file is logged at INFO. Files that could not be deleted are
    /// listed in the report and left alone.
    pub fn cleanup_old_logs(&self, retention_days: u64) -> Result<CleanupReport> {
        let report = retention::cleanup_old_logs(&self.directory, retention_days)?;

        for path in &report.removed {
            let name = path.file_name().unwrap_or(path.as_os_str()).to_string_lossy();
            self.logger.info(format!("Cleaned up old log file: {}", name));
        }
        Ok(report)
    }

    /// The wrapped logger handle
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn level(&self) -> Severity {
        self.config.level
    }

    /// Directory holding the log files, after `~` expansion
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path of the active log file
    pub fn log_file_path(&self) -> &Path {
        &self.log_file
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }
}
