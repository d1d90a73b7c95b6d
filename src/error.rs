//! Error types for the logging facade

use std::io;
use std::path::PathBuf;

/// Errors surfaced to callers of the facade
///
/// Emission never returns these; problems while writing a record are reported
/// on standard error by the sink that hit them.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to create log directory {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("failed to open log file {}: {source}", path.display())]
    OpenLogFile { path: PathBuf, source: io::Error },

    #[error("failed to read log directory {}: {source}", path.display())]
    ReadDir { path: PathBuf, source: io::Error },

    #[error("failed to read config file {}: {source}", path.display())]
    ReadConfig { path: PathBuf, source: io::Error },

    #[error("failed to parse config file {}: {source}", path.display())]
    ParseConfig {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl Error {
    /// The underlying I/O error, if this is a filesystem failure
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            Error::CreateDir { source, .. }
            | Error::OpenLogFile { source, .. }
            | Error::ReadDir { source, .. }
            | Error::ReadConfig { source, .. } => Some(source),
            Error::ParseConfig { .. } => None,
        }
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
