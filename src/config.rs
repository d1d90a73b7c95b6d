//! Configuration management for the logging facade

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::logging::file_writer::{DEFAULT_BACKUP_COUNT, DEFAULT_MAX_FILE_SIZE};
use crate::logging::format::FormatTemplate;
use crate::logging::level::Severity;
use crate::logging::sink::ConsoleStream;

/// Logical name used when none is given
pub const DEFAULT_LOGGER_NAME: &str = "default";

/// Everything needed to construct a [`LoggerFacade`](crate::LoggerFacade)
///
/// Every field has a default, so a TOML file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// Directory holding the log file and its backups (created if missing)
    #[serde(default = "logs_dir")]
    pub directory: PathBuf,

    /// Severity threshold; unknown names fall back to INFO
    #[serde(default)]
    pub level: Severity,

    /// Size in bytes at which the log file rotates (default: 10 MiB)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Number of rotated files to keep (default: 5)
    #[serde(default = "default_backup_count")]
    pub backup_count: usize,

    /// Also write records to the console
    #[serde(default = "default_console")]
    pub console: bool,

    /// Console stream: "stderr" (default) or "stdout"
    #[serde(default)]
    pub console_stream: ConsoleStream,

    /// Logical logger name
    #[serde(default = "default_name")]
    pub name: String,

    /// Log file name (default: `<name>.log`)
    #[serde(default)]
    pub file_name: Option<String>,

    /// Template for the file sink
    #[serde(default = "FormatTemplate::file_default")]
    pub file_format: FormatTemplate,

    /// Template for the console sink
    #[serde(default = "FormatTemplate::console_default")]
    pub console_format: FormatTemplate,
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

fn default_backup_count() -> usize {
    DEFAULT_BACKUP_COUNT
}

fn default_console() -> bool {
    true
}

fn default_name() -> String {
    DEFAULT_LOGGER_NAME.to_string()
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self::new(logs_dir())
    }
}

impl LoggerConfig {
    /// Default configuration writing into `directory`
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            level: Severity::default(),
            max_file_size: default_max_file_size(),
            backup_count: default_backup_count(),
            console: default_console(),
            console_stream: ConsoleStream::default(),
            name: default_name(),
            file_name: None,
            file_format: FormatTemplate::file_default(),
            console_format: FormatTemplate::console_default(),
        }
    }

    /// Load configuration from a TOML file, or return the defaults if it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| Error::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| Error::ParseConfig {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn with_level(mut self, level: impl Into<Severity>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    pub fn with_backup_count(mut self, count: usize) -> Self {
        self.backup_count = count;
        self
    }

    pub fn with_console(mut self, enabled: bool) -> Self {
        self.console = enabled;
        self
    }

    pub fn with_console_stream(mut self, stream: ConsoleStream) -> Self {
        self.console_stream = stream;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn with_file_format(mut self, format: FormatTemplate) -> Self {
        self.file_format = format;
        self
    }

    pub fn with_console_format(mut self, format: FormatTemplate) -> Self {
        self.console_format = format;
        self
    }

    /// Log file name, defaulting to `<name>.log`
    pub fn log_file_name(&self) -> String {
        self.file_name
            .clone()
            .unwrap_or_else(|| format!("{}.log", self.name))
    }

    /// Directory with `~` and environment variables expanded
    ///
    /// Paths that are not valid UTF-8, or that name an unset variable, are
    /// used as written (apart from `~`).
    pub fn resolved_directory(&self) -> PathBuf {
        let Some(raw) = self.directory.to_str() else {
            return self.directory.clone();
        };

        let expanded = shellexpand::full(raw).unwrap_or_else(|_| shellexpand::tilde(raw));
        match expanded {
            Cow::Borrowed(_) => self.directory.clone(),
            Cow::Owned(path) => PathBuf::from(path),
        }
    }
}

/// Get the base configuration directory (~/.minikit)
/// Falls back to ./.minikit if home directory cannot be determined
pub fn config_dir() -> PathBuf {
    try_config_dir().unwrap_or_else(|| {
        tracing::warn!("Could not determine home directory, using current directory for logs");
        PathBuf::from(".minikit")
    })
}

/// Try to get the base configuration directory, returning None if home dir is unavailable
pub fn try_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".minikit"))
}

/// Get the path to the default logs directory
pub fn logs_dir() -> PathBuf {
    config_dir().join("logs")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = LoggerConfig::default();
        assert_eq!(config.level, Severity::Info);
        assert_eq!(config.max_file_size, 10 * 1024 * 1024);
        assert_eq!(config.backup_count, 5);
        assert!(config.console);
        assert_eq!(config.console_stream, ConsoleStream::Stderr);
        assert_eq!(config.name, "default");
        assert_eq!(config.log_file_name(), "default.log");
        assert!(config.directory.ends_with(".minikit/logs"));
    }

    #[test]
    fn test_log_file_name_follows_name() {
        let config = LoggerConfig::new("/tmp/x").with_name("worker");
        assert_eq!(config.log_file_name(), "worker.log");

        let config = config.with_file_name("custom.txt");
        assert_eq!(config.log_file_name(), "custom.txt");
    }

    #[test]
    fn test_with_level_accepts_strings() {
        let config = LoggerConfig::new("/tmp/x").with_level("warning");
        assert_eq!(config.level, Severity::Warning);

        let config = config.with_level("bogus");
        assert_eq!(config.level, Severity::Info);
    }

    #[test]
    fn test_config_serialization() {
        let config = LoggerConfig::new("/var/log/app")
            .with_level(Severity::Error)
            .with_console(false);
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: LoggerConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: LoggerConfig = toml::from_str(
            r#"
            directory = "/srv/logs"
            level = "debug"
            console_stream = "stdout"

            [file_format]
            pattern = "[%timestamp%] %LEVEL%: %message%"
            "#,
        )
        .unwrap();

        assert_eq!(parsed.directory, PathBuf::from("/srv/logs"));
        assert_eq!(parsed.level, Severity::Debug);
        assert_eq!(parsed.console_stream, ConsoleStream::Stdout);
        assert_eq!(parsed.backup_count, 5);
        assert_eq!(parsed.file_format.pattern, "[%timestamp%] %LEVEL%: %message%");
        assert_eq!(parsed.file_format.timestamp, "%Y-%m-%d %H:%M:%S");
        assert_eq!(parsed.console_format, FormatTemplate::console_default());
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = LoggerConfig::load(&temp_dir.path().join("missing.toml")).unwrap();
        assert_eq!(config, LoggerConfig::default());
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("logging.toml");
        std::fs::write(&path, "max_file_size = \"huge\"").unwrap();

        let err = LoggerConfig::load(&path).unwrap_err();
        assert!(matches!(err, Error::ParseConfig { .. }));
    }

    #[test]
    fn test_resolved_directory_expands_tilde() {
        let config = LoggerConfig::new("~/logs");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(config.resolved_directory(), home.join("logs"));
        }

        let plain = LoggerConfig::new("/already/absolute");
        assert_eq!(plain.resolved_directory(), PathBuf::from("/already/absolute"));
    }

    #[test]
    fn test_config_dir_does_not_panic() {
        let dir = config_dir();
        assert!(dir.ends_with(".minikit"));
    }

    #[test]
    fn test_try_config_dir() {
        // Can't assert Some: CI might not have a home dir
        if let Some(path) = try_config_dir() {
            assert!(path.ends_with(".minikit"));
        }
    }
}
