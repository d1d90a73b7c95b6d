//! Severity levels
//!
//! Ordered classification of records, parsed once at the boundary with an INFO fallback.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity of a record, ordered from least to most important
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    /// Every severity, lowest first
    pub const ALL: [Severity; 5] = [
        Severity::Debug,
        Severity::Info,
        Severity::Warning,
        Severity::Error,
        Severity::Critical,
    ];

    /// Get the display name for this level
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
        }
    }

    /// Look up a level by name, case-insensitively
    ///
    /// `WARN` and `FATAL` are accepted as aliases for WARNING and CRITICAL.
    pub fn from_name(name: &str) -> Option<Severity> {
        match name.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Some(Severity::Debug),
            "INFO" => Some(Severity::Info),
            "WARNING" | "WARN" => Some(Severity::Warning),
            "ERROR" => Some(Severity::Error),
            "CRITICAL" | "FATAL" => Some(Severity::Critical),
            _ => None,
        }
    }

    /// Parse a level name, falling back to INFO for anything unrecognised
    pub fn parse(name: &str) -> Severity {
        Self::from_name(name).unwrap_or(Severity::Info)
    }

    /// The `tracing` level records of this severity are emitted at
    ///
    /// CRITICAL has no counterpart and shares ERROR; the sink layer tells them
    /// apart through the `critical` field.
    pub fn tracing_level(&self) -> tracing::Level {
        match self {
            Severity::Debug => tracing::Level::DEBUG,
            Severity::Info => tracing::Level::INFO,
            Severity::Warning => tracing::Level::WARN,
            Severity::Error | Severity::Critical => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl From<tracing::Level> for Severity {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE | tracing::Level::DEBUG => Severity::Debug,
            tracing::Level::INFO => Severity::Info,
            tracing::Level::WARN => Severity::Warning,
            tracing::Level::ERROR => Severity::Error,
        }
    }
}

impl From<String> for Severity {
    fn from(name: String) -> Self {
        Severity::parse(&name)
    }
}

impl From<&str> for Severity {
    fn from(name: &str) -> Self {
        Severity::parse(name)
    }
}

impl From<Severity> for String {
    fn from(level: Severity) -> Self {
        level.as_str().to_string()
    }
}
