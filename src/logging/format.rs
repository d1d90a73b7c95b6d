//! Text templates for log records
//!
//! A template is a pair of patterns: the line pattern with `%name%` placeholders
//! and a strftime pattern for the `%timestamp%` placeholder. Templates are not
//! validated up front; a malformed one fails when a record is rendered.

use std::borrow::Cow;
use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::level::Severity;

/// Default line pattern for the file sink
pub const DEFAULT_FILE_PATTERN: &str = "%timestamp% | %LEVEL:8% | %function%:%line% | %message%";
/// Default timestamp pattern for the file sink
pub const DEFAULT_FILE_TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S";
/// Default line pattern for the console sink
pub const DEFAULT_CONSOLE_PATTERN: &str = "%timestamp% | %LEVEL:8% | %function% | %message%";
/// Default timestamp pattern for the console sink
pub const DEFAULT_CONSOLE_TIMESTAMP: &str = "%H:%M:%S";

/// Why a record could not be rendered
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("unterminated placeholder in pattern near `{0}`")]
    Unterminated(String),
    #[error("unknown placeholder `%{0}%`")]
    UnknownPlaceholder(String),
    #[error("invalid width in placeholder `%{0}%`")]
    InvalidWidth(String),
    #[error("invalid timestamp pattern `{0}`")]
    InvalidTimestamp(String),
}

/// A record as seen by a formatter
#[derive(Debug, Clone)]
pub struct Record<'a> {
    pub time: DateTime<Local>,
    pub severity: Severity,
    /// Name of the logger that emitted the record
    pub logger: &'a str,
    /// Module path of the emitting code, when known
    pub module: Option<&'a str>,
    pub file: Option<&'a str>,
    pub line: Option<u32>,
    pub message: &'a str,
}

/// Message pattern plus timestamp pattern
///
/// Placeholders: `%timestamp%`, `%LEVEL%`, `%level%`, `%name%`, `%function%`,
/// `%file%`, `%line%` and `%message%`, each optionally padded as
/// `%name:width%` (width at most 65535). `%%` is a literal percent sign.
///
/// `%function%` is the module path for `tracing` macro calls. Records from
/// [`Logger::info`](crate::Logger::info) and the other level methods carry no
/// module, so it shows the caller's source file, and `function:line` in the
/// default template reads like `src/main.rs:42`. Without either it shows `-`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatTemplate {
    /// Line pattern, e.g. `[%timestamp%] %LEVEL%: %message%`
    pub pattern: String,
    /// strftime pattern used for `%timestamp%`
    #[serde(default = "default_timestamp")]
    pub timestamp: String,
}

fn default_timestamp() -> String {
    DEFAULT_FILE_TIMESTAMP.to_string()
}

impl FormatTemplate {
    /// Create a template from a line pattern and a timestamp pattern
    pub fn new(pattern: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            timestamp: timestamp.into(),
        }
    }

    /// `timestamp | LEVEL | function:line | message` with a full date
    pub fn file_default() -> Self {
        Self::new(DEFAULT_FILE_PATTERN, DEFAULT_FILE_TIMESTAMP)
    }

    /// `timestamp | LEVEL | function | message` with time of day only
    pub fn console_default() -> Self {
        Self::new(DEFAULT_CONSOLE_PATTERN, DEFAULT_CONSOLE_TIMESTAMP)
    }

    /// Render a record into a single line (without the trailing newline)
    pub fn render(&self, record: &Record<'_>) -> Result<String, FormatError> {
        let mut out = String::with_capacity(self.pattern.len() + record.message.len());
        let mut rest = self.pattern.as_str();

        while let Some(start) = rest.find('%') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let end = after
                .find('%')
                .ok_or_else(|| FormatError::Unterminated(rest[start..].to_string()))?;
            let token = &after[..end];
            rest = &after[end + 1..];

            // `%%` is a literal percent sign
            if token.is_empty() {
                out.push('%');
                continue;
            }

            let (name, width) = match token.split_once(':') {
                Some((name, width)) => {
                    // Widths beyond u16 are rejected by `std::fmt` at runtime
                    let width = width
                        .parse::<u16>()
                        .map_err(|_| FormatError::InvalidWidth(token.to_string()))?;
                    (name, Some(usize::from(width)))
                }
                None => (token, None),
            };

            let value = self.placeholder(name, record)?;
            match width {
                Some(width) => out.push_str(&format!("{value:<width$}")),
                None => out.push_str(&value),
            }
        }

        out.push_str(rest);
        Ok(out)
    }

    fn placeholder<'r>(&self, name: &str, record: &Record<'r>) -> Result<Cow<'r, str>, FormatError> {
        let value = match name {
            "timestamp" => Cow::Owned(format_timestamp(&self.timestamp, &record.time)?),
            "LEVEL" => Cow::Borrowed(record.severity.as_str()),
            "level" => Cow::Owned(record.severity.as_str().to_ascii_lowercase()),
            "name" => Cow::Borrowed(record.logger),
            "function" => Cow::Borrowed(record.module.or(record.file).unwrap_or("-")),
            "file" => Cow::Borrowed(record.file.unwrap_or("-")),
            "line" => Cow::Owned(record.line.unwrap_or(0).to_string()),
            "message" => Cow::Borrowed(record.message),
            other => return Err(FormatError::UnknownPlaceholder(other.to_string())),
        };
        Ok(value)
    }
}

fn format_timestamp(pattern: &str, time: &DateTime<Local>) -> Result<String, FormatError> {
    let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(FormatError::InvalidTimestamp(pattern.to_string()));
    }

    let mut out = String::new();
    write!(out, "{}", time.format_with_items(items.iter()))
        .map_err(|_| FormatError::InvalidTimestamp(pattern.to_string()))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(message: &str) -> Record<'_> {
        Record {
            time: Local.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap(),
            severity: Severity::Warning,
            logger: "default",
            module: Some("app::worker"),
            file: Some("src/worker.rs"),
            line: Some(42),
            message,
        }
    }

    #[test]
    fn test_file_default_layout() {
        let line = FormatTemplate::file_default()
            .render(&record("disk almost full"))
            .unwrap();
        assert_eq!(
            line,
            "2026-03-04 05:06:07 | WARNING  | app::worker:42 | disk almost full"
        );
    }

    #[test]
    fn test_console_default_layout() {
        let line = FormatTemplate::console_default()
            .render(&record("disk almost full"))
            .unwrap();
        assert_eq!(line, "05:06:07 | WARNING  | app::worker | disk almost full");
    }

    #[test]
    fn test_custom_template() {
        let template = FormatTemplate::new("[%timestamp%] %LEVEL%: %message%", "%H:%M");
        let line = template.render(&record("hello")).unwrap();
        assert_eq!(line, "[05:06] WARNING: hello");
        assert!(!line.contains(" | "));
    }

    #[test]
    fn test_literal_percent_and_lowercase_level() {
        let template = FormatTemplate::new("%level% 100%% %name%", "%H");
        let line = template.render(&record("ignored")).unwrap();
        assert_eq!(line, "warning 100% default");
    }

    #[test]
    fn test_function_falls_back_to_file() {
        let mut rec = record("x");
        rec.module = None;
        let template = FormatTemplate::new("%function%:%line%", "%H");
        assert_eq!(template.render(&rec).unwrap(), "src/worker.rs:42");

        rec.file = None;
        rec.line = None;
        assert_eq!(template.render(&rec).unwrap(), "-:0");
    }

    #[test]
    fn test_malformed_templates_fail_on_render() {
        let rec = record("x");
        assert!(matches!(
            FormatTemplate::new("%message", "%H").render(&rec),
            Err(FormatError::Unterminated(_))
        ));
        assert_eq!(
            FormatTemplate::new("%msg%", "%H").render(&rec),
            Err(FormatError::UnknownPlaceholder("msg".to_string()))
        );
        assert!(matches!(
            FormatTemplate::new("%LEVEL:wide%", "%H").render(&rec),
            Err(FormatError::InvalidWidth(_))
        ));
        assert_eq!(
            FormatTemplate::new("%message:70000%", "%H").render(&rec),
            Err(FormatError::InvalidWidth("message:70000".to_string()))
        );
        assert!(matches!(
            FormatTemplate::new("%timestamp%", "%Y %!").render(&rec),
            Err(FormatError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_largest_width_pads() {
        let line = FormatTemplate::new("%LEVEL:65535%|", "%H")
            .render(&record("x"))
            .unwrap();
        assert_eq!(line.len(), 65536);
        assert!(line.starts_with("WARNING "));
        assert!(line.ends_with(" |"));
    }

    #[test]
    fn test_timestamp_only_evaluated_when_used() {
        // A broken timestamp pattern is harmless if the line never asks for it
        let template = FormatTemplate::new("%message%", "%!");
        assert_eq!(template.render(&record("ok")).unwrap(), "ok");
    }
}
