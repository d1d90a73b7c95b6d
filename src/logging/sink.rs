//! Record destinations
//!
//! A sink owns a destination (the rotating file or a console stream), a
//! template, and its own severity threshold.

use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use super::file_writer::RotatingFileWriter;
use super::format::{FormatError, FormatTemplate, Record};
use super::level::Severity;

/// What kind of destination a sink writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    File,
    Console,
}

/// Standard stream used by the console sink
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleStream {
    Stdout,
    #[default]
    Stderr,
}

/// Why a record did not reach a sink
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("cannot format record: {0}")]
    Format(#[from] FormatError),
    #[error("cannot write record: {0}")]
    Io(#[from] io::Error),
}

/// Snapshot of a sink's configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkInfo {
    pub kind: SinkKind,
    pub threshold: Severity,
    /// Active file path, for file sinks
    pub path: Option<PathBuf>,
}

enum Target {
    File(RotatingFileWriter),
    Stream(ConsoleStream),
    Writer(Box<dyn Write + Send>),
}

/// A destination with its own threshold and template
pub struct Sink {
    kind: SinkKind,
    threshold: Severity,
    format: FormatTemplate,
    path: Option<PathBuf>,
    target: Mutex<Target>,
}

impl Sink {
    /// Sink writing to a size-rotated file
    pub fn file(writer: RotatingFileWriter, threshold: Severity, format: FormatTemplate) -> Self {
        Self {
            kind: SinkKind::File,
            threshold,
            format,
            path: Some(writer.path().to_path_buf()),
            target: Mutex::new(Target::File(writer)),
        }
    }

    /// Sink writing to standard output or standard error
    pub fn console(stream: ConsoleStream, threshold: Severity, format: FormatTemplate) -> Self {
        Self::console_target(Target::Stream(stream), threshold, format)
    }

    /// Console sink writing to an arbitrary writer instead of a standard stream
    pub fn console_writer(
        writer: Box<dyn Write + Send>,
        threshold: Severity,
        format: FormatTemplate,
    ) -> Self {
        Self::console_target(Target::Writer(writer), threshold, format)
    }

    fn console_target(target: Target, threshold: Severity, format: FormatTemplate) -> Self {
        Self {
            kind: SinkKind::Console,
            threshold,
            format,
            path: None,
            target: Mutex::new(target),
        }
    }

    pub fn kind(&self) -> SinkKind {
        self.kind
    }

    pub fn threshold(&self) -> Severity {
        self.threshold
    }

    pub fn set_threshold(&mut self, threshold: Severity) {
        self.threshold = threshold;
    }

    pub fn format(&self) -> &FormatTemplate {
        &self.format
    }

    /// Active file path, for file sinks
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn info(&self) -> SinkInfo {
        SinkInfo {
            kind: self.kind,
            threshold: self.threshold,
            path: self.path.clone(),
        }
    }

    /// Whether a record of this severity passes the sink's threshold
    pub fn accepts(&self, severity: Severity) -> bool {
        severity >= self.threshold
    }

    /// Render and write one record, ignoring the threshold
    pub fn emit(&self, record: &Record<'_>) -> Result<(), EmitError> {
        let mut line = self.format.render(record)?;
        line.push('\n');

        let mut target = self.target.lock().unwrap_or_else(PoisonError::into_inner);
        match &mut *target {
            Target::File(writer) => writer.write_record(&line)?,
            Target::Stream(ConsoleStream::Stdout) => write_line(&mut io::stdout().lock(), &line)?,
            Target::Stream(ConsoleStream::Stderr) => write_line(&mut io::stderr().lock(), &line)?,
            Target::Writer(writer) => write_line(writer, &line)?,
        }
        Ok(())
    }
}

fn write_line(writer: &mut dyn Write, line: &str) -> io::Result<()> {
    writer.write_all(line.as_bytes())?;
    writer.flush()
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink")
            .field("kind", &self.kind)
            .field("threshold", &self.threshold)
            .field("format", &self.format)
            .field("path", &self.path)
            .finish()
    }
}
