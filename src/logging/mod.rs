//! Logging system for minikit
//!
//! Provides named loggers routed through `tracing`, size-rotated file output,
//! console output, text templates, and retention of old log files.

pub mod file_writer;
pub mod format;
pub mod level;
pub mod logger;
pub mod retention;
pub mod sink;

pub use file_writer::{RotatingFileWriter, DEFAULT_BACKUP_COUNT, DEFAULT_MAX_FILE_SIZE};
pub use format::{FormatError, FormatTemplate, Record};
pub use level::Severity;
pub use logger::{logger, Logger};
pub use retention::{cleanup_old_logs, CleanupReport, DEFAULT_RETENTION_DAYS};
pub use sink::{ConsoleStream, EmitError, Sink, SinkInfo, SinkKind};
