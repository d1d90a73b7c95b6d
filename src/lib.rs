//! minikit-log - process-wide logging facade
//!
//! A [`LoggerFacade`] attaches a size-rotated file sink and an optional console
//! sink to a named logger. A [`LoggingContext`] keeps the active facade so the
//! rest of an application can acquire the same logger again.
//!
//! ```no_run
//! use minikit_log::{LoggerConfig, LoggingContext};
//!
//! let ctx = LoggingContext::new();
//! let logger = ctx
//!     .acquire(LoggerConfig::new("/var/log/myapp").with_level("WARNING"))
//!     .unwrap();
//! logger.warning("disk usage above 90%");
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod facade;
pub mod logging;

pub use config::LoggerConfig;
pub use context::{acquire, current_logger, initialize_from_verbosity, reinitialize, LoggingContext};
pub use error::{Error, Result};
pub use facade::LoggerFacade;
pub use logging::{
    CleanupReport, ConsoleStream, FormatTemplate, Logger, Severity, SinkInfo, SinkKind,
};
