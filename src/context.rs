//! Application logging context
//!
//! Holds the single active [`LoggerFacade`]. The first acquisition builds it
//! and later acquisitions reuse it (their parameters are ignored) until
//! [`LoggingContext::reinitialize`] replaces it. Check-and-set happens under
//! a mutex, so concurrent first acquisitions build exactly one facade.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use crate::config::{self, LoggerConfig, DEFAULT_LOGGER_NAME};
use crate::error::Result;
use crate::facade::LoggerFacade;
use crate::logging::level::Severity;
use crate::logging::logger::Logger;

static GLOBAL: OnceLock<LoggingContext> = OnceLock::new();

/// Owner of the active logger facade
#[derive(Debug)]
pub struct LoggingContext {
    /// Directory for verbosity-based initialization; `None` means `~/.minikit/logs`
    default_dir: Option<PathBuf>,
    default_name: String,
    facade: Mutex<Option<LoggerFacade>>,
}

impl Default for LoggingContext {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggingContext {
    /// Create an empty context using `~/.minikit/logs` and the `default` logger name
    pub fn new() -> Self {
        Self {
            default_dir: None,
            default_name: DEFAULT_LOGGER_NAME.to_string(),
            facade: Mutex::new(None),
        }
    }

    /// The process-wide context used by the free functions in this crate
    pub fn global() -> &'static LoggingContext {
        GLOBAL.get_or_init(LoggingContext::new)
    }

    /// Directory used by verbosity-based initialization
    pub fn with_default_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.default_dir = Some(dir.into());
        self
    }

    /// Logger name used by verbosity-based initialization
    pub fn with_default_name(mut self, name: impl Into<String>) -> Self {
        self.default_name = name.into();
        self
    }

    pub fn default_dir(&self) -> PathBuf {
        self.default_dir.clone().unwrap_or_else(config::logs_dir)
    }

    pub fn default_name(&self) -> &str {
        &self.default_name
    }

    /// Return the active logger, building it from `config` if there is none
    ///
    /// Once a facade exists `config` is ignored.
    pub fn acquire(&self, config: LoggerConfig) -> Result<Logger> {
        let mut slot = self.lock();
        match slot.as_ref() {
            Some(facade) => Ok(facade.logger().clone()),
            None => install(&mut slot, config),
        }
    }

    /// Drop the active facade and build a new one from `config`
    ///
    /// If construction fails the context is left empty.
    pub fn reinitialize(&self, config: LoggerConfig) -> Result<Logger> {
        let mut slot = self.lock();
        install(&mut slot, config)
    }

    /// Reinitialize from verbosity flags in the default directory
    ///
    /// The level is `explicit_level` if given, else DEBUG for `debug`, INFO for
    /// `verbose`, and WARNING otherwise. One record announcing the level is
    /// emitted at DEBUG, INFO, or WARNING respectively, so it is visible at
    /// the chosen threshold.
    pub fn initialize_from_verbosity(
        &self,
        verbose: bool,
        debug: bool,
        console: bool,
        explicit_level: Option<Severity>,
    ) -> Result<Logger> {
        let verbosity = Verbosity {
            verbose,
            debug,
            console,
            explicit_level,
        };
        let mut slot = self.lock();
        self.install_verbosity(&mut slot, self.default_dir(), verbosity)
    }

    /// Return the active logger, initializing a quiet one if there is none
    ///
    /// `directory` only matters when nothing is active yet; it replaces the
    /// default directory for that first construction.
    pub fn current_logger(&self, directory: Option<&Path>) -> Result<Logger> {
        let mut slot = self.lock();
        if let Some(facade) = slot.as_ref() {
            return Ok(facade.logger().clone());
        }

        let directory = directory
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.default_dir());
        self.install_verbosity(&mut slot, directory, Verbosity::default())
    }

    /// The active logger, without initializing anything
    pub fn logger(&self) -> Option<Logger> {
        self.lock().as_ref().map(|f| f.logger().clone())
    }

    pub fn is_initialized(&self) -> bool {
        self.lock().is_some()
    }

    /// Run `f` against the active facade, e.g. to change its level or clean up files
    pub fn with_facade<T>(&self, f: impl FnOnce(&mut LoggerFacade) -> T) -> Option<T> {
        self.lock().as_mut().map(f)
    }

    /// Forget the active facade; the next acquisition builds a new one
    ///
    /// The named logger keeps its sinks until a facade for the same name replaces them.
    pub fn reset(&self) {
        *self.lock() = None;
    }

    fn install_verbosity(
        &self,
        slot: &mut Option<LoggerFacade>,
        directory: PathBuf,
        verbosity: Verbosity,
    ) -> Result<Logger> {
        let level = verbosity.level();
        let config = LoggerConfig::new(directory)
            .with_name(self.default_name.as_str())
            .with_level(level)
            .with_console(verbosity.console);

        let logger = install(slot, config)?;
        let message = format!("Logging initialized at {} level", level);
        if verbosity.debug {
            logger.debug(message);
        } else if verbosity.verbose {
            logger.info(message);
        } else {
            logger.warning(message);
        }
        Ok(logger)
    }

    fn lock(&self) -> MutexGuard<'_, Option<LoggerFacade>> {
        self.facade.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Verbosity {
    verbose: bool,
    debug: bool,
    console: bool,
    explicit_level: Option<Severity>,
}

impl Verbosity {
    fn level(&self) -> Severity {
        match self.explicit_level {
            Some(level) => level,
            None if self.debug => Severity::Debug,
            None if self.verbose => Severity::Info,
            None => Severity::Warning,
        }
    }
}

fn install(slot: &mut Option<LoggerFacade>, config: LoggerConfig) -> Result<Logger> {
    *slot = None;
    let facade = LoggerFacade::new(config)?;
    let logger = facade.logger().clone();
    *slot = Some(facade);
    Ok(logger)
}

/// [`LoggingContext::acquire`] on the global context
pub fn acquire(config: LoggerConfig) -> Result<Logger> {
    LoggingContext::global().acquire(config)
}

/// [`LoggingContext::reinitialize`] on the global context
pub fn reinitialize(config: LoggerConfig) -> Result<Logger> {
    LoggingContext::global().reinitialize(config)
}

/// [`LoggingContext::initialize_from_verbosity`] on the global context
pub fn initialize_from_verbosity(
    verbose: bool,
    debug: bool,
    console: bool,
    explicit_level: Option<Severity>,
) -> Result<Logger> {
    LoggingContext::global().initialize_from_verbosity(verbose, debug, console, explicit_level)
}

/// [`LoggingContext::current_logger`] on the global context
pub fn current_logger(directory: Option<&Path>) -> Result<Logger> {
    LoggingContext::global().current_logger(directory)
}
