//! Named loggers on top of `tracing`
//!
//! Every logical name maps to exactly one [`Logger`] for the life of the
//! process. A logger owns a private `tracing` dispatcher whose only layer
//! forwards events to the logger's current sink set, so loggers never touch
//! (or depend on) the global subscriber.

use std::collections::HashMap;
use std::fmt;
use std::panic::Location;
use std::sync::{Arc, Mutex, OnceLock, PoisonError, RwLock};

use chrono::Local;
use tracing::field::{Field, Visit};
use tracing::{Dispatch, Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

use super::format::Record;
use super::level::Severity;
use super::sink::{EmitError, Sink, SinkInfo};

/// Field marking an ERROR event as CRITICAL
const CRITICAL_FIELD: &str = "critical";
/// Fields carrying the caller location of [`Logger::log`]
const CALLER_FILE_FIELD: &str = "caller.file";
const CALLER_LINE_FIELD: &str = "caller.line";

static LOGGERS: OnceLock<Mutex<HashMap<String, Logger>>> = OnceLock::new();

/// Get the logger registered under `name`, creating it on first use
///
/// A freshly created logger has no sinks and drops every record until a
/// facade attaches some.
pub fn logger(name: &str) -> Logger {
    let registry = LOGGERS.get_or_init(Default::default);
    let mut loggers = registry.lock().unwrap_or_else(PoisonError::into_inner);
    loggers
        .entry(name.to_string())
        .or_insert_with(|| Logger::new(name))
        .clone()
}

struct LoggerState {
    level: Severity,
    sinks: Vec<Sink>,
}

struct Shared {
    name: String,
    state: RwLock<LoggerState>,
}

impl Shared {
    fn handle(&self, record: &Record<'_>) {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        if record.severity < state.level {
            return;
        }

        for sink in state.sinks.iter().filter(|s| s.accepts(record.severity)) {
            if let Err(e) = sink.emit(record) {
                report_emit_error(&self.name, &e);
            }
        }
    }
}

/// Records cannot be logged through the logger that failed to write them
fn report_emit_error(logger: &str, error: &EmitError) {
    eprintln!("--- Logging error --- logger `{}`: {}", logger, error);
}

/// Handle to a named logger
///
/// Cloning is cheap; every clone refers to the same logger.
#[derive(Clone)]
pub struct Logger {
    shared: Arc<Shared>,
    dispatch: Dispatch,
}

impl Logger {
    fn new(name: &str) -> Self {
        let shared = Arc::new(Shared {
            name: name.to_string(),
            state: RwLock::new(LoggerState {
                level: Severity::default(),
                sinks: Vec::new(),
            }),
        });
        let subscriber = tracing_subscriber::registry().with(SinkLayer {
            shared: Arc::clone(&shared),
        });

        Self {
            shared,
            dispatch: Dispatch::new(subscriber),
        }
    }

    /// Logical name of this logger
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Whether two handles refer to the same logger
    pub fn ptr_eq(a: &Logger, b: &Logger) -> bool {
        Arc::ptr_eq(&a.shared, &b.shared)
    }

    /// The logger's own threshold
    pub fn level(&self) -> Severity {
        self.read_state().level
    }

    /// Set the threshold of the logger and of every attached sink
    ///
    /// Both change under one lock, so no record sees a half-updated logger.
    pub fn set_level(&self, level: Severity) {
        let mut state = self.write_state();
        state.level = level;
        for sink in &mut state.sinks {
            sink.set_threshold(level);
        }
    }

    /// Whether a record of this severity would pass the logger's threshold
    pub fn is_enabled_for(&self, severity: Severity) -> bool {
        severity >= self.level()
    }

    /// Snapshot of the attached sinks
    pub fn sinks(&self) -> Vec<SinkInfo> {
        self.read_state().sinks.iter().map(Sink::info).collect()
    }

    /// Drop every attached sink and attach `sinks` instead
    pub fn replace_sinks(&self, level: Severity, sinks: Vec<Sink>) {
        let replaced = {
            let mut state = self.write_state();
            state.level = level;
            std::mem::replace(&mut state.sinks, sinks).len()
        };

        // Logged after the lock is released: the thread default may be this logger
        if replaced > 0 {
            tracing::debug!(logger = %self.shared.name, replaced, "Replaced attached sinks");
        }
    }

    /// The dispatcher that routes `tracing` events into this logger
    ///
    /// Clone it to install the logger on other threads, or as the global
    /// default with `tracing::dispatcher::set_global_default`.
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Run `f` with this logger as the thread's default `tracing` dispatcher
    ///
    /// `tracing::info!` and friends inside `f` are written to this logger's
    /// sinks, carrying the module path and line of the macro call.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    /// Emit a record at the given severity
    #[track_caller]
    pub fn log(&self, severity: Severity, message: impl fmt::Display) {
        let caller = Location::caller();
        let (file, line) = (caller.file(), caller.line());

        self.in_scope(|| match severity {
            Severity::Debug => {
                tracing::event!(Level::DEBUG, caller.file = file, caller.line = line, "{}", message)
            }
            Severity::Info => {
                tracing::event!(Level::INFO, caller.file = file, caller.line = line, "{}", message)
            }
            Severity::Warning => {
                tracing::event!(Level::WARN, caller.file = file, caller.line = line, "{}", message)
            }
            Severity::Error => {
                tracing::event!(Level::ERROR, caller.file = file, caller.line = line, "{}", message)
            }
            Severity::Critical => tracing::event!(
                Level::ERROR,
                critical = true,
                caller.file = file,
                caller.line = line,
                "{}",
                message
            ),
        });
    }

    #[track_caller]
    pub fn debug(&self, message: impl fmt::Display) {
        self.log(Severity::Debug, message);
    }

    #[track_caller]
    pub fn info(&self, message: impl fmt::Display) {
        self.log(Severity::Info, message);
    }

    #[track_caller]
    pub fn warning(&self, message: impl fmt::Display) {
        self.log(Severity::Warning, message);
    }

    #[track_caller]
    pub fn error(&self, message: impl fmt::Display) {
        self.log(Severity::Error, message);
    }

    #[track_caller]
    pub fn critical(&self, message: impl fmt::Display) {
        self.log(Severity::Critical, message);
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, LoggerState> {
        self.shared
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, LoggerState> {
        self.shared
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read_state();
        f.debug_struct("Logger")
            .field("name", &self.shared.name)
            .field("level", &state.level)
            .field("sinks", &state.sinks)
            .finish()
    }
}

/// Layer forwarding every event to the logger's sinks
struct SinkLayer {
    shared: Arc<Shared>,
}

impl<S: Subscriber> Layer<S> for SinkLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = EventFields::default();
        event.record(&mut fields);

        let metadata = event.metadata();
        let severity = if fields.critical {
            Severity::Critical
        } else {
            Severity::from(*metadata.level())
        };

        // Records from `Logger::log` carry the caller's location; the
        // metadata only points at this crate
        let (module, file, line) = match fields.caller_file.as_deref() {
            Some(file) => (None, Some(file), fields.caller_line),
            None => (metadata.module_path(), metadata.file(), metadata.line()),
        };

        let message = fields.message_with_extras();
        let record = Record {
            time: Local::now(),
            severity,
            logger: &self.shared.name,
            module,
            file,
            line,
            message: &message,
        };
        self.shared.handle(&record);
    }
}

#[derive(Default)]
struct EventFields {
    message: String,
    extras: Vec<String>,
    critical: bool,
    caller_file: Option<String>,
    caller_line: Option<u32>,
}

impl EventFields {
    fn message_with_extras(&self) -> String {
        if self.extras.is_empty() {
            return self.message.clone();
        }
        let mut out = self.message.clone();
        for extra in &self.extras {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(extra);
        }
        out
    }
}

impl Visit for EventFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = value.to_string(),
            CALLER_FILE_FIELD => self.caller_file = Some(value.to_string()),
            name => self.extras.push(format!("{}={}", name, value)),
        }
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            CALLER_LINE_FIELD => self.caller_line = u32::try_from(value).ok(),
            name => self.extras.push(format!("{}={}", name, value)),
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        match field.name() {
            CRITICAL_FIELD => self.critical = value,
            name => self.extras.push(format!("{}={}", name, value)),
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            "message" => self.message = format!("{:?}", value),
            name => self.extras.push(format!("{}={:?}", name, value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::file_writer::RotatingFileWriter;
    use crate::logging::format::FormatTemplate;
    use crate::logging::sink::SinkKind;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn file_sink(path: &Path, level: Severity, pattern: &str) -> Sink {
        let writer = RotatingFileWriter::open(path, 0, 0).unwrap();
        Sink::file(writer, level, FormatTemplate::new(pattern, "%H:%M:%S"))
    }

    #[test]
    fn test_registry_returns_same_logger() {
        let a = logger("logger-tests-registry");
        let b = logger("logger-tests-registry");
        let c = logger("logger-tests-registry-other");
        assert!(Logger::ptr_eq(&a, &b));
        assert!(!Logger::ptr_eq(&a, &c));
        assert_eq!(a.name(), "logger-tests-registry");
    }

    #[test]
    fn test_logger_without_sinks_drops_records() {
        let log = logger("logger-tests-no-sinks");
        log.critical("nowhere to go");
        assert!(log.sinks().is_empty());
    }

    #[test]
    fn test_log_records_caller_location() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("caller.log");
        let log = logger("logger-tests-caller");
        log.replace_sinks(
            Severity::Debug,
            vec![file_sink(&path, Severity::Debug, "%LEVEL% %function%:%line% %message%")],
        );

        let line = line!() + 1;
        log.info("hello there");

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            format!("INFO {}:{} hello there\n", file!(), line)
        );
    }

    #[test]
    fn test_critical_is_distinct_from_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("critical.log");
        let log = logger("logger-tests-critical");
        log.replace_sinks(
            Severity::Critical,
            vec![file_sink(&path, Severity::Critical, "%LEVEL% %message%")],
        );

        log.error("plain error");
        log.critical("system on fire");

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "CRITICAL system on fire\n");
    }

    #[test]
    fn test_tracing_macros_in_scope() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("scope.log");
        let log = logger("logger-tests-scope");
        log.replace_sinks(
            Severity::Info,
            vec![file_sink(&path, Severity::Info, "%LEVEL% %function% %message%")],
        );

        log.in_scope(|| {
            tracing::trace!("too quiet");
            tracing::debug!("still too quiet");
            tracing::warn!(attempt = 3, "retrying upload");
        });

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, format!("WARNING {} retrying upload attempt=3\n", module_path!()));
    }

    #[test]
    fn test_dispatch_installs_on_other_threads() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("dispatch.log");
        let log = logger("logger-tests-dispatch");
        log.replace_sinks(
            Severity::Info,
            vec![file_sink(&path, Severity::Info, "%LEVEL% %message%")],
        );

        let dispatch = log.dispatch().clone();
        std::thread::spawn(move || {
            tracing::dispatcher::with_default(&dispatch, || {
                tracing::info!("from a worker thread");
            });
        })
        .join()
        .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "INFO from a worker thread\n");
    }

    #[test]
    fn test_replace_sinks_clears_previous() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("first.log");
        let second = temp_dir.path().join("second.log");
        let log = logger("logger-tests-replace");

        log.replace_sinks(
            Severity::Info,
            vec![file_sink(&first, Severity::Info, "%message%")],
        );
        log.replace_sinks(
            Severity::Info,
            vec![file_sink(&second, Severity::Info, "%message%")],
        );
        log.info("only once");

        assert_eq!(fs::read_to_string(&first).unwrap(), "");
        assert_eq!(fs::read_to_string(&second).unwrap(), "only once\n");
        assert_eq!(log.sinks().len(), 1);
        assert_eq!(log.sinks()[0].kind, SinkKind::File);
    }

    #[test]
    fn test_set_level_updates_every_sink() {
        let temp_dir = TempDir::new().unwrap();
        let log = logger("logger-tests-set-level");
        log.replace_sinks(
            Severity::Error,
            vec![
                file_sink(&temp_dir.path().join("a.log"), Severity::Error, "%message%"),
                Sink::console_writer(
                    Box::new(std::io::sink()),
                    Severity::Error,
                    FormatTemplate::console_default(),
                ),
            ],
        );

        for level in Severity::ALL {
            log.set_level(level);
            assert_eq!(log.level(), level);
            assert!(log.sinks().iter().all(|s| s.threshold == level));
        }
    }

    #[test]
    fn test_logger_threshold_gates_sinks() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("gate.log");
        let log = logger("logger-tests-gate");
        log.replace_sinks(
            Severity::Error,
            vec![file_sink(&path, Severity::Debug, "%message%")],
        );

        assert!(!log.is_enabled_for(Severity::Warning));
        log.warning("blocked by logger");
        log.error("passes");

        assert_eq!(fs::read_to_string(&path).unwrap(), "passes\n");
    }

    #[test]
    fn test_bad_template_does_not_panic() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.log");
        let log = logger("logger-tests-bad-template");
        log.replace_sinks(
            Severity::Debug,
            vec![file_sink(&path, Severity::Debug, "%unknown%")],
        );

        log.info("lost");

        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }
}
