/// Structured logging for the Athus entry form
///
/// Provides context-rich logging with component tags, optional location
/// context, timestamps, and severity levels. Supports both console output
/// and an append-only log file so failed submissions can be diagnosed after
/// the user has only seen the generic notice.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::str::FromStr;
use std::sync::Mutex;

use crate::model::GatewayError;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Component {
    Form,
    Gateway,
    Store,
    Config,
    System,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Form => write!(f, "FORM"),
            Component::Gateway => write!(f, "GATEWAY"),
            Component::Store => write!(f, "STORE"),
            Component::Config => write!(f, "CONFIG"),
            Component::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        if let Ok(mut slot) = LOGGER.lock() {
            *slot = Some(logger);
        }
    }

    fn log(
        &self,
        level: LogLevel,
        component: &Component,
        location: Option<&str>,
        message: &str,
        sink: Sink,
    ) {
        if level < self.min_level {
            return;
        }

        let log_entry = format_entry(level, component, location, message);
        let location_part = location.map(|s| format!(" [{}]", s)).unwrap_or_default();

        // Console output goes to stderr so it never mixes with the prompts.
        match sink {
            Sink::FileOnly => {}
            Sink::ConsoleAndFile if self.console_timestamps => eprintln!("{}", log_entry),
            Sink::ConsoleAndFile => match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", component, location_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", component, location_part, message),
                LogLevel::Info | LogLevel::Debug => {}
            },
        }

        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

/// Where an entry may be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sink {
    ConsoleAndFile,
    FileOnly,
}

/// Formats one log line: `<timestamp> <LEVEL> <COMPONENT> [location]: message`.
pub fn format_entry(
    level: LogLevel,
    component: &Component,
    location: Option<&str>,
    message: &str,
) -> String {
    let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
    let location_part = location.map(|s| format!(" [{}]", s)).unwrap_or_default();
    format!("{} {} {}{}: {}", timestamp, level, component, location_part, message)
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

fn dispatch_to(
    sink: Sink,
    level: LogLevel,
    component: Component,
    location: Option<&str>,
    message: &str,
) {
    if let Ok(guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_ref() {
            logger.log(level, &component, location, message, sink);
        }
    }
}

fn dispatch(level: LogLevel, component: Component, location: Option<&str>, message: &str) {
    dispatch_to(Sink::ConsoleAndFile, level, component, location, message);
}

/// Log a general informational message
pub fn info(component: Component, location: Option<&str>, message: &str) {
    dispatch(LogLevel::Info, component, location, message);
}

/// Log a warning message
pub fn warn(component: Component, location: Option<&str>, message: &str) {
    dispatch(LogLevel::Warning, component, location, message);
}

/// Log an error message
pub fn error(component: Component, location: Option<&str>, message: &str) {
    dispatch(LogLevel::Error, component, location, message);
}

/// Log a debug message
pub fn debug(component: Component, location: Option<&str>, message: &str) {
    dispatch(LogLevel::Debug, component, location, message);
}

// ---------------------------------------------------------------------------
// Submission Failure Logging
// ---------------------------------------------------------------------------

/// Short classification of a gateway failure, used as a log tag.
pub fn classify_gateway_failure(err: &GatewayError) -> &'static str {
    match err {
        GatewayError::Transport(_) => "TRANSPORT",
        GatewayError::Store { status, .. } if *status == 401 || *status == 403 => "AUTH",
        GatewayError::Store { .. } => "STORE",
        GatewayError::Database(_) => "DATABASE",
        GatewayError::Encode(_) => "ENCODE",
        GatewayError::Unexpected(_) => "UNEXPECTED",
    }
}

/// Text recorded for a failed insert.
pub fn submission_failure_message(err: &GatewayError) -> String {
    format!("insert failed [{}]: {}", classify_gateway_failure(err), err)
}

/// Log a failed insert with its full detail, to the log file only.
///
/// The user only ever sees the generic failure notice.
pub fn log_submission_failure(location: &str, err: &GatewayError) {
    dispatch_to(
        Sink::FileOnly,
        LogLevel::Error,
        Component::Gateway,
        Some(location),
        &submission_failure_message(err),
    );
}
