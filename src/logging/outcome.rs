//! Plain-text outcome log.
//!
//! One line per gateway response, appended to a file owned by the logger
//! instance. Default line shape:
//! ```text
//! INFO:sberpay:2025-03-01 09:30:00,000: Order #10747 registration for amount 10.5
//! ERROR:sberpay:2025-03-01 09:30:00,000: Order #10748 registration for amount 3 | ERROR: Order number is duplicated
//! ```

use crate::clock::{log_timestamp, Clock, SystemClock};
use crate::config::LogConfig;
use crate::protocol::models::GatewayOutcome;
use crate::SberpayError;
use serde_json::Value;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Severity of an outcome line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeLevel {
    /// Gateway reported success.
    Info,
    /// Gateway reported an error.
    Error,
}

impl OutcomeLevel {
    /// Upper-case level name as rendered into log lines.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for OutcomeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct LogSink {
    file: File,
    path: PathBuf,
    name: String,
    format: String,
}

/// Per-client outcome logger.
///
/// A logger built with [`OutcomeLogger::disabled`] has no destination and
/// refuses to log.
pub struct OutcomeLogger {
    sink: Option<LogSink>,
    clock: Arc<dyn Clock>,
}

impl OutcomeLogger {
    /// Logger without a destination.
    pub fn disabled() -> Self {
        Self {
            sink: None,
            clock: Arc::new(SystemClock),
        }
    }

    /// Open (or create) the log file for appending.
    pub fn open(config: &LogConfig) -> Result<Self, SberpayError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Open the log file with a custom clock (for testing).
    #[cfg(any(test, feature = "test-seams"))]
    pub fn open_with_clock(config: &LogConfig, clock: Arc<dyn Clock>) -> Result<Self, SberpayError> {
        Self::with_clock(config, clock)
    }

    /// Open the configured destination, or build a disabled logger.
    pub fn from_config(config: Option<&LogConfig>) -> Result<Self, SberpayError> {
        match config {
            Some(config) => Self::open(config),
            None => Ok(Self::disabled()),
        }
    }

    fn with_clock(config: &LogConfig, clock: Arc<dyn Clock>) -> Result<Self, SberpayError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.path)
            .map_err(|e| {
                SberpayError::LogIO(format!(
                    "Failed to open {}: {}",
                    config.path.display(),
                    e
                ))
            })?;

        tracing::info!(path = %config.path.display(), "outcome logging initialized");

        Ok(Self {
            sink: Some(LogSink {
                file,
                path: config.path.clone(),
                name: config.name.clone(),
                format: config.format.clone(),
            }),
            clock,
        })
    }

    /// Whether a destination is configured.
    pub fn is_initialized(&self) -> bool {
        self.sink.is_some()
    }

    /// Path of the log file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.sink.as_ref().map(|sink| sink.path.as_path())
    }

    /// Log a parsed gateway response.
    ///
    /// `errorCode == "0"` (or no code at all) is written at INFO with
    /// `message`; anything else at ERROR with the gateway's `errorMessage`
    /// appended.
    ///
    /// # Errors
    /// * `LoggerNotInitialized` - no destination configured
    /// * `LogIO` - the line could not be written
    pub fn log_outcome(&self, response: &Value, message: &str) -> Result<GatewayOutcome, SberpayError> {
        let sink = self.sink.as_ref().ok_or(SberpayError::LoggerNotInitialized)?;
        let outcome = GatewayOutcome::from_response(response);

        let (level, text) = match &outcome {
            GatewayOutcome::Success => {
                tracing::info!("{}", message);
                (OutcomeLevel::Info, message.to_string())
            }
            GatewayOutcome::Failure { code, message: error } => {
                let detail = error
                    .clone()
                    .unwrap_or_else(|| format!("errorCode {}", code));
                tracing::error!(error_code = %code, "{} | ERROR: {}", message, detail);
                (OutcomeLevel::Error, format!("{} | ERROR: {}", message, detail))
            }
        };

        self.write_line(sink, level, &text)?;
        Ok(outcome)
    }

    fn write_line(&self, sink: &LogSink, level: OutcomeLevel, message: &str) -> Result<(), SberpayError> {
        let timestamp = log_timestamp(self.clock.as_ref());
        let message = single_line(message);

        let line = render_line(
            &sink.format,
            &[
                ("level", level.as_str()),
                ("name", &sink.name),
                ("timestamp", &timestamp),
                ("message", &message),
            ],
        );

        let mut file = &sink.file;
        writeln!(file, "{}", line)
            .and_then(|_| file.flush())
            .map_err(|e| SberpayError::LogIO(format!("Failed to write log line: {}", e)))
    }
}

/// Render a `{placeholder}` template in one pass.
///
/// Unknown placeholders are left untouched, and substituted values are never
/// re-scanned.
pub fn render_line(template: &str, fields: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + 64);
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];

        let Some(end) = tail.find('}') else {
            out.push_str(tail);
            return out;
        };

        let key = &tail[1..end];
        match fields.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&tail[..=end]),
        }
        rest = &tail[end + 1..];
    }

    out.push_str(rest);
    out
}

fn single_line(message: &str) -> String {
    message.replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn open_test_logger(dir: &TempDir) -> OutcomeLogger {
        let config = LogConfig::new(dir.path().join("sber.log"));
        let clock = Arc::new(MockClock::from_rfc3339("2025-03-01T09:30:00.250Z"));
        OutcomeLogger::open_with_clock(&config, clock).unwrap()
    }

    fn read_log(dir: &TempDir) -> String {
        fs::read_to_string(dir.path().join("sber.log")).unwrap()
    }

    #[test]
    fn test_success_line() {
        let dir = TempDir::new().unwrap();
        let logger = open_test_logger(&dir);

        let outcome = logger
            .log_outcome(&json!({"errorCode": "0"}), "Order #1 registration for amount 10.5")
            .unwrap();

        assert!(outcome.is_success());
        assert_eq!(
            read_log(&dir),
            "INFO:sberpay:2025-03-01 09:30:00,250: Order #1 registration for amount 10.5\n"
        );
    }

    #[test]
    fn test_error_line_includes_error_message() {
        let dir = TempDir::new().unwrap();
        let logger = open_test_logger(&dir);

        let outcome = logger
            .log_outcome(
                &json!({"errorCode": "1", "errorMessage": "Order number is duplicated"}),
                "Order #2 registration for amount 3",
            )
            .unwrap();

        assert!(!outcome.is_success());
        assert_eq!(
            read_log(&dir),
            "ERROR:sberpay:2025-03-01 09:30:00,250: Order #2 registration for amount 3 | ERROR: Order number is duplicated\n"
        );
    }

    #[test]
    fn test_error_without_message_reports_code() {
        let dir = TempDir::new().unwrap();
        let logger = open_test_logger(&dir);

        logger.log_outcome(&json!({"errorCode": "7"}), "status").unwrap();
        assert!(read_log(&dir).ends_with("status | ERROR: errorCode 7\n"));
    }

    #[test]
    fn test_lines_are_appended() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("sber.log"), "existing line\n").unwrap();

        let logger = open_test_logger(&dir);
        logger.log_outcome(&json!({}), "first").unwrap();
        logger.log_outcome(&json!({"errorCode": "0"}), "second").unwrap();

        let contents = read_log(&dir);
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "existing line");
        assert!(lines[1].ends_with(": first"));
        assert!(lines[2].ends_with(": second"));
    }

    #[test]
    fn test_disabled_logger_fails_clearly() {
        let logger = OutcomeLogger::disabled();
        assert!(!logger.is_initialized());
        assert!(logger.path().is_none());

        let result = logger.log_outcome(&json!({"errorCode": "0"}), "nothing");
        assert!(matches!(result, Err(SberpayError::LoggerNotInitialized)));
    }

    #[test]
    fn test_from_config_none_is_disabled() {
        let logger = OutcomeLogger::from_config(None).unwrap();
        assert!(!logger.is_initialized());
    }

    #[test]
    fn test_open_missing_directory() {
        let dir = TempDir::new().unwrap();
        let config = LogConfig::new(dir.path().join("missing").join("sber.log"));
        assert!(matches!(OutcomeLogger::open(&config), Err(SberpayError::LogIO(_))));
    }

    #[test]
    fn test_custom_name_and_format() {
        let dir = TempDir::new().unwrap();
        let config = LogConfig::new(dir.path().join("sber.log"))
            .with_name("orders")
            .with_format("[{timestamp}] {level} {name} - {message}");
        let clock = Arc::new(MockClock::from_rfc3339("2025-03-01T09:30:00Z"));
        let logger = OutcomeLogger::open_with_clock(&config, clock).unwrap();

        logger.log_outcome(&json!({"errorCode": "0"}), "ok").unwrap();
        assert_eq!(read_log(&dir), "[2025-03-01 09:30:00,000] INFO orders - ok\n");
    }

    #[test]
    fn test_multiline_message_is_flattened() {
        let dir = TempDir::new().unwrap();
        let logger = open_test_logger(&dir);

        logger
            .log_outcome(&json!({"errorCode": "5", "errorMessage": "bad\nrequest"}), "op")
            .unwrap();
        assert_eq!(read_log(&dir).lines().count(), 1);
    }

    #[test]
    fn test_render_line_placeholders() {
        let fields = [("level", "INFO"), ("message", "{level}")];

        assert_eq!(render_line("{level}: {message}", &fields), "INFO: {level}");
        assert_eq!(render_line("{unknown} {level}", &fields), "{unknown} INFO");
        assert_eq!(render_line("open {level", &fields), "open {level");
        assert_eq!(render_line("plain", &fields), "plain");
    }
}
