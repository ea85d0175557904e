//! Time source for outcome log timestamps.

use chrono::{DateTime, Utc};

/// Outcome log timestamp layout, e.g. `2025-03-01 09:30:00,250`.
pub const LOG_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Source of the current UTC time.
pub trait Clock: Send + Sync {
    /// Get the current UTC time.
    fn now_utc(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Render the clock's current time the way outcome log lines carry it.
pub fn log_timestamp(clock: &dyn Clock) -> String {
    clock.now_utc().format(LOG_TIMESTAMP_FORMAT).to_string()
}

/// Clock frozen at one instant, so log lines can be compared verbatim.
#[cfg(any(test, feature = "test-seams"))]
#[derive(Debug, Clone)]
pub struct MockClock {
    now: DateTime<Utc>,
}

#[cfg(any(test, feature = "test-seams"))]
impl MockClock {
    /// Freeze the clock at an RFC 3339 instant.
    ///
    /// # Panics
    /// If `s` is not valid RFC 3339.
    pub fn from_rfc3339(s: &str) -> Self {
        Self {
            now: DateTime::parse_from_rfc3339(s)
                .expect("valid RFC 3339")
                .with_timezone(&Utc),
        }
    }
}

#[cfg(any(test, feature = "test-seams"))]
impl Clock for MockClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.now
    }
}
