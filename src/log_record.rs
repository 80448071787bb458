//! Log record representation for the shipping pipeline.
//!
//! A [`Record`] is created once per log call and never changes afterwards;
//! only its position in the queue moves. Timestamps are truncated to
//! microseconds at construction so that the textual encoding round-trips
//! exactly.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};

use crate::level::Level;

/// `strftime` pattern for the fixed `YYYY-MM-DDTHH:MM:SS.ffffffZ` encoding.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";
const TIMESTAMP_PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// One log event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    level: Level,
    timestamp: DateTime<Utc>,
    line: String,
}

impl Record {
    /// Construct a record stamped with the current UTC time.
    pub fn new(level: Level, line: impl Into<String>) -> Self {
        Self::with_timestamp(level, Utc::now(), line)
    }

    /// Construct a record with an explicit timestamp.
    pub fn with_timestamp(level: Level, timestamp: DateTime<Utc>, line: impl Into<String>) -> Self {
        Self {
            level,
            timestamp: timestamp.trunc_subsecs(6),
            line: line.into(),
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn line(&self) -> &str {
        &self.line
    }

    /// Render the timestamp in the fixed wire format.
    pub fn timestamp_str(&self) -> String {
        format_timestamp(&self.timestamp)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.line)
    }
}

pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a timestamp produced by [`format_timestamp`].
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    NaiveDateTime::parse_from_str(text, TIMESTAMP_PARSE_FORMAT).map(|naive| naive.and_utc())
}
