//! Queue entry encoding.
//!
//! Entries are strict JSON objects tagged with an encoding version:
//!
//! ```text
//! {"v":1,"level":"INFO","timestamp":"2024-03-09T07:05:01.000042Z","line":"hello"}
//! ```
//!
//! Entries written by older producers use a map-like rendering with single
//! quotes (`{'level': 'INFO', ...}`) and carry no version tag. Those are
//! still accepted by normalising quotes before parsing. The shim cannot
//! recover messages that themselves contain quote characters.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::level::{Level, ParseLevelError};
use crate::log_record::{Record, format_timestamp, parse_timestamp};

/// Version written into every encoded entry.
pub const ENCODING_VERSION: u32 = 1;

/// Errors raised while encoding or decoding queue entries.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid queue entry JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Level(#[from] ParseLevelError),
    #[error("invalid timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),
    #[error("unsupported queue entry version {0}")]
    UnsupportedVersion(u32),
}

#[derive(Serialize)]
struct EncodedRecord<'a> {
    v: u32,
    level: &'static str,
    timestamp: String,
    line: &'a str,
}

#[derive(Deserialize)]
struct DecodedRecord {
    #[serde(default)]
    v: Option<u32>,
    level: String,
    timestamp: String,
    line: String,
}

impl DecodedRecord {
    fn into_record(self) -> Result<Record, CodecError> {
        if let Some(version) = self.v
            && version != ENCODING_VERSION
        {
            return Err(CodecError::UnsupportedVersion(version));
        }
        let level: Level = self.level.parse()?;
        let timestamp = parse_timestamp(&self.timestamp)?;
        Ok(Record::with_timestamp(level, timestamp, self.line))
    }
}

/// Encode a record as a versioned JSON queue entry.
pub fn encode_record(record: &Record) -> Result<String, CodecError> {
    let encoded = EncodedRecord {
        v: ENCODING_VERSION,
        level: record.level().as_str(),
        timestamp: format_timestamp(&record.timestamp()),
        line: record.line(),
    };
    Ok(serde_json::to_string(&encoded)?)
}

/// Decode a queue entry, falling back to the legacy single-quoted layout.
pub fn decode_record(entry: &str) -> Result<Record, CodecError> {
    match serde_json::from_str::<DecodedRecord>(entry) {
        Ok(decoded) => decoded.into_record(),
        Err(err) if is_legacy_entry(entry) => decode_legacy(entry).map_err(|_| err.into()),
        Err(err) => Err(err.into()),
    }
}

fn is_legacy_entry(entry: &str) -> bool {
    entry.trim_start().starts_with("{'")
}

fn decode_legacy(entry: &str) -> Result<Record, CodecError> {
    let normalised = entry.replace('\'', "\"");
    let decoded: DecodedRecord = serde_json::from_str(&normalised)?;
    decoded.into_record()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    fn fixed_record(level: Level, line: &str) -> Record {
        let ts = Utc
            .with_ymd_and_hms(2023, 11, 2, 18, 30, 0)
            .single()
            .expect("valid date");
        Record::with_timestamp(level, ts, line)
    }

    #[test]
    fn encoding_is_versioned_json() {
        let encoded = encode_record(&fixed_record(Level::Info, "start")).expect("encode");
        assert_eq!(
            encoded,
            r#"{"v":1,"level":"INFO","timestamp":"2023-11-02T18:30:00.000000Z","line":"start"}"#
        );
    }

    #[test]
    fn decodes_legacy_single_quoted_entries() {
        let legacy = "{'level': 'ERROR', 'timestamp': '2023-11-02T18:30:00.000000Z', 'line': 'fail'}";
        let record = decode_record(legacy).expect("decode legacy");
        assert_eq!(record, fixed_record(Level::Error, "fail"));
    }

    #[test]
    fn rejects_future_versions() {
        let entry = r#"{"v":2,"level":"INFO","timestamp":"2023-11-02T18:30:00.000000Z","line":"x"}"#;
        assert!(matches!(
            decode_record(entry),
            Err(CodecError::UnsupportedVersion(2))
        ));
    }

    #[test]
    fn rejects_unknown_levels() {
        let entry = r#"{"v":1,"level":"LOUD","timestamp":"2023-11-02T18:30:00.000000Z","line":"x"}"#;
        assert!(matches!(decode_record(entry), Err(CodecError::Level(_))));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(decode_record("not a record"), Err(CodecError::Json(_))));
        assert!(decode_record("{'level': 'INFO'").is_err());
    }

    proptest! {
        #[test]
        fn encoded_records_decode_to_equal_values(
            level_idx in 0usize..5,
            line in ".*",
            secs in 0i64..4_000_000_000,
            micros in 0u32..1_000_000,
        ) {
            let levels = [Level::Debug, Level::Info, Level::Warning, Level::Error, Level::Critical];
            let ts = Utc.timestamp_opt(secs, micros * 1_000).single().expect("in range");
            let record = Record::with_timestamp(levels[level_idx], ts, line);
            let decoded = decode_record(&encode_record(&record).expect("encode")).expect("decode");
            prop_assert_eq!(decoded, record);
        }
    }
}
