//! Push payload construction.

use serde::Serialize;

use crate::labels::LabelSet;
use crate::log_record::Record;

use super::ShipError;

/// Body of one push request.
#[derive(Debug, Serialize)]
pub struct PushPayload {
    streams: Vec<Stream>,
}

#[derive(Debug, Serialize)]
struct Stream {
    labels: String,
    entries: Vec<Entry>,
}

#[derive(Debug, Serialize)]
struct Entry {
    ts: String,
    line: String,
}

impl PushPayload {
    /// Assemble a single-stream payload for `batch`.
    pub fn new(batch: &[Record], labels: &LabelSet) -> Self {
        let entries = batch
            .iter()
            .map(|record| Entry {
                ts: record.timestamp_str(),
                line: entry_line(record),
            })
            .collect();
        Self {
            streams: vec![Stream {
                labels: labels.render(),
                entries,
            }],
        }
    }

    pub fn to_json(&self) -> Result<String, ShipError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Render the entry line, `[<LEVEL>] <message>`.
pub fn entry_line(record: &Record) -> String {
    format!("[{}] {}", record.level(), record.line())
}

/// Serialise the push body for `batch`.
///
/// Pure: the same records and labels always yield the same bytes.
pub fn build_payload(batch: &[Record], labels: &LabelSet) -> Result<String, ShipError> {
    PushPayload::new(batch, labels).to_json()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use chrono::{TimeZone, Utc};
    use rstest::{fixture, rstest};

    #[fixture]
    fn labels() -> LabelSet {
        [("job", "api"), ("env", "prod")].into_iter().collect()
    }

    fn record_at(level: Level, second: u32, line: &str) -> Record {
        let ts = Utc
            .with_ymd_and_hms(2024, 5, 1, 12, 0, second)
            .single()
            .expect("valid date");
        Record::with_timestamp(level, ts, line)
    }

    #[rstest]
    fn single_record_payload_matches_push_format(labels: LabelSet) {
        let batch = [record_at(Level::Info, 0, "start")];
        let body = build_payload(&batch, &labels).expect("payload");
        assert_eq!(
            body,
            concat!(
                r#"{"streams":[{"labels":"{job=\"api\", env=\"prod\"}","#,
                r#""entries":[{"ts":"2024-05-01T12:00:00.000000Z","line":"[INFO] start"}]}]}"#
            )
        );
    }

    #[rstest]
    fn batch_entries_keep_order(labels: LabelSet) {
        let batch = [
            record_at(Level::Info, 1, "one"),
            record_at(Level::Error, 2, "two"),
        ];
        let body = build_payload(&batch, &labels).expect("payload");
        let parsed: serde_json::Value = serde_json::from_str(&body).expect("parse");
        let entries = parsed["streams"][0]["entries"]
            .as_array()
            .expect("entries array");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["line"], "[INFO] one");
        assert_eq!(entries[1]["line"], "[ERROR] two");
        assert_eq!(entries[1]["ts"], "2024-05-01T12:00:02.000000Z");
    }

    #[test]
    fn message_text_is_json_escaped() {
        let batch = [record_at(Level::Warning, 0, "quote \" and\nnewline")];
        let body = build_payload(&batch, &LabelSet::new()).expect("payload");
        let parsed: serde_json::Value = serde_json::from_str(&body).expect("parse");
        assert_eq!(parsed["streams"][0]["labels"], "{}");
        assert_eq!(
            parsed["streams"][0]["entries"][0]["line"],
            "[WARNING] quote \" and\nnewline"
        );
    }
}
