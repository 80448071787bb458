//! Entry point shared by the facade and the dispatcher for emitting records.

use std::sync::Arc;

use crate::level::Level;
use crate::local_logger::LocalLogger;
use crate::log_record::Record;
use crate::queue::RecordQueue;
use crate::rate_limited_warner::RateLimitedWarner;

/// Appends records to the queue and mirrors them to the local logger.
pub struct RecordSink {
    name: String,
    queue: RecordQueue,
    local: Arc<dyn LocalLogger>,
    warner: RateLimitedWarner,
}

impl RecordSink {
    pub(crate) fn new(
        name: String,
        queue: RecordQueue,
        local: Arc<dyn LocalLogger>,
        warner: RateLimitedWarner,
    ) -> Self {
        Self {
            name,
            queue,
            local,
            warner,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Build a record stamped now, queue it, then log it locally.
    ///
    /// Returns whether the record reached the queue. A queue failure is
    /// reported through the local logger only.
    pub fn emit(&self, level: Level, message: &str) -> bool {
        let record = Record::new(level, message);
        let queued = self.enqueue(&record);
        self.local.log(&self.name, &record);
        queued
    }

    fn enqueue(&self, record: &Record) -> bool {
        let Err(err) = self.queue.append(record) else {
            return true;
        };
        self.notify(format!(
            "nextlog: log queue unavailable ({err}); record not queued for shipping"
        ));
        self.warner.record_drop();
        self.warner.warn_if_due(|count| self.notify(drop_summary(count)));
        false
    }

    /// Report drops the rate limiter has not summarised yet.
    pub(crate) fn flush_warnings(&self) {
        self.warner.flush(|count| self.notify(drop_summary(count)));
    }

    fn notify(&self, message: String) {
        self.local.log(&self.name, &Record::new(Level::Warning, message));
    }
}

fn drop_summary(count: u64) -> String {
    format!("nextlog: {count} records dropped since the last report")
}

impl std::fmt::Debug for RecordSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordSink")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
