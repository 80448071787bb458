//! A local logger that accumulates records in memory for test assertions.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::local_logger::LocalLogger;
use crate::log_record::Record;

/// Local logger that stores every record it receives for later inspection.
#[derive(Clone, Default)]
pub struct CollectingLogger {
    records: Arc<Mutex<Vec<(String, Record)>>>,
}

impl CollectingLogger {
    /// Create a new empty logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a snapshot of all records received so far.
    pub fn collected(&self) -> Vec<Record> {
        self.records.lock().iter().map(|(_, r)| r.clone()).collect()
    }

    /// Return the messages received so far, in order.
    pub fn lines(&self) -> Vec<String> {
        self.records
            .lock()
            .iter()
            .map(|(_, r)| r.line().to_owned())
            .collect()
    }

    /// Return the logger names the records were emitted under.
    pub fn targets(&self) -> Vec<String> {
        self.records.lock().iter().map(|(t, _)| t.clone()).collect()
    }
}

impl LocalLogger for CollectingLogger {
    fn log(&self, target: &str, record: &Record) {
        self.records.lock().push((target.to_owned(), record.clone()));
    }
}
