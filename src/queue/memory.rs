//! In-process queue backend.

use std::collections::VecDeque;
use std::io;

use parking_lot::Mutex;

use super::QueueBackend;

/// Unbounded FIFO held in memory.
///
/// Entries do not survive the process; use [`SpoolQueue`](super::SpoolQueue)
/// when records must outlive a restart.
#[derive(Debug, Default)]
pub struct MemoryQueue {
    entries: Mutex<VecDeque<String>>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the queued entries, oldest first.
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().iter().cloned().collect()
    }
}

impl QueueBackend for MemoryQueue {
    fn push_tail(&self, entry: &str) -> io::Result<()> {
        self.entries.lock().push_back(entry.to_owned());
        Ok(())
    }

    fn peek_head(&self) -> io::Result<Option<String>> {
        Ok(self.entries.lock().front().cloned())
    }

    fn pop_head(&self) -> io::Result<()> {
        self.entries.lock().pop_front();
        Ok(())
    }

    fn len(&self) -> io::Result<usize> {
        Ok(self.entries.lock().len())
    }
}
