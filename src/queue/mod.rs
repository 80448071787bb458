//! Adapter over the durable record queue.
//!
//! The queue itself is an external service reached through a
//! [`QueueBackend`] handle. [`RecordQueue`] layers the record encoding on
//! top of the three primitives the pipeline needs: append at the tail,
//! peek at the head and remove the head. Producers only ever touch the
//! tail and the single dispatcher only touches the head, so the adapter
//! adds no locking of its own.

mod codec;
mod memory;
mod spool;

use std::io;
use std::sync::Arc;

use thiserror::Error;

use crate::log_record::Record;

pub use codec::{CodecError, ENCODING_VERSION, decode_record, encode_record};
pub use memory::MemoryQueue;
pub use spool::SpoolQueue;

/// Raw queue transport shared between producers and the dispatcher.
///
/// Implementations must serialise concurrent `push_tail` calls and keep
/// entries in FIFO order.
pub trait QueueBackend: Send + Sync {
    /// Append an encoded entry at the tail.
    fn push_tail(&self, entry: &str) -> io::Result<()>;

    /// Return the oldest entry without removing it.
    fn peek_head(&self) -> io::Result<Option<String>>;

    /// Remove the oldest entry. Removing from an empty queue is a no-op.
    fn pop_head(&self) -> io::Result<()>;

    /// Number of entries currently queued.
    fn len(&self) -> io::Result<usize>;
}

/// Errors raised by [`RecordQueue`].
#[derive(Debug, Error)]
pub enum QueueError {
    /// The queue transport failed.
    #[error("queue unavailable: {0}")]
    Unavailable(#[from] io::Error),
    /// The head entry could not be decoded into a record.
    #[error("malformed queued record {entry:?}: {source}")]
    Malformed {
        entry: String,
        #[source]
        source: CodecError,
    },
    /// A record could not be encoded for the queue.
    #[error("failed to encode record: {0}")]
    Encode(#[source] CodecError),
}

/// Record-level view of a [`QueueBackend`].
#[derive(Clone)]
pub struct RecordQueue {
    backend: Arc<dyn QueueBackend>,
}

impl RecordQueue {
    pub fn new(backend: Arc<dyn QueueBackend>) -> Self {
        Self { backend }
    }

    /// Encode `record` and append it to the tail of the queue.
    pub fn append(&self, record: &Record) -> Result<(), QueueError> {
        let entry = encode_record(record).map_err(QueueError::Encode)?;
        self.backend.push_tail(&entry)?;
        Ok(())
    }

    /// Decode the oldest queued record, if any.
    ///
    /// A head entry that fails to decode is reported as
    /// [`QueueError::Malformed`] and stays in place until removed.
    pub fn peek_head(&self) -> Result<Option<Record>, QueueError> {
        let Some(entry) = self.backend.peek_head()? else {
            return Ok(None);
        };
        match decode_record(&entry) {
            Ok(record) => Ok(Some(record)),
            Err(source) => Err(QueueError::Malformed { entry, source }),
        }
    }

    pub fn remove_head(&self) -> Result<(), QueueError> {
        self.backend.pop_head()?;
        Ok(())
    }

    pub fn len(&self) -> Result<usize, QueueError> {
        Ok(self.backend.len()?)
    }

    pub fn is_empty(&self) -> Result<bool, QueueError> {
        Ok(self.len()? == 0)
    }
}

impl std::fmt::Debug for RecordQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordQueue").finish_non_exhaustive()
    }
}
