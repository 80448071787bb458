//! Public logging facade.
//!
//! [`Logger`] wraps a [`LocalLogger`](crate::LocalLogger) and augments every
//! call with an append to the shared record queue. Appends block only on the
//! queue transport, never on the remote backend; delivery happens on the
//! [`Dispatcher`] thread started alongside the logger.

mod sink;

use std::sync::Arc;

use crate::dispatcher::{Dispatcher, DispatcherSettings, DispatcherState};
use crate::level::Level;
use crate::local_logger::LocalLogger;
use crate::queue::RecordQueue;
use crate::rate_limited_warner::RateLimitedWarner;
use crate::shipper::Shipper;

pub use sink::RecordSink;

const STOP_NOTICE: &str = "Logger: Waiting for logs to finish sending...";

/// Logger that queues every record for remote shipping.
#[derive(Debug)]
pub struct Logger {
    sink: Arc<RecordSink>,
    queue: RecordQueue,
    dispatcher: Dispatcher,
}

impl Logger {
    /// Assemble a logger from its parts and start the dispatcher.
    ///
    /// A `None` shipper leaves the logger in queue-only mode: records are
    /// buffered but nothing is delivered.
    pub fn from_parts(
        name: impl Into<String>,
        queue: RecordQueue,
        local: Arc<dyn LocalLogger>,
        shipper: Option<Arc<dyn Shipper>>,
        settings: DispatcherSettings,
    ) -> Self {
        let sink = Arc::new(RecordSink::new(
            name.into(),
            queue.clone(),
            local,
            RateLimitedWarner::default(),
        ));
        let dispatcher = Dispatcher::start(queue.clone(), shipper, Arc::clone(&sink), settings);
        Self {
            sink,
            queue,
            dispatcher,
        }
    }

    pub fn name(&self) -> &str {
        self.sink.name()
    }

    /// Log `message` at `level`.
    ///
    /// Returns `true` when the record was queued for shipping. The local
    /// copy is written either way.
    pub fn log(&self, level: Level, message: &str) -> bool {
        self.sink.emit(level, message)
    }

    pub fn debug(&self, message: &str) -> bool {
        self.log(Level::Debug, message)
    }

    pub fn info(&self, message: &str) -> bool {
        self.log(Level::Info, message)
    }

    pub fn warning(&self, message: &str) -> bool {
        self.log(Level::Warning, message)
    }

    pub fn error(&self, message: &str) -> bool {
        self.log(Level::Error, message)
    }

    pub fn critical(&self, message: &str) -> bool {
        self.log(Level::Critical, message)
    }

    /// Queue this logger appends to.
    pub fn queue(&self) -> &RecordQueue {
        &self.queue
    }

    pub fn dispatcher_state(&self) -> DispatcherState {
        self.dispatcher.state()
    }

    /// Stop the dispatcher and wait for it, bounded by the grace period.
    ///
    /// The first call queues a notice announcing the shutdown; it is shipped
    /// by whichever dispatcher next drains the queue. Subsequent calls
    /// return immediately.
    ///
    /// The grace period caps the wait; it is not a settle delay. An idle
    /// dispatcher exits at once and `stop` returns without sleeping out
    /// the remainder.
    pub fn stop(&self) {
        if self.dispatcher.request_stop() {
            self.info(STOP_NOTICE);
        }
        self.dispatcher.wait_stopped();
        self.sink.flush_warnings();
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.stop();
    }
}
