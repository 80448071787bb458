//! Worker thread driving the poll → ship → remove cycle.

use std::slice;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use log::debug;

use crate::labels::LabelSet;
use crate::level::Level;
use crate::logger::RecordSink;
use crate::queue::{QueueError, RecordQueue};
use crate::shipper::Shipper;

use super::{DispatcherState, SharedState};

/// What a single tick achieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Tick {
    /// Nothing to do: no shipper configured or the queue was empty.
    Idle,
    /// The head record was delivered and removed.
    Delivered,
    /// A malformed head entry was dropped.
    Skipped,
    /// A failure occurred; dispatching must stop.
    Halt,
}

pub(super) struct Worker {
    pub(super) queue: RecordQueue,
    pub(super) shipper: Option<Arc<dyn Shipper>>,
    pub(super) sink: Arc<RecordSink>,
    pub(super) labels: LabelSet,
    pub(super) poll_interval: Duration,
    pub(super) state: Arc<SharedState>,
}

impl Worker {
    /// Main loop. Waits one poll interval (or until the stop signal), then
    /// runs one tick.
    ///
    /// `_exited` is held for the lifetime of the loop; dropping it tells the
    /// dispatcher handle the worker is gone.
    pub(super) fn run(self, shutdown_rx: Receiver<()>, _exited: Sender<()>) {
        loop {
            match shutdown_rx.recv_timeout(self.poll_interval) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
            if self.tick() == Tick::Halt {
                // A concurrent stop request wins over the halt.
                self.state
                    .transition(DispatcherState::Running, DispatcherState::Halted);
                break;
            }
        }
        debug!("nextlog: dispatcher loop exited");
    }

    /// Attempt delivery of the queue head.
    pub(super) fn tick(&self) -> Tick {
        let Some(shipper) = &self.shipper else {
            return Tick::Idle;
        };
        let record = match self.queue.peek_head() {
            Ok(None) => return Tick::Idle,
            Ok(Some(record)) => record,
            Err(QueueError::Malformed { entry, source }) => {
                return self.skip_malformed(&entry, &source);
            }
            Err(err) => {
                self.report(&format!("Failed to read log queue: {err}"));
                return Tick::Halt;
            }
        };

        if let Err(err) = shipper.ship(slice::from_ref(&record), &self.labels) {
            self.report(&format!("Failed to send logs: {err}"));
            return Tick::Halt;
        }
        if let Err(err) = self.queue.remove_head() {
            self.report(&format!("Failed to remove delivered record from log queue: {err}"));
            return Tick::Halt;
        }
        Tick::Delivered
    }

    fn skip_malformed(&self, entry: &str, source: &dyn std::error::Error) -> Tick {
        if let Err(err) = self.queue.remove_head() {
            self.report(&format!("Failed to drop malformed queued record: {err}"));
            return Tick::Halt;
        }
        self.report(&format!("Dropped malformed queued record {entry:?}: {source}"));
        Tick::Skipped
    }

    /// Surface a failure through the logging pipeline itself: the error is
    /// queued (not shipped) and logged locally.
    fn report(&self, message: &str) {
        self.sink.emit(Level::Error, message);
    }
}
