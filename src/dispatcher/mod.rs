//! Background dispatcher draining the record queue.
//!
//! The dispatcher owns one worker thread. Once per poll interval the worker
//! peeks the queue head, ships it and removes it on success. The first
//! failed delivery halts dispatching for the lifetime of the dispatcher;
//! records stay queued until a new instance starts.
//!
//! # States
//!
//! ```text
//! Running ──delivery failure──▶ Halted
//!    │                            │
//!    └──────stop()────▶ Stopping ◀┘
//!                          │
//!                          ▼
//!                       Stopped
//! ```
//!
//! Stopping is cooperative: the stop signal is observed between ticks, so a
//! tick in progress (including a blocking HTTP call) always completes. The
//! caller of [`Dispatcher::stop`] waits at most the configured grace period
//! for the worker to exit.

mod worker;

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use log::warn;
use parking_lot::Mutex;

use crate::labels::LabelSet;
use crate::logger::RecordSink;
use crate::queue::RecordQueue;
use crate::shipper::Shipper;

use worker::Worker;

/// Default time between two queue polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Default upper bound on how long `stop` waits for the worker.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Lifecycle state of a [`Dispatcher`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatcherState {
    /// Polling and delivering.
    Running,
    /// A delivery or queue failure stopped dispatching.
    Halted,
    /// Stop requested; waiting for the worker to finish its tick.
    Stopping,
    /// Terminal.
    Stopped,
}

impl DispatcherState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Running,
            1 => Self::Halted,
            2 => Self::Stopping,
            _ => Self::Stopped,
        }
    }
}

impl From<DispatcherState> for u8 {
    fn from(state: DispatcherState) -> Self {
        match state {
            DispatcherState::Running => 0,
            DispatcherState::Halted => 1,
            DispatcherState::Stopping => 2,
            DispatcherState::Stopped => 3,
        }
    }
}

/// State shared between the dispatcher handle and its worker.
#[derive(Debug)]
pub(crate) struct SharedState(AtomicU8);

impl SharedState {
    fn new(state: DispatcherState) -> Self {
        Self(AtomicU8::new(state.into()))
    }

    pub(crate) fn load(&self) -> DispatcherState {
        DispatcherState::from_u8(self.0.load(Ordering::SeqCst))
    }

    fn store(&self, state: DispatcherState) {
        self.0.store(state.into(), Ordering::SeqCst);
    }

    /// Move from `from` to `to` only if no other transition happened first.
    pub(crate) fn transition(&self, from: DispatcherState, to: DispatcherState) -> bool {
        self.0
            .compare_exchange(from.into(), to.into(), Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

/// Timing and labelling parameters of a [`Dispatcher`].
#[derive(Clone, Debug)]
pub struct DispatcherSettings {
    pub poll_interval: Duration,
    pub shutdown_grace: Duration,
    pub labels: LabelSet,
}

impl Default for DispatcherSettings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
            labels: LabelSet::new(),
        }
    }
}

/// Handle to the background dispatch loop.
pub struct Dispatcher {
    state: Arc<SharedState>,
    shutdown_tx: Mutex<Option<Sender<()>>>,
    exited_rx: Receiver<()>,
    handle: Mutex<Option<JoinHandle<()>>>,
    shutdown_grace: Duration,
}

impl Dispatcher {
    /// Spawn the worker thread and enter [`DispatcherState::Running`].
    ///
    /// Without a shipper the worker still ticks but never touches the queue,
    /// which leaves records buffered for a later, configured instance.
    pub(crate) fn start(
        queue: RecordQueue,
        shipper: Option<Arc<dyn Shipper>>,
        sink: Arc<RecordSink>,
        settings: DispatcherSettings,
    ) -> Self {
        let state = Arc::new(SharedState::new(DispatcherState::Running));
        let (shutdown_tx, shutdown_rx) = bounded::<()>(1);
        // Never sent on; the worker dropping its end marks its exit.
        let (exited_tx, exited_rx) = bounded::<()>(0);
        let worker = Worker {
            queue,
            shipper,
            sink,
            labels: settings.labels,
            poll_interval: settings.poll_interval,
            state: Arc::clone(&state),
        };
        let handle = thread::Builder::new()
            .name("nextlog-dispatcher".into())
            .spawn(move || worker.run(shutdown_rx, exited_tx))
            .ok();
        if handle.is_none() {
            warn!("nextlog: failed to spawn dispatcher thread; records stay queued");
            state.store(DispatcherState::Halted);
        }
        Self {
            state,
            shutdown_tx: Mutex::new(Some(shutdown_tx)),
            exited_rx,
            handle: Mutex::new(handle),
            shutdown_grace: settings.shutdown_grace,
        }
    }

    pub fn state(&self) -> DispatcherState {
        self.state.load()
    }

    /// Signal the worker to stop after its current tick.
    ///
    /// Returns `true` for the call that actually issued the request; later
    /// calls are no-ops.
    pub fn request_stop(&self) -> bool {
        let Some(tx) = self.shutdown_tx.lock().take() else {
            return false;
        };
        self.state.store(DispatcherState::Stopping);
        // A halted worker has already exited and dropped its receiver.
        let _ = tx.try_send(());
        true
    }

    /// Wait up to the grace period for the worker to exit, then mark the
    /// dispatcher [`DispatcherState::Stopped`].
    ///
    /// Does nothing unless [`request_stop`](Self::request_stop) was called.
    /// Concurrent callers block until the first one finishes; the grace
    /// period elapses at most once per dispatcher.
    pub fn wait_stopped(&self) {
        let mut guard = self.handle.lock();
        if self.shutdown_tx.lock().is_some() {
            return;
        }
        let Some(handle) = guard.take() else {
            self.state.store(DispatcherState::Stopped);
            return;
        };
        match self.exited_rx.recv_timeout(self.shutdown_grace) {
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    "nextlog: dispatcher still busy after {:?}; detaching worker",
                    self.shutdown_grace
                );
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if handle.join().is_err() {
                    warn!("nextlog: dispatcher thread panicked");
                }
            }
        }
        self.state.store(DispatcherState::Stopped);
    }

    /// Request a stop and wait for it; idempotent.
    pub fn stop(&self) {
        self.request_stop();
        self.wait_stopped();
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("state", &self.state())
            .field("shutdown_grace", &self.shutdown_grace)
            .finish()
    }
}
