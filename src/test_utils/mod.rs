//! Helpers shared by unit and integration tests.
//!
//! Compiled for unit tests and, through the `test-util` feature, for the
//! integration tests under `tests/`.

mod collecting_logger;
mod flaky_queue;
mod scripted_shipper;

pub use collecting_logger::CollectingLogger;
pub use flaky_queue::FlakyQueue;
pub use scripted_shipper::{Outcome, ScriptedShipper};
