//! Queue-buffered log shipping.
//!
//! Application code logs through a [`Logger`]. Every call appends a
//! [`Record`] to a durable, shared queue and writes a local copy through a
//! [`LocalLogger`]. A background [`Dispatcher`] drains the queue in FIFO
//! order and pushes each record to a Loki-style HTTP endpoint.
//!
//! Delivery is at-least-once: a record is removed from the queue only after
//! the backend acknowledged it. The first failed delivery halts the
//! dispatcher; undelivered records stay queued for the next run.
//!
//! ```no_run
//! use std::sync::Arc;
//! use nextlog::{LoggerBuilder, SpoolQueue};
//!
//! let spool = Arc::new(SpoolQueue::open("/var/spool/nextlog")?);
//! let logger = LoggerBuilder::new()
//!     .with_name("api")
//!     .with_backend_url("http://loki:3100/api/prom/push")
//!     .with_label("job", "api")
//!     .start(spool)?;
//! logger.info("service started");
//! logger.stop();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod builder;
pub mod config;
pub mod dispatcher;
pub mod labels;
pub mod level;
pub mod local_logger;
pub mod log_record;
pub mod logger;
pub mod queue;
pub mod rate_limited_warner;
pub mod shipper;

#[cfg(any(test, feature = "test-util"))]
pub mod test_utils;

pub use builder::{BuildError, LoggerBuilder};
pub use config::{BasicAuth, LoggerConfig};
pub use dispatcher::{Dispatcher, DispatcherSettings, DispatcherState};
pub use labels::LabelSet;
pub use level::{Level, ParseLevelError};
pub use local_logger::{LocalLogger, LogCrateLogger, NullLogger};
pub use log_record::Record;
pub use logger::Logger;
pub use queue::{MemoryQueue, QueueBackend, QueueError, RecordQueue, SpoolQueue};
pub use shipper::{AuthConfig, HttpShipper, ShipError, Shipper, ShipperConfig, build_payload};
