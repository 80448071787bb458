//! Delivery of queued records to the log-aggregation backend.
//!
//! A [`Shipper`] turns a batch of records plus the static [`LabelSet`] into
//! one push request. Shippers never retry: a single failed push is
//! reported to the caller, which decides what happens next.
//!
//! # Response handling
//!
//! - **2xx**: delivered.
//! - **Any other status**: [`ShipError::Status`].
//! - **Connection errors and timeouts**: [`ShipError::Transport`].

mod config;
mod http;
mod payload;

use thiserror::Error;

use crate::labels::LabelSet;
use crate::log_record::Record;

pub use config::{
    AuthConfig, DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT, ShipperConfig,
};
pub use http::HttpShipper;
pub use payload::{PushPayload, build_payload, entry_line};

/// Reasons a push did not reach the backend.
#[derive(Debug, Error)]
pub enum ShipError {
    /// Network failure, including timeouts.
    #[error("transport error: {0}")]
    Transport(String),
    /// The backend answered with a non-2xx status.
    #[error("backend returned HTTP {0}")]
    Status(u16),
    /// The payload could not be serialised.
    #[error("payload encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Performs the wire-level push of one batch.
pub trait Shipper: Send + Sync {
    /// Push `batch` tagged with `labels`. Returns `Ok(())` once delivered.
    fn ship(&self, batch: &[Record], labels: &LabelSet) -> Result<(), ShipError>;
}
