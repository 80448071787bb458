//! Builder for [`Logger`].
//!
//! Collects the backend endpoint, labels, authentication, timeouts and
//! dispatcher timing, validates them and starts the logger over a queue
//! backend.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::config::DEFAULT_LOGGER_NAME;
use crate::dispatcher::{DEFAULT_POLL_INTERVAL, DEFAULT_SHUTDOWN_GRACE, DispatcherSettings};
use crate::labels::LabelSet;
use crate::local_logger::{LocalLogger, LogCrateLogger};
use crate::logger::Logger;
use crate::queue::{QueueBackend, RecordQueue};
use crate::shipper::{AuthConfig, HttpShipper, Shipper, ShipperConfig};

/// Errors that may occur while building a logger.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Invalid user supplied configuration.
    #[error("invalid logger configuration: {0}")]
    InvalidConfig(String),
    /// The configuration document could not be parsed.
    #[error("failed to parse logger configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

macro_rules! ensure_positive {
    ($value:expr, $field:expr) => {{
        if $value.is_zero() {
            Err(BuildError::InvalidConfig(format!(
                "{} must be greater than zero",
                $field
            )))
        } else {
            Ok($value)
        }
    }};
}

macro_rules! duration_setter {
    ($(#[$meta:meta])* $fn_name:ident, $ms_fn_name:ident, $field:ident) => {
        $(#[$meta])*
        pub fn $fn_name(mut self, value: Duration) -> Self {
            self.$field = Some(value);
            self
        }

        #[doc = concat!("Millisecond shorthand for [`", stringify!($fn_name), "`](Self::", stringify!($fn_name), ").")]
        pub fn $ms_fn_name(self, millis: u64) -> Self {
            self.$fn_name(Duration::from_millis(millis))
        }
    };
}

/// Builder for constructing a running [`Logger`].
#[derive(Clone, Default)]
pub struct LoggerBuilder {
    name: Option<String>,
    backend_url: Option<String>,
    labels: LabelSet,
    auth: Option<AuthConfig>,
    headers: HashMap<String, String>,
    poll_interval: Option<Duration>,
    shutdown_grace: Option<Duration>,
    connect_timeout: Option<Duration>,
    request_timeout: Option<Duration>,
    local: Option<Arc<dyn LocalLogger>>,
    shipper: Option<Arc<dyn Shipper>>,
}

impl LoggerBuilder {
    /// Create a builder for a queue-only logger with default timings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the logger name used as the local logging target.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the push endpoint, enabling remote shipping.
    pub fn with_backend_url(mut self, url: impl Into<String>) -> Self {
        self.backend_url = Some(url.into());
        self
    }

    /// Add one label to every shipped stream.
    ///
    /// Label names must match `[a-zA-Z_][a-zA-Z0-9_]*`, the form Loki
    /// accepts; [`start`](Self::start) rejects anything else (for example
    /// `has-dash`) with [`BuildError::InvalidConfig`]. Values are free-form.
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key, value);
        self
    }

    /// Replace the label set. Names follow the rules of
    /// [`with_label`](Self::with_label).
    pub fn with_labels(mut self, labels: LabelSet) -> Self {
        self.labels = labels;
        self
    }

    /// Configure HTTP Basic authentication.
    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.auth = Some(AuthConfig::Basic {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    /// Configure Bearer token authentication.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.auth = Some(AuthConfig::Bearer {
            token: token.into(),
        });
        self
    }

    /// Replace the custom HTTP headers.
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    /// Add a single custom HTTP header.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    duration_setter!(
        #[doc = "Set the time between queue polls."]
        with_poll_interval,
        with_poll_interval_ms,
        poll_interval
    );
    duration_setter!(
        #[doc = "Set the upper bound `stop` waits for the dispatcher."]
        with_shutdown_grace,
        with_shutdown_grace_ms,
        shutdown_grace
    );
    duration_setter!(
        #[doc = "Set the HTTP connect timeout."]
        with_connect_timeout,
        with_connect_timeout_ms,
        connect_timeout
    );
    duration_setter!(
        #[doc = "Set the overall HTTP request timeout."]
        with_request_timeout,
        with_request_timeout_ms,
        request_timeout
    );

    /// Replace the local logger (defaults to the `log` crate facade).
    pub fn with_local_logger(mut self, local: Arc<dyn LocalLogger>) -> Self {
        self.local = Some(local);
        self
    }

    /// Deliver through `shipper` instead of the HTTP shipper.
    ///
    /// A custom shipper enables delivery even without a backend URL.
    pub fn with_shipper(mut self, shipper: Arc<dyn Shipper>) -> Self {
        self.shipper = Some(shipper);
        self
    }

    fn validate(&self) -> Result<(), BuildError> {
        self.validate_name()?;
        self.validate_url()?;
        self.validate_labels()?;
        self.validate_durations()?;
        Ok(())
    }

    fn validate_name(&self) -> Result<(), BuildError> {
        match &self.name {
            Some(name) if name.trim().is_empty() => Err(BuildError::InvalidConfig(
                "logger name must not be empty".into(),
            )),
            _ => Ok(()),
        }
    }

    fn validate_url(&self) -> Result<(), BuildError> {
        let Some(url) = &self.backend_url else {
            return Ok(());
        };
        if url.trim().is_empty() {
            return Err(BuildError::InvalidConfig(
                "backend URL must not be empty".into(),
            ));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(BuildError::InvalidConfig(format!(
                "backend URL must use http or https: {url}"
            )));
        }
        Ok(())
    }

    fn validate_labels(&self) -> Result<(), BuildError> {
        match self.labels.iter().find(|(key, _)| !is_valid_label_name(key)) {
            Some((key, _)) => Err(BuildError::InvalidConfig(format!(
                "invalid label name {key:?}"
            ))),
            None => Ok(()),
        }
    }

    fn validate_durations(&self) -> Result<(), BuildError> {
        if let Some(interval) = self.poll_interval {
            ensure_positive!(interval, "poll_interval")?;
        }
        if let Some(timeout) = self.connect_timeout {
            ensure_positive!(timeout, "connect_timeout")?;
        }
        if let Some(timeout) = self.request_timeout {
            ensure_positive!(timeout, "request_timeout")?;
        }
        Ok(())
    }

    fn build_shipper(&self) -> Option<Arc<dyn Shipper>> {
        if let Some(shipper) = &self.shipper {
            return Some(Arc::clone(shipper));
        }
        let url = self.backend_url.clone()?;
        let defaults = ShipperConfig::default();
        let config = ShipperConfig {
            url,
            auth: self.auth.clone().unwrap_or(defaults.auth),
            headers: self.headers.clone(),
            connect_timeout: self.connect_timeout.unwrap_or(defaults.connect_timeout),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
        };
        Some(Arc::new(HttpShipper::new(config)))
    }

    fn build_settings(&self) -> DispatcherSettings {
        DispatcherSettings {
            poll_interval: self.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL),
            shutdown_grace: self.shutdown_grace.unwrap_or(DEFAULT_SHUTDOWN_GRACE),
            labels: self.labels.clone(),
        }
    }

    /// Validate the configuration, then construct the logger over `backend`
    /// and start its dispatcher.
    pub fn start(self, backend: Arc<dyn QueueBackend>) -> Result<Logger, BuildError> {
        self.validate()?;
        let shipper = self.build_shipper();
        let settings = self.build_settings();
        let name = self
            .name
            .unwrap_or_else(|| DEFAULT_LOGGER_NAME.to_owned());
        let local = self
            .local
            .unwrap_or_else(|| Arc::new(LogCrateLogger) as Arc<dyn LocalLogger>);
        Ok(Logger::from_parts(
            name,
            RecordQueue::new(backend),
            local,
            shipper,
            settings,
        ))
    }
}

/// Label names follow the Prometheus convention `[a-zA-Z_][a-zA-Z0-9_]*`.
fn is_valid_label_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

impl fmt::Debug for LoggerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerBuilder")
            .field("name", &self.name)
            .field("backend_url", &self.backend_url)
            .field("labels", &self.labels)
            .field("poll_interval", &self.poll_interval)
            .field("shutdown_grace", &self.shutdown_grace)
            .field("custom_shipper", &self.shipper.is_some())
            .finish_non_exhaustive()
    }
}
