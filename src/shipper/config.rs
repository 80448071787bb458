//! Configuration consumed by [`HttpShipper`](super::HttpShipper).

use std::collections::HashMap;
use std::time::Duration;

/// Default connection timeout applied when establishing HTTP connections.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default overall timeout for one push request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Authentication configuration for push requests.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum AuthConfig {
    /// No authentication.
    #[default]
    None,
    /// HTTP Basic authentication with username and password.
    Basic { username: String, password: String },
    /// Bearer token authentication.
    Bearer { token: String },
}

/// Describes how to reach the push endpoint.
#[derive(Clone, Debug)]
pub struct ShipperConfig {
    /// Push endpoint, e.g. `http://loki:3100/api/prom/push`.
    pub url: String,
    pub auth: AuthConfig,
    /// Additional HTTP headers to include in requests.
    pub headers: HashMap<String, String>,
    /// Timeout for establishing connections.
    pub connect_timeout: Duration,
    /// Timeout for the whole request, including reading the response.
    pub request_timeout: Duration,
}

impl ShipperConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

impl Default for ShipperConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            auth: AuthConfig::default(),
            headers: HashMap::new(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}
