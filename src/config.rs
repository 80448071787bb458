//! Declarative logger configuration.
//!
//! [`LoggerConfig`] mirrors the options a deployment supplies, typically as
//! JSON:
//!
//! ```json
//! {
//!   "backendURL": "http://loki:3100/api/prom/push",
//!   "labels": {"job": "api", "env": "prod"},
//!   "pollIntervalSeconds": 1,
//!   "shutdownGraceSeconds": 5
//! }
//! ```
//!
//! Omitting `backendURL` yields a queue-only logger. The configuration is
//! converted into a [`LoggerBuilder`] for validation and construction.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::builder::{BuildError, LoggerBuilder};
use crate::labels::LabelSet;
use crate::logger::Logger;
use crate::queue::QueueBackend;

pub const DEFAULT_LOGGER_NAME: &str = "nextlog";

fn default_name() -> String {
    DEFAULT_LOGGER_NAME.to_owned()
}

fn default_poll_interval_seconds() -> f64 {
    1.0
}

fn default_shutdown_grace_seconds() -> f64 {
    5.0
}

/// Credentials for HTTP Basic authentication.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

/// Recognised configuration options.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoggerConfig {
    /// Logger name used as the local logging target.
    #[serde(default = "default_name")]
    pub name: String,
    /// Push endpoint; `None` disables remote shipping.
    #[serde(rename = "backendURL", default)]
    pub backend_url: Option<String>,
    /// Static stream labels. Names must match `[a-zA-Z_][a-zA-Z0-9_]*`
    /// (Loki's label name syntax); other names are rejected when the
    /// logger starts.
    #[serde(default)]
    pub labels: LabelSet,
    #[serde(default = "default_poll_interval_seconds")]
    pub poll_interval_seconds: f64,
    #[serde(default = "default_shutdown_grace_seconds")]
    pub shutdown_grace_seconds: f64,
    #[serde(default)]
    pub connect_timeout_seconds: Option<f64>,
    #[serde(default)]
    pub request_timeout_seconds: Option<f64>,
    #[serde(default)]
    pub bearer_token: Option<String>,
    #[serde(default)]
    pub basic_auth: Option<BasicAuth>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            backend_url: None,
            labels: LabelSet::new(),
            poll_interval_seconds: default_poll_interval_seconds(),
            shutdown_grace_seconds: default_shutdown_grace_seconds(),
            connect_timeout_seconds: None,
            request_timeout_seconds: None,
            bearer_token: None,
            basic_auth: None,
            headers: HashMap::new(),
        }
    }
}

fn seconds(value: f64, field: &str) -> Result<Duration, BuildError> {
    Duration::try_from_secs_f64(value).map_err(|_| {
        BuildError::InvalidConfig(format!(
            "{field} must be a finite, non-negative number of seconds"
        ))
    })
}

impl LoggerConfig {
    /// Parse a JSON configuration document.
    pub fn from_json_str(text: &str) -> Result<Self, BuildError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Convert into a builder; durations are checked here, everything else
    /// when the builder starts the logger.
    pub fn into_builder(self) -> Result<LoggerBuilder, BuildError> {
        let mut builder = LoggerBuilder::new()
            .with_name(self.name)
            .with_labels(self.labels)
            .with_poll_interval(seconds(self.poll_interval_seconds, "pollIntervalSeconds")?)
            .with_shutdown_grace(seconds(
                self.shutdown_grace_seconds,
                "shutdownGraceSeconds",
            )?)
            .with_headers(self.headers);
        if let Some(url) = self.backend_url {
            builder = builder.with_backend_url(url);
        }
        if let Some(value) = self.connect_timeout_seconds {
            builder = builder.with_connect_timeout(seconds(value, "connectTimeoutSeconds")?);
        }
        if let Some(value) = self.request_timeout_seconds {
            builder = builder.with_request_timeout(seconds(value, "requestTimeoutSeconds")?);
        }
        match (self.bearer_token, self.basic_auth) {
            (Some(_), Some(_)) => {
                return Err(BuildError::InvalidConfig(
                    "bearerToken and basicAuth are mutually exclusive".into(),
                ));
            }
            (Some(token), None) => builder = builder.with_bearer_token(token),
            (None, Some(auth)) => builder = builder.with_basic_auth(auth.username, auth.password),
            (None, None) => {}
        }
        Ok(builder)
    }
}

impl Logger {
    /// Build a logger from `config` over `backend` and start its dispatcher.
    pub fn start(config: LoggerConfig, backend: Arc<dyn QueueBackend>) -> Result<Self, BuildError> {
        config.into_builder()?.start(backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn defaults_match_documented_values() {
        let config = LoggerConfig::from_json_str("{}").expect("parse");
        assert_eq!(config, LoggerConfig::default());
        assert_eq!(config.poll_interval_seconds, 1.0);
        assert_eq!(config.shutdown_grace_seconds, 5.0);
        assert!(config.backend_url.is_none());
    }

    #[test]
    fn parses_recognised_options() {
        let config = LoggerConfig::from_json_str(
            r#"{
                "name": "api",
                "backendURL": "http://localhost:3100/api/prom/push",
                "labels": {"job": "api", "env": "prod"},
                "pollIntervalSeconds": 0.25,
                "shutdownGraceSeconds": 2,
                "bearerToken": "secret"
            }"#,
        )
        .expect("parse");
        assert_eq!(config.name, "api");
        assert_eq!(
            config.backend_url.as_deref(),
            Some("http://localhost:3100/api/prom/push")
        );
        assert_eq!(config.labels.render(), r#"{job="api", env="prod"}"#);
        assert_eq!(config.poll_interval_seconds, 0.25);
        assert_eq!(config.bearer_token.as_deref(), Some("secret"));
    }

    #[test]
    fn rejects_unknown_options() {
        let err = LoggerConfig::from_json_str(r#"{"lokiUrl": "http://x"}"#).expect_err("unknown");
        assert!(matches!(err, BuildError::Parse(_)));
    }

    #[rstest]
    #[case(-1.0)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn rejects_invalid_durations(#[case] value: f64) {
        let config = LoggerConfig {
            shutdown_grace_seconds: value,
            ..LoggerConfig::default()
        };
        assert!(matches!(
            config.into_builder(),
            Err(BuildError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_conflicting_auth() {
        let config = LoggerConfig {
            bearer_token: Some("t".into()),
            basic_auth: Some(BasicAuth {
                username: "u".into(),
                password: "p".into(),
            }),
            ..LoggerConfig::default()
        };
        assert!(matches!(
            config.into_builder(),
            Err(BuildError::InvalidConfig(_))
        ));
    }
}
