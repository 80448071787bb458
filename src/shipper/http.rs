//! HTTP push shipper.
//!
//! Holds a ureq `Agent` so consecutive pushes reuse pooled connections.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64_STANDARD};
use ureq::{Agent, AgentBuilder};

use crate::labels::LabelSet;
use crate::log_record::Record;

use super::{AuthConfig, ShipError, Shipper, ShipperConfig, build_payload};

const JSON_CONTENT_TYPE: &str = "application/json";

/// Pushes batches to a Loki-style endpoint with a JSON POST.
pub struct HttpShipper {
    config: ShipperConfig,
    agent: Agent,
}

impl HttpShipper {
    pub fn new(config: ShipperConfig) -> Self {
        let agent = AgentBuilder::new()
            .timeout_connect(config.connect_timeout)
            .timeout(config.request_timeout)
            .build();
        Self { config, agent }
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }

    fn post(&self, payload: &str) -> Result<ureq::Response, Box<ureq::Error>> {
        let mut req = self.agent.post(&self.config.url);
        req = self.apply_auth(req);
        req = self.apply_headers(req);
        req = req.set("Content-Type", JSON_CONTENT_TYPE);
        req.send_string(payload).map_err(Box::new)
    }

    fn apply_auth(&self, req: ureq::Request) -> ureq::Request {
        match &self.config.auth {
            AuthConfig::None => req,
            AuthConfig::Basic { username, password } => {
                let encoded = base64_encode(format!("{username}:{password}").as_bytes());
                req.set("Authorization", &format!("Basic {encoded}"))
            }
            AuthConfig::Bearer { token } => req.set("Authorization", &format!("Bearer {token}")),
        }
    }

    fn apply_headers(&self, mut req: ureq::Request) -> ureq::Request {
        for (key, value) in &self.config.headers {
            req = req.set(key, value);
        }
        req
    }
}

impl Shipper for HttpShipper {
    fn ship(&self, batch: &[Record], labels: &LabelSet) -> Result<(), ShipError> {
        let payload = build_payload(batch, labels)?;
        match self.post(&payload) {
            Ok(response) => check_status(response.status()),
            Err(err) => match *err {
                ureq::Error::Status(code, _) => check_status(code),
                ureq::Error::Transport(transport) => Err(ShipError::Transport(transport.to_string())),
            },
        }
    }
}

impl std::fmt::Debug for HttpShipper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpShipper")
            .field("url", &self.config.url)
            .field("connect_timeout", &self.config.connect_timeout)
            .field("request_timeout", &self.config.request_timeout)
            .finish()
    }
}

/// Map a response status onto the delivery outcome.
pub(crate) fn check_status(status: u16) -> Result<(), ShipError> {
    match status {
        200..=299 => Ok(()),
        _ => Err(ShipError::Status(status)),
    }
}

/// Base64-encode a byte slice for Basic auth.
fn base64_encode(input: &[u8]) -> String {
    BASE64_STANDARD.encode(input)
}
