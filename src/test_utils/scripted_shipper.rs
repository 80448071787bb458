//! Shipper that replays a fixed script of outcomes.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::labels::LabelSet;
use crate::log_record::Record;
use crate::shipper::{ShipError, Shipper};

/// Result of one scripted `ship` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Deliver,
    /// Fail with the given HTTP status.
    Reject(u16),
}

#[derive(Default)]
struct Inner {
    script: VecDeque<Outcome>,
    fallback: Option<Outcome>,
    shipped: Vec<(Vec<Record>, LabelSet)>,
}

/// Shipper returning scripted outcomes and recording every batch it sees.
///
/// Once the script is exhausted the fallback outcome (delivery by default)
/// is returned.
#[derive(Clone, Default)]
pub struct ScriptedShipper {
    inner: Arc<Mutex<Inner>>,
}

impl ScriptedShipper {
    pub fn new(script: impl IntoIterator<Item = Outcome>) -> Self {
        let shipper = Self::default();
        shipper.inner.lock().script = script.into_iter().collect();
        shipper
    }

    /// Shipper that delivers every batch.
    pub fn delivering() -> Self {
        Self::default()
    }

    /// Shipper that rejects every batch with `status`.
    pub fn always_failing(status: u16) -> Self {
        let shipper = Self::default();
        shipper.inner.lock().fallback = Some(Outcome::Reject(status));
        shipper
    }

    /// Number of `ship` calls so far.
    pub fn calls(&self) -> usize {
        self.inner.lock().shipped.len()
    }

    /// Messages of every record passed to `ship`, in call order.
    pub fn shipped_lines(&self) -> Vec<String> {
        self.inner
            .lock()
            .shipped
            .iter()
            .flat_map(|(batch, _)| batch.iter().map(|r| r.line().to_owned()))
            .collect()
    }

    /// Label sets passed to `ship`, in call order.
    pub fn shipped_labels(&self) -> Vec<LabelSet> {
        self.inner
            .lock()
            .shipped
            .iter()
            .map(|(_, labels)| labels.clone())
            .collect()
    }
}

impl Shipper for ScriptedShipper {
    fn ship(&self, batch: &[Record], labels: &LabelSet) -> Result<(), ShipError> {
        let mut inner = self.inner.lock();
        inner.shipped.push((batch.to_vec(), labels.clone()));
        let outcome = inner
            .script
            .pop_front()
            .or_else(|| inner.fallback.clone())
            .unwrap_or(Outcome::Deliver);
        match outcome {
            Outcome::Deliver => Ok(()),
            Outcome::Reject(status) => Err(ShipError::Status(status)),
        }
    }
}
