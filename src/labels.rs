//! Static labels attached to every shipped stream.

use std::fmt;

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};

/// Insertion-ordered set of unique label keys and their values.
///
/// Rendering follows insertion order, so the label string sent to the
/// backend is deterministic for a given configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabelSet {
    pairs: Vec<(String, String)>,
}

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a label. A replaced label keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.pairs.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Render as a stream selector, e.g. `{job="api", env="prod"}`.
    ///
    /// Double quotes and backslashes inside values are escaped.
    pub fn render(&self) -> String {
        let body = self
            .iter()
            .map(|(k, v)| format!("{k}=\"{}\"", escape_value(v)))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{{{body}}}")
    }
}

fn escape_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

impl fmt::Display for LabelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LabelSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut labels = Self::new();
        for (k, v) in iter {
            labels.insert(k, v);
        }
        labels
    }
}

struct LabelSetVisitor;

impl<'de> Visitor<'de> for LabelSetVisitor {
    type Value = LabelSet;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of label names to string values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut labels = LabelSet::new();
        while let Some((key, value)) = map.next_entry::<String, String>()? {
            labels.insert(key, value);
        }
        Ok(labels)
    }
}

impl<'de> Deserialize<'de> for LabelSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(LabelSetVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_in_insertion_order() {
        let labels: LabelSet = [("job", "api"), ("env", "prod")].into_iter().collect();
        assert_eq!(labels.render(), r#"{job="api", env="prod"}"#);
    }

    #[test]
    fn empty_set_renders_braces() {
        assert_eq!(LabelSet::new().render(), "{}");
    }

    #[test]
    fn replacing_a_key_keeps_position() {
        let mut labels = LabelSet::new();
        labels.insert("job", "api");
        labels.insert("env", "dev");
        labels.insert("job", "worker");
        assert_eq!(labels.len(), 2);
        assert_eq!(labels.render(), r#"{job="worker", env="dev"}"#);
    }

    #[test]
    fn escapes_quotes_in_values() {
        let labels: LabelSet = [("msg", r#"say "hi""#)].into_iter().collect();
        assert_eq!(labels.render(), r#"{msg="say \"hi\""}"#);
    }

    #[test]
    fn deserialises_preserving_document_order() {
        let labels: LabelSet =
            serde_json::from_str(r#"{"zone":"eu","app":"shop","env":"prod"}"#).expect("parse");
        let keys: Vec<&str> = labels.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["zone", "app", "env"]);
        assert_eq!(labels.get("app"), Some("shop"));
    }
}
