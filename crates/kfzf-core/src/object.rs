use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifying metadata shared by every watched object.
///
/// Every field is defaulted so partially populated objects still load; adapters
/// degrade to placeholder values instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ObjectMeta {
    pub name: String,
    pub namespace: String,
    pub labels: BTreeMap<String, String>,
    /// RFC 3339 timestamp as delivered by the API server.
    pub creation_timestamp: Option<String>,
}

/// A raw object as delivered by the event source.
///
/// `spec` and `status` are kept as untyped JSON; per-kind adapters pick out the
/// fields they render.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawObject {
    pub kind: String,
    pub metadata: ObjectMeta,
    pub spec: serde_json::Value,
    pub status: serde_json::Value,
}

impl RawObject {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            metadata: ObjectMeta {
                name: name.into(),
                namespace: namespace.into(),
                ..ObjectMeta::default()
            },
            ..Self::default()
        }
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.metadata.labels.get(key).map(String::as_str)
    }

    /// Looks up a string at `path` under `spec`.
    pub fn spec_str(&self, path: &[&str]) -> Option<&str> {
        lookup(&self.spec, path).and_then(serde_json::Value::as_str)
    }

    /// Looks up a string at `path` under `status`.
    pub fn status_str(&self, path: &[&str]) -> Option<&str> {
        lookup(&self.status, path).and_then(serde_json::Value::as_str)
    }
}

fn lookup<'a>(value: &'a serde_json::Value, path: &[&str]) -> Option<&'a serde_json::Value> {
    path.iter().try_fold(value, |value, segment| value.get(segment))
}
