//! Field rendering shared by every resource kind.
//!
//! Dump lines are split on single spaces by consumers and there is no escaping,
//! so every field goes through [`field`]: empty values become [`NONE`] and
//! embedded whitespace becomes `_`.

use kfzf_core::RawObject;
use std::collections::BTreeMap;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Placeholder for empty or absent fields.
pub const NONE: &str = "None";

/// Makes `value` safe to embed in a space-separated line.
pub fn field(value: &str) -> String {
    if value.is_empty() {
        return NONE.to_owned();
    }
    value
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

/// Joins `values` with `,`, or [`NONE`] when there are none.
pub fn join_or_none<S: AsRef<str>>(values: &[S]) -> String {
    if values.is_empty() {
        return NONE.to_owned();
    }
    let joined = values
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(",");
    field(&joined)
}

/// Renders labels as sorted `key=value` pairs joined with `,`.
pub fn labels_string(labels: &BTreeMap<String, String>) -> String {
    let pairs: Vec<String> = labels
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect();
    join_or_none(&pairs)
}

pub fn parse_timestamp(value: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(value, &Rfc3339).ok()
}

/// Compact age as shown by `kubectl get`: `42s`, `5m`, `3h`, `2d`.
pub fn format_age(created: OffsetDateTime, now: OffsetDateTime) -> String {
    let secs = (now - created).whole_seconds().max(0);
    match secs {
        s if s < 60 => format!("{s}s"),
        s if s < 60 * 60 => format!("{}m", s / 60),
        s if s < 24 * 60 * 60 => format!("{}h", s / (60 * 60)),
        s => format!("{}d", s / (24 * 60 * 60)),
    }
}

/// Metadata every adapter renders.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResourceMeta {
    pub name: String,
    pub namespace: String,
    pub labels: BTreeMap<String, String>,
    pub created: Option<OffsetDateTime>,
}

impl ResourceMeta {
    pub fn from_raw(obj: &RawObject) -> Self {
        let created = obj.metadata.creation_timestamp.as_deref().and_then(|raw| {
            let parsed = parse_timestamp(raw);
            if parsed.is_none() {
                tracing::trace!(
                    target = "kfzf.resources",
                    name = %obj.metadata.name,
                    timestamp = raw,
                    "unparseable creation timestamp"
                );
            }
            parsed
        });
        Self {
            name: obj.metadata.name.clone(),
            namespace: obj.metadata.namespace.clone(),
            labels: obj.metadata.labels.clone(),
            created,
        }
    }

    pub fn age(&self, now: OffsetDateTime) -> String {
        match self.created {
            Some(created) => format_age(created, now),
            None => NONE.to_owned(),
        }
    }

    pub fn resource_age(&self) -> String {
        self.age(OffsetDateTime::now_utc())
    }

    pub fn labels_string(&self) -> String {
        labels_string(&self.labels)
    }
}
