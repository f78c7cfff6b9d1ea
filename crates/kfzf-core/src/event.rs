use crate::key::ResourceKey;
use crate::object::RawObject;
use serde::{Deserialize, Serialize};

/// What a delete notification refers to.
///
/// Event sources may deliver either the deleted object itself or a tombstone
/// whose final state is unknown (the watch missed the delete and only knows the
/// key). Anything else is carried as-is so the receiver can log and ignore it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeleteTarget {
    FinalStateUnknown {
        key: String,
        #[serde(default)]
        obj: Option<RawObject>,
    },
    Object(RawObject),
    Unresolved(serde_json::Value),
}

impl DeleteTarget {
    pub fn resource_key(&self) -> Option<ResourceKey> {
        match self {
            DeleteTarget::Object(obj) => ResourceKey::from_meta(&obj.metadata),
            DeleteTarget::FinalStateUnknown { key, obj } => obj
                .as_ref()
                .and_then(|obj| ResourceKey::from_meta(&obj.metadata))
                .or_else(|| ResourceKey::from_cache_key(key)),
            DeleteTarget::Unresolved(_) => None,
        }
    }
}

impl From<RawObject> for DeleteTarget {
    fn from(obj: RawObject) -> Self {
        DeleteTarget::Object(obj)
    }
}

/// One notification from the event source, as read from a JSON-lines stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WatchEvent {
    /// Full resync: the given objects replace everything known for `kind`.
    List {
        kind: String,
        #[serde(default)]
        objects: Vec<RawObject>,
    },
    Add {
        kind: String,
        object: RawObject,
    },
    Update {
        kind: String,
        old: RawObject,
        new: RawObject,
    },
    Delete {
        kind: String,
        target: DeleteTarget,
    },
}

impl WatchEvent {
    pub fn kind(&self) -> &str {
        match self {
            WatchEvent::List { kind, .. }
            | WatchEvent::Add { kind, .. }
            | WatchEvent::Update { kind, .. }
            | WatchEvent::Delete { kind, .. } => kind,
        }
    }
}
