use crate::meta::{field, ResourceMeta};
use kfzf_core::RawObject;
use kfzf_store::Resource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    pub meta: ResourceMeta,
    pub status: String,
}

impl Resource for Namespace {
    const NAME: &'static str = "namespaces";
    const HEADER: &'static str = "Name Status Age Labels";

    fn from_raw(obj: &RawObject) -> Self {
        Self {
            meta: ResourceMeta::from_raw(obj),
            status: obj.status_str(&["phase"]).unwrap_or_default().to_owned(),
        }
    }

    fn has_changed(&self, previous: &Self) -> bool {
        self.status != previous.status || self.meta.labels != previous.meta.labels
    }

    fn render(&self) -> String {
        [
            field(&self.meta.name),
            field(&self.status),
            self.meta.resource_age(),
            self.meta.labels_string(),
        ]
        .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminating_namespace_is_a_change() {
        let mut raw = RawObject::new("", "team-a");
        raw.status = serde_json::json!({"phase": "Active"});
        let active = Namespace::from_raw(&raw);
        assert_eq!(active.render(), "team-a Active None None");

        raw.status = serde_json::json!({"phase": "Terminating"});
        let terminating = Namespace::from_raw(&raw);
        assert!(terminating.has_changed(&active));
        assert!(!active.has_changed(&active.clone()));
    }
}
