use crate::meta::{field, join_or_none, ResourceMeta};
use kfzf_core::RawObject;
use kfzf_store::Resource;

const ROLE_LABEL_PREFIX: &str = "node-role.kubernetes.io/";
const INSTANCE_TYPE_LABELS: [&str; 2] = [
    "node.kubernetes.io/instance-type",
    "beta.kubernetes.io/instance-type",
];
const ZONE_LABELS: [&str; 2] = [
    "topology.kubernetes.io/zone",
    "failure-domain.beta.kubernetes.io/zone",
];

/// Summary of a cluster node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub meta: ResourceMeta,
    pub roles: Vec<String>,
    pub instance_type: String,
    pub zone: String,
    pub internal_ip: String,
}

fn first_label(obj: &RawObject, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|key| obj.label(key))
        .unwrap_or_default()
        .to_owned()
}

fn internal_ip(obj: &RawObject) -> String {
    obj.status
        .get("addresses")
        .and_then(|addresses| addresses.as_array())
        .into_iter()
        .flatten()
        .filter(|address| address.get("type").and_then(|t| t.as_str()) == Some("InternalIP"))
        .filter_map(|address| address.get("address").and_then(|a| a.as_str()))
        .last()
        .unwrap_or_default()
        .to_owned()
}

impl Resource for Node {
    const NAME: &'static str = "nodes";
    const HEADER: &'static str = "Name Roles InstanceType Zone InternalIp Age Labels";

    fn from_raw(obj: &RawObject) -> Self {
        let meta = ResourceMeta::from_raw(obj);
        let roles = meta
            .labels
            .keys()
            .filter_map(|key| key.strip_prefix(ROLE_LABEL_PREFIX))
            .filter(|role| !role.is_empty())
            .map(str::to_owned)
            .collect();
        Self {
            roles,
            instance_type: first_label(obj, &INSTANCE_TYPE_LABELS),
            zone: first_label(obj, &ZONE_LABELS),
            internal_ip: internal_ip(obj),
            meta,
        }
    }

    // Node status churns constantly (heartbeats, conditions); every update is
    // treated as a change.
    fn has_changed(&self, _previous: &Self) -> bool {
        true
    }

    fn render(&self) -> String {
        [
            field(&self.meta.name),
            join_or_none(&self.roles),
            field(&self.instance_type),
            field(&self.zone),
            field(&self.internal_ip),
            self.meta.resource_age(),
            self.meta.labels_string(),
        ]
        .join(" ")
    }
}
