use crate::meta::{field, join_or_none, ResourceMeta};
use kfzf_core::RawObject;
use kfzf_store::Resource;

/// Summary of a pod.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pod {
    pub meta: ResourceMeta,
    pub pod_ip: String,
    pub host_ip: String,
    pub node_name: String,
    pub phase: String,
    pub containers: Vec<String>,
}

fn container_names(obj: &RawObject) -> Vec<String> {
    obj.spec
        .get("containers")
        .and_then(|containers| containers.as_array())
        .into_iter()
        .flatten()
        .filter_map(|container| container.get("name").and_then(|name| name.as_str()))
        .map(str::to_owned)
        .collect()
}

impl Resource for Pod {
    const NAME: &'static str = "pods";
    const HEADER: &'static str = "Namespace Name PodIp HostIp NodeName Phase Containers Age Labels";

    fn from_raw(obj: &RawObject) -> Self {
        Self {
            meta: ResourceMeta::from_raw(obj),
            pod_ip: obj.status_str(&["podIP"]).unwrap_or_default().to_owned(),
            host_ip: obj.status_str(&["hostIP"]).unwrap_or_default().to_owned(),
            node_name: obj.spec_str(&["nodeName"]).unwrap_or_default().to_owned(),
            phase: obj.status_str(&["phase"]).unwrap_or_default().to_owned(),
            containers: container_names(obj),
        }
    }

    /// Age is derived at render time, so comparing the stored fields is enough.
    fn has_changed(&self, previous: &Self) -> bool {
        self != previous
    }

    fn render(&self) -> String {
        [
            field(&self.meta.namespace),
            field(&self.meta.name),
            field(&self.pod_ip),
            field(&self.host_ip),
            field(&self.node_name),
            field(&self.phase),
            join_or_none(&self.containers),
            self.meta.resource_age(),
            self.meta.labels_string(),
        ]
        .join(" ")
    }
}
