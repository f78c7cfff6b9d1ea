use crate::{Namespace, Node, Pod};
use kfzf_store::{Resource, ResourceEventHandler, Store, StoreConfig, StoreError};
use std::fmt;
use std::str::FromStr;

/// Resource kinds with a dump adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Namespaces,
    Nodes,
    Pods,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::Namespaces,
        ResourceKind::Nodes,
        ResourceKind::Pods,
    ];

    /// Name used for the dump file and in watch events.
    pub fn name(self) -> &'static str {
        match self {
            ResourceKind::Namespaces => Namespace::NAME,
            ResourceKind::Nodes => Node::NAME,
            ResourceKind::Pods => Pod::NAME,
        }
    }

    pub fn header(self) -> &'static str {
        match self {
            ResourceKind::Namespaces => Namespace::HEADER,
            ResourceKind::Nodes => Node::HEADER,
            ResourceKind::Pods => Pod::HEADER,
        }
    }

    /// Opens the store for this kind. The adapter is fixed here, once.
    pub fn open_store(
        self,
        config: &StoreConfig,
    ) -> Result<Box<dyn ResourceEventHandler>, StoreError> {
        Ok(match self {
            ResourceKind::Namespaces => Box::new(Store::<Namespace>::new(config)?),
            ResourceKind::Nodes => Box::new(Store::<Node>::new(config)?),
            ResourceKind::Pods => Box::new(Store::<Pod>::new(config)?),
        })
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown resource kind `{0}` (expected one of: namespaces, nodes, pods)")]
pub struct UnknownResourceKind(pub String);

impl FromStr for ResourceKind {
    type Err = UnknownResourceKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "namespace" | "namespaces" | "ns" => Ok(ResourceKind::Namespaces),
            "node" | "nodes" | "no" => Ok(ResourceKind::Nodes),
            "pod" | "pods" | "po" => Ok(ResourceKind::Pods),
            _ => Err(UnknownResourceKind(s.to_owned())),
        }
    }
}
