use crate::object::ObjectMeta;
use std::fmt;

/// Stable identity of one resource within a single kind's cache.
///
/// Rendered as `"{namespace}_{name}"`; cluster-scoped objects have an empty
/// namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey(String);

impl ResourceKey {
    pub fn new(namespace: &str, name: &str) -> Self {
        Self(format!("{namespace}_{name}"))
    }

    /// Returns `None` when the object carries no name.
    pub fn from_meta(meta: &ObjectMeta) -> Option<Self> {
        if meta.name.is_empty() {
            return None;
        }
        Some(Self::new(&meta.namespace, &meta.name))
    }

    /// Parses the event source's `namespace/name` (or bare `name`) token form.
    pub fn from_cache_key(token: &str) -> Option<Self> {
        let (namespace, name) = match token.split_once('/') {
            Some((namespace, name)) => (namespace, name),
            None => ("", token),
        };
        if name.is_empty() || name.contains('/') {
            return None;
        }
        Some(Self::new(namespace, name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_joins_namespace_and_name() {
        assert_eq!(ResourceKey::new("kube-system", "dns").as_str(), "kube-system_dns");
        assert_eq!(ResourceKey::new("", "node-1").as_str(), "_node-1");
    }

    #[test]
    fn nameless_meta_has_no_identity() {
        let meta = ObjectMeta {
            namespace: "default".into(),
            ..ObjectMeta::default()
        };
        assert_eq!(ResourceKey::from_meta(&meta), None);
    }

    #[test]
    fn cache_key_tokens() {
        assert_eq!(
            ResourceKey::from_cache_key("default/web"),
            Some(ResourceKey::new("default", "web"))
        );
        assert_eq!(
            ResourceKey::from_cache_key("node-1"),
            Some(ResourceKey::new("", "node-1"))
        );
        assert_eq!(ResourceKey::from_cache_key(""), None);
        assert_eq!(ResourceKey::from_cache_key("default/"), None);
        assert_eq!(ResourceKey::from_cache_key("a/b/c"), None);
    }
}
