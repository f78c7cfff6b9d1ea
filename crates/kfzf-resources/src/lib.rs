//! Dump adapters for the resource kinds kfzf knows how to render.
//!
//! Each adapter implements [`kfzf_store::Resource`]; [`ResourceKind`] picks one
//! when a store is opened.

mod kind;
mod meta;
mod namespace;
mod node;
mod pod;

pub use kind::{ResourceKind, UnknownResourceKind};
pub use meta::{
    field, format_age, join_or_none, labels_string, parse_timestamp, ResourceMeta, NONE,
};
pub use namespace::Namespace;
pub use node::Node;
pub use pod::Pod;
