//! Core shared types for kfzf.
//!
//! This crate is intentionally small: it models the raw objects delivered by a
//! watch event source, the identity used to key them, and the events
//! themselves. It has no I/O.

mod event;
mod key;
mod object;

pub use event::{DeleteTarget, WatchEvent};
pub use key::ResourceKey;
pub use object::{ObjectMeta, RawObject};
