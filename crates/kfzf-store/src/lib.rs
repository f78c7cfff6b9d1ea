//! On-disk, line-oriented snapshots of a watched resource set.
//!
//! A [`Store`] keeps every resource of one kind in memory, keyed by
//! [`kfzf_core::ResourceKey`], and mirrors it to a text file that external
//! tools can grep without contacting the API server.
//!
//! ## Write strategies
//!
//! - Additions append one line to the open dump file.
//! - Deletions, real updates and full resyncs rewrite the whole file through a
//!   scratch file and an atomic rename. Rewrites are rate limited by
//!   [`StoreConfig::time_between_full_dump`]; a throttled request is dropped
//!   and the file catches up on the next rewrite that is let through.
//!
//! ## On-disk layout
//!
//! - `<cache_dir>/<cluster>/<resource>`: header line, then one line per resource.
//! - `<cache_dir>/<cluster>/<resource>_`: scratch file, never read by consumers.

mod config;
mod error;
mod handler;
mod resource;
mod scheduler;
mod store;
mod util;
mod writer;

pub use config::{default_cache_root, StoreConfig, CACHE_DIR_ENV_VAR, CLUSTER_ENV_VAR};
pub use error::{Result, StoreError};
pub use handler::ResourceEventHandler;
pub use resource::Resource;
pub use scheduler::DumpScheduler;
pub use store::{Store, WriteOutcome};
pub use writer::{append_line, StagedDump};
