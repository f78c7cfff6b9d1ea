use crate::error::StoreError;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the base cache directory.
pub const CACHE_DIR_ENV_VAR: &str = "KFZF_CACHE_DIR";
/// Environment variable overriding the cluster name.
pub const CLUSTER_ENV_VAR: &str = "KFZF_CLUSTER";

/// Suffix appended to the destination path to form the scratch path.
const SCRATCH_SUFFIX: &str = "_";

/// Where and how often a store writes its dump.
///
/// Dumps live under `<cache_dir>/<cluster>/<resource name>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    pub cache_dir: PathBuf,
    pub cluster: String,
    /// Minimum wall-clock spacing between two full rewrites.
    pub time_between_full_dump: Duration,
}

impl StoreConfig {
    pub const DEFAULT_CLUSTER: &'static str = "default";
    pub const DEFAULT_TIME_BETWEEN_FULL_DUMP: Duration = Duration::from_secs(1);

    pub fn new(cache_dir: impl Into<PathBuf>, cluster: impl Into<String>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            cluster: cluster.into(),
            time_between_full_dump: Self::DEFAULT_TIME_BETWEEN_FULL_DUMP,
        }
    }

    pub fn with_time_between_full_dump(mut self, interval: Duration) -> Self {
        self.time_between_full_dump = interval;
        self
    }

    /// Fills in whatever is not given explicitly from `KFZF_CACHE_DIR` /
    /// `KFZF_CLUSTER`, then from `$HOME/.cache/kubectl_fzf` and the `default`
    /// cluster. A blank cluster name counts as unset.
    pub fn resolve(
        cache_dir: Option<PathBuf>,
        cluster: Option<String>,
    ) -> Result<Self, StoreError> {
        let from_env = || std::env::var_os(CACHE_DIR_ENV_VAR).map(PathBuf::from);
        let cache_dir = match cache_dir.or_else(from_env) {
            Some(dir) => dir,
            None => default_cache_root()?,
        };
        let cluster = cluster
            .or_else(|| std::env::var(CLUSTER_ENV_VAR).ok())
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| Self::DEFAULT_CLUSTER.to_owned());
        Ok(Self::new(cache_dir, cluster))
    }

    pub fn dest_dir(&self) -> PathBuf {
        self.cache_dir.join(&self.cluster)
    }

    pub fn dest_path(&self, resource_name: &str) -> PathBuf {
        self.dest_dir().join(resource_name)
    }

    pub fn scratch_path(&self, resource_name: &str) -> PathBuf {
        scratch_path_for(&self.dest_path(resource_name))
    }
}

pub(crate) fn scratch_path_for(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_os_string();
    name.push(SCRATCH_SUFFIX);
    PathBuf::from(name)
}

pub fn default_cache_root() -> Result<PathBuf, StoreError> {
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .ok_or(StoreError::MissingHomeDir)?;

    Ok(home.join(".cache").join("kubectl_fzf"))
}
