//! `kfzf.toml` configuration and tracing setup.

use kfzf_store::{StoreConfig, StoreError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};
use std::time::Duration;
use thiserror::Error;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Environment variable naming the config file to load.
pub const KFZF_CONFIG_ENV_VAR: &str = "KFZF_CONFIG";

/// Prefix shared by every `tracing` target this workspace logs under.
const LOG_TARGET_PREFIX: &str = "kfzf";

/// Resource kinds watched when the config does not list any.
pub const DEFAULT_KINDS: [&str; 3] = ["namespaces", "nodes", "pods"];

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KfzfConfig {
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub watch: WatchConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreSection {
    /// Base cache directory. Falls back to `KFZF_CACHE_DIR`, then `$HOME/.cache/kubectl_fzf`.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    /// Cluster name; dumps go to `<cache_dir>/<cluster>/`. Falls back to `KFZF_CLUSTER`.
    #[serde(default)]
    pub cluster: Option<String>,

    /// Minimum time between two full rewrites of a dump (in milliseconds).
    #[serde(default = "StoreSection::default_time_between_full_dump_ms")]
    pub time_between_full_dump_ms: u64,
}

impl StoreSection {
    fn default_time_between_full_dump_ms() -> u64 {
        StoreConfig::DEFAULT_TIME_BETWEEN_FULL_DUMP.as_millis() as u64
    }

    pub fn time_between_full_dump(&self) -> Duration {
        Duration::from_millis(self.time_between_full_dump_ms)
    }

    /// Resolves the effective store config: explicit values, then environment, then defaults.
    pub fn store_config(&self) -> Result<StoreConfig, StoreError> {
        let config = StoreConfig::resolve(self.cache_dir.clone(), self.cluster.clone())?;
        Ok(config.with_time_between_full_dump(self.time_between_full_dump()))
    }
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            cache_dir: None,
            cluster: None,
            time_between_full_dump_ms: Self::default_time_between_full_dump_ms(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WatchConfig {
    /// Resource kinds to keep dumps for.
    #[serde(default = "WatchConfig::default_kinds")]
    pub kinds: Vec<String>,
}

impl WatchConfig {
    fn default_kinds() -> Vec<String> {
        DEFAULT_KINDS.iter().map(|kind| kind.to_string()).collect()
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            kinds: Self::default_kinds(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level, or a full `EnvFilter` directive string.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Emit logs in JSON format.
    #[serde(default)]
    pub json: bool,

    /// Write logs to stderr.
    #[serde(default = "LoggingConfig::default_stderr")]
    pub stderr: bool,

    /// Append logs to the given file path. If the file cannot be opened, file
    /// logging is disabled while stderr logging stays active.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_owned()
    }

    fn default_stderr() -> bool {
        true
    }

    /// Turns `level` into `EnvFilter` directives.
    ///
    /// A bare level applies to the `kfzf.*` targets and keeps other crates at
    /// `warn` (or quieter). Anything else is taken as a directive string.
    pub(crate) fn directives(&self) -> String {
        let trimmed = self.level.trim();
        let level = match trimmed.to_ascii_lowercase().as_str() {
            "" => Self::default_level(),
            "warning" => "warn".to_owned(),
            level @ ("trace" | "debug" | "info" | "warn" | "error" | "off") => level.to_owned(),
            _ => return trimmed.to_owned(),
        };
        let others = match level.as_str() {
            "error" | "off" => level.as_str(),
            _ => "warn",
        };
        format!("{others},{LOG_TARGET_PREFIX}={level}")
    }

    /// The effective filter: the configured level's directives, with each `RUST_LOG`
    /// directive layered on top. Unparseable directives are skipped.
    pub fn env_filter(&self) -> EnvFilter {
        let mut filter = EnvFilter::try_new(self.directives()).unwrap_or_else(|_| {
            EnvFilter::new(format!("warn,{LOG_TARGET_PREFIX}={}", Self::default_level()))
        });

        if let Ok(env) = std::env::var("RUST_LOG") {
            for directive in env.split(',').map(str::trim).filter(|d| !d.is_empty()) {
                if let Ok(directive) = directive.parse::<Directive>() {
                    filter = filter.add_directive(directive);
                }
            }
        }
        filter
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
            stderr: Self::default_stderr(),
            file: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        // Keep the message without the source snippet.
        ConfigError::Toml(err.message().to_owned())
    }
}

impl KfzfConfig {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::load_from_str(&text)
    }

    pub fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Loads `explicit` if given, else the file named by `KFZF_CONFIG`, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>), ConfigError> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(KFZF_CONFIG_ENV_VAR).map(PathBuf::from));
        match path {
            Some(path) => Ok((Self::load_from_path(&path)?, Some(path))),
            None => Ok((Self::default(), None)),
        }
    }
}

static TRACING_INIT: Once = Once::new();

/// Installs the global `tracing` subscriber.
///
/// Safe to call more than once; only the first call has an effect.
pub fn init_tracing(config: &LoggingConfig) {
    TRACING_INIT.call_once(|| {
        let filter = config.env_filter();

        let file = config.file.as_ref().map(|path| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|err| (path, err))
        });
        let (file, file_error) = match file {
            Some(Ok(file)) => (Some(file), None),
            Some(Err(err)) => (None, Some(err)),
            None => (None, None),
        };

        let mut make_writer = if config.stderr {
            BoxMakeWriter::new(std::io::stderr)
        } else {
            BoxMakeWriter::new(std::io::sink)
        };
        if let Some(file) = file {
            make_writer = BoxMakeWriter::new(make_writer.and(Arc::new(file)));
        }

        let registry = tracing_subscriber::registry().with(filter);
        let installed = if config.json {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(make_writer)
                        .with_ansi(false),
                )
                .try_init()
        } else {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(make_writer)
                        .with_ansi(false),
                )
                .try_init()
        };

        if let (Ok(()), Some((path, err))) = (installed, file_error) {
            tracing::warn!(
                target = "kfzf.config",
                path = %path.display(),
                error = %err,
                "failed to open log file; logging to stderr only"
            );
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directives_for(level: &str) -> String {
        LoggingConfig {
            level: level.into(),
            ..LoggingConfig::default()
        }
        .directives()
    }

    #[test]
    fn bare_levels_scope_to_kfzf_targets() {
        assert_eq!(directives_for(" WARNING "), "warn,kfzf=warn");
        assert_eq!(directives_for(""), "warn,kfzf=info");
        assert_eq!(directives_for("debug"), "warn,kfzf=debug");
        assert_eq!(directives_for("error"), "error,kfzf=error");
    }

    #[test]
    fn directive_strings_pass_through() {
        assert_eq!(directives_for("kfzf.store=trace"), "kfzf.store=trace");
    }

    #[test]
    fn toml_errors_omit_source_snippet() {
        let err = KfzfConfig::load_from_str("[store]\ncluster = 3\n").unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("failed to parse toml config"), "{msg}");
        assert!(!msg.contains("cluster = 3"), "{msg}");
    }
}
