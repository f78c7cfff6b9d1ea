use std::path::PathBuf;

use kfzf_config::{ConfigError, KfzfConfig, LoggingConfig, DEFAULT_KINDS, KFZF_CONFIG_ENV_VAR};
use tempfile::tempdir;

use super::env::{EnvVarGuard, ENV_LOCK};

#[test]
fn empty_file_yields_defaults() {
    let config = KfzfConfig::load_from_str("").unwrap();
    assert_eq!(config, KfzfConfig::default());
    assert_eq!(config.watch.kinds, DEFAULT_KINDS.to_vec());
    assert_eq!(config.store.time_between_full_dump_ms, 1000);
    assert_eq!(config.logging, LoggingConfig::default());
}

#[test]
fn parses_every_section() {
    let config = KfzfConfig::load_from_str(
        r#"
[store]
cache_dir = "/var/cache/kfzf"
cluster = "staging"
time_between_full_dump_ms = 250

[logging]
level = "kfzf.store=debug"
json = true
stderr = false
file = "/tmp/kfzf.log"

[watch]
kinds = ["pods"]
"#,
    )
    .unwrap();

    assert_eq!(config.store.cache_dir, Some(PathBuf::from("/var/cache/kfzf")));
    assert_eq!(config.store.cluster.as_deref(), Some("staging"));
    assert_eq!(
        config.store.time_between_full_dump(),
        std::time::Duration::from_millis(250)
    );
    assert_eq!(config.logging.level, "kfzf.store=debug");
    assert!(config.logging.json);
    assert!(!config.logging.stderr);
    assert_eq!(config.logging.file, Some(PathBuf::from("/tmp/kfzf.log")));
    assert_eq!(config.watch.kinds, vec!["pods".to_owned()]);
}

#[test]
fn unknown_keys_are_rejected() {
    let err = KfzfConfig::load_from_str("[store]\nclustr = \"x\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Toml(_)), "{err:?}");
    assert!(err.to_string().contains("clustr"), "{err}");
}

#[test]
fn missing_file_reports_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let err = KfzfConfig::load_from_path(&path).unwrap_err();
    match err {
        ConfigError::Io { path: reported, .. } => {
            assert_eq!(reported, path.display().to_string())
        }
        other => panic!("expected io error, got {other:?}"),
    }
}

#[test]
fn env_var_names_the_config_file() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");

    let dir = tempdir().unwrap();
    let path = dir.path().join("kfzf.toml");
    std::fs::write(&path, "[watch]\nkinds = [\"nodes\"]\n").unwrap();
    let _env = EnvVarGuard::set(KFZF_CONFIG_ENV_VAR, &path);

    let (config, loaded_from) = KfzfConfig::load(None).unwrap();
    assert_eq!(loaded_from, Some(path));
    assert_eq!(config.watch.kinds, vec!["nodes".to_owned()]);
}

#[test]
fn explicit_path_wins_over_env_var() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");

    let dir = tempdir().unwrap();
    let from_env = dir.path().join("env.toml");
    let explicit = dir.path().join("explicit.toml");
    std::fs::write(&from_env, "[store]\ncluster = \"from-env\"\n").unwrap();
    std::fs::write(&explicit, "[store]\ncluster = \"explicit\"\n").unwrap();
    let _env = EnvVarGuard::set(KFZF_CONFIG_ENV_VAR, &from_env);

    let (config, _) = KfzfConfig::load(Some(&explicit)).unwrap();
    assert_eq!(config.store.cluster.as_deref(), Some("explicit"));
}

#[test]
fn no_config_anywhere_uses_defaults() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");
    let _env = EnvVarGuard::unset(KFZF_CONFIG_ENV_VAR);

    let (config, loaded_from) = KfzfConfig::load(None).unwrap();
    assert_eq!(loaded_from, None);
    assert_eq!(config, KfzfConfig::default());
}

#[test]
fn rust_log_is_layered_over_the_config_level() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");
    let _env = EnvVarGuard::set("RUST_LOG", "kfzf.store=trace, kfzf.watch=notalevel");

    let config = LoggingConfig {
        level: "warning".into(),
        ..LoggingConfig::default()
    };
    let filter = config.env_filter().to_string();
    assert!(filter.contains("kfzf=warn"), "{filter}");
    assert!(filter.contains("kfzf.store=trace"), "{filter}");
    assert!(!filter.contains("notalevel"), "{filter}");
}

#[test]
fn unset_rust_log_keeps_config_directives() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");
    let _env = EnvVarGuard::unset("RUST_LOG");

    let config = LoggingConfig {
        level: "kfzf.watch=debug".into(),
        ..LoggingConfig::default()
    };
    assert_eq!(config.env_filter().to_string(), "kfzf.watch=debug");
}
