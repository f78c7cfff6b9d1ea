use std::path::PathBuf;
use std::time::Duration;

use kfzf_config::StoreSection;
use kfzf_store::{StoreConfig, CACHE_DIR_ENV_VAR, CLUSTER_ENV_VAR};

use super::env::{EnvVarGuard, ENV_LOCK};

#[test]
fn explicit_values_win_over_env() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");
    let _dir = EnvVarGuard::set(CACHE_DIR_ENV_VAR, "/from/env");
    let _cluster = EnvVarGuard::set(CLUSTER_ENV_VAR, "env-cluster");

    let section = StoreSection {
        cache_dir: Some(PathBuf::from("/from/file")),
        cluster: Some("file-cluster".into()),
        time_between_full_dump_ms: 5,
    };
    let config = section.store_config().unwrap();
    assert_eq!(config.cache_dir, PathBuf::from("/from/file"));
    assert_eq!(config.cluster, "file-cluster");
    assert_eq!(config.time_between_full_dump, Duration::from_millis(5));
    assert_eq!(
        config.dest_path("pods"),
        PathBuf::from("/from/file/file-cluster/pods")
    );
}

#[test]
fn env_fills_unset_values() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");
    let _dir = EnvVarGuard::set(CACHE_DIR_ENV_VAR, "/from/env");
    let _cluster = EnvVarGuard::set(CLUSTER_ENV_VAR, "env-cluster");

    let config = StoreSection::default().store_config().unwrap();
    assert_eq!(config.cache_dir, PathBuf::from("/from/env"));
    assert_eq!(config.cluster, "env-cluster");
    assert_eq!(
        config.time_between_full_dump,
        StoreConfig::DEFAULT_TIME_BETWEEN_FULL_DUMP
    );
}

#[test]
fn blank_cluster_falls_back_to_default() {
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK mutex poisoned");
    let _cluster = EnvVarGuard::set(CLUSTER_ENV_VAR, "  ");

    let section = StoreSection {
        cache_dir: Some(PathBuf::from("/cache")),
        ..StoreSection::default()
    };
    let config = section.store_config().unwrap();
    assert_eq!(config.cluster, StoreConfig::DEFAULT_CLUSTER);
}
