//! Integration test: strategies loaded from a config file drive a policy.

use std::fs;
use std::time::Duration;

use faultline_core::config;
use faultline_core::retry::{AlwaysTransient, RetryError};
use faultline_core::RetryManager;
use tempfile::tempdir;

#[test]
fn configured_strategy_bounds_the_retry_loop() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
        default_strategy = "db"

        [[strategy]]
        name = "db"
        kind = "fixed"
        retry_count = 2
        retry_interval_secs = 0.001

        [[strategy]]
        name = "http"
        kind = "exponential"
        retry_count = 4
        min_backoff_secs = 0.001
        max_backoff_secs = 0.01
        delta_backoff_secs = 0.002
        first_fast_retry = true
        "#,
    )
    .unwrap();

    let cfg = config::load_or_init_at(&path).unwrap();
    let manager = RetryManager::from_config(&cfg).unwrap();

    let mut calls = 0;
    let out: Result<(), RetryError<&str>> = manager.default_policy(AlwaysTransient).execute(|| {
        calls += 1;
        Err("locked")
    });
    assert!(out.unwrap_err().is_exhausted());
    assert_eq!(calls, 3);

    let http = manager
        .policy::<std::io::Error, _>("http", AlwaysTransient)
        .unwrap();
    assert!(http.strategy().first_fast_retry());
    let first = http.strategy().next_delay(0, &());
    assert_eq!(first.delay(), Duration::ZERO);
}

#[test]
fn missing_file_gets_default_strategy() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("faultline").join("config.toml");
    let cfg = config::load_or_init_at(&path).unwrap();
    let manager = RetryManager::from_config(&cfg).unwrap();
    assert_eq!(manager.default_strategy_name(), config::DEFAULT_STRATEGY_NAME);
    assert_eq!(manager.default_strategy().retry_count(), 10);
    assert!(fs::read_to_string(&path).unwrap().contains("[[strategy]]"));
}
