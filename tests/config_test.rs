//! Configuration loading tests
//!
//! Env-var driven tests are serialized because they mutate process state.

use ntpscout::config::{Config, DEFAULT_CATALOG_URL};
use serial_test::serial;

fn clear_env() {
    for key in [
        "NTPSCOUT_CATALOG_URL",
        "NTPSCOUT_FETCH_TIMEOUT_SECS",
        "NTPSCOUT_FETCH_MAX_RETRIES",
        "NTPSCOUT_MAX_WORKERS",
        "NTPSCOUT_PROBE_TIMEOUT_SECS",
        "NTPSCOUT_TOP_N",
        "NTPSCOUT_LOG_LEVEL",
        "NTPSCOUT_LOG_FORMAT",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_defaults_when_env_is_empty() {
    clear_env();

    let config = Config::from_env().unwrap();

    assert_eq!(config.catalog.url, DEFAULT_CATALOG_URL);
    assert_eq!(config.catalog.fetch_timeout_secs, 10);
    assert_eq!(config.probe.max_workers, 10);
    assert_eq!(config.probe.timeout_secs, 3);
    assert_eq!(config.probe.top_n, 5);
}

#[test]
#[serial]
fn test_env_overrides() {
    clear_env();
    std::env::set_var("NTPSCOUT_CATALOG_URL", "http://localhost:9999/ntp/");
    std::env::set_var("NTPSCOUT_MAX_WORKERS", "4");
    std::env::set_var("NTPSCOUT_PROBE_TIMEOUT_SECS", "1");
    std::env::set_var("NTPSCOUT_TOP_N", "3");

    let config = Config::from_env().unwrap();

    assert_eq!(config.catalog.url, "http://localhost:9999/ntp/");
    assert_eq!(config.probe.max_workers, 4);
    assert_eq!(config.probe.timeout_secs, 1);
    assert_eq!(config.probe.top_n, 3);

    clear_env();
}

#[test]
#[serial]
fn test_unparseable_values_fall_back_to_defaults() {
    clear_env();
    std::env::set_var("NTPSCOUT_MAX_WORKERS", "not-a-number");

    let config = Config::from_env().unwrap();
    assert_eq!(config.probe.max_workers, 10);

    clear_env();
}

#[test]
#[serial]
fn test_invalid_catalog_url_is_rejected() {
    clear_env();
    std::env::set_var("NTPSCOUT_CATALOG_URL", "not a url");

    assert!(Config::from_env().is_err());

    clear_env();
}
