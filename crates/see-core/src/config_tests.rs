//! Config module tests

use crate::config::{ApiConfig, Config};

#[test]
fn test_config_default() {
    let config = Config::default();

    assert!(config.api.api_key.is_none());
    assert_eq!(config.api.timeout_secs, 15);
    assert_eq!(config.cache.domain_ttl_secs, 86_400);
    assert_eq!(config.history.max_entries, 100);
    assert_eq!(config.logging.level, "info");
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_rejects_api_key() {
    let mut config = Config::default();
    config.api.api_key = Some("sk-test-key".to_string());

    assert!(config.validate().is_err());
    assert!(config.set("api_key", "sk-test-key").is_err());
}

#[test]
fn test_config_get_set_roundtrip() {
    let mut config = Config::default();
    config.set("api.timeout_secs", "30").unwrap();
    config.set("cache.domain_ttl_secs", "600").unwrap();
    config.set("history.max_entries", "25").unwrap();
    config.set("logging.level", "debug").unwrap();

    assert_eq!(config.get("api.timeout_secs").unwrap(), "30");
    assert_eq!(config.get("cache.domain_ttl_secs").unwrap(), "600");
    assert_eq!(config.get("history.max_entries").unwrap(), "25");
    assert_eq!(config.get("logging.level").unwrap(), "debug");
}

#[test]
fn test_config_set_validation() {
    let mut config = Config::default();
    assert!(config.set("api.timeout_secs", "0").is_err());
    assert!(config.set("api.timeout_secs", "soon").is_err());
    assert!(config.set("history.max_entries", "0").is_err());
    assert!(config.set("logging.level", "loud").is_err());
    assert!(config.set("nope", "1").is_err());
    assert!(config.get("nope").is_err());
}

#[test]
fn test_config_list_hides_key() {
    let config = Config::default();
    let entries = config.list().unwrap();
    assert_eq!(entries.len(), 5);
    let (_, key_value) = entries
        .iter()
        .find(|(k, _)| k == "api.api_key")
        .unwrap();
    assert!(key_value.contains("encrypted"));
}

#[test]
fn test_config_toml_roundtrip() {
    let mut config = Config::default();
    config.history.max_entries = 10;

    let serialized = toml::to_string_pretty(&config).expect("Should serialize");
    assert!(!serialized.contains("api_key"));

    let deserialized: Config = toml::from_str(&serialized).expect("Should deserialize");
    assert_eq!(deserialized.history.max_entries, 10);
    assert_eq!(deserialized.api.timeout_secs, 15);
}

#[test]
fn test_config_partial_toml_uses_defaults() {
    let config: Config = toml::from_str("[history]\nmax_entries = 5\n").unwrap();
    assert_eq!(config.history.max_entries, 5);
    assert_eq!(config.api.timeout_secs, 15);
    assert_eq!(config.cache.domain_ttl_secs, 86_400);
}

#[test]
fn test_api_config_enforce_no_key() {
    let api = ApiConfig::default();
    assert!(api.enforce_no_key().is_ok());
}
