#![cfg(test)]

use super::config::*;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.api.timeout_secs, 10);
    assert_eq!(config.coordinator.poll_interval_secs, 60);
    assert_eq!(config.sensors.hour_offsets, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(config.sensors.minute_offsets, vec![15, 30, 45, 60, 75, 90]);
    assert_eq!(config.unit_label(), "CZK/kWh");
}

#[test]
fn test_config_validation() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.api.hourly_url = "ftp://example.com".to_string();
    assert!(config.validate().is_err());

    config = Config::default();
    config.coordinator.poll_interval_secs = 901;
    assert!(config.validate().is_err());

    config = Config::default();
    config.timezone = "Mars/Olympus".to_string();
    assert!(config.validate().is_err());

    config = Config::default();
    config.sensors.minute_offsets = vec![15, 20];
    assert!(config.validate().is_err());
}

#[test]
fn test_partial_yaml_uses_defaults() {
    let config: Config = serde_yaml::from_str("timezone: UTC\nweb:\n  port: 9000\n").unwrap();
    assert_eq!(config.timezone, "UTC");
    assert_eq!(config.web.port, 9000);
    assert_eq!(config.web.host, "127.0.0.1");
    assert_eq!(config.api.timeout_secs, 10);
}
