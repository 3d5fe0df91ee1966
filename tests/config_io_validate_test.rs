use spotova::config::Config;
use std::fs;

#[test]
fn save_and_load_yaml_roundtrip() {
    let tmp_dir = tempfile::tempdir().unwrap();
    let path = tmp_dir.path().join("spotova.yaml");

    let mut cfg = Config::default();
    cfg.api.hourly_url = "http://127.0.0.1:9000/hourly".to_string();
    cfg.sensors.hour_offsets = vec![1, 12];
    cfg.logging.file = path.with_extension("log").to_string_lossy().to_string();

    cfg.save_to_file(&path).unwrap();
    let loaded = Config::from_file(&path).unwrap();

    assert_eq!(loaded.api.hourly_url, "http://127.0.0.1:9000/hourly");
    assert_eq!(loaded.sensors.hour_offsets, vec![1, 12]);
    assert_eq!(loaded.logging.file, cfg.logging.file);
    assert!(loaded.validate().is_ok());
}

#[test]
fn config_validation_errors() {
    let mut cfg = Config::default();

    cfg.api.quarter_hour_url = "ftp://example.com/prices".to_string();
    assert!(cfg.validate().is_err());

    cfg = Config::default();
    cfg.api.timeout_secs = 0;
    assert!(cfg.validate().is_err());

    cfg = Config::default();
    cfg.coordinator.poll_interval_secs = 0;
    assert!(cfg.validate().is_err());

    cfg = Config::default();
    cfg.timezone = "Mars/Olympus".to_string();
    assert!(cfg.validate().is_err());

    // Offsets must land on a quarter-hour boundary
    cfg = Config::default();
    cfg.sensors.minute_offsets = vec![20];
    assert!(cfg.validate().is_err());

    cfg = Config::default();
    cfg.sensors.hour_offsets = vec![0];
    assert!(cfg.validate().is_err());
}

#[test]
fn from_file_with_invalid_yaml_fails() {
    let tmp = tempfile::NamedTempFile::new().unwrap();
    fs::write(tmp.path(), b"api: [unclosed").unwrap();
    let err = Config::from_file(tmp.path()).unwrap_err();
    let msg = format!("{}", err);
    assert!(msg.contains("Serialization error"));
}

#[test]
fn from_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::from_file(dir.path().join("absent.yaml")).unwrap_err();
    assert!(format!("{}", err).contains("I/O error"));
}
