//! Configuration management for Spotova
//!
//! This module handles loading, validation, and management of the application
//! configuration from YAML files. The file location can be overridden with the
//! `SPOTOVA_CONFIG` environment variable.

use crate::error::{Result, SpotovaError};
use chrono_tz::Tz;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

mod defaults;

/// Environment variable pointing at an explicit configuration file
pub const CONFIG_PATH_ENV: &str = "SPOTOVA_CONFIG";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Config {
    /// Price API endpoints and request settings
    pub api: ApiConfig,

    /// Refresh scheduling
    pub coordinator: CoordinatorConfig,

    /// Which forecast sensors to expose
    pub sensors: SensorsConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Web server binding configuration
    pub web: WebConfig,

    /// Single-instance guard
    pub instance: InstanceConfig,

    /// IANA timezone used to decide "today", "tomorrow" and the current slot
    pub timezone: String,

    /// Currency label of the source prices
    pub currency: String,
}

/// Price API endpoints
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ApiConfig {
    /// Quarter-hour resolution endpoint (tried first)
    pub quarter_hour_url: String,

    /// Hourly resolution endpoint (fallback)
    pub hourly_url: String,

    /// Per-attempt request timeout in seconds
    pub timeout_secs: u64,

    /// User agent sent with every request
    pub user_agent: String,
}

/// Refresh scheduling
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Poll interval in seconds; must stay below the 15 minute slot length
    pub poll_interval_secs: u64,
}

/// Forecast sensor offsets
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct SensorsConfig {
    /// Whole-hour offsets from now (e.g. 1..=6)
    pub hour_offsets: Vec<u32>,

    /// Quarter-hour offsets from now in minutes (multiples of 15)
    pub minute_offsets: Vec<u32>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Optional console-specific level
    pub console_level: Option<String>,

    /// Optional file-specific level
    pub file_level: Option<String>,

    /// Path to log file; empty logs to console only
    pub file: String,

    /// Number of rotated files to keep
    pub backup_count: u32,

    /// Whether to log to console
    pub console_output: bool,

    /// Whether to use JSON format
    pub json_format: bool,
}

/// Web server configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct WebConfig {
    /// Serve the HTTP API
    pub enabled: bool,

    /// Bind address
    pub host: String,

    /// TCP port
    pub port: u16,
}

/// Single-instance guard
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct InstanceConfig {
    /// Lock file path; empty disables the guard
    pub lock_file: String,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from `SPOTOVA_CONFIG` or the default locations
    pub fn load() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return Self::from_file(path);
        }

        let default_paths = [
            "spotova.yaml",
            "/data/spotova.yaml",
            "/etc/spotova/config.yaml",
        ];

        for path in &default_paths {
            if Path::new(path).exists() {
                return Self::from_file(path);
            }
        }

        Ok(Config::default())
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Parsed timezone
    pub fn tz(&self) -> Result<Tz> {
        self.timezone.parse::<Tz>().map_err(|_| {
            SpotovaError::validation(
                "timezone".to_string(),
                format!("Unknown timezone '{}'", self.timezone),
            )
        })
    }

    /// Unit label exposed with every price, e.g. `CZK/kWh`
    pub fn unit_label(&self) -> String {
        format!("{}/kWh", self.currency)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        for (field, url) in [
            ("api.quarter_hour_url", &self.api.quarter_hour_url),
            ("api.hourly_url", &self.api.hourly_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(SpotovaError::validation(
                    field,
                    "Must be an http(s) URL",
                ));
            }
        }

        if self.api.timeout_secs == 0 {
            return Err(SpotovaError::validation(
                "api.timeout_secs",
                "Must be greater than 0",
            ));
        }

        // Refreshes have to land inside every 15 minute slot
        if !(1..=900).contains(&self.coordinator.poll_interval_secs) {
            return Err(SpotovaError::validation(
                "coordinator.poll_interval_secs",
                "Must be between 1 and 900",
            ));
        }

        self.tz()?;

        if self.currency.trim().is_empty() {
            return Err(SpotovaError::validation("currency", "Cannot be empty"));
        }

        if let Some(h) = self
            .sensors
            .hour_offsets
            .iter()
            .find(|h| !(1..=24).contains(*h))
        {
            return Err(SpotovaError::validation(
                "sensors.hour_offsets".to_string(),
                format!("Offset {}h outside 1..=24", h),
            ));
        }

        if let Some(m) = self
            .sensors
            .minute_offsets
            .iter()
            .find(|m| **m == 0 || **m % 15 != 0)
        {
            return Err(SpotovaError::validation(
                "sensors.minute_offsets".to_string(),
                format!("Offset {}min is not a positive multiple of 15", m),
            ));
        }

        crate::logging::parse_log_level(&self.logging.level)?;

        if self.web.enabled && self.web.port == 0 {
            return Err(SpotovaError::validation(
                "web.port",
                "Port must be greater than 0",
            ));
        }

        Ok(())
    }
}
