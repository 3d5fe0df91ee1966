use super::*;

/// Quarter-hour price feed of spotovaelektrina.cz
pub const DEFAULT_QUARTER_HOUR_URL: &str =
    "https://spotovaelektrina.cz/api/v1/price/get-prices-json-qh";

/// Hourly price feed of spotovaelektrina.cz
pub const DEFAULT_HOURLY_URL: &str = "https://spotovaelektrina.cz/api/v1/price/get-prices-json";

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            quarter_hour_url: DEFAULT_QUARTER_HOUR_URL.to_string(),
            hourly_url: DEFAULT_HOURLY_URL.to_string(),
            timeout_secs: 10,
            user_agent: format!("spotova/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 60,
        }
    }
}

impl Default for SensorsConfig {
    fn default() -> Self {
        Self {
            hour_offsets: (1..=6).collect(),
            minute_offsets: (1..=6).map(|q| q * 15).collect(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            console_level: None,
            file_level: None,
            file: "/tmp/spotova.log".to_string(),
            backup_count: 5,
            console_output: true,
            json_format: false,
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "127.0.0.1".to_string(),
            port: 8089,
        }
    }
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            lock_file: "/tmp/spotova.lock".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            coordinator: CoordinatorConfig::default(),
            sensors: SensorsConfig::default(),
            logging: LoggingConfig::default(),
            web: WebConfig::default(),
            instance: InstanceConfig::default(),
            timezone: "Europe/Prague".to_string(),
            currency: "CZK".to_string(),
        }
    }
}
