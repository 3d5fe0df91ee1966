use crate::error::{Result, SpotovaError};
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize};

/// One priced interval as published by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Hour of day, 0-23
    pub hour: u32,
    /// Start minute of a quarter-hour interval; absent in hourly feeds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minute: Option<u32>,
    /// Price per MWh in the source currency
    #[serde(rename = "priceCZK")]
    pub price_czk: f64,
}

/// Prices for today and, once published, tomorrow
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceDataset {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub hours_today: Vec<PricePoint>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub hours_tomorrow: Vec<PricePoint>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<PricePoint>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<PricePoint>>::deserialize(deserializer)?.unwrap_or_default())
}

impl PriceDataset {
    /// Validate a raw API response and turn it into a dataset
    ///
    /// Anything but a JSON object is rejected, as is an object carrying
    /// neither day key (the API's error documents look like that).
    pub fn from_payload(payload: serde_json::Value) -> Result<Self> {
        let Some(obj) = payload.as_object() else {
            return Err(SpotovaError::malformed(format!(
                "expected a JSON object, got {}",
                json_kind(&payload)
            )));
        };
        if !obj.contains_key("hoursToday") && !obj.contains_key("hoursTomorrow") {
            return Err(SpotovaError::malformed(
                "object has neither hoursToday nor hoursTomorrow",
            ));
        }
        serde_json::from_value(payload)
            .map_err(|e| SpotovaError::malformed(format!("unexpected price document: {}", e)))
    }

    pub fn is_empty(&self) -> bool {
        self.hours_today.is_empty() && self.hours_tomorrow.is_empty()
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "a list",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Granularity of a day's price sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    QuarterHour,
    Hourly,
}

impl Resolution {
    /// Derived from the first entry; an empty sequence counts as hourly
    pub fn of(points: &[PricePoint]) -> Self {
        match points.first() {
            Some(p) if p.minute.is_some() => Self::QuarterHour,
            _ => Self::Hourly,
        }
    }

    pub fn minutes(self) -> u32 {
        match self {
            Self::QuarterHour => 15,
            Self::Hourly => 60,
        }
    }
}

/// Which API endpoint a dataset came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    QuarterHour,
    Hourly,
}

impl Endpoint {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::QuarterHour => "quarter_hour",
            Self::Hourly => "hourly",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Round a minute down to the start of its quarter hour
pub fn floor_to_quarter(minute: u32) -> u32 {
    minute - minute % 15
}

/// A 15 minute bucket of local time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot {
    pub date: NaiveDate,
    pub hour: u32,
    pub minute: u32,
}

impl Slot {
    pub fn containing(at: NaiveDateTime) -> Self {
        Self {
            date: at.date(),
            hour: at.hour(),
            minute: floor_to_quarter(at.minute()),
        }
    }

    /// `HH:MM` label of the slot start
    pub fn label(&self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.date, self.label())
    }
}
