//! Price sensors: a fixed offset from now resolved against the cached dataset
//!
//! Readings are never cached; every read re-derives the target time.

use crate::config::SensorsConfig;
use crate::prices::resolver::{build_forecast_map, lookup, resolve_day, slot_label, to_per_kwh};
use crate::prices::{ForecastMap, PriceDataset, Resolution};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Prefix shared by all sensor ids
pub const SENSOR_ID_PREFIX: &str = "spotova_elektrina";

/// Display name of the integration
pub const DEFAULT_NAME: &str = "Spotová Elektřina";

/// Distance between now and the priced slot a sensor reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorOffset {
    Now,
    Hours(u32),
    Minutes(u32),
}

impl SensorOffset {
    pub fn duration(self) -> Duration {
        match self {
            Self::Now => Duration::zero(),
            Self::Hours(h) => Duration::hours(i64::from(h)),
            Self::Minutes(m) => Duration::minutes(i64::from(m)),
        }
    }

    pub fn minutes(self) -> i64 {
        self.duration().num_minutes()
    }
}

/// Static description of one sensor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorSpec {
    pub unique_id: String,
    pub name: String,
    pub offset: SensorOffset,
}

impl SensorSpec {
    pub fn current() -> Self {
        Self {
            unique_id: format!("{}_current_price", SENSOR_ID_PREFIX),
            name: DEFAULT_NAME.to_string(),
            offset: SensorOffset::Now,
        }
    }

    pub fn hours_ahead(hours: u32) -> Self {
        Self {
            unique_id: format!("{}_price_in_{}h", SENSOR_ID_PREFIX, hours),
            name: format!("{} +{}h", DEFAULT_NAME, hours),
            offset: SensorOffset::Hours(hours),
        }
    }

    pub fn minutes_ahead(minutes: u32) -> Self {
        Self {
            unique_id: format!("{}_price_in_{}min", SENSOR_ID_PREFIX, minutes),
            name: format!("{} +{}min", DEFAULT_NAME, minutes),
            offset: SensorOffset::Minutes(minutes),
        }
    }

    /// Resolve this sensor against `dataset` at local time `now`
    pub fn read(&self, dataset: Option<&PriceDataset>, now: NaiveDateTime, unit: &str) -> SensorReading {
        let today = now.date();
        let target = now + self.offset.duration();

        let (state, resolution, forecast_today, forecast_tomorrow) = match dataset {
            Some(ds) => {
                let (_, resolution) = resolve_day(target.date(), today, ds);
                (
                    to_per_kwh(lookup(target, today, ds).map(|p| p.price_czk)),
                    resolution,
                    build_forecast_map(&ds.hours_today),
                    build_forecast_map(&ds.hours_tomorrow),
                )
            }
            None => (
                None,
                Resolution::Hourly,
                ForecastMap::default(),
                ForecastMap::default(),
            ),
        };

        SensorReading {
            unique_id: self.unique_id.clone(),
            name: self.name.clone(),
            state,
            attributes: SensorAttributes {
                unit_of_measurement: unit.to_string(),
                device_class: "monetary",
                state_class: "measurement",
                offset_minutes: self.offset.minutes(),
                resolution_minutes: resolution.minutes(),
                slot: slot_label(target, resolution),
                target_date: target.date(),
                forecast_today,
                forecast_tomorrow,
            },
        }
    }
}

/// Value and attributes of a sensor at one instant
#[derive(Debug, Clone, Serialize)]
pub struct SensorReading {
    pub unique_id: String,
    pub name: String,
    /// Price per kWh, or null when the slot has no published price
    pub state: Option<f64>,
    pub attributes: SensorAttributes,
}

#[derive(Debug, Clone, Serialize)]
pub struct SensorAttributes {
    pub unit_of_measurement: String,
    pub device_class: &'static str,
    pub state_class: &'static str,
    pub offset_minutes: i64,
    pub resolution_minutes: u32,
    pub slot: String,
    pub target_date: NaiveDate,
    pub forecast_today: ForecastMap,
    pub forecast_tomorrow: ForecastMap,
}

/// Current price sensor followed by the configured hour and minute offsets
pub fn sensor_specs(config: &SensorsConfig) -> Vec<SensorSpec> {
    std::iter::once(SensorSpec::current())
        .chain(config.hour_offsets.iter().map(|h| SensorSpec::hours_ahead(*h)))
        .chain(
            config
                .minute_offsets
                .iter()
                .map(|m| SensorSpec::minutes_ahead(*m)),
        )
        .collect()
}

/// The configured sensors together with their unit label
#[derive(Debug, Clone)]
pub struct SensorSet {
    specs: Vec<SensorSpec>,
    unit: String,
}

impl SensorSet {
    pub fn new(specs: Vec<SensorSpec>, unit: impl Into<String>) -> Self {
        Self {
            specs,
            unit: unit.into(),
        }
    }

    pub fn specs(&self) -> &[SensorSpec] {
        &self.specs
    }

    pub fn get(&self, unique_id: &str) -> Option<&SensorSpec> {
        self.specs.iter().find(|s| s.unique_id == unique_id)
    }

    pub fn read(&self, spec: &SensorSpec, dataset: Option<&PriceDataset>, now: NaiveDateTime) -> SensorReading {
        spec.read(dataset, now, &self.unit)
    }

    pub fn read_all(&self, dataset: Option<&PriceDataset>, now: NaiveDateTime) -> Vec<SensorReading> {
        self.specs
            .iter()
            .map(|spec| spec.read(dataset, now, &self.unit))
            .collect()
    }
}
