//! Pure price lookups over a cached dataset

use super::types::{PriceDataset, PricePoint, Resolution, floor_to_quarter};
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Pick the day sequence for `target_date` relative to `today`
///
/// Dates other than today and tomorrow resolve to an empty hourly sequence.
pub fn resolve_day(
    target_date: NaiveDate,
    today: NaiveDate,
    dataset: &PriceDataset,
) -> (&[PricePoint], Resolution) {
    let points: &[PricePoint] = if target_date == today {
        &dataset.hours_today
    } else if today.succ_opt() == Some(target_date) {
        &dataset.hours_tomorrow
    } else {
        &[]
    };
    (points, Resolution::of(points))
}

/// Find the price point covering `target`; the first match in sequence order wins
pub fn lookup(target: NaiveDateTime, today: NaiveDate, dataset: &PriceDataset) -> Option<&PricePoint> {
    let (points, resolution) = resolve_day(target.date(), today, dataset);
    let hour = target.hour();
    match resolution {
        Resolution::QuarterHour => {
            let minute = floor_to_quarter(target.minute());
            points
                .iter()
                .find(|p| p.hour == hour && p.minute.unwrap_or(0) == minute)
        }
        Resolution::Hourly => points.iter().find(|p| p.hour == hour),
    }
}

/// Convert a per-MWh price to per-kWh, rounded to 2 decimals
///
/// Ties round to the even cent, so 1125 per MWh gives 1.12.
pub fn to_per_kwh(price_mwh: Option<f64>) -> Option<f64> {
    price_mwh.map(per_kwh)
}

fn per_kwh(price_mwh: f64) -> f64 {
    (price_mwh / 10.0).round_ties_even() / 100.0
}

/// `HH:MM` label of a price point
pub fn time_label(point: &PricePoint) -> String {
    format!("{:02}:{:02}", point.hour, point.minute.unwrap_or(0))
}

/// `HH:MM` label of the slot containing `target` at the given resolution
pub fn slot_label(target: NaiveDateTime, resolution: Resolution) -> String {
    let minute = match resolution {
        Resolution::QuarterHour => floor_to_quarter(target.minute()),
        Resolution::Hourly => 0,
    };
    format!("{:02}:{:02}", target.hour(), minute)
}

/// Time label to per-kWh price, kept in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastMap {
    entries: Vec<(String, f64)>,
}

impl ForecastMap {
    /// Insert or overwrite; an overwritten label keeps its original position
    pub fn insert(&mut self, label: String, price: f64) {
        match self.entries.iter_mut().find(|(l, _)| *l == label) {
            Some(entry) => entry.1 = price,
            None => self.entries.push((label, price)),
        }
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, p)| *p)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(l, p)| (l.as_str(), *p))
    }
}

impl Serialize for ForecastMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, price) in &self.entries {
            map.serialize_entry(label, price)?;
        }
        map.end()
    }
}

/// Forecast map of a whole day sequence
pub fn build_forecast_map(points: &[PricePoint]) -> ForecastMap {
    let mut map = ForecastMap::default();
    for point in points {
        map.insert(time_label(point), per_kwh(point.price_czk));
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(date: NaiveDate, h: u32, m: u32) -> NaiveDateTime {
        date.and_hms_opt(h, m, 0).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 1).unwrap()
    }

    fn hourly(hour: u32, price: f64) -> PricePoint {
        PricePoint {
            hour,
            minute: None,
            price_czk: price,
        }
    }

    fn quarter(hour: u32, minute: u32, price: f64) -> PricePoint {
        PricePoint {
            hour,
            minute: Some(minute),
            price_czk: price,
        }
    }

    #[test]
    fn quarter_hour_lookup_floors_minute() {
        let ds = PriceDataset {
            hours_today: vec![quarter(10, 15, 2000.0), quarter(10, 30, 2500.0)],
            hours_tomorrow: vec![],
        };
        let point = lookup(at(today(), 10, 37), today(), &ds).unwrap();
        assert_eq!(point.minute, Some(30));
        assert_eq!(to_per_kwh(Some(point.price_czk)), Some(2.5));
        assert!(lookup(at(today(), 10, 45), today(), &ds).is_none());
    }

    #[test]
    fn hourly_lookup_ignores_minutes() {
        let ds = PriceDataset {
            hours_today: vec![hourly(14, 1800.0)],
            hours_tomorrow: vec![],
        };
        let point = lookup(at(today(), 14, 59), today(), &ds).unwrap();
        assert_eq!(to_per_kwh(Some(point.price_czk)), Some(1.8));
        assert!(lookup(at(today(), 15, 1), today(), &ds).is_none());
    }

    #[test]
    fn tomorrow_and_beyond() {
        let tomorrow = today().succ_opt().unwrap();
        let ds = PriceDataset {
            hours_today: vec![hourly(0, 1000.0)],
            hours_tomorrow: vec![hourly(0, 3000.0)],
        };
        assert_eq!(lookup(at(tomorrow, 0, 30), today(), &ds).unwrap().price_czk, 3000.0);

        let day_after = tomorrow.succ_opt().unwrap();
        let (points, resolution) = resolve_day(day_after, today(), &ds);
        assert!(points.is_empty());
        assert_eq!(resolution, Resolution::Hourly);
        assert!(lookup(at(day_after, 0, 0), today(), &ds).is_none());

        let yesterday = today().pred_opt().unwrap();
        assert!(resolve_day(yesterday, today(), &ds).0.is_empty());
    }

    #[test]
    fn duplicate_entries_first_wins() {
        let ds = PriceDataset {
            hours_today: vec![hourly(8, 1500.0), hourly(8, 9999.0)],
            hours_tomorrow: vec![],
        };
        assert_eq!(lookup(at(today(), 8, 0), today(), &ds).unwrap().price_czk, 1500.0);
    }

    #[test]
    fn quarter_hour_entry_without_minute_counts_as_zero() {
        let ds = PriceDataset {
            hours_today: vec![quarter(9, 0, 1000.0), hourly(10, 1200.0)],
            hours_tomorrow: vec![],
        };
        assert_eq!(lookup(at(today(), 10, 10), today(), &ds).unwrap().price_czk, 1200.0);
        assert!(lookup(at(today(), 10, 20), today(), &ds).is_none());
    }

    #[test]
    fn slot_labels_follow_resolution() {
        let t = at(today(), 7, 44);
        assert_eq!(slot_label(t, Resolution::QuarterHour), "07:30");
        assert_eq!(slot_label(t, Resolution::Hourly), "07:00");
    }

    #[test]
    fn per_kwh_conversion() {
        assert_eq!(to_per_kwh(None), None);
        assert_eq!(to_per_kwh(Some(1000.0)), Some(1.0));
        assert_eq!(to_per_kwh(Some(2345.6)), Some(2.35));
        assert_eq!(to_per_kwh(Some(-512.0)), Some(-0.51));
    }

    #[test]
    fn half_cent_rounds_to_even() {
        assert_eq!(to_per_kwh(Some(1125.0)), Some(1.12));
        assert_eq!(to_per_kwh(Some(1135.0)), Some(1.14));
        assert_eq!(to_per_kwh(Some(-1125.0)), Some(-1.12));

        let map = build_forecast_map(&[hourly(0, 2205.0)]);
        assert_eq!(map.get("00:00"), Some(2.2));
    }

    #[test]
    fn forecast_map_keeps_source_order() {
        let map = build_forecast_map(&[hourly(9, 1000.0), hourly(10, 2000.0)]);
        let entries: Vec<_> = map.iter().collect();
        assert_eq!(entries, vec![("09:00", 1.0), ("10:00", 2.0)]);
        assert_eq!(
            serde_json::to_string(&map).unwrap(),
            r#"{"09:00":1.0,"10:00":2.0}"#
        );

        let map = build_forecast_map(&[quarter(23, 45, 500.0), quarter(0, 0, 700.0)]);
        let labels: Vec<_> = map.iter().map(|(l, _)| l).collect();
        assert_eq!(labels, vec!["23:45", "00:00"]);
    }

    #[test]
    fn forecast_map_duplicate_label_keeps_position() {
        let map = build_forecast_map(&[hourly(1, 1000.0), hourly(2, 2000.0), hourly(1, 3000.0)]);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("01:00"), Some(3.0));
        assert_eq!(map.iter().next(), Some(("01:00", 3.0)));
    }
}
