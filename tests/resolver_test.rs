use chrono::{NaiveDate, NaiveDateTime};
use spotova::prices::{PriceDataset, PricePoint, build_forecast_map, lookup, to_per_kwh};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
}

fn at(h: u32, m: u32) -> NaiveDateTime {
    today().and_hms_opt(h, m, 0).unwrap()
}

fn point(hour: u32, minute: Option<u32>, price: f64) -> PricePoint {
    PricePoint {
        hour,
        minute,
        price_czk: price,
    }
}

#[test]
fn quarter_hour_lookup_floors_minute() {
    let ds = PriceDataset {
        hours_today: vec![
            point(10, Some(15), 2100.0),
            point(10, Some(30), 2500.0),
            point(10, Some(45), 2700.0),
        ],
        hours_tomorrow: vec![],
    };
    let price = lookup(at(10, 37), today(), &ds).map(|p| p.price_czk);
    assert_eq!(to_per_kwh(price), Some(2.5));
}

#[test]
fn hourly_lookup_matches_hour_only() {
    let ds = PriceDataset {
        hours_today: vec![point(14, None, 1800.0)],
        hours_tomorrow: vec![],
    };
    let price = lookup(at(14, 59), today(), &ds).map(|p| p.price_czk);
    assert_eq!(to_per_kwh(price), Some(1.8));
    assert!(lookup(at(15, 1), today(), &ds).is_none());
}

#[test]
fn tomorrow_and_beyond() {
    let ds = PriceDataset {
        hours_today: vec![],
        hours_tomorrow: vec![point(3, None, 950.0)],
    };
    let tomorrow_3 = at(3, 10) + chrono::Duration::days(1);
    assert_eq!(lookup(tomorrow_3, today(), &ds).unwrap().price_czk, 950.0);

    let day_after = at(3, 10) + chrono::Duration::days(2);
    assert!(lookup(day_after, today(), &ds).is_none());
}

#[test]
fn per_kwh_conversion() {
    assert_eq!(to_per_kwh(None), None);
    assert_eq!(to_per_kwh(Some(1000.0)), Some(1.0));
    assert_eq!(to_per_kwh(Some(2346.0)), Some(2.35));
}

#[test]
fn forecast_map_keeps_order() {
    let map = build_forecast_map(&[point(9, None, 1000.0), point(10, None, 2000.0)]);
    assert_eq!(
        serde_json::to_string(&map).unwrap(),
        r#"{"09:00":1.0,"10:00":2.0}"#
    );
}
