#![no_main]
use libfuzzer_sys::fuzz_target;
use spotova::prices::{PriceDataset, Resolution, build_forecast_map};

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };

    // Whatever the API sends must either parse or be rejected, never panic
    if let Ok(dataset) = PriceDataset::from_payload(value) {
        let _ = Resolution::of(&dataset.hours_today);
        let _ = build_forecast_map(&dataset.hours_today);
        let _ = build_forecast_map(&dataset.hours_tomorrow);
    }
});
