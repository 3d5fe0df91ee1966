//! Spot price retrieval and lookup
//!
//! - `types`: API document model and time slots
//! - `source`: HTTP access to the price API
//! - `coordinator`: cached dataset with slot-based refresh and endpoint fallback
//! - `resolver`: pure lookups and unit conversion over a dataset
//! - `service`: poll loop and the handle used by the web API

pub mod coordinator;
pub mod resolver;
pub mod service;
pub mod source;
pub mod types;

pub use coordinator::{
    CoordinatorStatus, PriceCoordinator, RefreshEvent, RefreshOutcome, RefreshState,
};
pub use resolver::{ForecastMap, build_forecast_map, lookup, resolve_day, to_per_kwh};
pub use service::{CoordinatorCommand, CoordinatorHandle, PriceService};
pub use source::{HttpPriceSource, PriceSource};
pub use types::{Endpoint, PriceDataset, PricePoint, Resolution, Slot};
