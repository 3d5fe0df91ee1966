//! # Spotova - spot electricity price sensors
//!
//! Polls the spotovaelektrina.cz price API and exposes the current spot price
//! plus a short forecast window as sensor readings over a small HTTP API, for
//! home-automation platforms to scrape.
//!
//! ## Architecture
//!
//! - `config`: YAML configuration and validation
//! - `logging`: Structured logging and tracing
//! - `prices`: Price API access, cached dataset, refresh coordinator, lookups
//! - `sensor`: Offset sensors resolved against the cached dataset
//! - `web`: HTTP server and REST API
//! - `instance`: Single-instance guard

pub mod config;
pub mod error;
pub mod instance;
pub mod logging;
pub mod prices;
pub mod sensor;
pub mod web;

#[cfg(test)]
mod config_tests;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, SpotovaError};
pub use prices::{CoordinatorHandle, PriceCoordinator, PriceDataset, PriceService};
