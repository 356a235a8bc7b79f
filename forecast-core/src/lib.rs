//! Core library for the forecast app.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Location resolution (device fix or free-text place name)
//! - The WeatherAPI.com forecast fetcher & normalizer
//! - A publish/subscribe service for observer UIs
//!
//! It is used by `forecast-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod fetch;
pub mod location;
pub mod model;
pub mod service;

pub use config::Config;
pub use error::{FetchError, LocationError};
pub use fetch::{DEFAULT_FORECAST_DAYS, WeatherApiClient};
pub use location::{LocationProvider, LocationQuery, LocationResolver};
pub use model::{ForecastSnapshot, WeatherRecord};
pub use service::ForecastService;
