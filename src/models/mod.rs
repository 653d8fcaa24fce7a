//! Data models for the WeatherGen application
//!
//! This module contains the core domain models organized by concern:
//! - Location: the user-supplied place query
//! - Weather: current conditions, daily outlooks and icon keys
//! - Forecast: the bundle returned by the model and the per-query result

pub mod forecast;
pub mod location;
pub mod weather;

// Re-export all public types for convenient access
pub use forecast::{FORECAST_DAYS, ForecastBundle, ForecastResult};
pub use location::LocationQuery;
pub use weather::{CurrentConditions, DailyOutlook, WeatherIcon};
