//! `WeatherGen` - AI-generated weather forecasts
//!
//! A generative model is asked for a simulated forecast (current conditions
//! plus seven days, constrained to a JSON schema) and for a Python script
//! that would fetch real data for the same place. The controller runs one
//! query at a time and the view layer turns its state into a dashboard.

pub mod ai;
pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod models;
pub mod service;
pub mod view;
pub mod web;

// Re-export core types for public API
pub use ai::{GeminiClient, GenerationRequest, GenerativeModel, ModelError};
pub use config::WeatherGenConfig;
pub use controller::{ApplicationController, QueryPhase, QueryTicket, ViewState};
pub use error::WeatherGenError;
pub use models::{ForecastResult, LocationQuery, WeatherIcon};
pub use service::WeatherQueryService;
pub use view::ViewModel;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WeatherGenError>;
