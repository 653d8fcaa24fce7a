//! Forecast bundle and per-query result

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CurrentConditions, DailyOutlook};
use crate::{Result, WeatherGenError};

/// Number of daily outlooks in every forecast (day 0 = today)
pub const FORECAST_DAYS: usize = 7;

/// Current conditions plus the 7-day outlook, as produced by the model
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastBundle {
    pub current: CurrentConditions,
    /// Daily outlooks in chronological order
    pub forecast: Vec<DailyOutlook>,
}

impl ForecastBundle {
    /// Enforce the bundle invariants on a freshly parsed payload
    ///
    /// Fewer than [`FORECAST_DAYS`] entries is a generation failure; extra
    /// trailing days are dropped. Humidity is clamped to 0-100.
    pub fn validated(mut self) -> Result<Self> {
        if self.forecast.len() < FORECAST_DAYS {
            return Err(WeatherGenError::generation(format!(
                "expected {FORECAST_DAYS} forecast days, got {}",
                self.forecast.len()
            )));
        }

        if self.forecast.len() > FORECAST_DAYS {
            tracing::warn!(
                days = self.forecast.len(),
                "Model returned more forecast days than requested, truncating"
            );
            self.forecast.truncate(FORECAST_DAYS);
        }

        if !(0.0..=100.0).contains(&self.current.humidity) {
            tracing::debug!(humidity = self.current.humidity, "Clamping humidity");
            self.current.humidity = self.current.humidity.clamp(0.0, 100.0);
        }

        Ok(self)
    }

    /// Lowest daily low and highest daily high across the outlook
    #[must_use]
    pub fn temperature_bounds(&self) -> Option<(f64, f64)> {
        let min = self.forecast.iter().map(|d| d.low).reduce(f64::min)?;
        let max = self.forecast.iter().map(|d| d.high).reduce(f64::max)?;
        Some((min, max))
    }
}

/// Everything one query produces: the forecast plus the generated script
///
/// Built once per query and never mutated afterwards; a new query yields a
/// new value.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResult {
    #[serde(flatten)]
    bundle: ForecastBundle,
    /// Generated Python script with code fences removed
    python_code: String,
    /// When this result was assembled
    generated_at: DateTime<Utc>,
}

impl ForecastResult {
    /// Merge a validated bundle and a cleaned script into a result
    #[must_use]
    pub fn new(bundle: ForecastBundle, python_code: String) -> Self {
        Self {
            bundle,
            python_code,
            generated_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn current(&self) -> &CurrentConditions {
        &self.bundle.current
    }

    #[must_use]
    pub fn forecast(&self) -> &[DailyOutlook] {
        &self.bundle.forecast
    }

    #[must_use]
    pub fn bundle(&self) -> &ForecastBundle {
        &self.bundle
    }

    #[must_use]
    pub fn python_code(&self) -> &str {
        &self.python_code
    }

    #[must_use]
    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }
}
