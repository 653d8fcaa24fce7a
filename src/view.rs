//! Presentation models
//!
//! Pure functions from the controller's [`ViewState`] to what the dashboard
//! and code viewer show. Nothing here issues queries or touches shared state.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::PresentationConfig;
use crate::controller::{QueryPhase, ViewState};
use crate::models::weather::round_degrees;
use crate::models::{ForecastResult, WeatherIcon};

/// File name shown in the code viewer's title bar
pub const SCRIPT_FILE_NAME: &str = "weather_forecast.py";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Idle,
    Loading,
    Success,
    Failure,
}

/// Everything the browser dashboard renders, as one JSON document
#[derive(Debug, Clone, Serialize)]
pub struct ViewModel {
    pub status: Status,
    pub generation: u64,
    pub location: Option<String>,
    pub error: Option<String>,
    pub dashboard: Option<DashboardView>,
    pub code: Option<CodeView>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl ViewModel {
    #[must_use]
    pub fn from_state(state: &ViewState, config: &PresentationConfig) -> Self {
        let status = match state.phase {
            QueryPhase::Idle => Status::Idle,
            QueryPhase::Loading => Status::Loading,
            QueryPhase::Success(_) => Status::Success,
            QueryPhase::Failure { .. } => Status::Failure,
        };

        let result = state.result();
        Self {
            status,
            generation: state.generation,
            location: state.location.clone(),
            error: state.error().map(str::to_string),
            dashboard: result.map(DashboardView::from_result),
            code: result.map(|r| CodeView::from_result(r, config)),
            last_updated: result.map(ForecastResult::generated_at),
        }
    }
}

/// Current conditions card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentCard {
    pub location: String,
    pub description: String,
    pub temperature: i64,
    pub icon: WeatherIcon,
    pub humidity: i64,
    pub wind_speed: i64,
    pub feels_like: i64,
    pub condition: String,
}

/// One point of the 7-day trend chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub day: String,
    pub high: f64,
    pub low: f64,
}

/// High/low series plus a whole-degree axis range with one degree of padding
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureTrend {
    pub points: Vec<TrendPoint>,
    pub axis_min: f64,
    pub axis_max: f64,
}

impl TemperatureTrend {
    fn from_result(result: &ForecastResult) -> Self {
        let points: Vec<TrendPoint> = result
            .forecast()
            .iter()
            .map(|d| TrendPoint {
                day: d.day.clone(),
                high: d.high,
                low: d.low,
            })
            .collect();

        let (axis_min, axis_max) = match result.bundle().temperature_bounds() {
            Some((min, max)) => ((min - 1.0).floor(), (max + 1.0).ceil()),
            None => (0.0, 0.0),
        };

        Self {
            points,
            axis_min,
            axis_max,
        }
    }

    /// Vertical position of `value` in `[0, 1]`, 0 at the axis minimum
    #[must_use]
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.axis_max - self.axis_min;
        if span <= 0.0 {
            return 0.5;
        }
        ((value - self.axis_min) / span).clamp(0.0, 1.0)
    }
}

/// One entry of the 7-day list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayCard {
    pub day: String,
    pub icon: WeatherIcon,
    pub high: i64,
    pub low: i64,
    pub condition: String,
}

/// Dashboard mode: current card, trend chart and day list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub current: CurrentCard,
    pub trend: TemperatureTrend,
    pub days: Vec<DayCard>,
}

impl DashboardView {
    #[must_use]
    pub fn from_result(result: &ForecastResult) -> Self {
        let current = result.current();
        Self {
            current: CurrentCard {
                location: current.location.clone(),
                description: current.description.clone(),
                temperature: round_degrees(current.temperature),
                icon: current.icon,
                humidity: round_degrees(current.humidity),
                wind_speed: round_degrees(current.wind_speed),
                feels_like: round_degrees(current.feels_like),
                condition: current.condition.clone(),
            },
            trend: TemperatureTrend::from_result(result),
            days: result
                .forecast()
                .iter()
                .map(|d| DayCard {
                    day: d.day.clone(),
                    icon: d.icon,
                    high: round_degrees(d.high),
                    low: round_degrees(d.low),
                    condition: d.condition.clone(),
                })
                .collect(),
        }
    }
}

/// Code mode: the script plus copy affordance settings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeView {
    pub file_name: &'static str,
    pub script: String,
    pub copied_indicator_ms: u64,
    pub run_instructions: Vec<String>,
}

impl CodeView {
    #[must_use]
    pub fn from_result(result: &ForecastResult, config: &PresentationConfig) -> Self {
        Self {
            file_name: SCRIPT_FILE_NAME,
            script: result.python_code().to_string(),
            copied_indicator_ms: config.copied_indicator_ms,
            run_instructions: vec![
                "Ensure you have Python installed.".to_string(),
                "Install the requests library: pip install requests".to_string(),
                "Replace 'YOUR_API_KEY' with a valid OpenWeatherMap API key.".to_string(),
                format!("Run the script: python {SCRIPT_FILE_NAME}"),
            ],
        }
    }
}

fn icon_glyph(icon: WeatherIcon) -> &'static str {
    match icon {
        WeatherIcon::Sun => "☀️",
        WeatherIcon::Cloud => "☁️",
        WeatherIcon::Rain => "🌧️",
        WeatherIcon::Snow => "🌨️",
        WeatherIcon::Storm => "⛈️",
        WeatherIcon::Mist => "🌫️",
    }
}

impl fmt::Display for DashboardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.current;
        writeln!(f, "{} {}", icon_glyph(c.icon), c.location)?;
        writeln!(f, "   {}", c.description)?;
        writeln!(f, "   🌡️ {}°C (feels like {}°C)", c.temperature, c.feels_like)?;
        writeln!(f, "   💧 Humidity {}%", c.humidity)?;
        writeln!(f, "   💨 Wind {} km/h", c.wind_speed)?;
        writeln!(f, "   {}", c.condition)?;
        writeln!(f)?;
        writeln!(f, "Temperature Trend (7 Days)")?;

        const BAR_WIDTH: f64 = 30.0;
        for point in &self.trend.points {
            // Both ends lie in [0, BAR_WIDTH], so the casts cannot truncate.
            let start = (self.trend.normalize(point.low) * BAR_WIDTH).round() as usize;
            let end = (self.trend.normalize(point.high) * BAR_WIDTH).round() as usize;
            writeln!(
                f,
                "   {:<4} {}{}",
                point.day,
                " ".repeat(start),
                "█".repeat(end.saturating_sub(start).max(1))
            )?;
        }
        writeln!(f)?;

        for day in &self.days {
            writeln!(
                f,
                "   {:<4} {}  {:>3}° / {:>3}°  {}",
                day.day,
                icon_glyph(day.icon),
                day.high,
                day.low,
                day.condition
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for CodeView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}", self.file_name)?;
        writeln!(f, "{}", self.script)?;
        writeln!(f)?;
        writeln!(f, "How to run this code:")?;
        for step in &self.run_instructions {
            writeln!(f, "   - {step}")?;
        }
        Ok(())
    }
}
