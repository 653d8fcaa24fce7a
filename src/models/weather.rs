//! Weather condition models and display methods

use std::fmt;

use serde::{Deserialize, Serialize};

/// Icon key shown next to a weather condition
///
/// The set is closed. Whatever string the model produces is coerced into one
/// of these variants on deserialization, so an unknown value can never reach
/// the presentation layer.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum WeatherIcon {
    #[default]
    Sun,
    Cloud,
    Rain,
    Snow,
    Storm,
    Mist,
}

impl WeatherIcon {
    /// All recognised icon keys, in prompt order
    pub const ALL: [WeatherIcon; 6] = [
        WeatherIcon::Sun,
        WeatherIcon::Cloud,
        WeatherIcon::Rain,
        WeatherIcon::Snow,
        WeatherIcon::Storm,
        WeatherIcon::Mist,
    ];

    /// Wire key for this icon
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            WeatherIcon::Sun => "sun",
            WeatherIcon::Cloud => "cloud",
            WeatherIcon::Rain => "rain",
            WeatherIcon::Snow => "snow",
            WeatherIcon::Storm => "storm",
            WeatherIcon::Mist => "mist",
        }
    }

    /// Strict lookup of a wire key (case-insensitive)
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|icon| icon.key() == key)
    }

    /// Map any model-supplied label onto the closed icon set
    ///
    /// Exact keys win, then common synonyms; everything else falls back to
    /// [`WeatherIcon::Sun`].
    #[must_use]
    pub fn coerce(raw: &str) -> Self {
        if let Some(icon) = Self::from_key(raw) {
            return icon;
        }

        let normalized = raw.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        let icon = match normalized.as_str() {
            "sunny" | "clear" | "clear-sky" | "fair" | "hot" => Some(WeatherIcon::Sun),
            "cloudy" | "clouds" | "overcast" | "partly-cloudy" | "mostly-cloudy" => {
                Some(WeatherIcon::Cloud)
            }
            "rainy" | "drizzle" | "showers" | "shower" | "light-rain" | "heavy-rain" => {
                Some(WeatherIcon::Rain)
            }
            "snowy" | "snowfall" | "sleet" | "ice" | "hail" | "blizzard" => Some(WeatherIcon::Snow),
            "thunder" | "thunderstorm" | "thunderstorms" | "lightning" | "stormy" => {
                Some(WeatherIcon::Storm)
            }
            "fog" | "foggy" | "haze" | "hazy" | "misty" | "smoke" => Some(WeatherIcon::Mist),
            _ => None,
        };

        icon.unwrap_or_else(|| {
            tracing::debug!(raw, "Unrecognised icon key, falling back to sun");
            WeatherIcon::default()
        })
    }
}

impl From<String> for WeatherIcon {
    fn from(value: String) -> Self {
        Self::coerce(&value)
    }
}

impl fmt::Display for WeatherIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Current weather conditions at the resolved location
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurrentConditions {
    /// Temperature in Celsius
    #[serde(rename = "temp")]
    pub temperature: f64,
    /// Short condition label (e.g. "Light rain")
    pub condition: String,
    /// Relative humidity percentage (0-100)
    pub humidity: f64,
    /// Wind speed in km/h
    pub wind_speed: f64,
    /// Apparent temperature in Celsius
    pub feels_like: f64,
    /// Formatted location name (City, Country)
    pub location: String,
    /// Human-readable description of the weather
    pub description: String,
    pub icon: WeatherIcon,
}

impl CurrentConditions {
    /// Format temperature with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{}°C", round_degrees(self.temperature))
    }

    /// Format the "feels like" temperature with unit
    #[must_use]
    pub fn format_feels_like(&self) -> String {
        format!("{}°C", round_degrees(self.feels_like))
    }

    /// Format humidity as a percentage
    #[must_use]
    pub fn format_humidity(&self) -> String {
        format!("{}%", round_degrees(self.humidity))
    }

    /// Format wind information
    #[must_use]
    pub fn format_wind(&self) -> String {
        format!("{} km/h", round_degrees(self.wind_speed))
    }
}

/// Outlook for one day of the forecast
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DailyOutlook {
    /// Day label (e.g. "Mon", "Tue")
    pub day: String,
    /// Daily high in Celsius
    pub high: f64,
    /// Daily low in Celsius
    pub low: f64,
    pub condition: String,
    pub icon: WeatherIcon,
}

impl DailyOutlook {
    /// Format the high/low pair, e.g. "21° / 14°"
    #[must_use]
    pub fn format_range(&self) -> String {
        format!("{}° / {}°", round_degrees(self.high), round_degrees(self.low))
    }
}

/// Round a measurement to a whole number for display (half away from zero)
#[must_use]
pub fn round_degrees(value: f64) -> i64 {
    // Values are temperatures, speeds and percentages; far inside i64 range.
    value.round() as i64
}
