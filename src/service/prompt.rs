//! Prompt builders and the forecast response schema.

use serde_json::{Value, json};

use crate::models::{FORECAST_DAYS, LocationQuery, WeatherIcon};

/// Comma separated, quoted icon keys, e.g. `'sun', 'cloud', ...`
fn icon_list() -> String {
    WeatherIcon::ALL
        .iter()
        .map(|icon| format!("'{}'", icon.key()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Instruction for the structured current-conditions + 7-day payload.
pub fn forecast_prompt(location: &LocationQuery) -> String {
    format!(
        "Generate a realistic, simulated current weather report and a 7-day forecast for {location}.\n\
         Assume the current date is typical for the season, and keep the numbers internally consistent \
         (daily highs above lows, today's high and low bracketing the current temperature).\n\
         The forecast array must contain exactly 7 days in chronological order, starting with today.\n\
         Provide the response in JSON format.\n\
         \n\
         Rules for 'icon': use strictly one of these values: {icons}.",
        icons = icon_list()
    )
}

/// Instruction for the companion script.
pub fn script_prompt(location: &LocationQuery) -> String {
    format!(
        "Write a production-ready Python script using the 'requests' library to fetch weather data for {location}.\n\
         \n\
         Requirements:\n\
         1. Use the OpenWeatherMap API as the example endpoint (use a placeholder API_KEY).\n\
         2. Include proper error handling (try/except).\n\
         3. Print the current temperature, humidity, and weather description.\n\
         4. Comment the code explaining each step.\n\
         5. Return ONLY the code, inside markdown code blocks."
    )
}

/// Response schema for the forecast payload (Gemini OpenAPI subset).
pub fn forecast_schema() -> Value {
    let icon_description = WeatherIcon::ALL
        .iter()
        .map(|icon| icon.key())
        .collect::<Vec<_>>()
        .join(", ");

    json!({
        "type": "OBJECT",
        "properties": {
            "current": {
                "type": "OBJECT",
                "properties": {
                    "temp": {"type": "NUMBER", "description": "Current temperature in Celsius"},
                    "condition": {"type": "STRING"},
                    "humidity": {"type": "NUMBER", "description": "Humidity percentage"},
                    "windSpeed": {"type": "NUMBER", "description": "Wind speed in km/h"},
                    "feelsLike": {"type": "NUMBER", "description": "Feels like temperature in Celsius"},
                    "location": {"type": "STRING", "description": "Formatted location name (City, Country)"},
                    "description": {"type": "STRING", "description": "Short description of the weather"},
                    "icon": {"type": "STRING", "description": icon_description}
                },
                "required": ["temp", "condition", "humidity", "windSpeed", "feelsLike", "location", "description", "icon"]
            },
            "forecast": {
                "type": "ARRAY",
                "minItems": FORECAST_DAYS.to_string(),
                "maxItems": FORECAST_DAYS.to_string(),
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "day": {"type": "STRING", "description": "Day name (e.g., Mon, Tue)"},
                        "high": {"type": "NUMBER"},
                        "low": {"type": "NUMBER"},
                        "condition": {"type": "STRING"},
                        "icon": {"type": "STRING", "description": icon_description}
                    },
                    "required": ["day", "high", "low", "condition", "icon"]
                }
            }
        },
        "required": ["current", "forecast"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forecast_prompt_names_location_and_icons() {
        let location = LocationQuery::parse("Reykjavik, Iceland").unwrap();
        let prompt = forecast_prompt(&location);
        assert!(prompt.contains("Reykjavik, Iceland"));
        assert!(prompt.contains("7-day forecast"));
        assert!(prompt.contains("'sun', 'cloud', 'rain', 'snow', 'storm', 'mist'"));
    }

    #[test]
    fn script_prompt_asks_for_placeholder_key() {
        let location = LocationQuery::parse("Lima").unwrap();
        let prompt = script_prompt(&location);
        assert!(prompt.contains("Lima"));
        assert!(prompt.contains("placeholder API_KEY"));
        assert!(prompt.contains("markdown code blocks"));
    }

    #[test]
    fn schema_requires_every_field() {
        let schema = forecast_schema();
        assert_eq!(schema["required"], json!(["current", "forecast"]));
        assert_eq!(
            schema["properties"]["current"]["required"]
                .as_array()
                .unwrap()
                .len(),
            8
        );
        assert_eq!(schema["properties"]["forecast"]["type"], "ARRAY");
        assert_eq!(schema["properties"]["forecast"]["minItems"], "7");
        assert_eq!(schema["properties"]["forecast"]["maxItems"], "7");
        assert_eq!(
            schema["properties"]["forecast"]["items"]["required"],
            json!(["day", "high", "low", "condition", "icon"])
        );
    }
}
