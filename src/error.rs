//! Error types and handling for the `WeatherGen` application

use thiserror::Error;

use crate::ai::ModelError;

/// Main error type for the `WeatherGen` application
#[derive(Error, Debug)]
pub enum WeatherGenError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The primary (schema-constrained) generation failed: the model was
    /// unreachable, answered with nothing, or answered with a payload that
    /// does not fit the forecast schema
    #[error("Generation failed: {message}")]
    Generation { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl WeatherGenError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new generation error
    pub fn generation<S: Into<String>>(message: S) -> Self {
        Self::Generation {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Whether this error aborted a forecast query
    #[must_use]
    pub fn is_generation_failure(&self) -> bool {
        matches!(self, WeatherGenError::Generation { .. })
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WeatherGenError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            WeatherGenError::Generation { .. } => {
                "Failed to fetch weather data. Please try a different location.".to_string()
            }
            WeatherGenError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            WeatherGenError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

impl From<ModelError> for WeatherGenError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::MissingApiKey => WeatherGenError::config(err.to_string()),
            other => WeatherGenError::generation(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for WeatherGenError {
    fn from(err: serde_json::Error) -> Self {
        WeatherGenError::generation(format!("malformed forecast payload: {err}"))
    }
}
