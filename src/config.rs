//! Configuration management for `WeatherGen` application
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::WeatherGenError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the `WeatherGen` application
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct WeatherGenConfig {
    /// Generative model configuration
    pub ai: AiConfig,
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Default application settings
    pub defaults: DefaultsConfig,
    /// Presentation settings
    pub presentation: PresentationConfig,
}

/// Generative model API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// API key; `GEMINI_API_KEY` / `API_KEY` are used when unset
    pub api_key: Option<String>,
    /// Base URL for the generative language API
    #[serde(default = "default_ai_base_url")]
    pub base_url: String,
    /// Model identifier
    #[serde(default = "default_ai_model")]
    pub model: String,
    /// Request timeout in seconds
    #[serde(default = "default_ai_timeout")]
    pub timeout_seconds: u32,
    /// Issue the forecast and script requests concurrently
    #[serde(default)]
    pub parallel_requests: bool,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_server_host")]
    pub host: String,
    /// Bind port
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// Directory holding the browser dashboard
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Default application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Location queried once at startup
    #[serde(default = "default_initial_location")]
    pub initial_location: String,
}

/// Presentation settings handed to the views
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresentationConfig {
    /// How long the "copied" acknowledgment stays visible, in milliseconds
    #[serde(default = "default_copied_indicator_ms")]
    pub copied_indicator_ms: u64,
}

// Default value functions
fn default_ai_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_ai_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_ai_timeout() -> u32 {
    60
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    3000
}

fn default_static_dir() -> String {
    "frontend".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_initial_location() -> String {
    "San Francisco, CA".to_string()
}

fn default_copied_indicator_ms() -> u64 {
    2000
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_ai_base_url(),
            model: default_ai_model(),
            timeout_seconds: default_ai_timeout(),
            parallel_requests: false,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            static_dir: default_static_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            initial_location: default_initial_location(),
        }
    }
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            copied_indicator_ms: default_copied_indicator_ms(),
        }
    }
}

impl WeatherGenConfig {
    /// Load configuration from `config_path`, or the default location when
    /// `None`, then apply environment overrides
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. WEATHERGEN_AI__MODEL
        builder = builder.add_source(
            Environment::with_prefix("WEATHERGEN")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: WeatherGenConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("weathergen").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.ai.base_url.is_empty() {
            self.ai.base_url = default_ai_base_url();
        }
        if self.ai.model.is_empty() {
            self.ai.model = default_ai_model();
        }
        if self.ai.timeout_seconds == 0 {
            self.ai.timeout_seconds = default_ai_timeout();
        }
        if self.server.host.is_empty() {
            self.server.host = default_server_host();
        }
        if self.server.port == 0 {
            self.server.port = default_server_port();
        }
        if self.server.static_dir.is_empty() {
            self.server.static_dir = default_static_dir();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.defaults.initial_location.trim().is_empty() {
            self.defaults.initial_location = default_initial_location();
        }
        if self.presentation.copied_indicator_ms == 0 {
            self.presentation.copied_indicator_ms = default_copied_indicator_ms();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_key()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate the API key when one is configured
    pub fn validate_api_key(&self) -> Result<()> {
        if let Some(api_key) = &self.ai.api_key {
            if api_key.trim().is_empty() {
                return Err(WeatherGenError::config(
                    "AI API key cannot be empty if provided. Either remove it or provide a valid key.",
                )
                .into());
            }

            if api_key.len() < 8 {
                return Err(WeatherGenError::config(
                    "AI API key appears to be invalid (too short). Please check your API key.",
                )
                .into());
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.ai.timeout_seconds > 300 {
            return Err(WeatherGenError::config("AI request timeout cannot exceed 300 seconds").into());
        }

        if self.presentation.copied_indicator_ms > 10_000 {
            return Err(WeatherGenError::config(
                "Copied indicator delay cannot exceed 10000 ms",
            )
            .into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(WeatherGenError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(WeatherGenError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.ai.base_url.starts_with("http://") && !self.ai.base_url.starts_with("https://") {
            return Err(
                WeatherGenError::config("AI base URL must be a valid HTTP or HTTPS URL").into(),
            );
        }

        if self.ai.model.contains('/') || self.ai.model.contains(char::is_whitespace) {
            return Err(WeatherGenError::config(format!(
                "Invalid model name '{}'",
                self.ai.model
            ))
            .into());
        }

        Ok(())
    }
}

impl LoggingConfig {
    /// Install the global tracing subscriber
    ///
    /// `RUST_LOG` wins over the configured level when it is set.
    pub fn init_tracing(&self) {
        use tracing_subscriber::{EnvFilter, fmt};

        let default_directive = format!("weathergen={},tower_http=info", self.level);
        let filter_directive = std::env::var("RUST_LOG")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(default_directive);

        let filter = EnvFilter::new(filter_directive);
        if self.format == "json" {
            let _ = fmt().with_env_filter(filter).json().try_init();
        } else {
            let _ = fmt().with_env_filter(filter).try_init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = WeatherGenConfig::default();
        assert_eq!(
            config.ai.base_url,
            "https://generativelanguage.googleapis.com/v1beta"
        );
        assert_eq!(config.ai.model, "gemini-2.5-flash");
        assert_eq!(config.ai.timeout_seconds, 60);
        assert!(!config.ai.parallel_requests);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.defaults.initial_location, "San Francisco, CA");
        assert_eq!(config.presentation.copied_indicator_ms, 2000);
        assert!(config.ai.api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_short_api_key() {
        let mut config = WeatherGenConfig::default();
        config.ai.api_key = Some("abc".to_string());
        let result = config.validate_api_key();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("too short"));
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = WeatherGenConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = WeatherGenConfig::default();
        config.ai.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));
    }

    #[test]
    fn test_config_validation_base_url() {
        let mut config = WeatherGenConfig::default();
        config.ai.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_apply_defaults_fills_blanks() {
        let mut config = WeatherGenConfig::default();
        config.ai.model = String::new();
        config.server.port = 0;
        config.defaults.initial_location = "  ".to_string();
        config.apply_defaults();
        assert_eq!(config.ai.model, "gemini-2.5-flash");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.defaults.initial_location, "San Francisco, CA");
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = std::env::temp_dir().join(format!("weathergen-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[ai]\nmodel = \"gemini-2.0-flash\"\nparallel_requests = true\n\n[defaults]\ninitial_location = \"Tokyo, Japan\""
        )
        .unwrap();

        let config = WeatherGenConfig::load_from_path(Some(path)).unwrap();
        assert_eq!(config.ai.model, "gemini-2.0-flash");
        assert!(config.ai.parallel_requests);
        assert_eq!(config.defaults.initial_location, "Tokyo, Japan");
        assert_eq!(config.server.port, 3000);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("weathergen-missing").join("config.toml");
        let config = WeatherGenConfig::load_from_path(Some(path)).unwrap();
        assert_eq!(config.ai.timeout_seconds, 60);
        assert_eq!(config.server.static_dir, "frontend");
        assert_eq!(config.presentation.copied_indicator_ms, 2000);
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = WeatherGenConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("weathergen"));
            assert!(path.to_string_lossy().contains("config.toml"));
        }
    }
}
