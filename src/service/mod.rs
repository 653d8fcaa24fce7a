//! Weather query service
//!
//! Turns a location into a [`ForecastResult`] by asking the generative model
//! twice: once for the forecast, constrained to a JSON schema so the
//! dashboard can trust the field shapes, and once for a free-form Python
//! script. The forecast is the primary payload and its failure aborts the
//! query; the script is supplementary and degrades to a placeholder.

pub mod prompt;
pub mod script;

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use crate::ai::{GenerationRequest, GenerativeModel};
use crate::models::{ForecastBundle, ForecastResult, LocationQuery};
use crate::{Result, WeatherGenError};

pub use script::{PLACEHOLDER_SCRIPT, strip_code_fences};

/// Outcome of the supplementary script request
#[derive(Debug, Clone, PartialEq, Eq)]
enum ScriptOutcome {
    Generated(String),
    /// The request failed or came back empty; the placeholder is used.
    Degraded { reason: String },
}

impl ScriptOutcome {
    fn into_code(self) -> String {
        match self {
            ScriptOutcome::Generated(code) => code,
            ScriptOutcome::Degraded { .. } => PLACEHOLDER_SCRIPT.to_string(),
        }
    }
}

/// Builds forecast results from a generative model
pub struct WeatherQueryService {
    model: Arc<dyn GenerativeModel>,
    parallel_requests: bool,
}

impl WeatherQueryService {
    /// Create a service around an already constructed model client
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self {
            model,
            parallel_requests: false,
        }
    }

    /// Issue the forecast and script requests concurrently instead of one
    /// after the other
    #[must_use]
    pub fn with_parallel_requests(mut self, parallel: bool) -> Self {
        self.parallel_requests = parallel;
        self
    }

    /// Fetch a simulated forecast and companion script for `location`
    ///
    /// Fails with a generation error when the forecast request fails, comes
    /// back empty, or does not fit the schema. Problems with the script
    /// request never fail the query.
    #[instrument(skip(self, location), fields(location = %location, model = self.model.name()))]
    pub async fn fetch_forecast(&self, location: &LocationQuery) -> Result<ForecastResult> {
        info!("Generating forecast for '{}'", location);
        let start = Instant::now();

        let (bundle, script) = if self.parallel_requests {
            let (bundle, script) =
                futures::future::join(self.request_forecast(location), self.request_script(location))
                    .await;
            (bundle?, script)
        } else {
            let bundle = self.request_forecast(location).await?;
            let script = self.request_script(location).await;
            (bundle, script)
        };

        if let ScriptOutcome::Degraded { reason } = &script {
            warn!(reason, "Script generation degraded, using placeholder");
        }

        let result = ForecastResult::new(bundle, script.into_code());
        info!(
            "Forecast for '{}' ready in {:.3}s",
            result.current().location,
            start.elapsed().as_secs_f64()
        );
        Ok(result)
    }

    /// Schema-constrained request for current conditions + 7 days
    async fn request_forecast(&self, location: &LocationQuery) -> Result<ForecastBundle> {
        let request =
            GenerationRequest::structured(prompt::forecast_prompt(location), prompt::forecast_schema());

        let text = self.model.generate(&request).await?;
        if text.trim().is_empty() {
            return Err(WeatherGenError::generation(
                "model returned an empty forecast response",
            ));
        }

        debug!("Parsing forecast payload ({} chars)", text.len());
        let bundle: ForecastBundle = serde_json::from_str(&text)?;
        bundle.validated()
    }

    /// Free-form request for the Python script
    async fn request_script(&self, location: &LocationQuery) -> ScriptOutcome {
        let request = GenerationRequest::free_form(prompt::script_prompt(location));

        match self.model.generate(&request).await {
            Ok(text) => match script::clean_script(&text) {
                Some(code) => ScriptOutcome::Generated(code),
                None => ScriptOutcome::Degraded {
                    reason: "empty script response".to_string(),
                },
            },
            Err(e) => ScriptOutcome::Degraded {
                reason: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::ModelError;
    use crate::models::{FORECAST_DAYS, WeatherIcon};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Answers structured and free-form requests from fixed replies
    struct FakeModel {
        forecast: Mutex<Option<std::result::Result<String, ModelError>>>,
        script: Mutex<Option<std::result::Result<String, ModelError>>>,
        calls: Mutex<Vec<GenerationRequest>>,
    }

    impl FakeModel {
        fn new(
            forecast: std::result::Result<String, ModelError>,
            script: std::result::Result<String, ModelError>,
        ) -> Arc<Self> {
            Arc::new(Self {
                forecast: Mutex::new(Some(forecast)),
                script: Mutex::new(Some(script)),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<GenerationRequest> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GenerativeModel for FakeModel {
        async fn generate(
            &self,
            request: &GenerationRequest,
        ) -> std::result::Result<String, ModelError> {
            self.calls.lock().unwrap().push(request.clone());
            let slot = if request.is_structured() {
                &self.forecast
            } else {
                &self.script
            };
            slot.lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(ModelError::Format("no reply left".to_string())))
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    fn forecast_payload(icon: &str, days: usize) -> String {
        let forecast: Vec<_> = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun", "Mon", "Tue"]
            .iter()
            .take(days)
            .enumerate()
            .map(|(i, day)| {
                json!({
                    "day": day,
                    "high": 20.0 + i as f64,
                    "low": 12.0 + i as f64,
                    "condition": "Showers",
                    "icon": icon
                })
            })
            .collect();

        json!({
            "current": {
                "temp": 17.0,
                "condition": "Rain",
                "humidity": 88,
                "windSpeed": 12.5,
                "feelsLike": 16.0,
                "location": "Tokyo, Japan",
                "description": "Steady rain through the afternoon",
                "icon": icon
            },
            "forecast": forecast
        })
        .to_string()
    }

    fn tokyo() -> LocationQuery {
        LocationQuery::parse("Tokyo, Japan").unwrap()
    }

    #[tokio::test]
    async fn tokyo_scenario() {
        let model = FakeModel::new(
            Ok(forecast_payload("rain", 7)),
            Ok("\n```python\nprint(\"hello\")\n```\n".to_string()),
        );
        let service = WeatherQueryService::new(model.clone());

        let result = service.fetch_forecast(&tokyo()).await.unwrap();
        assert_eq!(result.current().icon, WeatherIcon::Rain);
        assert_eq!(result.forecast().len(), FORECAST_DAYS);
        assert!(result.forecast().iter().all(|d| d.icon == WeatherIcon::Rain));
        assert_eq!(result.python_code(), "print(\"hello\")");

        let calls = model.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].is_structured());
        assert!(calls[0].prompt.contains("Tokyo, Japan"));
        assert!(!calls[1].is_structured());
    }

    #[tokio::test]
    async fn empty_forecast_response_fails() {
        let model = FakeModel::new(Ok("   ".to_string()), Ok("print(1)".to_string()));
        let service = WeatherQueryService::new(model.clone());

        let err = service.fetch_forecast(&tokyo()).await.unwrap_err();
        assert!(err.is_generation_failure());
        // Sequential mode never reaches the script request
        assert_eq!(model.calls().len(), 1);
    }

    #[tokio::test]
    async fn malformed_forecast_payload_fails() {
        let model = FakeModel::new(
            Ok(r#"{"current": {"temp": "warm"}}"#.to_string()),
            Ok("print(1)".to_string()),
        );
        let service = WeatherQueryService::new(model);

        let err = service.fetch_forecast(&tokyo()).await.unwrap_err();
        assert!(err.is_generation_failure());
    }

    #[tokio::test]
    async fn short_forecast_fails() {
        let model = FakeModel::new(Ok(forecast_payload("sun", 3)), Ok("print(1)".to_string()));
        let service = WeatherQueryService::new(model);

        let err = service.fetch_forecast(&tokyo()).await.unwrap_err();
        assert!(err.is_generation_failure());
    }

    #[tokio::test]
    async fn model_error_on_forecast_fails() {
        let model = FakeModel::new(
            Err(ModelError::Api {
                status: 500,
                message: "boom".to_string(),
            }),
            Ok("print(1)".to_string()),
        );
        let service = WeatherQueryService::new(model);

        let err = service.fetch_forecast(&tokyo()).await.unwrap_err();
        assert!(err.is_generation_failure());
        assert!(err.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn empty_script_uses_placeholder() {
        let model = FakeModel::new(Ok(forecast_payload("cloud", 7)), Ok(String::new()));
        let service = WeatherQueryService::new(model);

        let result = service.fetch_forecast(&tokyo()).await.unwrap();
        assert_eq!(result.python_code(), PLACEHOLDER_SCRIPT);
    }

    #[tokio::test]
    async fn failed_script_request_uses_placeholder() {
        let model = FakeModel::new(
            Ok(forecast_payload("cloud", 7)),
            Err(ModelError::Format("timeout".to_string())),
        );
        let service = WeatherQueryService::new(model);

        let result = service.fetch_forecast(&tokyo()).await.unwrap();
        assert_eq!(result.python_code(), PLACEHOLDER_SCRIPT);
    }

    #[tokio::test]
    async fn unknown_icons_are_coerced() {
        let model = FakeModel::new(Ok(forecast_payload("tornado", 7)), Ok("x = 1".to_string()));
        let service = WeatherQueryService::new(model);

        let result = service.fetch_forecast(&tokyo()).await.unwrap();
        assert_eq!(result.current().icon, WeatherIcon::Sun);
        assert!(result.forecast().iter().all(|d| WeatherIcon::ALL.contains(&d.icon)));
    }

    #[tokio::test]
    async fn parallel_mode_matches_sequential() {
        let model = FakeModel::new(
            Ok(forecast_payload("snow", 9)),
            Ok("```python\nimport requests\n```".to_string()),
        );
        let service = WeatherQueryService::new(model.clone()).with_parallel_requests(true);

        let result = service.fetch_forecast(&tokyo()).await.unwrap();
        assert_eq!(result.forecast().len(), FORECAST_DAYS);
        assert_eq!(result.python_code(), "import requests");
        assert_eq!(model.calls().len(), 2);
    }

    #[tokio::test]
    async fn parallel_mode_still_fails_on_empty_forecast() {
        let model = FakeModel::new(Ok(String::new()), Ok("print(1)".to_string()));
        let service = WeatherQueryService::new(model).with_parallel_requests(true);

        assert!(service.fetch_forecast(&tokyo()).await.is_err());
    }
}
