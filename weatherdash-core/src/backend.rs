use anyhow::{Context, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;

use crate::{
    config::Config,
    error::WeatherError,
    model::{PredictionRequest, PredictionResponse},
    normalize::RawWeather,
};

/// The remote service behind the dashboard.
#[async_trait]
pub trait WeatherBackend: Send + Sync + Debug {
    /// `GET /current-weather/{city}`, with status codes already categorized.
    async fn current_weather(&self, city: &str) -> Result<RawWeather, WeatherError>;

    /// `POST /predict`. Callers treat every error the same way, so no taxonomy here.
    async fn predict(&self, request: &PredictionRequest) -> anyhow::Result<PredictionResponse>;
}

#[derive(Debug, Clone)]
pub struct HttpBackend {
    config: Config,
    http: Client,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

impl HttpBackend {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { config, http })
    }
}

#[async_trait]
impl WeatherBackend for HttpBackend {
    async fn current_weather(&self, city: &str) -> Result<RawWeather, WeatherError> {
        let url = self
            .config
            .build_url(&format!("current-weather/{}", urlencoding::encode(city)));

        tracing::debug!(%url, city, "fetching current weather");

        let res = self.http.get(&url).send().await.map_err(|e| WeatherError::connection(&e))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| WeatherError::connection(&e))?;

        if !status.is_success() {
            let server_message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .filter(|m| !m.is_empty());

            tracing::debug!(%status, body = %truncate_body(&body), "current weather request failed");
            return Err(WeatherError::from_status(status.as_u16(), city, server_message));
        }

        let raw: RawWeather = serde_json::from_str(&body)
            .map_err(|e| WeatherError::Malformed(format!("{e}: {}", truncate_body(&body))))?;

        if let Some(message) = raw.error.as_ref().filter(|m| !m.is_empty()) {
            return Err(WeatherError::Remote(message.clone()));
        }

        tracing::debug!(body = %truncate_body(&body), "weather data received");
        Ok(raw)
    }

    async fn predict(&self, request: &PredictionRequest) -> anyhow::Result<PredictionResponse> {
        let url = self.config.build_url("predict");

        let res = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .context("Failed to send prediction request")?;

        let status = res.status();
        let body = res.text().await.context("Failed to read prediction response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Prediction request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: PredictionResponse =
            serde_json::from_str(&body).context("Failed to parse prediction JSON")?;

        tracing::debug!(?parsed, "prediction data received");
        Ok(parsed)
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
