//! The weather-fetch orchestrator.
//!
//! One [`Dashboard::fetch_weather`] call validates the city, fetches and
//! normalizes current conditions, asks for a prediction (falling back to a
//! local one on any failure) and synthesizes the 7-day outlook. Progress is
//! published as a [`FetchState`] on a watch channel.
//!
//! Every call takes a generation number. Only the newest generation may
//! publish, so a slow response for a city the user already moved away from
//! never overwrites the state of a newer request.

use chrono::Local;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;

use crate::{
    backend::{HttpBackend, WeatherBackend},
    config::Config,
    error::WeatherError,
    forecast::synthesize_forecast,
    model::WeatherReport,
    normalize::normalize,
    prediction::{fallback_prediction, from_response},
};

pub const MIN_CITY_LEN: usize = 2;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum FetchState {
    #[default]
    Idle,
    Loading {
        city: String,
        generation: u64,
    },
    Success {
        generation: u64,
        report: Box<WeatherReport>,
    },
    Failed {
        generation: u64,
        error: WeatherError,
    },
}

impl FetchState {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading { .. })
    }

    pub fn report(&self) -> Option<&WeatherReport> {
        match self {
            FetchState::Success { report, .. } => Some(&**report),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&WeatherError> {
        match self {
            FetchState::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn generation(&self) -> Option<u64> {
        match self {
            FetchState::Idle => None,
            FetchState::Loading { generation, .. }
            | FetchState::Success { generation, .. }
            | FetchState::Failed { generation, .. } => Some(*generation),
        }
    }
}

/// City names shorter than [`MIN_CITY_LEN`] after trimming are rejected.
pub fn validate_city(city: &str) -> Result<&str, WeatherError> {
    let trimmed = city.trim();
    if trimmed.chars().count() < MIN_CITY_LEN {
        return Err(WeatherError::InvalidCity);
    }
    Ok(trimmed)
}

#[derive(Debug)]
pub struct Dashboard {
    backend: Box<dyn WeatherBackend>,
    generation: AtomicU64,
    state: watch::Sender<FetchState>,
}

impl Dashboard {
    pub fn new(backend: Box<dyn WeatherBackend>) -> Self {
        let (state, _) = watch::channel(FetchState::Idle);
        Self { backend, generation: AtomicU64::new(0), state }
    }

    /// Dashboard talking to the HTTP backend described by `config`.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        Ok(Self::new(Box::new(HttpBackend::new(config)?)))
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchState> {
        self.state.subscribe()
    }

    /// Snapshot of the published state.
    pub fn state(&self) -> FetchState {
        self.state.borrow().clone()
    }

    /// Run one full fetch sequence for `city`.
    ///
    /// The returned result belongs to this call even when a newer call has
    /// since taken over the published state.
    pub async fn fetch_weather(&self, city: &str) -> Result<WeatherReport, WeatherError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        self.publish(
            generation,
            FetchState::Loading { city: city.trim().to_string(), generation },
        );
        let _settle = SettleOnDrop { state: &self.state, generation };

        let result = self.run(city).await;

        let next = match &result {
            Ok(report) => FetchState::Success { generation, report: Box::new(report.clone()) },
            Err(error) => {
                tracing::error!(city, %error, "weather fetch failed");
                FetchState::Failed { generation, error: error.clone() }
            }
        };

        if !self.publish(generation, next) {
            tracing::debug!(city, generation, "discarding superseded weather result");
        }

        result
    }

    async fn run(&self, city: &str) -> Result<WeatherReport, WeatherError> {
        let city = validate_city(city)?;
        tracing::info!(city, "fetching weather data");

        let raw = self.backend.current_weather(city).await?;
        let observation = normalize(&raw, city, &mut rand::rng());

        let remote = self.backend.predict(&observation.prediction_request()).await;
        let prediction = match remote {
            Ok(response) => from_response(response, observation.temperature, &mut rand::rng()),
            Err(err) => {
                tracing::warn!(error = %format!("{err:#}"), "prediction API failed, using fallback");
                fallback_prediction(observation.temperature, &mut rand::rng())
            }
        };

        let forecast =
            synthesize_forecast(observation.temperature, Local::now().date_naive(), &mut rand::rng());

        Ok(WeatherReport { observation, prediction, forecast })
    }

    /// Replace the published state if `generation` is still the newest one.
    fn publish(&self, generation: u64, next: FetchState) -> bool {
        self.state.send_if_modified(|current| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            *current = next;
            true
        })
    }
}

/// Puts the state back to `Idle` if the fetch future is dropped while its
/// `Loading` is still the published state (timeouts, `select!`, aborts).
struct SettleOnDrop<'a> {
    state: &'a watch::Sender<FetchState>,
    generation: u64,
}

impl Drop for SettleOnDrop<'_> {
    fn drop(&mut self) {
        let generation = self.generation;
        let abandoned = self.state.send_if_modified(|current| match current {
            FetchState::Loading { generation: g, .. } if *g == generation => {
                *current = FetchState::Idle;
                true
            }
            _ => false,
        });

        if abandoned {
            tracing::debug!(generation, "weather fetch abandoned before completion");
        }
    }
}
