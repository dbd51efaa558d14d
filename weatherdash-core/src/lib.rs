//! Core library for the `weatherdash` terminal dashboard.
//!
//! This crate defines:
//! - Configuration resolution (environment + config file)
//! - The backend client and the weather-fetch orchestrator
//! - Normalization, fallback prediction and the mocked 7-day forecast
//! - City search, background scenes and deployment diagnostics
//!
//! It is used by `weatherdash-cli`, but has no terminal dependencies of its own.

pub mod backend;
pub mod config;
pub mod dashboard;
pub mod diagnostics;
pub mod error;
pub mod forecast;
pub mod model;
pub mod normalize;
pub mod prediction;
pub mod scene;
pub mod search;

pub use backend::{HttpBackend, WeatherBackend};
pub use config::{Config, ConfigWarning, Mode, StoredConfig};
pub use dashboard::{Dashboard, FetchState};
pub use error::WeatherError;
pub use model::{ForecastDay, PredictionResult, PredictionSource, WeatherObservation, WeatherReport};
pub use prediction::Trend;
