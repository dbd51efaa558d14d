use rand::{Rng, RngExt};

use crate::model::{PredictionResponse, PredictionResult, PredictionSource};

pub const FALLBACK_CONFIDENCE: &str = "Medium";
pub const DEFAULT_REMOTE_CONFIDENCE: &str = "High";

/// Largest deviation, in °C, of a locally synthesized prediction.
pub const FALLBACK_SPREAD: f64 = 2.0;

/// Prediction used when the remote endpoint is unreachable or misbehaves.
pub fn fallback_prediction<R: Rng + ?Sized>(current_temperature: f64, rng: &mut R) -> PredictionResult {
    PredictionResult {
        predicted_temperature: jitter(current_temperature, rng),
        current_temperature,
        confidence: FALLBACK_CONFIDENCE.to_string(),
        source: PredictionSource::Fallback,
    }
}

/// Fill the gaps of a successful `/predict` body.
pub fn from_response<R: Rng + ?Sized>(
    response: PredictionResponse,
    current_temperature: f64,
    rng: &mut R,
) -> PredictionResult {
    PredictionResult {
        predicted_temperature: response
            .predicted_temperature
            .unwrap_or_else(|| jitter(current_temperature, rng)),
        current_temperature,
        confidence: response
            .confidence
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_REMOTE_CONFIDENCE.to_string()),
        source: PredictionSource::Remote,
    }
}

fn jitter<R: Rng + ?Sized>(temperature: f64, rng: &mut R) -> f64 {
    temperature + rng.random_range(-FALLBACK_SPREAD..FALLBACK_SPREAD)
}

/// Direction of the predicted change, as shown on the prediction panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Warmer,
    Cooler,
}

impl Trend {
    pub fn label(self) -> &'static str {
        match self {
            Trend::Warmer => "Getting Warmer",
            Trend::Cooler => "Getting Cooler",
        }
    }
}

impl PredictionResult {
    pub fn difference(&self) -> f64 {
        self.predicted_temperature - self.current_temperature
    }

    /// Zero change counts as cooler.
    pub fn trend(&self) -> Trend {
        if self.difference() > 0.0 { Trend::Warmer } else { Trend::Cooler }
    }

    /// Signed difference with one decimal, e.g. `+1.0°C` or `-0.4°C`.
    pub fn difference_label(&self) -> String {
        let diff = self.difference();
        let sign = if self.trend() == Trend::Warmer { "+" } else { "" };
        format!("{sign}{diff:.1}°C")
    }

    pub fn is_fallback(&self) -> bool {
        self.source == PredictionSource::Fallback
    }
}
