use serde::{Deserialize, Serialize};

/// Current conditions for one city, after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub feels_like: f64,
    pub description: String,
    pub city: String,
    pub country: String,
    pub wind_speed: f64,
    /// Kilometers.
    pub visibility: f64,
    pub uv_index: u8,
    pub sunrise: String,
    pub sunset: String,
}

impl WeatherObservation {
    /// Request body for the prediction endpoint. Visibility goes back to meters.
    pub fn prediction_request(&self) -> PredictionRequest {
        PredictionRequest {
            temperature: self.temperature,
            humidity: self.humidity,
            pressure: self.pressure,
            feels_like: self.feels_like,
            wind_speed: self.wind_speed,
            visibility: self.visibility * 1000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub feels_like: f64,
    pub wind_speed: f64,
    pub visibility: f64,
}

/// Body of a successful `/predict` response. Both fields are optional upstream.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictionResponse {
    pub predicted_temperature: Option<f64>,
    pub confidence: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionSource {
    Remote,
    Fallback,
}

/// Next-hour temperature forecast with a free-text confidence label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub predicted_temperature: f64,
    pub current_temperature: f64,
    /// "High", "Medium", "Very High", ... whatever the backend says.
    pub confidence: String,
    pub source: PredictionSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub day: String,
    pub icon: String,
    /// e.g. `33°/28°`
    pub temp: String,
    pub desc: String,
    pub condition: String,
    pub humidity: u8,
    pub wind_speed: u8,
}

/// Everything one successful fetch produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub observation: WeatherObservation,
    pub prediction: PredictionResult,
    pub forecast: Vec<ForecastDay>,
}
