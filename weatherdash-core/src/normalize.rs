//! Mapping of the current-weather payload onto [`WeatherObservation`].
//!
//! The backend has answered with two shapes over time: a flat one
//! (`temperature`, `humidity`, ...) and the OpenWeather one (`main.temp`,
//! `weather[0].description`, `sys.country`, ...). Both are accepted. A flat
//! field always wins over its nested counterpart, and absent fields get a
//! fixed default.

use rand::{Rng, RngExt};
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value;

use crate::model::WeatherObservation;

pub const DEFAULT_DESCRIPTION: &str = "Clear sky";
pub const DEFAULT_COUNTRY: &str = "India";
pub const DEFAULT_VISIBILITY_KM: f64 = 10.0;
pub const DEFAULT_SUNRISE: &str = "6:30 AM";
pub const DEFAULT_SUNSET: &str = "7:45 PM";

/// Raw `/current-weather/{city}` body.
///
/// Every field is optional, and a field of the wrong type reads as absent
/// so that the nested value or the default takes over.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawWeather {
    #[serde(default, deserialize_with = "lenient")]
    pub error: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub temperature: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub humidity: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub pressure: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub feels_like: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub country: Option<String>,
    #[serde(rename = "windSpeed", default, deserialize_with = "lenient")]
    pub wind_speed_camel: Option<f64>,
    #[serde(rename = "wind_speed", default, deserialize_with = "lenient")]
    pub wind_speed_snake: Option<f64>,
    /// Meters.
    #[serde(default, deserialize_with = "lenient")]
    pub visibility: Option<f64>,
    #[serde(rename = "uvIndex", default, deserialize_with = "lenient")]
    pub uv_index_camel: Option<f64>,
    #[serde(rename = "uv_index", default, deserialize_with = "lenient")]
    pub uv_index_snake: Option<f64>,
    pub sunrise: Option<Value>,
    pub sunset: Option<Value>,

    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub main: Option<RawMain>,
    #[serde(default, deserialize_with = "lenient")]
    pub weather: Option<Vec<RawCondition>>,
    #[serde(default, deserialize_with = "lenient")]
    pub sys: Option<RawSys>,
    #[serde(default, deserialize_with = "lenient")]
    pub wind: Option<RawWind>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMain {
    #[serde(default, deserialize_with = "lenient")]
    pub temp: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub humidity: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub pressure: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub feels_like: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCondition {
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSys {
    #[serde(default, deserialize_with = "lenient")]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawWind {
    #[serde(default, deserialize_with = "lenient")]
    pub speed: Option<f64>,
}

/// Any JSON value; `None` unless it has the expected type.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

impl RawWeather {
    fn main_field(&self, pick: impl Fn(&RawMain) -> Option<f64>) -> Option<f64> {
        self.main.as_ref().and_then(pick)
    }

    fn flat_wind_speed(&self) -> Option<f64> {
        self.wind_speed_camel.or(self.wind_speed_snake)
    }

    fn flat_uv_index(&self) -> Option<f64> {
        self.uv_index_camel.or(self.uv_index_snake)
    }

    fn nested_description(&self) -> Option<String> {
        self.weather
            .as_ref()
            .and_then(|w| w.first())
            .and_then(|c| c.description.clone())
    }
}

/// Normalize a raw payload for `queried_city`.
///
/// `rng` is only used for the decorative UV index when the backend sends none.
pub fn normalize<R: Rng + ?Sized>(
    raw: &RawWeather,
    queried_city: &str,
    rng: &mut R,
) -> WeatherObservation {
    let temperature = raw.temperature.or_else(|| raw.main_field(|m| m.temp)).unwrap_or(0.0);

    let feels_like = raw
        .feels_like
        .or_else(|| raw.main_field(|m| m.feels_like))
        .or(raw.temperature)
        .unwrap_or(0.0);

    let visibility = raw
        .visibility
        .map(meters_to_km)
        .unwrap_or(DEFAULT_VISIBILITY_KM);

    let uv_index = match raw.flat_uv_index() {
        Some(uv) => uv.round().clamp(0.0, u8::MAX as f64) as u8,
        None => rng.random_range(1..=10),
    };

    WeatherObservation {
        temperature,
        humidity: raw.humidity.or_else(|| raw.main_field(|m| m.humidity)).unwrap_or(0.0),
        pressure: raw.pressure.or_else(|| raw.main_field(|m| m.pressure)).unwrap_or(0.0),
        feels_like,
        description: raw
            .description
            .clone()
            .or_else(|| raw.nested_description())
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
        city: raw
            .city
            .clone()
            .or_else(|| raw.name.clone())
            .unwrap_or_else(|| queried_city.to_string()),
        country: raw
            .country
            .clone()
            .or_else(|| raw.sys.as_ref().and_then(|s| s.country.clone()))
            .unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
        wind_speed: raw
            .flat_wind_speed()
            .or_else(|| raw.wind.as_ref().and_then(|w| w.speed))
            .unwrap_or(0.0),
        visibility,
        uv_index,
        sunrise: clock_text(raw.sunrise.as_ref()).unwrap_or_else(|| DEFAULT_SUNRISE.to_string()),
        sunset: clock_text(raw.sunset.as_ref()).unwrap_or_else(|| DEFAULT_SUNSET.to_string()),
    }
}

pub fn meters_to_km(meters: f64) -> f64 {
    (meters / 1000.0).round()
}

// OpenWeather sends epoch seconds here; only preformatted strings are shown.
fn clock_text(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}
