use thiserror::Error;

/// Failures of the current-weather fetch. Prediction failures never show up here,
/// they are absorbed by the fallback prediction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeatherError {
    #[error("Please enter a valid city name (at least 2 characters)")]
    InvalidCity,

    #[error("City \"{city}\" not found. Please check the spelling and try again.")]
    CityNotFound { city: String },

    /// 500 from the backend; carries the server message or a generic one.
    #[error("{0}")]
    Service(String),

    #[error("{message}")]
    Http { status: u16, message: String },

    /// A 2xx response whose body still reported an `error`.
    #[error("{0}")]
    Remote(String),

    #[error("Weather service returned an unreadable response: {0}")]
    Malformed(String),

    #[error(
        "Unable to connect to weather service. Please check that the backend server is running and reachable."
    )]
    Connection { detail: String },
}

impl WeatherError {
    pub const SERVICE_UNAVAILABLE: &'static str =
        "Weather service is temporarily unavailable. Please try again later.";

    /// Build the error for a non-2xx response of the current-weather endpoint.
    pub fn from_status(status: u16, city: &str, server_message: Option<String>) -> Self {
        match status {
            404 => Self::CityNotFound { city: city.to_string() },
            500 => Self::Service(
                server_message.unwrap_or_else(|| Self::SERVICE_UNAVAILABLE.to_string()),
            ),
            _ => Self::Http {
                status,
                message: server_message
                    .unwrap_or_else(|| format!("Failed to fetch weather data (Error {status})")),
            },
        }
    }

    pub fn connection(err: &reqwest::Error) -> Self {
        Self::Connection { detail: err.to_string() }
    }

    /// Whether the error was raised before any request went out.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidCity)
    }
}
