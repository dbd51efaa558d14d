//! Decorative 7-day outlook.
//!
//! Nothing here is a forecasting model: every day is a random draw around the
//! current temperature, with a monsoon bias between June and September.

use chrono::{Datelike, Days, NaiveDate};
use rand::{Rng, RngExt};

use crate::model::ForecastDay;

pub const FORECAST_DAYS: usize = 7;

const BASE_CONDITIONS: [&str; 5] = ["sunny", "partly cloudy", "cloudy", "humid", "hazy"];
const MONSOON_CONDITIONS: [&str; 3] = ["rainy", "thunderstorm", "drizzle"];
const OFF_SEASON_RAIN: &str = "light rain";
const OFF_SEASON_RAIN_CHANCE: f64 = 0.2;

/// June through September, as zero-based month indices.
pub fn is_monsoon(month0: u32) -> bool {
    (5..=8).contains(&month0)
}

/// Generate the full batch for `current_temp`, starting at `today`.
pub fn synthesize_forecast<R: Rng + ?Sized>(
    current_temp: f64,
    today: NaiveDate,
    rng: &mut R,
) -> Vec<ForecastDay> {
    let monsoon = is_monsoon(today.month0());

    (0..FORECAST_DAYS)
        .map(|i| {
            let variation = f64::from(rng.random_range(0..8_i32) - 4);
            let high = current_temp + variation + 3.0;
            let low = current_temp + variation - 2.0;

            let mut candidates = BASE_CONDITIONS.to_vec();
            if monsoon {
                candidates.extend(MONSOON_CONDITIONS);
            } else if rng.random_bool(OFF_SEASON_RAIN_CHANCE) {
                candidates.push(OFF_SEASON_RAIN);
            }
            let condition = candidates[rng.random_range(0..candidates.len())];

            ForecastDay {
                day: day_label(today, i),
                icon: weather_icon(condition).to_string(),
                temp: format!("{}°/{}°", high.round(), low.round()),
                desc: capitalize(condition),
                condition: condition.to_string(),
                humidity: rng.random_range(40..80),
                wind_speed: rng.random_range(5..20),
            }
        })
        .collect()
}

fn day_label(today: NaiveDate, offset: usize) -> String {
    match offset {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        n => today
            .checked_add_days(Days::new(n as u64))
            .map(|d| d.format("%A").to_string())
            .unwrap_or_else(|| format!("Day {}", n + 1)),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Glyph for a free-text condition. Order matters: "thunderstorm with rain"
/// is a rain icon, "partly cloudy" is not a plain cloud.
pub fn weather_icon(condition: &str) -> &'static str {
    let c = condition.to_lowercase();

    if c.contains("rain") || c.contains("drizzle") {
        "🌧️"
    } else if c.contains("cloud") && !c.contains("partly") {
        "☁️"
    } else if c.contains("partly cloudy") || c.contains("few clouds") {
        "⛅"
    } else if c.contains("sun") || c.contains("clear") {
        "☀️"
    } else if c.contains("thunder") || c.contains("storm") {
        "⛈️"
    } else if c.contains("hazy") || c.contains("haze") || c.contains("mist") || c.contains("fog") {
        "🌫️"
    } else if c.contains("humid") {
        "🌡️"
    } else if c.contains("snow") {
        "❄️"
    } else if c.contains("wind") {
        "💨"
    } else {
        "🌤️"
    }
}
