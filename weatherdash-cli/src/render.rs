//! Plain-text panels for the terminal.

use chrono::{DateTime, Duration, Local};
use rand::Rng;
use std::fmt::Write;

use weatherdash_core::{
    ForecastDay, PredictionResult, Trend, WeatherObservation, WeatherReport,
    forecast::weather_icon,
    scene::{Accent, Scene},
};

const WIDTH: usize = 64;

pub struct Style {
    pub color: bool,
}

impl Style {
    fn paint(&self, accent: Accent, text: &str) -> String {
        if self.color {
            format!("\x1b[38;5;{}m{text}\x1b[0m", accent.ansi())
        } else {
            text.to_string()
        }
    }
}

pub fn header(style: &Style, accent: Accent) -> String {
    let title = style.paint(accent, "WeatherAI");
    format!("{title}  🤖 AI Powered\nPrecision Weather Forecasting with Machine Learning\n")
}

pub fn current(obs: &WeatherObservation) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "📍 {}, {}", obs.city, obs.country);
    let _ = writeln!(
        out,
        "{}  {}°C  {}",
        weather_icon(&obs.description),
        obs.temperature.round(),
        obs.description
    );
    let _ = writeln!(out, "   Feels like {}°C", obs.feels_like.round());
    let _ = writeln!(
        out,
        "   💧 Humidity {}%   💨 Wind {} m/s   🧭 Pressure {} hPa",
        obs.humidity, obs.wind_speed, obs.pressure
    );
    let _ = writeln!(
        out,
        "   👁 Visibility {} km   ☀ UV {}   🌅 {}   🌇 {}",
        obs.visibility, obs.uv_index, obs.sunrise, obs.sunset
    );

    out
}

/// The next-hour panel. `now` is injected so the target hour is testable.
pub fn prediction(pred: &PredictionResult, now: DateTime<Local>) -> String {
    let target = now + Duration::hours(1);
    let arrow = match pred.trend() {
        Trend::Warmer => "📈",
        Trend::Cooler => "📉",
    };

    let mut out = String::new();
    let _ = writeln!(out, "🤖 AI Weather Prediction   Confidence: {}", pred.confidence);
    let _ = writeln!(
        out,
        "   Predicting for {} at {}",
        target.format("%A, %-d %B %Y"),
        target.format("%-I:%M %p")
    );
    let _ = writeln!(
        out,
        "   Next hour {}°C   {} {} {}",
        pred.predicted_temperature.round(),
        pred.difference_label(),
        arrow,
        pred.trend().label()
    );
    if pred.is_fallback() {
        let _ = writeln!(out, "   (estimated locally, prediction service unavailable)");
    }

    out
}

pub fn forecast(days: &[ForecastDay]) -> String {
    let mut out = String::from("7-Day Forecast\n");

    for day in days {
        let _ = writeln!(
            out,
            "   {:<10} {}  {:<9} {:<14} 💧{:>2}%  💨{:>2} km/h",
            day.day, day.icon, day.temp, day.desc, day.humidity, day.wind_speed
        );
    }

    out
}

pub fn background<R: Rng + ?Sized>(style: &Style, scene: &Scene, rng: &mut R) -> String {
    style.paint(scene.accent, &scene.strip(WIDTH, rng))
}

pub fn report<R: Rng + ?Sized>(
    style: &Style,
    report: &WeatherReport,
    now: DateTime<Local>,
    rng: &mut R,
) -> String {
    let obs = &report.observation;
    let scene = Scene::for_conditions(&obs.description, &obs.city);
    let strip = background(style, &scene, rng);

    [
        header(style, scene.accent),
        strip.clone(),
        current(obs),
        prediction(&report.prediction, now),
        forecast(&report.forecast),
        strip,
    ]
    .join("\n")
}
