//! End-to-end fetch sequences against a wiremock backend.

use serde_json::json;
use std::time::Duration;
use weatherdash_core::{Config, Dashboard, FetchState, PredictionSource, Trend, WeatherError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_mumbai(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/current-weather/Mumbai"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "temperature": 30,
            "humidity": 70,
            "pressure": 1008,
            "feels_like": 33,
            "description": "Haze",
            "city": "Mumbai",
            "country": "India"
        })))
        .expect(1)
        .mount(server)
        .await;
}

fn dashboard(server: &MockServer) -> Dashboard {
    Dashboard::from_config(Config::with_base_url(server.uri())).unwrap()
}

#[tokio::test]
async fn mumbai_end_to_end() {
    let server = MockServer::start().await;
    mount_mumbai(&server).await;

    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "predicted_temperature": 31,
            "confidence": "High"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dashboard = dashboard(&server);
    let report = dashboard.fetch_weather("Mumbai").await.unwrap();

    let obs = &report.observation;
    assert_eq!(obs.visibility, 10.0);
    assert_eq!(obs.wind_speed, 0.0);
    assert_eq!(obs.city, "Mumbai");

    let pred = &report.prediction;
    assert_eq!(pred.source, PredictionSource::Remote);
    assert_eq!(pred.confidence, "High");
    assert_eq!(pred.difference_label(), "+1.0°C");
    assert_eq!(pred.trend(), Trend::Warmer);
    assert_eq!(pred.trend().label(), "Getting Warmer");

    assert_eq!(report.forecast.len(), 7);
    assert_eq!(report.forecast[0].day, "Today");
    assert_eq!(report.forecast[1].day, "Tomorrow");

    let state = dashboard.state();
    assert!(!state.is_loading());
    assert_eq!(state.report(), Some(&report));
}

#[tokio::test]
async fn unknown_city_fails_without_prediction() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/current-weather/Zzqx"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "city not found"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dashboard = dashboard(&server);
    let err = dashboard.fetch_weather("Zzqx").await.unwrap_err();

    let state = dashboard.state();
    assert!(!state.is_loading());
    assert!(state.report().is_none());
    assert_eq!(state.error(), Some(&err));

    let msg = err.to_string();
    assert!(msg.contains("Zzqx"));
    assert!(msg.contains("not found"));
}

#[tokio::test]
async fn short_city_never_reaches_the_backend() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dashboard = dashboard(&server);
    let err = dashboard.fetch_weather(" M ").await.unwrap_err();

    assert_eq!(err, WeatherError::InvalidCity);
    assert!(matches!(dashboard.state(), FetchState::Failed { .. }));
}

async fn assert_fallback(server: &MockServer, config: Config) {
    let dashboard = Dashboard::from_config(config).unwrap();
    let report = dashboard.fetch_weather("Mumbai").await.unwrap();

    assert_eq!(report.prediction.confidence, "Medium");
    assert_eq!(report.prediction.source, PredictionSource::Fallback);
    assert_eq!(report.prediction.current_temperature, 30.0);
    assert!((report.prediction.predicted_temperature - 30.0).abs() <= 2.0);
    assert_eq!(report.forecast.len(), 7);

    drop(dashboard);
    server.verify().await;
}

#[tokio::test]
async fn prediction_non_success_falls_back() {
    let server = MockServer::start().await;
    mount_mumbai(&server).await;

    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"error": "Models not loaded"})))
        .mount(&server)
        .await;

    assert_fallback(&server, Config::with_base_url(server.uri())).await;
}

#[tokio::test]
async fn prediction_malformed_json_falls_back() {
    let server = MockServer::start().await;
    mount_mumbai(&server).await;

    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&server)
        .await;

    assert_fallback(&server, Config::with_base_url(server.uri())).await;
}

#[tokio::test]
async fn prediction_transport_error_falls_back() {
    let server = MockServer::start().await;
    mount_mumbai(&server).await;

    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let config = Config {
        timeout: Duration::from_millis(500),
        ..Config::with_base_url(server.uri())
    };

    assert_fallback(&server, config).await;
}

#[tokio::test]
async fn timed_out_fetch_does_not_stay_loading() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/current-weather/Pune"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"temperature": 28}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let dashboard = dashboard(&server);
    let outcome =
        tokio::time::timeout(Duration::from_millis(100), dashboard.fetch_weather("Pune")).await;

    assert!(outcome.is_err());
    assert!(!dashboard.state().is_loading());
}
