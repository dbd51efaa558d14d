//! One-shot probes against a deployed backend, for connectivity and CORS
//! troubleshooting. Nothing here retries; every probe is reported as-is.

use anyhow::Context;
use reqwest::{Client, Method};
use std::{collections::HashMap, time::Duration};

use crate::config::{
    Config, ENV_API_BASE_URL, ENV_API_BASE_URL_FALLBACK, ENV_MODE, Mode, StoredConfig,
};

pub const DEFAULT_BACKEND_URL: &str = "https://weather-prediction-app-1-gmxl.onrender.com";
pub const DEFAULT_FRONTEND_URL: &str = "https://weather-prediction-app-wt9d.onrender.com";
pub const SAMPLE_CITY: &str = "Mumbai";

const EXCERPT_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResponse {
    pub status: u16,
    pub excerpt: String,
    /// `access-control-*` response headers, lowercased names.
    pub cors_headers: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProbeOutcome {
    pub name: &'static str,
    pub method: Method,
    pub url: String,
    /// `Err` holds the transport error text.
    pub result: Result<ProbeResponse, String>,
}

impl ProbeOutcome {
    pub fn passed(&self) -> bool {
        matches!(&self.result, Ok(r) if (200..300).contains(&r.status))
    }
}

#[derive(Debug, Clone, Default)]
pub struct DiagnosticReport {
    pub probes: Vec<ProbeOutcome>,
}

impl DiagnosticReport {
    pub fn all_passed(&self) -> bool {
        !self.probes.is_empty() && self.probes.iter().all(ProbeOutcome::passed)
    }

    pub fn probe(&self, name: &str) -> Option<&ProbeOutcome> {
        self.probes.iter().find(|p| p.name == name)
    }
}

#[derive(Debug, Clone)]
pub struct Diagnostics {
    http: Client,
    backend_url: String,
    frontend_url: String,
}

impl Diagnostics {
    pub fn new(backend_url: &str, frontend_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            backend_url: backend_url.trim_end_matches('/').to_string(),
            frontend_url: frontend_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.backend_url, path)
    }

    /// Health, root, CORS preflight, then a sample weather lookup. When the
    /// health probe cannot even connect, a bare `HEAD /` is tried as well.
    pub async fn run(&self) -> DiagnosticReport {
        let mut probes = Vec::new();

        let health = self.probe("health", Method::GET, "/health", &[]).await;
        let unreachable = health.result.is_err();
        probes.push(health);

        if unreachable {
            tracing::warn!(backend = %self.backend_url, "health endpoint unreachable, testing basic connectivity");
            probes.push(self.probe("connectivity", Method::HEAD, "/", &[]).await);
        }

        probes.push(self.probe("root", Method::GET, "/", &[]).await);

        let preflight = [
            ("Origin", self.frontend_url.as_str()),
            ("Access-Control-Request-Method", "GET"),
            ("Access-Control-Request-Headers", "Content-Type"),
        ];
        probes.push(self.probe("cors", Method::OPTIONS, "/health", &preflight).await);

        let weather_path = format!("/current-weather/{SAMPLE_CITY}");
        probes.push(self.probe("weather", Method::GET, &weather_path, &[]).await);

        DiagnosticReport { probes }
    }

    async fn probe(
        &self,
        name: &'static str,
        method: Method,
        path: &str,
        headers: &[(&str, &str)],
    ) -> ProbeOutcome {
        let url = self.url(path);
        tracing::debug!(name, %method, %url, "probing");

        let request = headers
            .iter()
            .fold(self.http.request(method.clone(), &url), |req, (k, v)| req.header(*k, *v));

        let result = match request.send().await {
            Ok(res) => {
                let status = res.status().as_u16();
                let cors_headers = res
                    .headers()
                    .iter()
                    .filter(|(k, _)| k.as_str().contains("access-control"))
                    .map(|(k, v)| {
                        (k.as_str().to_string(), v.to_str().unwrap_or("<binary>").to_string())
                    })
                    .collect();
                let body = res.text().await.unwrap_or_default();

                Ok(ProbeResponse { status, excerpt: excerpt(&body), cors_headers })
            }
            Err(err) => Err(err.to_string()),
        };

        ProbeOutcome { name, method, url, result }
    }
}

/// Pretty-printed JSON when the body parses, raw text otherwise, cut to 100 chars.
pub fn excerpt(body: &str) -> String {
    let text = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| serde_json::to_string_pretty(&v).ok())
        .unwrap_or_else(|| body.to_string());

    if text.chars().count() > EXCERPT_CHARS {
        format!("{}...", text.chars().take(EXCERPT_CHARS).collect::<String>())
    } else {
        text
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Resolves to the expected production backend.
    Correct,
    LocalhostInProduction,
    Unexpected,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioReport {
    pub name: &'static str,
    pub vars: Vec<(&'static str, String)>,
    pub base_url: String,
    pub verdict: Verdict,
}

/// Evaluate `vars` through the regular resolver.
pub fn evaluate_scenario(
    name: &'static str,
    vars: Vec<(&'static str, String)>,
    expected_backend: &str,
) -> ScenarioReport {
    let lookup: HashMap<&str, String> = vars.iter().cloned().collect();
    let config = Config::layered(&StoredConfig::default(), |key| lookup.get(key).cloned());
    let base_url = config.resolve_base_url();

    let verdict = if base_url.contains("localhost") && config.mode == Mode::Production {
        Verdict::LocalhostInProduction
    } else if base_url == expected_backend.trim_end_matches('/') {
        Verdict::Correct
    } else {
        Verdict::Unexpected
    };

    ScenarioReport { name, vars, base_url, verdict }
}

/// The usual deployment setups: local development, production without the
/// primary URL, production with it.
pub fn deployment_scenarios(backend_url: &str) -> Vec<ScenarioReport> {
    vec![
        evaluate_scenario(
            "Local development",
            vec![
                (ENV_API_BASE_URL, backend_url.to_string()),
                (ENV_API_BASE_URL_FALLBACK, "http://localhost:5000".to_string()),
                (ENV_MODE, "development".to_string()),
            ],
            backend_url,
        ),
        evaluate_scenario(
            "Production without API base URL",
            vec![(ENV_MODE, "production".to_string())],
            backend_url,
        ),
        evaluate_scenario(
            "Production with API base URL",
            vec![
                (ENV_API_BASE_URL, backend_url.to_string()),
                (ENV_MODE, "production".to_string()),
            ],
            backend_url,
        ),
    ]
}
