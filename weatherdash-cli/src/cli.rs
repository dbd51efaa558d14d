use anyhow::{Context, anyhow};
use chrono::Local;
use clap::{Parser, Subcommand};
use inquire::{
    Confirm, CustomUserError, Text,
    autocompletion::{Autocomplete, Replacement},
};
use std::{io::IsTerminal, time::Duration};
use tokio::{sync::watch, task::JoinHandle};

use weatherdash_core::{
    Config, Dashboard, FetchState, StoredConfig,
    config::{
        ENV_ANALYTICS, ENV_API_BASE_URL, ENV_API_BASE_URL_FALLBACK, ENV_API_TIMEOUT, ENV_DEBUG,
        ENV_MODE,
    },
    diagnostics::{
        DEFAULT_BACKEND_URL, DEFAULT_FRONTEND_URL, Diagnostics, ProbeOutcome, Verdict,
        deployment_scenarios,
    },
    search,
};

use crate::render::{self, Style};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherdash", version, about = "Weather dashboard with AI next-hour predictions")]
pub struct Cli {
    /// Verbose logging (same as WEATHERDASH_DEBUG=true).
    #[arg(long, global = true)]
    pub debug: bool,

    /// Override the backend base URL for this run.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show current weather, next-hour prediction and a 7-day outlook.
    Show {
        /// City name, e.g. "Mumbai".
        city: String,

        /// Print the report as JSON instead of panels.
        #[arg(long)]
        json: bool,
    },

    /// Suggest city names; without a query, list popular cities.
    Search { query: Option<String> },

    /// Pick cities with autocomplete and show their weather until you quit.
    Interactive,

    /// Store backend settings in the config file.
    Configure,

    /// Print the resolved configuration and any warnings.
    Config,

    /// Probe a deployed backend for connectivity and CORS problems.
    Diagnose {
        #[arg(long, default_value = DEFAULT_BACKEND_URL)]
        backend: String,

        /// Origin sent with the CORS preflight.
        #[arg(long, default_value = DEFAULT_FRONTEND_URL)]
        frontend: String,
    },
}

impl Cli {
    pub async fn run(self, mut config: Config) -> anyhow::Result<()> {
        if let Some(url) = self.api_url {
            config.api_base_url = Some(url);
        }
        config.debug |= self.debug;
        tracing::debug!(?config, "resolved configuration");

        match self.command {
            Command::Show { city, json } => show(&config, &city, json).await,
            Command::Search { query } => {
                search_cities(query.as_deref());
                Ok(())
            }
            Command::Interactive => interactive(&config).await,
            Command::Configure => configure(),
            Command::Config => {
                print_config(&config);
                Ok(())
            }
            Command::Diagnose { backend, frontend } => {
                diagnose(&backend, &frontend, config.timeout).await
            }
        }
    }
}

fn style() -> Style {
    Style { color: std::io::stdout().is_terminal() }
}

async fn show(config: &Config, city: &str, json: bool) -> anyhow::Result<()> {
    config.validate();
    let dashboard = Dashboard::from_config(config.clone())?;

    let progress = report_progress(dashboard.subscribe());
    let result = dashboard.fetch_weather(city).await;
    finish_progress(progress).await;

    let report = result.map_err(|e| anyhow!(e))?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        );
    } else {
        println!("{}", render::report(&style(), &report, Local::now(), &mut rand::rng()));
    }

    Ok(())
}

/// Print a loading line while the dashboard is fetching; stops at the first
/// settled state.
fn report_progress(mut rx: watch::Receiver<FetchState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            match state {
                FetchState::Loading { city, .. } => eprintln!("⏳ Fetching weather for {city}..."),
                _ => break,
            }
        }
    })
}

async fn finish_progress(progress: JoinHandle<()>) {
    if let Err(err) = progress.await {
        tracing::debug!(error = %err, "progress reporter ended abnormally");
    }
}

fn search_cities(query: Option<&str>) {
    match query {
        Some(q) => {
            let hits = search::suggest(q);
            if hits.is_empty() {
                println!("No matching cities for \"{}\".", q.trim());
            }
            for city in hits {
                println!("{city}");
            }
        }
        None => {
            println!("Popular cities:");
            for city in search::POPULAR_CITIES {
                println!("  {city}");
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
struct CitySuggester;

impl Autocomplete for CitySuggester {
    fn get_suggestions(&mut self, input: &str) -> Result<Vec<String>, CustomUserError> {
        Ok(search::suggest(input).into_iter().map(str::to_string).collect())
    }

    fn get_completion(
        &mut self,
        _input: &str,
        highlighted_suggestion: Option<String>,
    ) -> Result<Replacement, CustomUserError> {
        Ok(highlighted_suggestion)
    }
}

const QUIT_WORDS: [&str; 3] = ["q", "quit", "exit"];

#[derive(Debug, PartialEq, Eq)]
enum Prompted {
    Fetch(String),
    Invalid,
    Quit,
}

/// Empty input refreshes the last city; Esc or a quit word ends the session.
fn interpret(input: Option<&str>, last: &str) -> Prompted {
    let Some(typed) = input.map(str::trim) else {
        return Prompted::Quit;
    };

    if typed.is_empty() {
        return Prompted::Fetch(last.to_string());
    }
    if QUIT_WORDS.iter().any(|w| typed.eq_ignore_ascii_case(w)) {
        return Prompted::Quit;
    }

    match search::selection(None, typed) {
        Some(city) => Prompted::Fetch(city),
        None => Prompted::Invalid,
    }
}

async fn interactive(config: &Config) -> anyhow::Result<()> {
    config.validate();
    let dashboard = Dashboard::from_config(config.clone())?;
    let mut last = "Mumbai".to_string();
    let mut next = Some(last.clone());

    loop {
        if let Some(city) = next.take() {
            let progress = report_progress(dashboard.subscribe());
            let result = dashboard.fetch_weather(&city).await;
            finish_progress(progress).await;

            match result {
                Ok(report) => {
                    println!("{}", render::report(&style(), &report, Local::now(), &mut rand::rng()));
                    last = city;
                }
                Err(err) if err.is_input_error() => eprintln!("✏️  {err}"),
                Err(err) => eprintln!("❌ {err} (press Enter to try again)"),
            }
        }

        let input = Text::new("City (Enter to refresh, q to quit):")
            .with_autocomplete(CitySuggester)
            .with_placeholder(&last)
            .prompt_skippable()
            .context("Failed to read city")?;

        match interpret(input.as_deref(), &last) {
            Prompted::Fetch(city) => next = Some(city),
            Prompted::Invalid => {
                eprintln!("Please enter a valid city name (at least 2 characters)")
            }
            Prompted::Quit => return Ok(()),
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut stored = StoredConfig::load()?;

    let url = Text::new("Backend API base URL:")
        .with_default(stored.api_base_url.as_deref().unwrap_or(DEFAULT_BACKEND_URL))
        .prompt()
        .context("Failed to read API base URL")?;
    stored.api_base_url = Some(url.trim().to_string()).filter(|u| !u.is_empty());

    let fallback = Text::new("Fallback API base URL (optional):")
        .with_default(stored.api_base_url_fallback.as_deref().unwrap_or(""))
        .prompt()
        .context("Failed to read fallback URL")?;
    stored.api_base_url_fallback = Some(fallback.trim().to_string()).filter(|u| !u.is_empty());

    let timeout = Text::new("Request timeout (ms):")
        .with_default(&stored.timeout_ms.unwrap_or(weatherdash_core::config::DEFAULT_TIMEOUT_MS).to_string())
        .prompt()
        .context("Failed to read timeout")?;
    stored.timeout_ms = Some(
        timeout
            .trim()
            .parse()
            .with_context(|| format!("Invalid timeout: {timeout}"))?,
    );

    stored.debug = Some(
        Confirm::new("Enable debug logging?")
            .with_default(stored.debug.unwrap_or(false))
            .prompt()
            .context("Failed to read debug flag")?,
    );

    let path = stored.save()?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

fn print_config(config: &Config) {
    println!("🔧 Configuration");
    println!("- API Base URL: {}", config.resolve_base_url());
    println!("- Environment: {}", config.mode);
    println!("- Debug Mode: {}", config.debug);
    println!("- Analytics: {}", config.analytics);
    println!("- Timeout: {} ms", config.timeout.as_millis());
    match StoredConfig::config_file_path() {
        Ok(path) => println!("- Config file: {}", path.display()),
        Err(err) => println!("- Config file: unavailable ({err})"),
    }

    println!("Environment variables:");
    for key in [
        ENV_API_BASE_URL,
        ENV_API_BASE_URL_FALLBACK,
        ENV_API_TIMEOUT,
        ENV_DEBUG,
        ENV_ANALYTICS,
        ENV_MODE,
    ] {
        let value = std::env::var(key).unwrap_or_else(|_| "not set".to_string());
        println!("- {key}: {value}");
    }

    for warning in config.validate() {
        println!("⚠️  WARNING: {warning}");
    }
}

async fn diagnose(backend: &str, frontend: &str, timeout: Duration) -> anyhow::Result<()> {
    println!("🔍 Testing backend {backend}\n");

    let report = Diagnostics::new(backend, frontend, timeout)?.run().await;

    for (i, probe) in report.probes.iter().enumerate() {
        print_probe(i + 1, probe);
    }

    if report.all_passed() {
        println!("✅ Backend is fully functional!");
    } else {
        println!("❌ Some checks failed.");
        println!("🔍 Troubleshooting:");
        println!("   - Check that the backend service is running");
        println!("   - Verify the backend URL is correct");
        println!("   - Free-tier hosts may be sleeping; retry in a minute");
        if report.probe("cors").is_some_and(|p| !p.passed()) {
            println!("   - Allow the frontend origin on the backend: FRONTEND_URL={frontend}");
        }
    }

    println!("\n🔧 Configuration scenarios");
    for scenario in deployment_scenarios(backend) {
        println!("   {}", scenario.name);
        for (key, value) in &scenario.vars {
            println!("     {key}={value}");
        }
        println!("     Resulting API Base URL: {}", scenario.base_url);
        match scenario.verdict {
            Verdict::Correct => println!("     ✅ CORRECT: using the production backend"),
            Verdict::LocalhostInProduction => println!("     ❌ PROBLEM: using localhost in production"),
            Verdict::Unexpected => println!("     ⚠️  WARNING: unexpected configuration"),
        }
    }

    Ok(())
}

fn print_probe(n: usize, probe: &ProbeOutcome) {
    println!("{n}. {} {} ({})", probe.method, probe.url, probe.name);

    match &probe.result {
        Ok(res) => {
            let mark = if probe.passed() { "✅" } else { "❌" };
            println!("   {mark} Status: {}", res.status);
            for (key, value) in &res.cors_headers {
                println!("     {key}: {value}");
            }
            if !res.excerpt.is_empty() {
                println!("   📄 {}", res.excerpt.replace('\n', "\n      "));
            }
        }
        Err(err) => println!("   ❌ Error: {err}"),
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_show_with_global_flags() {
        let cli = Cli::try_parse_from(["weatherdash", "show", "Mumbai", "--debug", "--json"])
            .expect("should parse");

        assert!(cli.debug);
        assert!(matches!(cli.command, Command::Show { ref city, json: true } if city == "Mumbai"));
    }

    #[test]
    fn diagnose_defaults_to_deployed_urls() {
        let cli = Cli::try_parse_from(["weatherdash", "diagnose"]).expect("should parse");

        match cli.command {
            Command::Diagnose { backend, frontend } => {
                assert_eq!(backend, DEFAULT_BACKEND_URL);
                assert_eq!(frontend, DEFAULT_FRONTEND_URL);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn api_url_override() {
        let cli = Cli::try_parse_from(["weatherdash", "--api-url", "http://x:9", "config"])
            .expect("should parse");
        assert_eq!(cli.api_url.as_deref(), Some("http://x:9"));
    }

    #[test]
    fn enter_refreshes_last_city() {
        assert_eq!(interpret(Some(""), "Mumbai"), Prompted::Fetch("Mumbai".into()));
        assert_eq!(interpret(Some("   "), "Pune"), Prompted::Fetch("Pune".into()));
    }

    #[test]
    fn typed_city_quit_and_invalid() {
        assert_eq!(interpret(Some(" Delhi "), "Mumbai"), Prompted::Fetch("Delhi".into()));
        assert_eq!(interpret(Some("Q"), "Mumbai"), Prompted::Quit);
        assert_eq!(interpret(Some("exit"), "Mumbai"), Prompted::Quit);
        assert_eq!(interpret(None, "Mumbai"), Prompted::Quit);
        assert_eq!(interpret(Some("x"), "Mumbai"), Prompted::Invalid);
    }

    #[tokio::test]
    async fn panicked_progress_task_is_absorbed() {
        let handle: JoinHandle<()> = tokio::spawn(async { panic!("reporter crashed") });
        finish_progress(handle).await;
    }

    #[tokio::test]
    async fn progress_stops_when_fetch_settles() {
        let (tx, rx) = watch::channel(FetchState::Idle);
        let handle = report_progress(rx);

        tx.send_replace(FetchState::Loading { city: "Pune".into(), generation: 1 });
        tx.send_replace(FetchState::Idle);

        tokio::time::timeout(Duration::from_secs(1), finish_progress(handle))
            .await
            .expect("reporter should stop once the state settles");
    }

    #[test]
    fn suggester_completes_with_highlight() {
        let mut s = CitySuggester;

        assert_eq!(s.get_suggestions("pun").unwrap(), vec!["Pune".to_string()]);
        assert_eq!(
            s.get_completion("pun", Some("Pune".into())).unwrap(),
            Some("Pune".to_string())
        );
    }
}
