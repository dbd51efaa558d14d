use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fmt, fs, path::PathBuf, time::Duration};

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

pub const ENV_API_BASE_URL: &str = "WEATHERDASH_API_BASE_URL";
pub const ENV_API_BASE_URL_FALLBACK: &str = "WEATHERDASH_API_BASE_URL_FALLBACK";
pub const ENV_API_TIMEOUT: &str = "WEATHERDASH_API_TIMEOUT";
pub const ENV_DEBUG: &str = "WEATHERDASH_DEBUG";
pub const ENV_ANALYTICS: &str = "WEATHERDASH_ANALYTICS";
pub const ENV_MODE: &str = "WEATHERDASH_ENV";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Development,
    Production,
}

impl Mode {
    /// Anything but "production" is development.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("production") {
            Mode::Production
        } else {
            Mode::Development
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Development => "Development",
            Mode::Production => "Production",
        })
    }
}

/// Settings persisted by `weatherdash configure`.
///
/// Example TOML:
/// api_base_url = "https://weather.example.com"
/// timeout_ms = 8000
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredConfig {
    pub api_base_url: Option<String>,
    pub api_base_url_fallback: Option<String>,
    pub timeout_ms: Option<u64>,
    pub debug: Option<bool>,
}

impl StoredConfig {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(path)
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weatherdash", "weatherdash")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Primary backend URL, if configured.
    pub api_base_url: Option<String>,
    pub api_base_url_fallback: Option<String>,
    pub timeout: Duration,
    pub debug: bool,
    pub analytics: bool,
    pub mode: Mode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: None,
            api_base_url_fallback: None,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            debug: false,
            analytics: false,
            mode: Mode::Development,
        }
    }
}

impl Config {
    /// Stored settings overlaid with the process environment.
    pub fn load() -> Result<Self> {
        let stored = StoredConfig::load()?;
        Ok(Self::layered(&stored, |key| std::env::var(key).ok()))
    }

    /// Build from stored settings, letting `lookup` (usually the environment) win.
    /// Empty values count as unset.
    pub fn layered(stored: &StoredConfig, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let non_empty = |v: &Option<String>| v.clone().filter(|v| !v.trim().is_empty());

        let timeout_ms = match var(ENV_API_TIMEOUT) {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "ignoring unparsable {ENV_API_TIMEOUT}");
                DEFAULT_TIMEOUT_MS
            }),
            None => stored.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS),
        };

        Self {
            api_base_url: var(ENV_API_BASE_URL).or_else(|| non_empty(&stored.api_base_url)),
            api_base_url_fallback: var(ENV_API_BASE_URL_FALLBACK)
                .or_else(|| non_empty(&stored.api_base_url_fallback)),
            timeout: Duration::from_millis(timeout_ms),
            debug: var(ENV_DEBUG)
                .map(|v| v == "true")
                .or(stored.debug)
                .unwrap_or(false),
            analytics: var(ENV_ANALYTICS).is_some_and(|v| v == "true"),
            mode: var(ENV_MODE).map(|v| Mode::parse(&v)).unwrap_or_default(),
        }
    }

    /// Shortcut for a fixed backend, mostly for tests and `--backend` flags.
    pub fn with_base_url(url: impl Into<String>) -> Self {
        Self { api_base_url: Some(url.into()), ..Self::default() }
    }

    /// Primary URL, then fallback, then the local default; one trailing slash removed.
    pub fn resolve_base_url(&self) -> String {
        let base = self
            .api_base_url
            .as_deref()
            .or(self.api_base_url_fallback.as_deref())
            .unwrap_or(DEFAULT_BASE_URL);

        base.strip_suffix('/').unwrap_or(base).to_string()
    }

    /// `endpoint` appended to the base URL, with exactly the leading slash it needs.
    /// The result is not validated.
    pub fn build_url(&self, endpoint: &str) -> String {
        let base = self.resolve_base_url();
        let url = if endpoint.starts_with('/') {
            format!("{base}{endpoint}")
        } else {
            format!("{base}/{endpoint}")
        };

        if self.verbose() {
            tracing::debug!(%url, %base, endpoint, "built API URL");
        }

        url
    }

    pub fn verbose(&self) -> bool {
        self.mode == Mode::Development || self.debug
    }

    /// Common misconfigurations. Each one is also logged as a warning.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.mode == Mode::Production {
            let base = self.resolve_base_url();
            if base.contains("localhost") {
                warnings.push(ConfigWarning::LocalhostInProduction { url: base });
            }
            if self.api_base_url.is_none() {
                warnings.push(ConfigWarning::PrimaryUrlUnset);
            }
        }

        for warning in &warnings {
            tracing::warn!("{warning}");
        }

        warnings
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    LocalhostInProduction { url: String },
    PrimaryUrlUnset,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::LocalhostInProduction { url } => {
                write!(f, "Using localhost URL in production environment ({url})")
            }
            ConfigWarning::PrimaryUrlUnset => {
                write!(f, "{ENV_API_BASE_URL} not set in production")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    fn from_env(pairs: &[(&str, &str)]) -> Config {
        Config::layered(&StoredConfig::default(), env(pairs))
    }

    #[test]
    fn base_url_priority() {
        let cfg = from_env(&[
            (ENV_API_BASE_URL, "https://primary.example.com"),
            (ENV_API_BASE_URL_FALLBACK, "https://fallback.example.com"),
        ]);
        assert_eq!(cfg.resolve_base_url(), "https://primary.example.com");

        let cfg = from_env(&[(ENV_API_BASE_URL_FALLBACK, "https://fallback.example.com")]);
        assert_eq!(cfg.resolve_base_url(), "https://fallback.example.com");

        let cfg = from_env(&[]);
        assert_eq!(cfg.resolve_base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn empty_variables_count_as_unset() {
        let cfg = from_env(&[(ENV_API_BASE_URL, ""), (ENV_API_BASE_URL_FALLBACK, "http://x:1")]);
        assert_eq!(cfg.resolve_base_url(), "http://x:1");
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let cfg = Config::with_base_url("https://api.example.com/");
        assert_eq!(cfg.resolve_base_url(), "https://api.example.com");
    }

    #[test]
    fn build_url_normalizes_leading_slash() {
        let cfg = Config::with_base_url("https://api.example.com/");

        assert_eq!(cfg.build_url("/predict"), "https://api.example.com/predict");
        assert_eq!(cfg.build_url("predict"), "https://api.example.com/predict");
    }

    #[test]
    fn build_url_does_not_validate() {
        let cfg = Config::with_base_url("not a url");
        assert_eq!(cfg.build_url("health"), "not a url/health");
    }

    #[test]
    fn timeout_flags_and_mode() {
        let cfg = from_env(&[
            (ENV_API_TIMEOUT, "2500"),
            (ENV_DEBUG, "true"),
            (ENV_ANALYTICS, "yes"),
            (ENV_MODE, "production"),
        ]);

        assert_eq!(cfg.timeout, Duration::from_millis(2500));
        assert!(cfg.debug);
        assert!(!cfg.analytics);
        assert_eq!(cfg.mode, Mode::Production);
    }

    #[test]
    fn unparsable_timeout_uses_default() {
        let cfg = from_env(&[(ENV_API_TIMEOUT, "soon")]);
        assert_eq!(cfg.timeout, Duration::from_millis(DEFAULT_TIMEOUT_MS));
    }

    #[test]
    fn environment_overrides_stored_settings() {
        let stored = StoredConfig {
            api_base_url: Some("https://stored.example.com".into()),
            api_base_url_fallback: None,
            timeout_ms: Some(3000),
            debug: Some(true),
        };

        let cfg = Config::layered(&stored, env(&[]));
        assert_eq!(cfg.resolve_base_url(), "https://stored.example.com");
        assert_eq!(cfg.timeout, Duration::from_millis(3000));
        assert!(cfg.debug);

        let cfg = Config::layered(
            &stored,
            env(&[(ENV_API_BASE_URL, "https://env.example.com"), (ENV_DEBUG, "false")]),
        );
        assert_eq!(cfg.resolve_base_url(), "https://env.example.com");
        assert!(!cfg.debug);
    }

    #[test]
    fn production_without_primary_url_warns_twice() {
        let warnings = from_env(&[(ENV_MODE, "production")]).validate();

        assert_eq!(warnings.len(), 2);
        assert!(matches!(warnings[0], ConfigWarning::LocalhostInProduction { .. }));
        assert_eq!(warnings[1], ConfigWarning::PrimaryUrlUnset);
    }

    #[test]
    fn production_with_fallback_only_warns_about_primary() {
        let warnings = from_env(&[
            (ENV_MODE, "production"),
            (ENV_API_BASE_URL_FALLBACK, "https://fallback.example.com"),
        ])
        .validate();

        assert_eq!(warnings, vec![ConfigWarning::PrimaryUrlUnset]);
    }

    #[test]
    fn development_never_warns() {
        assert!(from_env(&[]).validate().is_empty());
        assert!(
            from_env(&[(ENV_API_BASE_URL, "https://api.example.com"), (ENV_MODE, "production")])
                .validate()
                .is_empty()
        );
    }

    #[test]
    fn stored_config_toml_roundtrip() {
        let stored = StoredConfig {
            api_base_url: Some("https://api.example.com".into()),
            timeout_ms: Some(8000),
            ..StoredConfig::default()
        };

        let text = toml::to_string_pretty(&stored).unwrap();
        let parsed: StoredConfig = toml::from_str(&text).unwrap();

        assert_eq!(parsed, stored);
    }
}
