//! Configuration loading from TOML files

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use scholarview_client::{CONNECT_TIMEOUT, DEFAULT_BASE_URL, DEFAULT_RETRY_DELAY, ReadinessPolicy};

/// Global configuration for scholarview
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub http: HttpConfig,
    pub readiness: ReadinessConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// API root, e.g. `http://localhost:3001/api`
    #[serde(deserialize_with = "deserialize_env_var")]
    pub base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Connect timeout in seconds
    pub connect_timeout: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: CONNECT_TIMEOUT.as_secs(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ReadinessConfig {
    pub retry_delay_ms: u64,
    /// Unset: keep polling until interrupted
    pub max_attempts: Option<u32>,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            retry_delay_ms: DEFAULT_RETRY_DELAY.as_millis() as u64,
            max_attempts: None,
        }
    }
}

/// Floor for the readiness delay; 0 would poll the backend in a tight loop
pub const MIN_RETRY_DELAY_MS: u64 = 100;

/// Readiness delay from a millisecond setting, raised to [`MIN_RETRY_DELAY_MS`].
pub fn retry_delay(ms: u64) -> Duration {
    if ms < MIN_RETRY_DELAY_MS {
        log::warn!("retry_delay_ms = {ms} is too low, using {MIN_RETRY_DELAY_MS}");
    }
    Duration::from_millis(ms.max(MIN_RETRY_DELAY_MS))
}

impl ReadinessConfig {
    pub fn policy(&self) -> ReadinessPolicy {
        ReadinessPolicy {
            retry_delay: retry_delay(self.retry_delay_ms),
            max_attempts: self.max_attempts,
        }
    }
}

/// Deserialize a string that may be an environment variable reference like ${VAR}
fn deserialize_env_var<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    expand_env_var(&s).ok_or_else(|| {
        serde::de::Error::custom(format!("environment variable in {s} is not set"))
    })
}

/// Expand ${VAR} to environment variable value
fn expand_env_var(s: &str) -> Option<String> {
    if let Some(var_name) = s.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        std::env::var(var_name).ok()
    } else {
        Some(s.to_string())
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./scholarview.toml (current directory)
    /// 2. ~/.config/scholarview/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("scholarview.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "scholarview") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.http.connect_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.server.base_url, "http://localhost:3001/api");
        assert_eq!(config.http.connect_timeout, 30);
        assert_eq!(config.readiness.retry_delay_ms, 1000);
        assert_eq!(config.readiness.max_attempts, None);
        assert_eq!(config.readiness.policy(), ReadinessPolicy::default());
    }

    #[test]
    fn expand_env_var_simple() {
        std::env::set_var("SCHOLARVIEW_TEST_URL", "http://backend:9000/api");
        assert_eq!(
            expand_env_var("${SCHOLARVIEW_TEST_URL}"),
            Some("http://backend:9000/api".to_string())
        );
        std::env::remove_var("SCHOLARVIEW_TEST_URL");
    }

    #[test]
    fn expand_env_var_literal() {
        assert_eq!(expand_env_var("literal"), Some("literal".to_string()));
    }

    #[test]
    fn expand_env_var_missing() {
        assert_eq!(expand_env_var("${NONEXISTENT_VAR_12345}"), None);
    }

    #[test]
    fn parse_config_toml() {
        let toml = r#"
[server]
base_url = "http://scholar.internal:8080/api"

[readiness]
retry_delay_ms = 250
max_attempts = 40
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.base_url, "http://scholar.internal:8080/api");
        assert_eq!(config.http.connect_timeout, 30);
        let policy = config.readiness.policy();
        assert_eq!(policy.retry_delay, Duration::from_millis(250));
        assert_eq!(policy.max_attempts, Some(40));
    }

    #[test]
    fn zero_retry_delay_is_raised() {
        let config: Config = toml::from_str("[readiness]\nretry_delay_ms = 0").unwrap();
        assert_eq!(
            config.readiness.policy().retry_delay,
            Duration::from_millis(MIN_RETRY_DELAY_MS)
        );
        assert_eq!(retry_delay(250), Duration::from_millis(250));
    }

    #[test]
    fn missing_env_var_is_parse_error() {
        let toml = r#"
[server]
base_url = "${NONEXISTENT_VAR_12345}"
"#;
        assert!(toml::from_str::<Config>(toml).is_err());
    }

    #[test]
    fn from_file_reads_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[http]\nconnect_timeout = 5").unwrap();
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn from_file_missing_is_error() {
        let err = Config::from_file(Path::new("/nonexistent/scholarview.toml")).unwrap_err();
        assert!(format!("{err}").contains("Failed to read config file"));
    }
}
