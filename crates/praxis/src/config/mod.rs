use crate::scoring::{Strategy, UnknownStrategy};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the assistant and its HTTP surface.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub model: ModelConfig,
    pub strategy: Strategy,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let strategy = match non_empty_var("PRAXIS_STRATEGY") {
            Some(value) => value
                .parse::<Strategy>()
                .map_err(|source| ConfigError::InvalidStrategy { source })?,
            None => Strategy::default(),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            model: ModelConfig::from_env()?,
            strategy,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Chat-completions deployment used by the assistant.
///
/// Without an endpoint every model call fails fast and the assistant answers
/// with its fallback text.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub endpoint: Option<String>,
    pub deployment: String,
    pub api_key: Option<String>,
    pub api_version: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            deployment: "gpt-4.1-nano".to_string(),
            api_key: None,
            api_version: "2025-01-01-preview".to_string(),
            temperature: 0.7,
            max_tokens: 1500,
            timeout_secs: 30,
        }
    }
}

impl ModelConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let temperature = match non_empty_var("MODEL_TEMPERATURE") {
            Some(value) => value
                .parse::<f32>()
                .ok()
                .filter(|t| t.is_finite() && (0.0..=2.0).contains(t))
                .ok_or(ConfigError::InvalidTemperature)?,
            None => defaults.temperature,
        };
        let max_tokens = match non_empty_var("MODEL_MAX_TOKENS") {
            Some(value) => value
                .parse::<u32>()
                .map_err(|_| ConfigError::InvalidMaxTokens)?,
            None => defaults.max_tokens,
        };
        let timeout_secs = match non_empty_var("MODEL_TIMEOUT_SECS") {
            Some(value) => value
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidTimeout)?,
            None => defaults.timeout_secs,
        };

        Ok(Self {
            endpoint: non_empty_var("MODEL_ENDPOINT"),
            deployment: non_empty_var("MODEL_DEPLOYMENT").unwrap_or(defaults.deployment),
            api_key: non_empty_var("MODEL_API_KEY"),
            api_version: non_empty_var("MODEL_API_VERSION").unwrap_or(defaults.api_version),
            temperature,
            max_tokens,
            timeout_secs,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidStrategy { source: UnknownStrategy },
    InvalidTemperature,
    InvalidMaxTokens,
    InvalidTimeout,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidStrategy { source } => write!(f, "PRAXIS_STRATEGY: {source}"),
            ConfigError::InvalidTemperature => {
                write!(f, "MODEL_TEMPERATURE must be a number between 0 and 2")
            }
            ConfigError::InvalidMaxTokens => write!(f, "MODEL_MAX_TOKENS must be a valid u32"),
            ConfigError::InvalidTimeout => {
                write!(f, "MODEL_TIMEOUT_SECS must be a positive number of seconds")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidStrategy { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidTemperature
            | ConfigError::InvalidMaxTokens
            | ConfigError::InvalidTimeout => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "PRAXIS_STRATEGY",
            "MODEL_ENDPOINT",
            "MODEL_DEPLOYMENT",
            "MODEL_API_KEY",
            "MODEL_API_VERSION",
            "MODEL_TEMPERATURE",
            "MODEL_MAX_TOKENS",
            "MODEL_TIMEOUT_SECS",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.strategy, Strategy::Balanced);
        assert_eq!(config.model, ModelConfig::default());
        assert!(!config.model.is_configured());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn reads_strategy_and_model_settings() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("PRAXIS_STRATEGY", "carbon-reduction");
        env::set_var("MODEL_ENDPOINT", "https://example.openai.azure.com/");
        env::set_var("MODEL_TEMPERATURE", "0.2");
        env::set_var("MODEL_TIMEOUT_SECS", "5");

        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.strategy, Strategy::CarbonReduction);
        assert!(config.model.is_configured());
        assert_eq!(config.model.timeout(), Duration::from_secs(5));
        assert!((config.model.temperature - 0.2).abs() < f32::EPSILON);
        reset_env();
    }

    #[test]
    fn rejects_malformed_values() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("PRAXIS_STRATEGY", "fastest");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidStrategy { .. })
        ));

        reset_env();
        env::set_var("MODEL_TIMEOUT_SECS", "0");
        assert!(matches!(AppConfig::load(), Err(ConfigError::InvalidTimeout)));
        reset_env();
    }
}
