use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::workflows::factoring::pricing::{DEFAULT_BASE_RATE, DEFAULT_TENOR_DAYS};

const DEFAULT_ORACLE_TIMEOUT_MS: u64 = 10_000;

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

/// Top-level configuration for the factoring service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub workflow: WorkflowConfig,
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

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            workflow: WorkflowConfig::from_env()?,
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

/// Policy dials for a workflow run.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowConfig {
    /// Upper bound on a single oracle call before the run fails.
    pub oracle_timeout: Duration,
    pub default_tenor_days: u32,
    pub base_rate: f64,
    /// Price with the oracle's clamped recommendation instead of `base_rate`.
    pub use_oracle_rate: bool,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            oracle_timeout: Duration::from_millis(DEFAULT_ORACLE_TIMEOUT_MS),
            default_tenor_days: DEFAULT_TENOR_DAYS,
            base_rate: DEFAULT_BASE_RATE,
            use_oracle_rate: false,
        }
    }
}

impl WorkflowConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let oracle_timeout = match env::var("ORACLE_TIMEOUT_MS") {
            Ok(raw) => match raw.trim().parse::<u64>() {
                Ok(millis) if millis > 0 => Duration::from_millis(millis),
                _ => return Err(ConfigError::InvalidOracleTimeout),
            },
            Err(_) => defaults.oracle_timeout,
        };

        let default_tenor_days = match env::var("WORKFLOW_TENOR_DAYS") {
            Ok(raw) => match raw.trim().parse::<u32>() {
                Ok(days) if days > 0 => days,
                _ => return Err(ConfigError::InvalidTenor),
            },
            Err(_) => defaults.default_tenor_days,
        };

        let base_rate = match env::var("PRICING_BASE_RATE") {
            Ok(raw) => match raw.trim().parse::<f64>() {
                Ok(rate) if rate.is_finite() && rate >= 0.0 => rate,
                _ => return Err(ConfigError::InvalidBaseRate),
            },
            Err(_) => defaults.base_rate,
        };

        let use_oracle_rate = match env::var("WORKFLOW_USE_ORACLE_RATE") {
            Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" | "" => false,
                _ => return Err(ConfigError::InvalidFlag("WORKFLOW_USE_ORACLE_RATE")),
            },
            Err(_) => defaults.use_oracle_rate,
        };

        Ok(Self {
            oracle_timeout,
            default_tenor_days,
            base_rate,
            use_oracle_rate,
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidOracleTimeout,
    InvalidTenor,
    InvalidBaseRate,
    InvalidFlag(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidOracleTimeout => {
                write!(f, "ORACLE_TIMEOUT_MS must be a positive number of milliseconds")
            }
            ConfigError::InvalidTenor => {
                write!(f, "WORKFLOW_TENOR_DAYS must be a positive number of days")
            }
            ConfigError::InvalidBaseRate => {
                write!(f, "PRICING_BASE_RATE must be a finite, non-negative percentage")
            }
            ConfigError::InvalidFlag(name) => write!(f, "{name} must be true or false"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
