use std::env;
use std::net::{IpAddr, SocketAddr};

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

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub screening: ScreeningConfig,
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

        let screening = match env::var("APP_MIN_MATCH_SCORE") {
            Ok(raw) => ScreeningConfig::from_raw(&raw)?,
            Err(_) => ScreeningConfig::default(),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            screening,
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

/// How strict a screening pass is when flagging a property as a fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreeningConfig {
    /// Score a comparison needs to qualify. 100 demands every evaluated criterion pass.
    pub minimum_match_score: f64,
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self {
            minimum_match_score: 100.0,
        }
    }
}

impl ScreeningConfig {
    /// Parse a qualifying score; anything outside 0..=100, NaN included, is rejected.
    pub fn from_raw(raw: &str) -> Result<Self, ConfigError> {
        let score = raw
            .trim()
            .parse::<f64>()
            .map_err(|_| ConfigError::InvalidMatchScore(raw.to_string()))?;
        if !(0.0..=100.0).contains(&score) {
            return Err(ConfigError::InvalidMatchScore(raw.to_string()));
        }
        Ok(Self {
            minimum_match_score: score,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("APP_PORT must be a valid u16")]
    InvalidPort,
    #[error("APP_HOST must parse to an IPv4 or IPv6 address")]
    InvalidHost {
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("APP_MIN_MATCH_SCORE must be a number between 0 and 100 (got '{0}')")]
    InvalidMatchScore(String),
}
