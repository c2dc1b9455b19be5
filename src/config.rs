//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

/// Development default values - NEVER use in production.
pub mod defaults {
    pub const DEV_API_BASE_URL: &str = "http://localhost:8000/api";
    pub const DEV_SESSION_FILE: &str = ".adrd-session";
    pub const DEV_SETTLE_REFRESH_MS: u64 = 1500;
}

/// Runtime environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Parse environment from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Some(Self::Development),
            "production" | "prod" => Some(Self::Production),
            _ => None,
        }
    }

    /// Check if this is a development environment.
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// Check if this is a production environment.
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Runtime environment
    pub environment: Environment,
    /// Base URL of the catalog API, without trailing slash
    pub api_base_url: String,
    /// File persisting the client-local session state
    pub session_file: PathBuf,
    /// Pause before the post-submit follow-up refresh, in milliseconds
    pub settle_refresh_ms: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In development mode (RUST_ENV=development) all variables have
    /// sensible defaults; only RUST_ENV is required. In production mode the
    /// API base URL must be set and must not match the development default.
    ///
    /// Environment variables:
    /// - `RUST_ENV`: Environment (development/production) - REQUIRED
    /// - `ADRD_API_BASE_URL`: Catalog API base URL (default: http://localhost:8000/api)
    /// - `ADRD_SESSION_FILE`: Session state file (default: .adrd-session)
    /// - `ADRD_SETTLE_REFRESH_MS`: Post-submit follow-up refresh delay in ms (default: 1500)
    pub fn from_env() -> Result<Self, ConfigError> {
        // Parse environment - required
        let env_str = env::var("RUST_ENV").map_err(|_| ConfigError::MissingEnvVar("RUST_ENV"))?;

        let environment = Environment::parse(&env_str).ok_or(ConfigError::InvalidValue(
            "RUST_ENV must be 'development' or 'production'",
        ))?;

        let api_base_url = env::var("ADRD_API_BASE_URL")
            .unwrap_or_else(|_| defaults::DEV_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let session_file = env::var("ADRD_SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(defaults::DEV_SESSION_FILE));

        let settle_refresh_ms = env::var("ADRD_SETTLE_REFRESH_MS")
            .unwrap_or_else(|_| defaults::DEV_SETTLE_REFRESH_MS.to_string())
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::InvalidValue("ADRD_SETTLE_REFRESH_MS must be a valid number")
            })?;

        let config = Config {
            environment,
            api_base_url,
            session_file,
            settle_refresh_ms,
        };

        // Validate production configuration
        if environment.is_production() {
            config.validate_production()?;
        }

        Ok(config)
    }

    /// Validate that production configuration does not use development defaults.
    fn validate_production(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.api_base_url == defaults::DEV_API_BASE_URL {
            errors.push(format!(
                "ADRD_API_BASE_URL is using development default '{}'. Set the production catalog API URL.",
                defaults::DEV_API_BASE_URL
            ));
        }

        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            errors.push(format!(
                "ADRD_API_BASE_URL '{}' is not an http(s) URL.",
                self.api_base_url
            ));
        }

        if !errors.is_empty() {
            return Err(ConfigError::ProductionValidation(errors));
        }

        Ok(())
    }

    /// Check if running in development mode.
    pub fn is_development(&self) -> bool {
        self.environment.is_development()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(&'static str),

    #[error("Production configuration validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    ProductionValidation(Vec<String>),
}
