//! Server configuration

use anyhow::{Result, bail};

/// Server configuration, loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database path
    pub database_path: String,
    /// HTTP port
    pub http_port: u16,
    /// JWT secret for bearer authentication
    pub jwt_secret: String,
    /// Default currency code for order pricing
    pub currency: String,
    /// Environment: development | staging | production
    pub environment: String,
}

impl Config {
    /// Require a secret env var: must be set and non-empty outside development.
    fn require_secret(name: &str, environment: &str) -> Result<String> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    bail!("{name} must be set in {environment} environment");
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            bail!("{name} must not be empty in {environment} environment");
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "cargodesk.db".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            currency: std::env::var("CURRENCY").unwrap_or_else(|_| "RUB".into()),
            environment,
        })
    }
}
