//! Configuration management for the lending server

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// "pretty" or "json"
    pub format: String,
    /// When set, logs are also written to a daily rolling file in this directory
    pub directory: Option<String>,
}

/// How borrower credentials are sealed and compared
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CredentialScheme {
    #[default]
    Plaintext,
    Argon2,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AuthConfig {
    pub credential_scheme: CredentialScheme,
}

/// Fixed administrator identity, never stored in the borrower directory
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,
}

/// What to do when a return would push availability above the total copy count
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OverReturnPolicy {
    /// Cap availability at the total and log a warning
    #[default]
    Clamp,
    /// Refuse the return
    Reject,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LendingConfig {
    pub default_loan_days: u32,
    pub require_registered_borrower: bool,
    pub over_return_policy: OverReturnPolicy,
    pub seed_sample_catalog: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub lending: LendingConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Environment variables, e.g. LENDING_LENDING__DEFAULT_LOAN_DAYS=21
            .add_source(
                Environment::with_prefix("LENDING")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("admin.password", env::var("ADMIN_PASSWORD").ok())?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            directory: None,
        }
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "adminpassword".to_string(),
        }
    }
}

impl Default for LendingConfig {
    fn default() -> Self {
        Self {
            default_loan_days: 14,
            require_registered_borrower: true,
            over_return_policy: OverReturnPolicy::Clamp,
            seed_sample_catalog: true,
        }
    }
}
