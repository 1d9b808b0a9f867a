//! # configs
//!
//! Environment-driven configuration. Variables use the `BRINGALONG_` prefix
//! with `__` separating nested sections, e.g. `BRINGALONG_SMTP__HOST`.
//! A local `.env` file is honored when present.

use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Postgres DSN.
    pub database_url: SecretString,
    /// Public base URL used to build links in outgoing mail.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub smtp: SmtpSettings,
    #[serde(default)]
    pub worker: WorkerSettings,
    #[serde(default)]
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpSettings {
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    /// Default sender address.
    pub from: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkerSettings {
    /// Seconds between background job cycles.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Which jobs this worker runs: "notifier", "archiver" or "all".
    #[serde(default = "default_jobs")]
    pub jobs: String,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        WorkerSettings {
            interval_secs: default_interval_secs(),
            jobs: default_jobs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// "json" or "text".
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        LogSettings {
            format: default_log_format(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_interval_secs() -> u64 {
    600
}

fn default_jobs() -> String {
    "all".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl AppConfig {
    /// Loads configuration from the environment, reading `.env` first when
    /// one exists next to the binary. Runs before any tracing subscriber is
    /// installed, so it emits no log events itself.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let settings = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("BRINGALONG")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}
