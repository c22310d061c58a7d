use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::domain::value_objects::thresholds::AlertThreshold;

/// Top-level application configuration loaded from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub probe: ProbeConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub smtp: SmtpConfig,
}

/// Sampling and alerting settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Checked when the file is parsed; an out-of-range value fails the load.
    #[serde(default)]
    pub cpu_alert_percent: AlertThreshold,
    #[serde(default = "default_sample_window")]
    pub sample_window_ms: u64,
    #[serde(default = "default_disk_path")]
    pub disk_path: String,
}

/// Where the log and the per-run artifacts live (tilde-expanded at point of use).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_log_path")]
    pub log_path: String,
    #[serde(default = "default_chart_path")]
    pub chart_path: String,
    #[serde(default = "default_report_path")]
    pub report_path: String,
}

/// Mail relay settings. Credentials come from the environment, never from here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    #[serde(default = "default_smtp_host")]
    pub host: String,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    #[serde(default = "default_smtp_timeout")]
    pub timeout_secs: u64,
}

// --- Defaults ---

const fn default_sample_window() -> u64 {
    1000
}

fn default_disk_path() -> String {
    "/".into()
}

fn default_log_path() -> String {
    "system_health_log.csv".into()
}

fn default_chart_path() -> String {
    "system_health_graph.png".into()
}

fn default_report_path() -> String {
    "system_health_report.pdf".into()
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".into()
}

const fn default_smtp_port() -> u16 {
    587
}

const fn default_smtp_timeout() -> u64 {
    30
}

// --- Default impls ---

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            cpu_alert_percent: AlertThreshold::default(),
            sample_window_ms: default_sample_window(),
            disk_path: default_disk_path(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            log_path: default_log_path(),
            chart_path: default_chart_path(),
            report_path: default_report_path(),
        }
    }
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: default_smtp_host(),
            port: default_smtp_port(),
            timeout_secs: default_smtp_timeout(),
        }
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

impl ProbeConfig {
    #[must_use]
    pub const fn threshold(&self) -> AlertThreshold {
        self.cpu_alert_percent
    }

    #[must_use]
    pub const fn sample_window(&self) -> Duration {
        Duration::from_millis(self.sample_window_ms)
    }

    #[must_use]
    pub fn disk_path(&self) -> PathBuf {
        expand(&self.disk_path)
    }
}

impl PathsConfig {
    #[must_use]
    pub fn log_path(&self) -> PathBuf {
        expand(&self.log_path)
    }

    #[must_use]
    pub fn chart_path(&self) -> PathBuf {
        expand(&self.chart_path)
    }

    #[must_use]
    pub fn report_path(&self) -> PathBuf {
        expand(&self.report_path)
    }
}

impl SmtpConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// --- AppConfig methods ---

impl AppConfig {
    /// Load config from default path or create default config file
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined,
    /// the file cannot be read, or the TOML content is invalid.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_or_create(&path)
    }

    /// Load from a specific path, or create a default config file if missing
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML content is invalid,
    /// or the default config file cannot be written.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from(path)
        } else {
            let config = Self::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Load from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML content is invalid,
    /// or a value is out of range.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).context("Failed to read config file")?;
        let config: Self = toml::from_str(&content).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to a specific path, creating parent directories if needed
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created,
    /// serialization fails, or the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error naming the first out-of-range setting.
    pub fn validate(&self) -> Result<()> {
        if self.smtp.host.trim().is_empty() {
            anyhow::bail!("[smtp] host must not be empty");
        }
        if self.smtp.timeout_secs == 0 {
            anyhow::bail!("[smtp] timeout_secs must be greater than 0");
        }
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(config_dir.join("healthprobe").join("config.toml"))
    }
}

// --- Mail credentials ---

pub const ENV_SENDER: &str = "EMAIL";
pub const ENV_PASSWORD: &str = "EMAIL_PASSWORD";
pub const ENV_RECIPIENT: &str = "RECEIVER_EMAIL";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CredentialsError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid email address in {var}: {reason}")]
    InvalidAddress { var: &'static str, reason: String },
}

/// Sender address, sender password and recipient address for the mail relay.
#[derive(Clone)]
pub struct MailCredentials {
    pub sender: String,
    pub password: String,
    pub recipient: String,
}

impl std::fmt::Debug for MailCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailCredentials")
            .field("sender", &self.sender)
            .field("password", &"<redacted>")
            .field("recipient", &self.recipient)
            .finish()
    }
}

impl MailCredentials {
    /// Read credentials from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `CredentialsError` naming the first missing or malformed variable.
    pub fn from_env() -> Result<Self, CredentialsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read credentials through `lookup`; blank values count as missing.
    ///
    /// # Errors
    ///
    /// Returns `CredentialsError` naming the first missing or malformed variable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CredentialsError> {
        let required = |var: &'static str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(CredentialsError::Missing(var))
        };

        let sender = required(ENV_SENDER)?;
        let password = required(ENV_PASSWORD)?;
        let recipient = required(ENV_RECIPIENT)?;

        for (var, address) in [(ENV_SENDER, &sender), (ENV_RECIPIENT, &recipient)] {
            address
                .parse::<lettre::Address>()
                .map_err(|e| CredentialsError::InvalidAddress {
                    var,
                    reason: e.to_string(),
                })?;
        }

        Ok(Self {
            sender,
            password,
            recipient,
        })
    }
}
