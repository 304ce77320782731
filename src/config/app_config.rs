use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use validator::Validate;

use crate::monitoring::notifier::{WebhookKind, DEFAULT_SUBJECT};
use crate::monitoring::path_resolver::{LogSource, DEFAULT_LOG_FILENAME};
use crate::monitoring::tail::TextEncoding;

/// Env var consulted when `notifier.webhook_url` is not set
pub const DEFAULT_WEBHOOK_URL_ENV: &str = "ALERT_WEBHOOK_URL";

/// Config file as written on disk
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RawConfig {
    pub threshold: Option<f64>,

    #[serde(default)]
    #[validate(length(min = 1, message = "recipients must be a non-empty list"))]
    pub recipients: Vec<String>,

    pub base_dir: Option<String>,
    pub log_file: Option<String>,

    #[serde(default = "default_log_filename")]
    #[validate(length(min = 1, message = "log_filename must not be empty"))]
    pub log_filename: String,

    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: f64,

    #[serde(default)]
    pub start_from_beginning: bool,

    #[serde(default = "default_cooldown")]
    #[validate(range(min = 0.0, message = "resend_cooldown_seconds must not be negative"))]
    pub resend_cooldown_seconds: f64,

    #[serde(default = "default_encoding")]
    pub encoding: String,

    #[serde(default = "default_source_name")]
    pub source_name: String,

    #[serde(default)]
    pub notifier: RawNotifierConfig,
}

/// `notifier` section of the config file
#[derive(Debug, Clone, Deserialize)]
pub struct RawNotifierConfig {
    #[serde(default)]
    pub kind: WebhookKind,
    pub webhook_url: Option<String>,
    #[serde(default = "default_webhook_url_env")]
    pub webhook_url_env: String,
    #[serde(default = "default_subject")]
    pub subject: String,
}

impl Default for RawNotifierConfig {
    fn default() -> Self {
        Self {
            kind: WebhookKind::default(),
            webhook_url: None,
            webhook_url_env: default_webhook_url_env(),
            subject: default_subject(),
        }
    }
}

fn default_log_filename() -> String {
    DEFAULT_LOG_FILENAME.to_string()
}

fn default_poll_interval() -> f64 {
    1.0
}

fn default_cooldown() -> f64 {
    300.0
}

fn default_encoding() -> String {
    "utf-8".to_string()
}

fn default_source_name() -> String {
    "Fridge1".to_string()
}

fn default_webhook_url_env() -> String {
    DEFAULT_WEBHOOK_URL_ENV.to_string()
}

fn default_subject() -> String {
    DEFAULT_SUBJECT.to_string()
}

/// Notification settings
#[derive(Debug, Clone, PartialEq)]
pub struct NotifierConfig {
    pub kind: WebhookKind,
    pub webhook_url: String,
    pub subject: String,
    pub source_name: String,
    pub recipients: Vec<String>,
}

/// Validated monitor configuration, immutable for a run
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub threshold: f64,
    pub log_source: LogSource,
    pub poll_interval: Duration,
    pub start_from_beginning: bool,
    pub cooldown: Duration,
    pub encoding: TextEncoding,
    pub notifier: NotifierConfig,
}

impl AppConfig {
    /// Load and validate a JSON config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

        let raw: RawConfig = serde_json::from_str(&content)?;
        Self::from_raw(raw)
    }

    /// Validate raw settings and apply defaults
    pub fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let threshold = raw.threshold.ok_or(ConfigError::MissingThreshold)?;
        if !threshold.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "threshold must be a finite number, got {}",
                threshold
            )));
        }

        raw.validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        let poll_interval = seconds("poll_interval_seconds", raw.poll_interval_seconds)?;
        if poll_interval.is_zero() {
            return Err(ConfigError::Invalid(format!(
                "poll_interval_seconds must be positive, got {}",
                raw.poll_interval_seconds
            )));
        }
        let cooldown = seconds("resend_cooldown_seconds", raw.resend_cooldown_seconds)?;

        let log_source = LogSource::from_parts(
            raw.log_file.as_deref(),
            raw.base_dir.as_deref(),
            &raw.log_filename,
        )?;
        let encoding = raw.encoding.parse::<TextEncoding>()?;

        let webhook_url = match raw.notifier.webhook_url.filter(|u| !u.trim().is_empty()) {
            Some(url) => url,
            None => env::var(&raw.notifier.webhook_url_env)
                .ok()
                .filter(|u| !u.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingWebhookUrl(raw.notifier.webhook_url_env.clone()))?,
        };

        Ok(Self {
            threshold,
            log_source,
            poll_interval,
            start_from_beginning: raw.start_from_beginning,
            cooldown,
            encoding,
            notifier: NotifierConfig {
                kind: raw.notifier.kind,
                webhook_url,
                subject: raw.notifier.subject,
                source_name: raw.source_name,
                recipients: raw.recipients,
            },
        })
    }
}

/// Converts a seconds field, rejecting negative, non-finite and out-of-range values
fn seconds(field: &str, value: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(value)
        .map_err(|e| ConfigError::Invalid(format!("{field} out of range ({value}): {e}")))
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Config missing required field: 'threshold'")]
    MissingThreshold,
    #[error("Either 'log_file' or 'base_dir' must be specified in config")]
    MissingLogLocation,
    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),
    #[error("Webhook URL missing: set 'notifier.webhook_url' or the {0} environment variable")]
    MissingWebhookUrl(String),
    #[error("Invalid config: {0}")]
    Invalid(String),
}
