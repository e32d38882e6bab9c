use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::buffer::DEFAULT_ALERT_CAPACITY;
use crate::error::AppError;
use crate::feed::backoff::{ExponentialBackoff, RetryPolicy};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
pub const CONFIG_PATH_ENV: &str = "SNIPER_FEED_CONFIG";
pub const WS_URL_ENV: &str = "SNIPER_FEED_WS_URL";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub feed: FeedConfig,
    pub reconnect: ReconnectConfig,
    pub ui: UiConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub url: String,
    pub channel_capacity: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: "ws://localhost:8000/api/ws".to_string(),
            channel_capacity: 256,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReconnectConfig {
    pub enabled: bool,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub factor: f64,
    /// Give up after this many consecutive failed attempts. `0` retries forever.
    pub max_attempts: u32,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            initial_delay_ms: 1_000,
            max_delay_ms: 30_000,
            factor: 2.0,
            max_attempts: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub title: String,
    pub refresh_rate_ms: u64,
    pub max_alerts: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            title: "ETH Degen Sniper Alerts".to_string(),
            refresh_rate_ms: 100,
            max_alerts: DEFAULT_ALERT_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: PathBuf::from("sniper-feed.log"),
        }
    }
}

/// Parse and check a feed endpoint. Only `ws` and `wss` URLs with a host are accepted.
pub fn parse_endpoint(raw: &str) -> Result<Url, AppError> {
    let invalid = |reason: String| AppError::InvalidEndpoint {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "ws" | "wss" => {}
        other => {
            return Err(invalid(format!(
                "unsupported scheme '{}', expected ws or wss",
                other
            )))
        }
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}

impl ReconnectConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if !self.factor.is_finite() || self.factor < 1.0 {
            return Err(AppError::Config(format!(
                "reconnect.factor must be >= 1.0, got {}",
                self.factor
            )));
        }
        if self.initial_delay_ms == 0 {
            return Err(AppError::Config(
                "reconnect.initial_delay_ms must be > 0".to_string(),
            ));
        }
        if self.initial_delay_ms > self.max_delay_ms {
            return Err(AppError::Config(format!(
                "reconnect.initial_delay_ms ({}) exceeds reconnect.max_delay_ms ({})",
                self.initial_delay_ms, self.max_delay_ms
            )));
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let backoff = ExponentialBackoff::new(
            Duration::from_millis(self.initial_delay_ms),
            Duration::from_millis(self.max_delay_ms),
            self.factor,
        );
        RetryPolicy::new(backoff, self.enabled, self.max_attempts)
    }
}

impl Config {
    /// Load `.env`, then the TOML file (falling back to defaults when it does
    /// not exist), then environment overrides, then validate.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config_path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        let mut config = Self::from_path_or_default(&config_path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_path_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&config_str).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(WS_URL_ENV) {
            if !url.trim().is_empty() {
                self.feed.url = url.trim().to_string();
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        parse_endpoint(&self.feed.url).context("feed.url is invalid")?;
        if self.feed.channel_capacity == 0 {
            bail!("feed.channel_capacity must be > 0");
        }
        if self.ui.max_alerts == 0 {
            bail!("ui.max_alerts must be > 0");
        }
        if self.ui.refresh_rate_ms == 0 {
            bail!("ui.refresh_rate_ms must be > 0");
        }
        self.reconnect.validate()?;
        Ok(())
    }

    pub fn endpoint(&self) -> Result<Url> {
        parse_endpoint(&self.feed.url).context("feed.url is invalid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_default_toml() {
        let toml_str = r#"
[feed]
url = "wss://alerts.example.com/api/ws"
channel_capacity = 128

[reconnect]
enabled = false
initial_delay_ms = 500
max_delay_ms = 10000
factor = 1.5
max_attempts = 5

[ui]
title = "Sniper"
refresh_rate_ms = 50
max_alerts = 20

[logging]
level = "debug"
file = "feed.log"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.feed.url, "wss://alerts.example.com/api/ws");
        assert_eq!(config.feed.channel_capacity, 128);
        assert!(!config.reconnect.enabled);
        assert_eq!(config.reconnect.max_attempts, 5);
        assert!((config.reconnect.factor - 1.5).abs() < f64::EPSILON);
        assert_eq!(config.ui.max_alerts, 20);
        assert_eq!(config.logging.file, PathBuf::from("feed.log"));
        config.validate().unwrap();
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.feed.url, "ws://localhost:8000/api/ws");
        assert_eq!(config.ui.max_alerts, 50);
        assert_eq!(config.ui.title, "ETH Degen Sniper Alerts");
        assert!(config.reconnect.enabled);
        config.validate().unwrap();
    }

    #[test]
    fn parse_endpoint_accepts_ws_and_wss() {
        assert_eq!(
            parse_endpoint("ws://localhost:8000/api/ws").unwrap().port(),
            Some(8000)
        );
        assert_eq!(
            parse_endpoint(" wss://example.com/feed ").unwrap().scheme(),
            "wss"
        );
    }

    #[test]
    fn parse_endpoint_rejects_invalid_inputs() {
        assert!(parse_endpoint("").is_err());
        assert!(parse_endpoint("localhost:8000").is_err());
        assert!(matches!(
            parse_endpoint("http://localhost:8000/api/ws"),
            Err(AppError::InvalidEndpoint { .. })
        ));
    }

    #[test]
    fn reconnect_validation() {
        let mut cfg = ReconnectConfig::default();
        assert!(cfg.validate().is_ok());
        cfg.factor = 0.5;
        assert!(cfg.validate().is_err());
        cfg.factor = 2.0;
        cfg.initial_delay_ms = 60_000;
        assert!(cfg.validate().is_err());
        cfg.initial_delay_ms = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_capacity() {
        let mut config = Config::default();
        config.ui.max_alerts = 0;
        assert!(config.validate().is_err());
    }
}
