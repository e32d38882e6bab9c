use std::path::Path;

use sniper_feed::config::{parse_endpoint, Config, ReconnectConfig, WS_URL_ENV};

#[test]
fn parse_default_toml() {
    let toml_str = r#"
[feed]
url = "ws://localhost:8000/api/ws"
channel_capacity = 256

[reconnect]
enabled = true
initial_delay_ms = 1000
max_delay_ms = 30000
factor = 2.0
max_attempts = 0

[ui]
title = "ETH Degen Sniper Alerts"
refresh_rate_ms = 100
max_alerts = 50

[logging]
level = "info"
file = "sniper-feed.log"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.feed.url, "ws://localhost:8000/api/ws");
    assert_eq!(config.ui.max_alerts, 50);
    assert_eq!(config.reconnect.max_delay_ms, 30_000);
    assert!(config.validate().is_ok());
    assert_eq!(config.endpoint().unwrap().path(), "/api/ws");
}

#[test]
fn partial_toml_keeps_defaults_for_missing_keys() {
    let config: Config = toml::from_str(
        r#"
[feed]
url = "wss://feed.example.org/alerts"
"#,
    )
    .unwrap();
    assert_eq!(config.feed.url, "wss://feed.example.org/alerts");
    assert_eq!(config.feed.channel_capacity, 256);
    assert_eq!(config.ui.refresh_rate_ms, 100);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn missing_config_file_falls_back_to_defaults() {
    let config =
        Config::from_path_or_default(Path::new("does/not/exist/sniper-feed.toml")).unwrap();
    assert_eq!(config.feed.url, "ws://localhost:8000/api/ws");
    assert_eq!(config.ui.max_alerts, 50);
}

#[test]
fn env_override_replaces_feed_url() {
    let mut config = Config::default();
    std::env::set_var(WS_URL_ENV, "  wss://override.example.com/ws  ");
    config.apply_env_overrides();
    std::env::remove_var(WS_URL_ENV);
    assert_eq!(config.feed.url, "wss://override.example.com/ws");
}

#[test]
fn validate_rejects_bad_values() {
    let mut config = Config::default();
    config.feed.url = "http://localhost:8000/api/ws".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.feed.channel_capacity = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.reconnect = ReconnectConfig {
        factor: 0.9,
        ..ReconnectConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn parse_endpoint_rejects_missing_scheme() {
    assert!(parse_endpoint("localhost:8000/api/ws").is_err());
    assert!(parse_endpoint("ws://").is_err());
}
