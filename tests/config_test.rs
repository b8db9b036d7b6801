//! Configuration system tests.

use netpulse_lib::core::config::LogLevel;
use netpulse_lib::core::{Config, ConfigBuilder, FeedSource};
use std::path::PathBuf;
use std::time::Duration;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.feed.source, FeedSource::Http);
    assert_eq!(config.feed.url, "http://127.0.0.1:3000");
    assert_eq!(config.refresh.interval_secs, 30);
    assert_eq!(config.refresh.tick, Duration::from_secs(1));
    assert!(!config.api.enabled);
    assert_eq!(config.notify.webhook_url, None);
}

#[test]
fn test_config_builder() {
    let config = ConfigBuilder::new()
        .feed_url("https://collector.internal:8443")
        .interval_secs(15)
        .api_port(9000)
        .webhook_url("https://hooks.example.com/x")
        .log_file(PathBuf::from("netpulse.log"))
        .debug(true)
        .build()
        .unwrap();

    assert_eq!(config.feed.url, "https://collector.internal:8443");
    assert_eq!(config.refresh.interval_secs, 15);
    assert!(config.api.enabled);
    assert_eq!(config.api.port, 9000);
    assert!(config.debug);
}

#[test]
fn test_yaml_config() {
    let yaml = r#"
feed:
  source: file
  path: /var/lib/netpulse/records.json
refresh:
  interval_secs: 20
  min_busy: 1500ms
  offline_delay: 2s
api:
  enabled: true
  port: 8088
  enable_cors: false
notify:
  webhook_url: https://hooks.example.com/abc
logging:
  level: warn
"#;

    let config = ConfigBuilder::new().from_yaml(yaml).unwrap().build().unwrap();
    assert_eq!(config.feed.source, FeedSource::File);
    assert_eq!(config.feed.path, Some(PathBuf::from("/var/lib/netpulse/records.json")));
    assert_eq!(config.refresh.min_busy, Duration::from_millis(1500));
    assert_eq!(config.refresh.offline_delay, Duration::from_secs(2));
    // Unspecified fields keep their defaults
    assert_eq!(config.refresh.tick, Duration::from_secs(1));
    assert!(!config.api.enable_cors);
    assert_eq!(config.logging.level, LogLevel::Warn);
}

#[test]
fn test_config_validation() {
    assert!(ConfigBuilder::new().feed_url("ftp://collector").build().is_err());
    assert!(ConfigBuilder::new().interval_secs(0).build().is_err());
    assert!(ConfigBuilder::new().webhook_url(" ").build().is_err());
    assert!(ConfigBuilder::new().from_yaml("refresh: [").is_err());
}

#[test]
fn test_config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    let config = ConfigBuilder::new().feed_source(FeedSource::Demo).interval_secs(45).build().unwrap();
    std::fs::write(&path, serde_yaml::to_string(&config).unwrap()).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let loaded = ConfigBuilder::new().from_yaml(&content).unwrap().build().unwrap();
    assert_eq!(loaded.feed.source, FeedSource::Demo);
    assert_eq!(loaded.refresh.interval_secs, 45);
    assert_eq!(loaded.refresh.min_busy, config.refresh.min_busy);
}
