//! Tests for server configuration loaded from the environment and TOML files.

mod support;

use std::io::Write;

use chrono::Duration;
use jai_metro::config::{AppConfig, ConfigError};
use jai_metro::models::BusinessDayClock;

const CONFIG_VARS: [&str; 8] = [
    "HOST",
    "PORT",
    "ADMIN_USER",
    "ADMIN_PASS",
    "JWT_SECRET",
    "SESSION_TTL_HOURS",
    "BUSINESS_UTC_OFFSET_MINUTES",
    "BUSINESS_ROLLOVER_HOUR",
];

/// Run `f` with every config variable cleared except `set`.
fn with_config_env<R>(set: &[(&str, &str)], f: impl FnOnce() -> R) -> R {
    let mut changes: Vec<(&str, Option<&str>)> = CONFIG_VARS.iter().map(|k| (*k, None)).collect();
    for (key, value) in set {
        changes.retain(|(k, _)| k != key);
        changes.push((key, Some(value)));
    }
    support::with_scoped_env(&changes, f)
}

#[test]
fn test_from_env_defaults() {
    let config = with_config_env(&[], AppConfig::from_env).unwrap();
    assert_eq!(config, AppConfig::default());
    assert_eq!(config.socket_addr().unwrap().to_string(), "0.0.0.0:8080");
    assert_eq!(config.clock().unwrap(), BusinessDayClock::default());
}

#[test]
fn test_from_env_overrides() {
    let config = with_config_env(
        &[
            ("HOST", "127.0.0.1"),
            ("PORT", " 3000 "),
            ("ADMIN_USER", "owner"),
            ("ADMIN_PASS", "hunter2"),
            ("JWT_SECRET", "s3cret"),
            ("SESSION_TTL_HOURS", "2"),
            ("BUSINESS_ROLLOVER_HOUR", "0"),
        ],
        AppConfig::from_env,
    )
    .unwrap();

    assert_eq!(config.socket_addr().unwrap().to_string(), "127.0.0.1:3000");
    assert!(config.credentials().matches("owner", "hunter2"));
    assert_eq!(config.session_ttl(), Duration::hours(2));
    assert_eq!(config.business_day.rollover_hour, 0);

    let signer = config.signer();
    let token = signer.issue().unwrap();
    assert!(signer.verify(&token).is_ok());
}

#[test]
fn test_from_env_rejects_bad_numbers() {
    let err = with_config_env(&[("PORT", "eighty")], AppConfig::from_env).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { name: "PORT", .. }));

    let err = with_config_env(&[("SESSION_TTL_HOURS", "0")], AppConfig::from_env).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::InvalidValue {
            name: "session_ttl_hours",
            ..
        }
    ));
}

#[test]
fn test_from_env_rejects_bad_rollover() {
    let err = with_config_env(&[("BUSINESS_ROLLOVER_HOUR", "25")], AppConfig::from_env)
        .unwrap_err();
    assert!(matches!(err, ConfigError::BusinessDay(_)));
}

#[test]
fn test_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[server]
host = "127.0.0.1"
port = 9000

[admin]
username = "boss"
session_ttl_hours = 12

[business_day]
utc_offset_minutes = 0
rollover_hour = 6
"#
    )
    .unwrap();

    let config = AppConfig::from_file(file.path()).unwrap();
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.admin.username, "boss");
    assert_eq!(config.admin.password, "supersecret");
    assert_eq!(config.session_ttl(), Duration::hours(12));
    assert_eq!(config.clock().unwrap(), BusinessDayClock::new(0, 6).unwrap());
}

#[test]
fn test_from_file_errors() {
    let dir = tempfile::tempdir().unwrap();
    let err = AppConfig::from_file(dir.path().join("missing.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "[server\nport = 1").unwrap();
    let err = AppConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "[business_day]\nutc_offset_minutes = 100000\n").unwrap();
    let err = AppConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::BusinessDay(_)));
}
