//! Server configuration.
//!
//! Settings come from environment variables ([`AppConfig::from_env`]) or from
//! a TOML file ([`AppConfig::from_file`]). Both start from the same defaults
//! and are validated before the server starts.
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 3000
//!
//! [admin]
//! username = "admin"
//! password = "change-me"
//! session_secret = "long-random-string"
//! session_ttl_hours = 8
//!
//! [business_day]
//! utc_offset_minutes = 330
//! rollover_hour = 1
//! ```

use std::fmt::Display;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::{AdminCredentials, SessionSigner};
use crate::models::{BusinessDayClock, BusinessDayError, DEFAULT_ROLLOVER_HOUR, IST_UTC_OFFSET_MINUTES};

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value for {name}: {value:?} ({reason})")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },
    #[error(transparent)]
    BusinessDay(#[from] BusinessDayError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminSettings {
    pub username: String,
    pub password: String,
    /// Key used to sign session tokens
    pub session_secret: String,
    pub session_ttl_hours: i64,
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "supersecret".to_string(),
            session_secret: "dev_secret_change_me".to_string(),
            session_ttl_hours: 8,
        }
    }
}

impl std::fmt::Debug for AdminSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSettings")
            .field("username", &self.username)
            .field("session_ttl_hours", &self.session_ttl_hours)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessDaySettings {
    pub utc_offset_minutes: i32,
    pub rollover_hour: u32,
}

impl Default for BusinessDaySettings {
    fn default() -> Self {
        Self {
            utc_offset_minutes: IST_UTC_OFFSET_MINUTES,
            rollover_hour: DEFAULT_ROLLOVER_HOUR,
        }
    }
}

/// Complete server configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub admin: AdminSettings,
    pub business_day: BusinessDaySettings,
}

fn env_override<T>(name: &'static str, target: &mut T) -> Result<(), ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    if let Ok(raw) = std::env::var(name) {
        *target = raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            name,
            value: raw.clone(),
            reason: e.to_string(),
        })?;
    }
    Ok(())
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `HOST` (default `0.0.0.0`), `PORT` (default `8080`)
    /// - `ADMIN_USER` (default `admin`), `ADMIN_PASS` (default `supersecret`)
    /// - `JWT_SECRET`: session signing key (default `dev_secret_change_me`)
    /// - `SESSION_TTL_HOURS` (default `8`)
    /// - `BUSINESS_UTC_OFFSET_MINUTES` (default `330`)
    /// - `BUSINESS_ROLLOVER_HOUR` (default `1`)
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        env_override("HOST", &mut config.server.host)?;
        env_override("PORT", &mut config.server.port)?;
        env_override("ADMIN_USER", &mut config.admin.username)?;
        env_override("ADMIN_PASS", &mut config.admin.password)?;
        env_override("JWT_SECRET", &mut config.admin.session_secret)?;
        env_override("SESSION_TTL_HOURS", &mut config.admin.session_ttl_hours)?;
        env_override(
            "BUSINESS_UTC_OFFSET_MINUTES",
            &mut config.business_day.utc_offset_minutes,
        )?;
        env_override(
            "BUSINESS_ROLLOVER_HOUR",
            &mut config.business_day.rollover_hour,
        )?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file. Missing keys take their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every setting that could only fail at request time otherwise.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;
        self.clock()?;
        if self.admin.session_ttl_hours <= 0 {
            return Err(ConfigError::InvalidValue {
                name: "session_ttl_hours",
                value: self.admin.session_ttl_hours.to_string(),
                reason: "must be positive".to_string(),
            });
        }
        if self.admin.session_secret.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "session_secret",
                value: String::new(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .server
            .host
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::InvalidValue {
                name: "host",
                value: self.server.host.clone(),
                reason: e.to_string(),
            })?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    pub fn clock(&self) -> Result<BusinessDayClock, ConfigError> {
        Ok(BusinessDayClock::new(
            self.business_day.utc_offset_minutes,
            self.business_day.rollover_hour,
        )?)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::hours(self.admin.session_ttl_hours)
    }

    pub fn signer(&self) -> SessionSigner {
        SessionSigner::new(&self.admin.session_secret, self.session_ttl())
    }

    pub fn credentials(&self) -> AdminCredentials {
        AdminCredentials::new(&self.admin.username, &self.admin.password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        config.validate().unwrap();
        assert_eq!(config.socket_addr().unwrap().port(), 8080);
        assert_eq!(config.session_ttl(), Duration::hours(8));
        assert_eq!(config.clock().unwrap(), BusinessDayClock::default());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
[server]
port = 3000

[business_day]
rollover_hour = 12
"#,
        )
        .unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.business_day.rollover_hour, 12);
        assert_eq!(config.business_day.utc_offset_minutes, IST_UTC_OFFSET_MINUTES);
        assert_eq!(config.admin.username, "admin");
    }

    #[test]
    fn test_invalid_rollover_is_rejected() {
        let mut config = AppConfig::default();
        config.business_day.rollover_hour = 24;
        assert!(matches!(config.validate(), Err(ConfigError::BusinessDay(_))));
    }

    #[test]
    fn test_invalid_host_is_rejected() {
        let mut config = AppConfig::default();
        config.server.host = "not an address".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { name: "host", .. })
        ));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let rendered = format!("{:?}", AppConfig::default());
        assert!(!rendered.contains("supersecret"));
        assert!(!rendered.contains("dev_secret_change_me"));
    }
}
