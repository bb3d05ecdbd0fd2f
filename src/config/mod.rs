//! Client configuration
//!
//! A [`Config`] can be built in code, read from a Redis-style configuration
//! file, or parsed from a `redis://` URL.

mod parser;

pub use parser::{parse_config_file, parse_config_str, ConfigParseError};

use std::path::PathBuf;
use std::time::Duration;

/// Default namespace for temporary keys created by set algebra
pub const DEFAULT_TEMP_KEY_PREFIX: &str = "__ferrous_tmp__";

/// Connection and namespace settings for a [`crate::Client`]
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Store host name or address
    pub host: String,

    /// Store TCP port
    pub port: u16,

    /// Database index selected after connecting
    pub db: usize,

    /// Optional password sent with AUTH
    pub password: Option<String>,

    /// Timeout for establishing the TCP connection
    pub connect_timeout: Duration,

    /// Read/write timeout for one round trip (0 disables)
    pub io_timeout: Duration,

    /// Reserved prefix for temporary keys; handles refuse keys inside it
    pub temp_key_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "127.0.0.1".to_string(),
            port: 6379,
            db: 0,
            password: None,
            connect_timeout: Duration::from_secs(5),
            io_timeout: Duration::from_secs(5),
            temp_key_prefix: DEFAULT_TEMP_KEY_PREFIX.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigParseError> {
        let path = path.into();
        parse_config_file(&path)
    }

    /// Parse `redis://[:password@]host[:port][/db]`
    pub fn from_url(url: &str) -> Result<Self, ConfigParseError> {
        let rest = url
            .strip_prefix("redis://")
            .ok_or_else(|| ConfigParseError::Url(format!("unsupported scheme in '{}'", url)))?;

        let mut config = Config::default();

        let (auth, location) = match rest.rsplit_once('@') {
            Some((auth, location)) => (Some(auth), location),
            None => (None, rest),
        };
        if let Some(auth) = auth {
            // user:password or :password; ACL users are not supported
            let password = auth.split_once(':').map(|(_, p)| p).unwrap_or(auth);
            if !password.is_empty() {
                config.password = Some(password.to_string());
            }
        }

        let (host_port, db) = match location.split_once('/') {
            Some((host_port, db)) => (host_port, Some(db)),
            None => (location, None),
        };

        let (host, port) = match host_port.rsplit_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (host_port, None),
        };
        if !host.is_empty() {
            config.host = host.to_string();
        }
        if let Some(port) = port {
            config.port = port
                .parse()
                .map_err(|_| ConfigParseError::Url(format!("invalid port '{}'", port)))?;
        }
        if let Some(db) = db.filter(|db| !db.is_empty()) {
            config.db = db
                .parse()
                .map_err(|_| ConfigParseError::Url(format!("invalid database '{}'", db)))?;
        }

        Ok(config)
    }

    /// Address passed to the TCP connector
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get a configuration parameter by name
    pub fn get(&self, param: &str) -> Option<String> {
        match param {
            "host" => Some(self.host.clone()),
            "port" => Some(self.port.to_string()),
            "db" => Some(self.db.to_string()),
            "requirepass" | "password" => self.password.clone(),
            "connect-timeout" => Some(self.connect_timeout.as_millis().to_string()),
            "timeout" => Some(self.io_timeout.as_millis().to_string()),
            "temp-key-prefix" => Some(self.temp_key_prefix.clone()),
            _ => None,
        }
    }

    /// Get all configuration parameters; the password is never reported
    pub fn get_all(&self) -> Vec<(String, String)> {
        ["host", "port", "db", "connect-timeout", "timeout", "temp-key-prefix"]
            .iter()
            .filter_map(|param| self.get(param).map(|value| (param.to_string(), value)))
            .collect()
    }
}
