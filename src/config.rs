use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Default location of the config file
pub const DEFAULT_CONFIG_PATH: &str = "~/.config/uact-admin/config.yml";

/// Longest accepted idle session lifetime
pub const MAX_SESSION_EXPIRY_DAYS: i64 = 3650;

/// Application configuration loaded from config.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Host to bind to (default: 0.0.0.0)
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default: 9000)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path to SQLite database
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Directory for uploaded thumbnails, served under /uploads
    #[serde(default = "default_upload_path")]
    pub upload_path: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Allow new console accounts to self-register
    #[serde(default = "default_true")]
    pub allow_registration: bool,

    /// Minimum password length for registration
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,

    /// Idle session lifetime in days
    #[serde(default = "default_session_expiry_days")]
    pub session_expiry_days: i64,

    /// Mark session cookies Secure (enable behind HTTPS)
    #[serde(default)]
    pub secure_cookies: bool,

    /// Push gateway URL; notifications are only logged when unset
    #[serde(default)]
    pub notification_endpoint: Option<String>,

    /// Bearer key sent to the push gateway
    #[serde(default)]
    pub notification_api_key: Option<String>,

    /// Topic every new-video notification is sent to
    #[serde(default = "default_notification_topic")]
    pub notification_topic: String,

    /// Push gateway request timeout in seconds
    #[serde(default = "default_notification_timeout")]
    pub notification_timeout_seconds: u64,
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 9000 }
fn default_db_path() -> PathBuf { expand_home("~/uact-admin/uact.db") }
fn default_upload_path() -> PathBuf { expand_home("~/uact-admin/uploads") }
fn default_log_level() -> String { "info".to_string() }
fn default_true() -> bool { true }
fn default_min_password_length() -> usize { 6 }
fn default_session_expiry_days() -> i64 { 7 }
fn default_notification_topic() -> String { "all-users".to_string() }
fn default_notification_timeout() -> u64 { 10 }

impl Default for Config {
    fn default() -> Self {
        Config {
            host: default_host(),
            port: default_port(),
            db_path: default_db_path(),
            upload_path: default_upload_path(),
            log_level: default_log_level(),
            allow_registration: default_true(),
            min_password_length: default_min_password_length(),
            session_expiry_days: default_session_expiry_days(),
            secure_cookies: false,
            notification_endpoint: None,
            notification_api_key: None,
            notification_topic: default_notification_topic(),
            notification_timeout_seconds: default_notification_timeout(),
        }
    }
}

impl Config {
    /// Load configuration from file, with fallback to defaults
    /// Precedence: environment variables > config file > defaults
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config_path = path.unwrap_or(DEFAULT_CONFIG_PATH);
        let expanded_path = expand_home(config_path);

        let mut config = if expanded_path.exists() {
            tracing::info!("Loading config from: {}", expanded_path.display());
            let content = fs::read_to_string(&expanded_path)?;
            Self::from_yaml(&content)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", expanded_path.display());
            Self::default()
        };

        config.apply_env_overrides();
        config.expand_paths();
        config.validate()?;

        // Create config file if it doesn't exist
        if !expanded_path.exists() {
            config.save_default(&expanded_path)?;
        }

        Ok(config)
    }

    /// Parse a YAML document; missing keys take their defaults
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str::<Config>(content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Apply UACT_* environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("UACT_HOST") {
            self.host = val;
        }
        if let Ok(val) = std::env::var("UACT_PORT") {
            if let Ok(port) = val.parse() {
                self.port = port;
            }
        }
        if let Ok(val) = std::env::var("UACT_DB_PATH") {
            self.db_path = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("UACT_UPLOAD_PATH") {
            self.upload_path = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("UACT_LOG_LEVEL") {
            self.log_level = val;
        }
        if let Ok(val) = std::env::var("UACT_NOTIFICATION_ENDPOINT") {
            self.notification_endpoint = Some(val);
        }
        if let Ok(val) = std::env::var("UACT_NOTIFICATION_API_KEY") {
            self.notification_api_key = Some(val);
        }
    }

    /// Expand ~ in all path fields
    fn expand_paths(&mut self) {
        self.db_path = expand_home_path(&self.db_path);
        self.upload_path = expand_home_path(&self.upload_path);
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.min_password_length == 0 {
            return Err(Error::Config(
                "min_password_length must be at least 1".to_string(),
            ));
        }

        if self.session_expiry_days <= 0 || self.session_expiry_days > MAX_SESSION_EXPIRY_DAYS {
            return Err(Error::Config(format!(
                "session_expiry_days must be between 1 and {}, got: {}",
                MAX_SESSION_EXPIRY_DAYS, self.session_expiry_days
            )));
        }

        if let Some(endpoint) = &self.notification_endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(Error::Config(format!(
                    "notification_endpoint must be an http(s) URL, got: {}",
                    endpoint
                )));
            }
        }

        if self.notification_topic.trim().is_empty() {
            return Err(Error::Config("notification_topic must not be empty".to_string()));
        }

        Ok(())
    }

    /// Save default configuration to file
    fn save_default(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, yaml)?;
        tracing::info!("Created default config at: {}", path.display());

        Ok(())
    }

    /// Directory uploaded thumbnails are written to
    pub fn thumbnail_dir(&self) -> PathBuf {
        self.upload_path.join("thumbnails")
    }
}

/// Expand ~ to home directory in a string path
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Expand ~ in a PathBuf
fn expand_home_path(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(path_str) => expand_home(path_str),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.port, 9000);
        assert_eq!(config.notification_topic, "all-users");
        assert_eq!(config.min_password_length, 6);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config = Config::from_yaml("port: 8080\nallow_registration: false\n").unwrap();
        assert_eq!(config.port, 8080);
        assert!(!config.allow_registration);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.session_expiry_days, 7);
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let result = Config::from_yaml("port: [not a port");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_non_http_endpoint() {
        let config = Config {
            notification_endpoint: Some("ftp://push.example.com".to_string()),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_non_positive_session_expiry() {
        let config = Config {
            session_expiry_days: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_oversized_session_expiry() {
        let config = Config {
            session_expiry_days: i64::MAX,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = Config {
            session_expiry_days: MAX_SESSION_EXPIRY_DAYS,
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_writes_default_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.yml");

        let config = Config::load(Some(path.to_str().unwrap())).unwrap();
        assert!(path.exists(), "Default config should be written");

        let reloaded = Config::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(reloaded.port, config.port);
        assert_eq!(reloaded.notification_topic, config.notification_topic);
    }

    #[test]
    fn test_expand_home() {
        let expanded = expand_home("/absolute/path");
        assert_eq!(expanded, PathBuf::from("/absolute/path"));

        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/x.db"), home.join("x.db"));
        }
    }
}
