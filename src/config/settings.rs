//! Configuration settings
//!
//! Sections mirror the TOML file layout. Every field has a serde default so a
//! partial file is enough.

use serde::{Deserialize, Serialize};
use std::time::Duration;

// Helper functions for serde defaults
fn default_base_url() -> String {
    "http://192.168.8.1".to_string()
}

fn default_min_id_length() -> usize {
    32
}

fn default_max_bootstrap_attempts() -> u32 {
    20
}

fn default_bootstrap_retry_interval() -> u64 {
    100
}

fn default_ussd_timeout() -> u64 {
    30
}

fn default_poll_interval() -> u64 {
    500
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration settings for the modem client
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Device address and proxy
    #[serde(default)]
    pub modem: ModemSettings,
    /// Session bootstrap behaviour
    #[serde(default)]
    pub session: SessionSettings,
    /// USSD polling
    #[serde(default)]
    pub ussd: UssdSettings,
    /// HTTP client tuning
    #[serde(default)]
    pub network: NetworkSettings,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Device address and upstream proxy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModemSettings {
    /// Base address of the web-management API
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Optional upstream proxy for every outbound call
    #[serde(default)]
    pub proxy: Option<String>,
}

/// Session bootstrap configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Shortest session identity accepted from the bootstrap request
    #[serde(default = "default_min_id_length")]
    pub min_id_length: usize,
    /// Upper bound on bootstrap requests before `start()` gives up
    #[serde(default = "default_max_bootstrap_attempts")]
    pub max_bootstrap_attempts: u32,
    /// Pause between bootstrap requests in milliseconds
    #[serde(default = "default_bootstrap_retry_interval")]
    pub bootstrap_retry_interval_ms: u64,
}

/// USSD polling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UssdSettings {
    /// Default wall-clock budget for a USSD request in seconds
    #[serde(default = "default_ussd_timeout")]
    pub timeout_secs: u64,
    /// Backoff between result polls in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSettings {
    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
    /// User agent string
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable verbose logging
    #[serde(default)]
    pub verbose: bool,
}

impl Default for ModemSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            proxy: None,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            min_id_length: default_min_id_length(),
            max_bootstrap_attempts: default_max_bootstrap_attempts(),
            bootstrap_retry_interval_ms: default_bootstrap_retry_interval(),
        }
    }
}

impl Default for UssdSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_ussd_timeout(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            verbose: false,
        }
    }
}

impl UssdSettings {
    /// Default USSD timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Poll backoff as a duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Settings {
    /// Create new settings with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings pointing at a specific device address
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        let mut settings = Self::default();
        settings.modem.base_url = base_url.into();
        settings
    }

    /// Defaults with `HILINK_*` and `LOG_LEVEL` overrides applied
    pub fn from_env() -> crate::Result<Self> {
        let mut settings = Self::default();
        super::EnvOverrides::capture()?.apply(&mut settings);
        Ok(settings)
    }

    /// Load settings from configuration file
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::Error::config("file", &format!("Failed to read config file: {}", e))
        })?;

        let settings: Settings = toml::from_str(&content).map_err(|e| {
            crate::Error::config("file", &format!("Failed to parse config file: {}", e))
        })?;

        Ok(settings)
    }

    /// Validate configuration settings
    pub fn validate(&self) -> crate::Result<()> {
        if let Err(e) = url::Url::parse(&self.modem.base_url) {
            return Err(crate::Error::config(
                "base_url",
                &format!("Invalid base URL '{}': {}", self.modem.base_url, e),
            ));
        }

        if let Some(proxy) = &self.modem.proxy
            && let Err(e) = url::Url::parse(proxy)
        {
            return Err(crate::Error::config(
                "proxy",
                &format!("Invalid proxy URL '{}': {}", proxy, e),
            ));
        }

        if self.session.max_bootstrap_attempts == 0 {
            return Err(crate::Error::config(
                "max_bootstrap_attempts",
                "Bootstrap attempts cannot be 0",
            ));
        }

        if self.ussd.timeout_secs == 0 {
            return Err(crate::Error::config(
                "ussd.timeout_secs",
                "USSD timeout cannot be 0",
            ));
        }

        if self.ussd.poll_interval_ms == 0 {
            return Err(crate::Error::config(
                "ussd.poll_interval_ms",
                "Poll interval cannot be 0",
            ));
        }

        if self.network.request_timeout == 0 {
            return Err(crate::Error::config(
                "request_timeout",
                "Request timeout cannot be 0",
            ));
        }

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(crate::Error::config(
                    "log_level",
                    &format!("Invalid log level: {}", self.logging.level),
                ));
            }
        }

        Ok(())
    }
}
