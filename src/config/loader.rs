//! Layered configuration: built-in defaults, a TOML file, then `HILINK_*`
//! environment variables.
//!
//! Command-line flags are applied by the binary on top of [`ConfigLoader::load`].

use crate::{Error, Result, config::Settings};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming an explicit configuration file
pub const CONFIG_PATH_VAR: &str = "HILINK_CONFIG";

/// Overrides read from the environment. A field is `Some` only when its
/// variable is set, whatever its value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    /// `HILINK_BASE_URL`
    pub base_url: Option<String>,
    /// `HILINK_PROXY`
    pub proxy: Option<String>,
    /// `HILINK_USSD_TIMEOUT`, in seconds
    pub ussd_timeout_secs: Option<u64>,
    /// `LOG_LEVEL`
    pub log_level: Option<String>,
}

impl EnvOverrides {
    /// Read the process environment
    pub fn capture() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read overrides through `lookup`, which returns a variable's value if set
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let ussd_timeout_secs = match lookup("HILINK_USSD_TIMEOUT") {
            Some(raw) => Some(raw.trim().parse().map_err(|e| {
                Error::config("HILINK_USSD_TIMEOUT", &format!("Invalid timeout '{}': {}", raw, e))
            })?),
            None => None,
        };

        Ok(Self {
            base_url: lookup("HILINK_BASE_URL"),
            proxy: lookup("HILINK_PROXY"),
            ussd_timeout_secs,
            log_level: lookup("LOG_LEVEL"),
        })
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overwrite every field of `settings` that has an override
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(base_url) = &self.base_url {
            settings.modem.base_url = base_url.clone();
        }
        if let Some(proxy) = &self.proxy {
            settings.modem.proxy = Some(proxy.clone());
        }
        if let Some(timeout) = self.ussd_timeout_secs {
            settings.ussd.timeout_secs = timeout;
        }
        if let Some(level) = &self.log_level {
            settings.logging.level = level.clone();
        }
    }
}

/// Resolves the configuration file and produces validated [`Settings`]
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    /// File requested by the caller; must exist
    path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Loader that discovers the file on its own (see [`discover`](Self::discover))
    pub fn new() -> Self {
        Self::default()
    }

    /// Loader bound to an explicit file, e.g. from `--config`
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// `<config dir>/hilink/config.toml` for the current platform
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("hilink").join("config.toml"))
    }

    /// `$HILINK_CONFIG` if set, otherwise the default path when that file exists
    pub fn discover() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_VAR) {
            return Some(PathBuf::from(path));
        }
        Self::default_path().filter(|path| path.is_file())
    }

    /// Defaults, then the file, then the process environment, then validation
    pub fn load(&self) -> Result<Settings> {
        self.load_with(&EnvOverrides::capture()?)
    }

    /// [`load`](Self::load) with caller-supplied environment overrides
    pub fn load_with(&self, env: &EnvOverrides) -> Result<Settings> {
        let path = self.path.clone().or_else(Self::discover);

        let mut settings = match path.as_deref() {
            Some(path) => read_file(path)?,
            None => {
                debug!("No configuration file, starting from defaults");
                Settings::default()
            }
        };

        if !env.is_empty() {
            debug!("Applying environment overrides: {:?}", env);
            env.apply(&mut settings);
        }

        settings.validate()?;
        Ok(settings)
    }
}

fn read_file(path: &Path) -> Result<Settings> {
    if !path.is_file() {
        return Err(Error::config(
            "file",
            &format!("Configuration file {} does not exist", path.display()),
        ));
    }
    info!("Loading configuration from {}", path.display());
    Settings::from_file(path)
}
