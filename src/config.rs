//! Top-level application configuration.
//!
//! Configuration is stored as YAML at `$ISSUEDESK_CONFIG` or, when that is
//! unset, `config.yaml` in the platform config directory. It includes:
//! - The console API base URL and request timeout
//! - The bearer token and the signed-in user's id
//! - The list page size
//!
//! `ISSUEDESK_API_URL` and `ISSUEDESK_TOKEN` override the file.

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{DeskError, Result};
use crate::query::DEFAULT_PAGE_SIZE;
use crate::types::UserId;

pub const CONFIG_PATH_ENV: &str = "ISSUEDESK_CONFIG";
pub const API_URL_ENV: &str = "ISSUEDESK_API_URL";
pub const TOKEN_ENV: &str = "ISSUEDESK_TOKEN";

pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";

/// Keys accepted by `config set`.
pub const VALID_KEYS: &[&str] = &[
    "api.base_url",
    "api.timeout",
    "auth.token",
    "auth.user_id",
    "page_size",
];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    /// Rows per list page (default: 10)
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            auth: AuthConfig::default(),
            page_size: default_page_size(),
        }
    }
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_api_timeout")]
    pub timeout: u64,
}

fn default_api_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: default_api_timeout(),
        }
    }
}

/// Authentication configuration
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("user_id", &self.user_id)
            .finish()
    }
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = env::var(CONFIG_PATH_ENV)
            && !path.is_empty()
        {
            return Ok(PathBuf::from(path));
        }
        ProjectDirs::from("", "", "issuedesk")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
            .ok_or_else(|| {
                DeskError::Config(format!(
                    "could not determine a config directory; set {CONFIG_PATH_ENV}"
                ))
            })
    }

    /// Load configuration from file, or return default if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            DeskError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config at {}: {}", path.display(), e),
            ))
        })?;
        let config: Config = serde_yaml_ng::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| {
                DeskError::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create directory for config at {}: {}",
                        parent.display(),
                        e
                    ),
                ))
            })?;
        }

        let content = serde_yaml_ng::to_string(self)?;
        fs::write(path, content).map_err(|e| {
            DeskError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write config at {}: {}", path.display(), e),
            ))
        })?;

        // The file may hold a token: owner read/write only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    /// API base URL from environment, config file, or the default.
    pub fn api_url(&self) -> String {
        if let Ok(url) = env::var(API_URL_ENV)
            && !url.is_empty()
        {
            return url;
        }
        self.api
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    /// Bearer token from environment or config file.
    pub fn token(&self) -> Option<String> {
        if let Ok(token) = env::var(TOKEN_ENV)
            && !token.is_empty()
        {
            return Some(token);
        }
        self.auth.token.clone()
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout.max(1))
    }

    pub fn page_size(&self) -> u32 {
        self.page_size.max(1)
    }

    pub fn current_user(&self) -> Option<UserId> {
        self.auth.user_id
    }

    /// Set a key from its command-line string form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "api.base_url" => {
                url::Url::parse(value)?;
                self.api.base_url = Some(value.to_string());
            }
            "api.timeout" => {
                self.api.timeout = parse_positive(key, value)?;
            }
            "auth.token" => {
                self.auth.token = Some(value.to_string()).filter(|t| !t.is_empty());
            }
            "auth.user_id" => {
                self.auth.user_id = Some(parse_positive(key, value)?);
            }
            "page_size" => {
                self.page_size = u32::try_from(parse_positive(key, value)?)
                    .map_err(|_| DeskError::Config(format!("page_size '{value}' is too large")))?;
            }
            other => {
                return Err(DeskError::Config(format!(
                    "unknown config key '{other}'. Valid keys: {}",
                    VALID_KEYS.join(", ")
                )));
            }
        }
        Ok(())
    }
}

fn parse_positive(key: &str, value: &str) -> Result<u64> {
    match value.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(DeskError::Config(format!(
            "invalid value '{value}' for {key}. Expected a positive integer"
        ))),
    }
}
