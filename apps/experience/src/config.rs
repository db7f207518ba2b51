//! # Configuration
//!
//! Server, storage, admin and CRM settings.
//!
//! Resolution order (later wins):
//! 1. Built-in defaults
//! 2. Optional TOML file (`--config experience.toml`)
//! 3. Environment variables
//! 4. CLI flags (applied by the command that needs them)
//!
//! ## Environment Variables
//!
//! - `EXPERIENCE_ADMIN_KEY`: shared secret for the admin routes
//! - `EXPERIENCE_RATE_LIMIT`: requests per second (0 disables limiting)
//! - `EXPERIENCE_CORS_ORIGINS`: comma-separated origins, or `*`
//! - `HUBSPOT_ACCESS_TOKEN`: enables CRM contact sync
//! - `HUBSPOT_BASE_URL`: CRM API base URL

use experience_core::ExperienceError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_ADMIN_KEY: &str = "EXPERIENCE_ADMIN_KEY";
pub const ENV_RATE_LIMIT: &str = "EXPERIENCE_RATE_LIMIT";
pub const ENV_CORS_ORIGINS: &str = "EXPERIENCE_CORS_ORIGINS";
pub const ENV_CRM_TOKEN: &str = "HUBSPOT_ACCESS_TOKEN";
pub const ENV_CRM_BASE_URL: &str = "HUBSPOT_BASE_URL";

/// Default CRM API endpoint.
pub const DEFAULT_CRM_BASE_URL: &str = "https://api.hubapi.com";

// =============================================================================
// SECTIONS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Comma-separated allowed origins, `*` for any. Localhost only when unset.
    pub cors_origins: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            cors_origins: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// `"redb"` (persistent) or `"memory"` (volatile).
    pub backend: String,
    pub database: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: "redb".to_string(),
            database: PathBuf::from("experience.redb"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Shared secret for `/admin/*`. Admin routes are refused when unset.
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrmConfig {
    /// Private-app access token. Sync is disabled when unset.
    pub access_token: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for CrmConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            base_url: DEFAULT_CRM_BASE_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Requests per second across all clients; 0 disables limiting.
    pub rate_limit: u32,
    /// Maximum request body size in bytes.
    pub body_limit_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            rate_limit: 100,
            body_limit_bytes: 256 * 1024,
        }
    }
}

// =============================================================================
// CONFIG
// =============================================================================

/// Fully resolved application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub admin: AdminConfig,
    pub crm: CrmConfig,
    pub limits: LimitsConfig,
}

impl Config {
    /// Load from an optional TOML file, then apply environment overrides.
    ///
    /// A path that was given explicitly must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ExperienceError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(config.with_env_from(|key| std::env::var(key).ok()))
    }

    /// Parse a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ExperienceError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ExperienceError::Io(format!("Cannot read config '{}': {}", path.display(), e))
        })?;
        Self::from_toml(&contents)
    }

    /// Parse TOML text; missing sections and keys take their defaults.
    pub fn from_toml(contents: &str) -> Result<Self, ExperienceError> {
        toml::from_str(contents).map_err(|e| ExperienceError::InvalidInput(e.to_string()))
    }

    /// Apply overrides from `lookup` (the process environment in production).
    ///
    /// Empty values are ignored; an unparsable rate limit keeps the current one.
    #[must_use]
    pub fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = var(ENV_ADMIN_KEY) {
            self.admin.api_key = Some(key);
        }
        if let Some(raw) = var(ENV_RATE_LIMIT) {
            match raw.trim().parse() {
                Ok(rps) => self.limits.rate_limit = rps,
                Err(_) => tracing::warn!(
                    "{}={} is not a number, keeping {}",
                    ENV_RATE_LIMIT,
                    raw,
                    self.limits.rate_limit
                ),
            }
        }
        if let Some(origins) = var(ENV_CORS_ORIGINS) {
            self.server.cors_origins = Some(origins);
        }
        if let Some(token) = var(ENV_CRM_TOKEN) {
            self.crm.access_token = Some(token);
        }
        if let Some(url) = var(ENV_CRM_BASE_URL) {
            self.crm.base_url = url;
        }
        self
    }

    /// The admin key, if one is configured and non-empty.
    #[must_use]
    pub fn admin_key(&self) -> Option<&str> {
        self.admin
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
    }
}

// =============================================================================
// TESTS
// =============================================================================
