//! Configuration loading with multi-layer merge

use crate::admin::AdminUser;
use crate::store::SqliteStore;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub admin: AdminConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Catalog database location
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Database path; `~` and environment variables are expanded
    pub path: Option<String>,
}

/// Storefront display settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DisplayConfig {
    /// Maximum related products shown
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    5
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
        }
    }
}

/// Identity and secret used for admin requests
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AdminConfig {
    /// Secret request tokens are derived from
    pub nonce_secret: Option<String>,

    #[serde(default = "default_user")]
    pub user: String,

    #[serde(default = "default_capabilities")]
    pub capabilities: Vec<String>,
}

fn default_user() -> String {
    "admin".to_string()
}

fn default_capabilities() -> Vec<String> {
    vec!["manage_options".to_string()]
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            nonce_secret: None,
            user: default_user(),
            capabilities: default_capabilities(),
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Also write logs to this file
    pub file: Option<String>,
}

impl AppConfig {
    /// Load configuration from the standard hierarchy
    ///
    /// Load order (later overrides earlier):
    /// 1. Built-in defaults
    /// 2. ~/.config/related-products/config.toml
    /// 3. .related-products/config.toml (project)
    pub fn load(project_dir: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        // Load user config
        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                let user_config = Self::load_file(&user_config_path)
                    .with_context(|| format!("loading {}", user_config_path.display()))?;
                config.merge(user_config);
            }
        }

        // Load project config
        let project_config_path = project_dir
            .map(|p| p.join(".related-products/config.toml"))
            .unwrap_or_else(|| PathBuf::from(".related-products/config.toml"));

        if project_config_path.exists() {
            let project_config = Self::load_file(&project_config_path)
                .with_context(|| format!("loading {}", project_config_path.display()))?;
            config.merge(project_config);
        }

        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Get the user config path (~/.config/related-products/config.toml)
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("related-products/config.toml"))
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: Self) {
        if other.store.path.is_some() {
            self.store.path = other.store.path;
        }

        if other.display.limit != default_limit() {
            self.display.limit = other.display.limit;
        }

        if other.admin.nonce_secret.is_some() {
            self.admin.nonce_secret = other.admin.nonce_secret;
        }
        if other.admin.user != default_user() {
            self.admin.user = other.admin.user;
        }
        if other.admin.capabilities != default_capabilities() {
            self.admin.capabilities = other.admin.capabilities;
        }

        if other.logging.file.is_some() {
            self.logging.file = other.logging.file;
        }
    }

    /// Resolved catalog database path
    pub fn store_path(&self) -> Result<PathBuf> {
        match self.store.path.as_deref() {
            Some(path) => expand_path(path),
            None => SqliteStore::default_path(),
        }
    }

    /// Resolved log file path, if file logging is configured
    pub fn log_file(&self) -> Result<Option<PathBuf>> {
        self.logging.file.as_deref().map(expand_path).transpose()
    }

    /// The user admin requests run as
    pub fn admin_user(&self) -> AdminUser {
        AdminUser::new(self.admin.user.clone(), self.admin.capabilities.iter().cloned())
    }
}

fn expand_path(path: &str) -> Result<PathBuf> {
    let expanded =
        shellexpand::full(path).with_context(|| format!("expanding path '{}'", path))?;
    Ok(PathBuf::from(expanded.as_ref()))
}
