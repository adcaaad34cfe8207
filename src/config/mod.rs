mod session;

pub use session::{SecretString, SessionData, SessionManager};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use directories::BaseDirs;

use crate::cli::Cli;
use crate::error::{Result, VibeError};
use crate::gateway::Collaborator;

pub(crate) const CONFIG_DIR: &str = "vibe-control";
const MAIN_CONFIG_FILE: &str = "config.toml";

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_API_PREFIX: &str = "/api/v1";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub services: ServicesConfig,
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    pub request_timeout_secs: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_file: None,
            request_timeout_secs: 30,
        }
    }
}

/// Where each backend collaborator lives.
///
/// Every collaborator falls back to `base_url`, so a single monolithic backend
/// works with no per-service entries at all.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServicesConfig {
    pub base_url: String,
    pub api_prefix: String,
    pub auth: Option<String>,
    pub recommender: Option<String>,
    pub analytics: Option<String>,
    pub playlist: Option<String>,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            auth: None,
            recommender: None,
            analytics: None,
            playlist: None,
        }
    }
}

impl ServicesConfig {
    pub fn base_for(&self, collaborator: Collaborator) -> &str {
        let specific = match collaborator {
            Collaborator::Auth => &self.auth,
            Collaborator::Recommender => &self.recommender,
            Collaborator::Analytics => &self.analytics,
            Collaborator::Playlist => &self.playlist,
        };
        specific.as_deref().unwrap_or(&self.base_url)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LimitsConfig {
    pub search: u32,
    pub recommendations: u32,
    pub playlist: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            search: 20,
            recommendations: 20,
            playlist: 20,
        }
    }
}

pub struct ConfigManager {
    config_dir: PathBuf,
    config_path: PathBuf,
    app_config: AppConfig,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        let config_dir = Self::get_config_dir()?;
        let config_path = config_dir.join(MAIN_CONFIG_FILE);
        let app_config = Self::load_toml_file(&config_path).unwrap_or_default();

        Ok(Self {
            config_dir,
            config_path,
            app_config,
        })
    }

    /// Load from an explicit file. Unlike the default location, the file must exist.
    pub fn with_path(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            return Err(VibeError::ConfigNotFound { path });
        }
        let app_config = Self::load_toml_file(&path).unwrap_or_default();
        let config_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            config_dir,
            config_path: path,
            app_config,
        })
    }

    /// Resolve the config from CLI arguments: explicit `--config`, then the
    /// platform default, with flag/env overrides layered on top.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut manager = match &cli.config {
            Some(path) => Self::with_path(path.clone())?,
            None => Self::new()?,
        };
        manager.apply_overrides(cli);
        Ok(manager)
    }

    pub fn apply_overrides(&mut self, cli: &Cli) {
        let services = &mut self.app_config.services;
        if let Some(base) = &cli.api_base {
            services.base_url = base.clone();
        }
        if let Some(url) = &cli.auth_service {
            services.auth = Some(url.clone());
        }
        if let Some(url) = &cli.recommender_service {
            services.recommender = Some(url.clone());
        }
        if let Some(url) = &cli.analytics_service {
            services.analytics = Some(url.clone());
        }
        if let Some(url) = &cli.playlist_service {
            services.playlist = Some(url.clone());
        }
        if let Some(level) = &cli.log_level {
            self.app_config.general.log_level = level.clone();
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn app_config(&self) -> &AppConfig {
        &self.app_config
    }

    fn get_config_dir() -> Result<PathBuf> {
        BaseDirs::new()
            .map(|dirs| dirs.config_dir().join(CONFIG_DIR))
            .ok_or_else(|| VibeError::Config("Could not determine config directory".to_string()))
    }

    fn load_toml_file<T: for<'de> Deserialize<'de> + Default>(path: &Path) -> Option<T> {
        if !path.exists() {
            return None;
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => Some(config),
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}", path.display(), e);
                    None
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn ensure_config_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir)
                .map_err(|e| VibeError::Config(format!("Failed to create config dir: {}", e)))?;
        }
        Ok(())
    }

    /// Write the default config file if none exists. Returns true if a file was written.
    pub fn write_default_config(&self) -> Result<bool> {
        self.ensure_config_dir()?;

        if self.config_path.exists() {
            return Ok(false);
        }
        let content = toml::to_string_pretty(&AppConfig::default())
            .map_err(|e| VibeError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(&self.config_path, content)
            .map_err(|e| VibeError::Config(format!("Failed to write config: {}", e)))?;
        Ok(true)
    }
}
