//! Durable storage for the bearer token.
//!
//! The token lives in a single TOML file under the config directory
//! (`~/.config/vibe-control/session.toml`) under the well-known key `token`.
//! It survives restarts on this machine and nothing more.

use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::CONFIG_DIR;
use crate::error::{Result, VibeError};

const SESSION_FILE: &str = "session.toml";

/// A secret value that is zeroed on drop
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Serialize for SecretString {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(SecretString)
    }
}

/// On-disk session record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    /// Version for forward compatibility
    #[serde(default = "default_version")]
    pub version: u32,
    pub token: SecretString,
    /// RFC 3339 timestamp of the last save
    #[serde(default)]
    pub saved_at: Option<String>,
}

fn default_version() -> u32 {
    1
}

impl SessionData {
    pub fn new(token: &SecretString) -> Self {
        Self {
            version: 1,
            token: token.clone(),
            saved_at: Some(chrono::Utc::now().to_rfc3339()),
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.token.expose().trim().is_empty()
    }
}

/// Reads and writes the session file.
///
/// `ephemeral()` gives a manager that never touches disk, for one-shot runs
/// and tests that do not care about persistence.
#[derive(Debug, Clone)]
pub struct SessionManager {
    session_path: Option<PathBuf>,
}

impl SessionManager {
    /// Create a new SessionManager using the default config directory
    pub fn new() -> Result<Self> {
        let config_dir = BaseDirs::new()
            .map(|dirs| dirs.config_dir().join(CONFIG_DIR))
            .ok_or_else(|| VibeError::Config("Could not determine config directory".to_string()))?;

        Ok(Self {
            session_path: Some(config_dir.join(SESSION_FILE)),
        })
    }

    /// Create a SessionManager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            session_path: Some(path),
        }
    }

    pub fn ephemeral() -> Self {
        Self { session_path: None }
    }

    pub fn session_path(&self) -> Option<&Path> {
        self.session_path.as_deref()
    }

    /// Load the stored token. Missing, unreadable or corrupt files all mean "no session".
    pub fn load(&self) -> Option<SecretString> {
        let path = self.session_path.as_ref()?;
        if !path.exists() {
            tracing::debug!("No session file found");
            return None;
        }

        match std::fs::read_to_string(path).map(Zeroizing::new) {
            Ok(content) => match toml::from_str::<SessionData>(&content) {
                Ok(data) if data.is_valid() => {
                    tracing::info!("Loaded stored session from {}", path.display());
                    Some(data.token)
                }
                Ok(_) => {
                    tracing::warn!("Session file has an empty token, ignoring");
                    None
                }
                Err(e) => {
                    tracing::warn!("Failed to parse session file: {}", e);
                    None
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read session file: {}", e);
                None
            }
        }
    }

    pub fn save(&self, token: &SecretString) -> Result<()> {
        let Some(path) = &self.session_path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    VibeError::Session(format!("Failed to create config dir: {}", e))
                })?;
            }
        }

        let content = toml::to_string_pretty(&SessionData::new(token))
            .map(Zeroizing::new)
            .map_err(|e| VibeError::Session(format!("Failed to serialize session: {}", e)))?;

        std::fs::write(path, content.as_bytes())
            .map_err(|e| VibeError::Session(format!("Failed to write session file: {}", e)))?;

        tracing::debug!("Saved session to {}", path.display());
        Ok(())
    }

    /// Delete the session file. Succeeds when there is nothing to delete.
    pub fn clear(&self) -> Result<()> {
        if let Some(path) = &self.session_path {
            if path.exists() {
                std::fs::remove_file(path)
                    .map_err(|e| VibeError::Session(format!("Failed to remove session file: {}", e)))?;
                tracing::info!("Cleared session file");
            }
        }
        Ok(())
    }

    pub fn exists(&self) -> bool {
        self.session_path.as_ref().is_some_and(|p| p.exists())
    }
}
