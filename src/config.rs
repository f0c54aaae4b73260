//! TOML file persistence for [`Settings`]
//!
//! ```toml
//! domain_id = 1
//! groups = [2, 5]
//! tags = []
//! username = "first_and_last_name"
//! roles = ["member"]
//! operations = ["create", "update", "block"]
//! user_readonly = true
//! ```

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::traits::SettingsStore;
use crate::types::*;

impl Settings {
    /// Parse settings from TOML text; absent keys take their defaults
    pub fn from_toml(content: &str) -> SyncResult<Self> {
        toml::from_str(content)
            .map_err(|e| SyncError::Config(format!("failed to parse settings: {e}")))
    }

    /// Render settings as TOML text
    pub fn to_toml(&self) -> SyncResult<String> {
        toml::to_string(self)
            .map_err(|e| SyncError::Config(format!("failed to serialize settings: {e}")))
    }

    /// Read settings from a TOML file
    pub fn from_file(path: &Path) -> SyncResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

/// [`SettingsStore`] backed by a single TOML file
#[derive(Debug, Clone)]
pub struct TomlSettingsStore {
    path: PathBuf,
}

impl TomlSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SettingsStore for TomlSettingsStore {
    async fn load(&self) -> SyncResult<Option<Settings>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Settings::from_toml(&content).map(Some),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no settings file");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&mut self, settings: &Settings) -> SyncResult<()> {
        let content = settings.to_toml()?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, content)?;
        debug!(path = %self.path.display(), "wrote settings file");
        Ok(())
    }
}
