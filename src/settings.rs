//! Operator settings — unit forward recipients and the calendar target.
//!
//! Kept in a JSON file so the admin API can change them at runtime. A
//! missing file means defaults; nothing is written until the first save.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::ConfigError;
use crate::intake::Unit;
use crate::leads::calendar::DEFAULT_CALENDAR_ID;

/// Settings persisted to the settings file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Who receives Ijui leads, addressed on the channel the lead came in on:
    /// a chat id for Telegram, a phone number for phone-addressed transports.
    pub ijui_number: String,
    /// Who receives Catuipe leads; same format as `ijui_number`.
    pub catuipe_number: String,
    pub calendar_id: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ijui_number: String::new(),
            catuipe_number: String::new(),
            calendar_id: DEFAULT_CALENDAR_ID.to_string(),
        }
    }
}

impl Settings {
    /// Configured forward recipient for a unit, if any.
    pub fn unit_number(&self, unit: Unit) -> Option<&str> {
        let number = match unit {
            Unit::Ijui => &self.ijui_number,
            Unit::Catuipe => &self.catuipe_number,
        };
        let number = number.trim();
        (!number.is_empty()).then_some(number)
    }
}

/// File-backed settings with an in-memory copy.
pub struct SettingsStore {
    path: PathBuf,
    current: RwLock<Settings>,
}

impl SettingsStore {
    /// Load settings from `path`, or start from defaults if the file is absent.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let current = read_settings(&path).await?;
        Ok(Self {
            path,
            current: RwLock::new(current),
        })
    }

    /// Store that never touches disk until `save` is called.
    pub fn in_memory(path: impl Into<PathBuf>, settings: Settings) -> Self {
        Self {
            path: path.into(),
            current: RwLock::new(settings),
        }
    }

    pub async fn get(&self) -> Settings {
        self.current.read().await.clone()
    }

    /// Replace the settings and persist them.
    pub async fn save(&self, settings: Settings) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(&settings).map_err(|e| ConfigError::ParseError {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;
        tokio::fs::write(&self.path, json).await?;

        *self.current.write().await = settings;
        tracing::info!(path = %self.path.display(), "Settings saved");
        Ok(())
    }
}

async fn read_settings(path: &Path) -> Result<Settings, ConfigError> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "No settings file, using defaults");
            return Ok(Settings::default());
        }
        Err(e) => return Err(ConfigError::Io(e)),
    };

    serde_json::from_str(&raw).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}
