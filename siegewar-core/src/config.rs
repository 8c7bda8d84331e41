use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Default edge length of a town unit, in blocks.
pub const DEFAULT_TOWN_BLOCK_SIZE: u32 = 16;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("town_block_size must be at least 1")]
    ZeroTownBlockSize,
}

/// Siege-war rule toggles.
///
/// Every field is optional in the settings file; missing ones fall back to
/// the defaults below (all actions enabled, 16-block town units).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiegeWarSettings {
    pub attack_enabled: bool,
    pub abandon_enabled: bool,
    pub surrender_enabled: bool,
    pub invade_enabled: bool,
    pub plunder_enabled: bool,
    /// Edge length of a town unit in blocks. Also the abandon proximity radius.
    pub town_block_size: u32,
}

impl Default for SiegeWarSettings {
    fn default() -> Self {
        Self {
            attack_enabled: true,
            abandon_enabled: true,
            surrender_enabled: true,
            invade_enabled: true,
            plunder_enabled: true,
            town_block_size: DEFAULT_TOWN_BLOCK_SIZE,
        }
    }
}

impl SiegeWarSettings {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.town_block_size == 0 {
            return Err(ConfigError::ZeroTownBlockSize);
        }
        Ok(())
    }
}

/// Source of the current settings.
///
/// Read on every evaluation so that reloaded settings apply to the next
/// block placement without rebuilding the classifier.
pub trait SettingsSource {
    fn settings(&self) -> SiegeWarSettings;
}

impl SettingsSource for SiegeWarSettings {
    fn settings(&self) -> SiegeWarSettings {
        *self
    }
}

/// Shared, reloadable settings handle.
#[derive(Debug, Clone, Default)]
pub struct SharedSettings {
    inner: Arc<RwLock<SiegeWarSettings>>,
}

impl SharedSettings {
    pub fn new(settings: SiegeWarSettings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(settings)),
        }
    }

    pub fn replace(&self, settings: SiegeWarSettings) {
        match self.inner.write() {
            Ok(mut guard) => *guard = settings,
            Err(poisoned) => *poisoned.into_inner() = settings,
        }
    }

    /// Reload from a JSON file. On error the current settings stay in place.
    pub fn reload_from(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let settings = SiegeWarSettings::from_json_file(path)?;
        self.replace(settings);
        log::info!("Reloaded siege-war settings: {:?}", settings);
        Ok(())
    }
}

impl SettingsSource for SharedSettings {
    fn settings(&self) -> SiegeWarSettings {
        match self.inner.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}
