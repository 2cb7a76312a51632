use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use super::errors::SettingsError;
use super::types::Preferences;

/// Somewhere settled preferences are mirrored to.
pub trait SettingsSink: Send + Sync {
    fn write(&self, prefs: &Preferences) -> Result<(), SettingsError>;
}

/// The in-process configuration object other components read preferences
/// from. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct SharedSettings {
    prefs: Arc<RwLock<Preferences>>,
    writes: Arc<AtomicU64>,
}

impl SharedSettings {
    pub fn new(prefs: Preferences) -> Self {
        Self {
            prefs: Arc::new(RwLock::new(prefs)),
            writes: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn get(&self) -> Preferences {
        self.prefs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// How many times the preferences were written through [`SettingsSink`].
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }
}

impl SettingsSink for SharedSettings {
    fn write(&self, prefs: &Preferences) -> Result<(), SettingsError> {
        *self.prefs.write().unwrap_or_else(PoisonError::into_inner) = prefs.clone();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Preferences persisted as TOML, usually `~/.beacon/settings.toml`.
#[derive(Debug, Clone)]
pub struct TomlSettingsFile {
    path: PathBuf,
}

impl TomlSettingsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file, falling back to defaults when it doesn't exist.
    pub fn load(&self) -> Result<Preferences, SettingsError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(
                    event = "core.settings.load_defaulted",
                    path = %self.path.display(),
                );
                return Ok(Preferences::default());
            }
            Err(e) => return Err(e.into()),
        };
        toml::from_str(&content).map_err(|e| SettingsError::Parse {
            message: format!("'{}': {}", self.path.display(), e),
        })
    }
}

impl SettingsSink for TomlSettingsFile {
    fn write(&self, prefs: &Preferences) -> Result<(), SettingsError> {
        let content = toml::to_string_pretty(prefs).map_err(|e| SettingsError::Serialize {
            message: e.to_string(),
        })?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, content)?;
        Ok(())
    }
}
