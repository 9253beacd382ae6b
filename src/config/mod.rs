//! Persisted UI preferences
//!
//! The management page keeps one piece of state across reloads: the
//! chosen sort mode. It is stored as a small YAML file under the
//! platform config directory, scoped per installation. A missing or
//! unreadable file falls back to defaults, and persist failures are
//! logged rather than surfaced; the controller treats the write as
//! fire-and-forget.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::errors::{CoreError, CoreResult};
use crate::core::sort::{SortMode, SortModePersistence};

/// User preferences for the management surface
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UiPrefs {
    /// How the credential list is ordered
    pub sort_mode: SortMode,
}

/// Default preference file locations
pub struct PrefsPaths;

impl PrefsPaths {
    /// Config directory for this installation
    pub fn prefs_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lockbox")
    }

    /// Full path of the preference file
    pub fn prefs_file() -> PathBuf {
        Self::prefs_dir().join("prefs.yml")
    }
}

/// Loads and saves [`UiPrefs`] at a fixed path
#[derive(Debug, Clone)]
pub struct PrefsManager {
    path: PathBuf,
    prefs: UiPrefs,
}

impl PrefsManager {
    /// Open the preference file at the platform default location
    pub fn open_default() -> Self {
        Self::open(PrefsPaths::prefs_file())
    }

    /// Open a preference file at an explicit path
    ///
    /// A missing or unparseable file yields default preferences.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let prefs = match Self::read(&path) {
            Ok(prefs) => prefs,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "using default preferences");
                UiPrefs::default()
            }
        };

        Self { path, prefs }
    }

    /// The current preferences
    pub fn prefs(&self) -> &UiPrefs {
        &self.prefs
    }

    /// Write the current preferences to disk
    pub fn save(&self) -> CoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(&self.prefs)?;
        fs::write(&self.path, yaml)?;
        Ok(())
    }

    fn read(path: &Path) -> CoreResult<UiPrefs> {
        if !path.exists() {
            return Ok(UiPrefs::default());
        }

        let contents = fs::read_to_string(path)?;
        serde_yaml::from_str(&contents).map_err(CoreError::from)
    }
}

impl SortModePersistence for PrefsManager {
    fn load(&self) -> SortMode {
        self.prefs.sort_mode
    }

    fn persist(&mut self, mode: SortMode) {
        self.prefs.sort_mode = mode;
        if let Err(err) = self.save() {
            warn!(path = %self.path.display(), error = %err, "failed to persist sort mode");
        }
    }
}
