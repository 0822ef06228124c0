//! Preference Stores
//!
//! Boolean display preferences behind an explicit store interface.
//! Changes are published on a broadcast channel so views can re-render.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tokio::sync::broadcast;

use super::SettingsError;

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// A preference was written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceChange {
    pub key: String,
    pub enabled: bool,
}

/// Key/value store of boolean preferences
pub trait PreferenceStore: Send + Sync {
    /// Current value, `false` when never set
    fn get(&self, key: &str) -> bool;

    /// Write a value and notify subscribers
    fn set(&self, key: &str, enabled: bool) -> Result<(), SettingsError>;

    /// Receive every subsequent change
    fn subscribe(&self) -> broadcast::Receiver<PreferenceChange>;

    /// Flip a value, returning the new one
    fn toggle(&self, key: &str) -> Result<bool, SettingsError> {
        let enabled = !self.get(key);
        self.set(key, enabled)?;
        Ok(enabled)
    }
}

/// Process-local store
pub struct MemoryPreferenceStore {
    values: RwLock<BTreeMap<String, bool>>,
    changes: broadcast::Sender<PreferenceChange>,
}

impl Default for MemoryPreferenceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            values: RwLock::new(BTreeMap::new()),
            changes,
        }
    }

    /// Snapshot of every stored value
    pub fn values(&self) -> BTreeMap<String, bool> {
        self.values.read().map(|v| v.clone()).unwrap_or_default()
    }

    /// Write a value only if `before_commit` accepts the resulting map.
    ///
    /// Nothing changes and nobody is notified when it fails.
    fn set_checked<F>(&self, key: &str, enabled: bool, before_commit: F) -> Result<(), SettingsError>
    where
        F: FnOnce(&BTreeMap<String, bool>) -> Result<(), SettingsError>,
    {
        {
            let mut values = self
                .values
                .write()
                .map_err(|e| SettingsError::Lock(e.to_string()))?;
            let mut candidate = values.clone();
            candidate.insert(key.to_string(), enabled);
            before_commit(&candidate)?;
            *values = candidate;
        }

        // No receivers is fine
        let _ = self.changes.send(PreferenceChange {
            key: key.to_string(),
            enabled,
        });
        Ok(())
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> bool {
        self.values
            .read()
            .ok()
            .and_then(|v| v.get(key).copied())
            .unwrap_or(false)
    }

    fn set(&self, key: &str, enabled: bool) -> Result<(), SettingsError> {
        self.set_checked(key, enabled, |_| Ok(()))
    }

    fn subscribe(&self) -> broadcast::Receiver<PreferenceChange> {
        self.changes.subscribe()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PreferenceFile {
    #[serde(default)]
    preferences: BTreeMap<String, bool>,
}

/// Store persisted as a JSON file, rewritten on every change
pub struct FilePreferenceStore {
    path: PathBuf,
    inner: MemoryPreferenceStore,
}

impl FilePreferenceStore {
    /// Open the store at `path`, starting empty when the file is missing
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();
        let inner = MemoryPreferenceStore::new();

        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let file: PreferenceFile = serde_json::from_str(&content)?;
            *inner
                .values
                .write()
                .map_err(|e| SettingsError::Lock(e.to_string()))? = file.preferences;
        }

        tracing::debug!(path = %path.display(), "Opened preference store");
        Ok(Self { path, inner })
    }

    /// Default location under the user's config directory
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|p| p.join("chaintvl").join("preferences.json"))
            .unwrap_or_else(|| PathBuf::from("./preferences.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn values(&self) -> BTreeMap<String, bool> {
        self.inner.values()
    }

    fn write_file(&self, preferences: &BTreeMap<String, bool>) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = PreferenceFile {
            preferences: preferences.clone(),
        };
        std::fs::write(&self.path, serde_json::to_string_pretty(&file)?)?;
        Ok(())
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str) -> bool {
        self.inner.get(key)
    }

    fn set(&self, key: &str, enabled: bool) -> Result<(), SettingsError> {
        self.inner
            .set_checked(key, enabled, |values| self.write_file(values))
    }

    fn subscribe(&self) -> broadcast::Receiver<PreferenceChange> {
        self.inner.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_store_defaults_false() {
        let store = MemoryPreferenceStore::new();
        assert!(!store.get("staking"));

        store.set("staking", true).unwrap();
        assert!(store.get("staking"));
        assert!(!store.toggle("staking").unwrap());
        assert!(!store.get("staking"));
    }

    #[test]
    fn test_subscribers_see_changes() {
        let store = MemoryPreferenceStore::new();
        let mut rx = store.subscribe();

        store.set("pool2", true).unwrap();
        store.toggle("pool2").unwrap();

        assert_eq!(
            rx.try_recv().unwrap(),
            PreferenceChange {
                key: "pool2".to_string(),
                enabled: true
            }
        );
        assert!(!rx.try_recv().unwrap().enabled);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_file_store_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.json");

        {
            let store = FilePreferenceStore::open(&path).unwrap();
            store.set("darkmode", true).unwrap();
            store.set("borrowed", false).unwrap();
        }

        let reopened = FilePreferenceStore::open(&path).unwrap();
        assert!(reopened.get("darkmode"));
        assert!(!reopened.get("borrowed"));
        assert_eq!(reopened.values().len(), 2);
    }

    #[test]
    fn test_file_store_failed_write_changes_nothing() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        let store = FilePreferenceStore::open(blocker.join("prefs.json")).unwrap();
        let mut rx = store.subscribe();

        assert!(matches!(store.set("staking", true), Err(SettingsError::Io(_))));
        assert!(!store.get("staking"));
        assert!(store.values().is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            FilePreferenceStore::open(&path),
            Err(SettingsError::Serde(_))
        ));
    }
}
