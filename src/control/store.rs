//! Key/value stores for saved control settings

use crate::core::{LoggerError, Result};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// String key/value storage used by [`ProviderControl`](super::ProviderControl)
/// to save and restore levels
pub trait SettingsStore: Send + Sync {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&self, key: &str);
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.lock().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) {
        self.items.lock().remove(key);
    }
}

/// Store persisted as one JSON object in a file
///
/// The file is read on every access and rewritten on every change, so
/// several processes can share it between runs. A missing file is an
/// empty store.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&self, items: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(items)?)?;
        Ok(())
    }
}

impl SettingsStore for FileStore {
    fn get_item(&self, key: &str) -> Option<String> {
        let _guard = self.lock.lock();
        match self.load() {
            Ok(mut items) => items.remove(key),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "cannot read settings file");
                None
            }
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock();
        let mut items = self
            .load()
            .map_err(|e| LoggerError::persistence(key, e.to_string()))?;
        items.insert(key.to_string(), value.to_string());
        self.store(&items)
            .map_err(|e| LoggerError::persistence(key, e.to_string()))
    }

    fn remove_item(&self, key: &str) {
        let _guard = self.lock.lock();
        let result = self.load().and_then(|mut items| {
            if items.remove(key).is_some() {
                self.store(&items)
            } else {
                Ok(())
            }
        });
        if let Err(e) = result {
            tracing::warn!(path = %self.path.display(), key, error = %e, "cannot update settings file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert_eq!(store.get_item("k"), None);
        store.set_item("k", "v").unwrap();
        assert_eq!(store.get_item("k").as_deref(), Some("v"));
        store.remove_item("k");
        assert_eq!(store.get_item("k"), None);
    }

    #[test]
    fn test_file_store_persists_between_instances() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("settings.json");

        let store = FileStore::new(&path);
        assert_eq!(store.get_item("a"), None);
        store.set_item("a", "1")?;
        store.set_item("b", "2")?;

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get_item("a").as_deref(), Some("1"));
        reopened.remove_item("a");
        assert_eq!(store.get_item("a"), None);
        assert_eq!(store.get_item("b").as_deref(), Some("2"));
        Ok(())
    }

    #[test]
    fn test_file_store_reports_corrupt_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json")?;

        let store = FileStore::new(&path);
        assert_eq!(store.get_item("a"), None);
        let err = store.set_item("a", "1").unwrap_err();
        assert!(matches!(err, LoggerError::Persistence { .. }));
        Ok(())
    }
}
