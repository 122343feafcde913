//! File-backed key-value cache.
//!
//! Stores a single JSON file containing a map of string keys to string values.
//! The file lives in a per-user configuration directory unless a path is given,
//! and is read once on open and rewritten synchronously on every mutation.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use turn_nav_lib::ports::{KeyValueStore, StorageError, StorageResult};

pub struct FileStorage {
    /// Path to the backing JSON file.
    path: PathBuf,
    /// In-memory copy of key -> value
    inner: Mutex<HashMap<String, String>>,
}

impl FileStorage {
    /// Pick the cache file for the current user.
    /// - On Windows: %APPDATA%/TurnNav/cache.json
    /// - Else: $HOME/.config/turn-nav/cache.json
    fn default_storage_path() -> PathBuf {
        if cfg!(windows)
            && let Ok(appdata) = std::env::var("APPDATA")
        {
            return Path::new(&appdata).join("TurnNav").join("cache.json");
        }

        if let Ok(home) = std::env::var("HOME") {
            return Path::new(&home)
                .join(".config")
                .join("turn-nav")
                .join("cache.json");
        }

        Path::new(".").join("turn-nav-cache.json")
    }

    pub fn new_with_path(path: Option<PathBuf>) -> StorageResult<Self> {
        let path = path.unwrap_or_else(Self::default_storage_path);

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| {
                StorageError::Io(format!("Failed to create cache directory: {e}"))
            })?;
        }

        let mut map = HashMap::new();
        if path.exists() {
            let text = fs::read_to_string(&path)
                .map_err(|e| StorageError::Io(format!("Failed to read cache file: {e}")))?;
            if !text.trim().is_empty() {
                map = serde_json::from_str(&text).map_err(|e| {
                    StorageError::Json(format!("Failed to parse cache file: {e}"))
                })?;
            }
        }
        tracing::debug!("Opened cache {} with {} keys", path.display(), map.len());

        Ok(FileStorage {
            path,
            inner: Mutex::new(map),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, HashMap<String, String>>> {
        self.inner
            .lock()
            .map_err(|e| StorageError::Platform(format!("mutex poisoned: {e}")))
    }

    fn flush_locked(&self, locked: &HashMap<String, String>) -> StorageResult<()> {
        let text =
            serde_json::to_string_pretty(locked).map_err(|e| StorageError::Json(e.to_string()))?;
        fs::write(&self.path, text).map_err(|e| StorageError::Io(format!("write failed: {e}")))
    }
}

impl KeyValueStore for FileStorage {
    fn set_string(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut guard = self.lock()?;
        guard.insert(key.to_string(), value.to_string());
        self.flush_locked(&guard)
    }

    fn get_string(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let mut guard = self.lock()?;
        if guard.remove(key).is_some() {
            self.flush_locked(&guard)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use turn_nav_lib::ports::{load_json, save_json};

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("turn-nav-storage-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_values_survive_reopen() {
        let path = temp_path("reopen.json");
        let _ = fs::remove_file(&path);

        let storage = FileStorage::new_with_path(Some(path.clone())).unwrap();
        storage.set_string("voice_enabled", "false").unwrap();
        save_json(&storage, "selected_route", &2usize).unwrap();

        let reopened = FileStorage::new_with_path(Some(path.clone())).unwrap();
        assert_eq!(
            reopened.get_string("voice_enabled").unwrap().as_deref(),
            Some("false")
        );
        assert_eq!(load_json::<usize>(&reopened, "selected_route").unwrap(), Some(2));

        reopened.remove("voice_enabled").unwrap();
        let again = FileStorage::new_with_path(Some(path.clone())).unwrap();
        assert_eq!(again.get_string("voice_enabled").unwrap(), None);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_corrupted_file_is_reported() {
        let path = temp_path("corrupted.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            FileStorage::new_with_path(Some(path.clone())),
            Err(StorageError::Json(_))
        ));
        let _ = fs::remove_file(&path);
    }
}
