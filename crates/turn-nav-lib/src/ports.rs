//! Ports to the side-effecting collaborators
//!
//! - [`SpeechSink`] receives announcement text for text-to-speech.
//! - [`KeyValueStore`] is the string key/value cache used for preferences and
//!   the last directions response.
//!
//! The navigation core only talks to these traits so it can run against
//! in-memory doubles in tests and against platform backends in the application.

use serde::{Serialize, de::DeserializeOwned};
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

/// Text-to-speech collaborator
pub trait SpeechSink {
    fn speak(&self, text: &str);
}

/// Speech sink that only remembers what it was asked to say
#[derive(Debug, Default)]
pub struct RecordingSpeech {
    spoken: Mutex<Vec<String>>,
}

impl RecordingSpeech {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything spoken so far, oldest first
    pub fn spoken(&self) -> Vec<String> {
        match self.spoken.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl SpeechSink for RecordingSpeech {
    fn speak(&self, text: &str) {
        match self.spoken.lock() {
            Ok(mut guard) => guard.push(text.to_string()),
            Err(poisoned) => poisoned.into_inner().push(text.to_string()),
        }
    }
}

impl<S: SpeechSink + ?Sized> SpeechSink for &S {
    fn speak(&self, text: &str) {
        (**self).speak(text)
    }
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("Platform storage error: {0}")]
    Platform(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// String key/value cache
pub trait KeyValueStore: Send + Sync {
    /// Store a string value for a key.
    fn set_string(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Read a string value for a key. Returns Ok(None) when key is missing.
    fn get_string(&self, key: &str) -> StorageResult<Option<String>>;

    /// Remove a key (no-op if key does not exist).
    fn remove(&self, key: &str) -> StorageResult<()>;
}

/// Serialize `value` as JSON under `key`
pub fn save_json<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) -> StorageResult<()> {
    let text = serde_json::to_string(value).map_err(|e| StorageError::Json(e.to_string()))?;
    store.set_string(key, &text)
}

/// Read and deserialize the JSON stored under `key`
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> StorageResult<Option<T>> {
    match store.get_string(key)? {
        Some(text) => serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| StorageError::Json(e.to_string())),
        None => Ok(None),
    }
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StorageResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|e| StorageError::Platform(format!("memory store poisoned: {e}")))
    }
}

impl KeyValueStore for MemoryStore {
    fn set_string(&self, key: &str, value: &str) -> StorageResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get_string(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}
