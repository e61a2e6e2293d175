use anyhow::{anyhow, Result};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;
use tracing::warn;

// ─── Keys ────────────────────────────────────────────────────────────────────

pub const LAST_GROUP_KEY: &str = "lastGroupName";
pub const CACHED_INSTITUTES_KEY: &str = "CACHED_INSTITUTES";
pub const LAST_TEACHER_KEY: &str = "lastTeacherId";
pub const CACHED_TEACHERS_KEY: &str = "CACHED_TEACHERS";
pub const BETA_CONFIRM_KEY: &str = "betaConfirm";

// ─── Port ────────────────────────────────────────────────────────────────────

/// Best-effort key/value persistence. Nothing read from here is required for
/// correctness; every read has a default.
pub trait Storage {
    fn get_value(&self, key: &str) -> Option<Value>;
    fn set_value(&mut self, key: &str, value: Value);
}

pub trait StorageExt: Storage {
    fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get_value(key)
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or(default)
    }

    fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_value(key).and_then(|v| serde_json::from_value(v).ok())
    }

    fn set<T: Serialize>(&mut self, key: &str, value: &T) {
        match serde_json::to_value(value) {
            Ok(v) => self.set_value(key, v),
            Err(e) => warn!(key, error = %e, "could not serialize storage value"),
        }
    }
}

impl<S: Storage + ?Sized> StorageExt for S {}

// ─── File backend ────────────────────────────────────────────────────────────

fn storage_path() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("schedule-tui").join("storage.json"))
}

/// JSON object on disk, rewritten on every `set_value`.
pub struct FileStorage {
    path: Option<PathBuf>,
    values: Map<String, Value>,
}

impl FileStorage {
    pub fn open() -> Self {
        let path = storage_path();
        let values = path
            .as_ref()
            .and_then(|p| std::fs::read_to_string(p).ok())
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default();
        Self { path, values }
    }

    fn flush(&self) -> Result<()> {
        let path = self
            .path
            .as_ref()
            .ok_or_else(|| anyhow!("Could not determine data directory"))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get_value(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set_value(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
        if let Err(e) = self.flush() {
            warn!(key, error = %e, "saving storage failed");
        }
    }
}

// ─── In-memory backend ───────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryStorage {
    pub values: Map<String, Value>,
    pub writes: usize,
}

impl Storage for MemoryStorage {
    fn get_value(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set_value(&mut self, key: &str, value: Value) {
        self.writes += 1;
        self.values.insert(key.to_string(), value);
    }
}
