//! Durable, instance-isolated state storage.
//!
//! Each [`DurableState`] carries a randomly generated instance identifier
//! and a base directory (created on first use). Every key is namespaced by
//! the identifier when persisted — one file per (instance, key) — so
//! multiple instances over the same directory never collide. Absence of a
//! file means "no value", never an error.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::StateStore;
use crate::error::{Result, StepgateError};

/// On-disk envelope for one persisted value.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedEntry {
    /// Schema version for migration.
    version: u32,
    /// Instance that wrote the entry.
    instance: String,
    /// Logical key.
    key: String,
    /// When the entry was written.
    written_at: DateTime<Utc>,
    /// The stored value.
    value: Value,
}

/// File-backed state store isolated per instance.
#[derive(Debug, Clone)]
pub struct DurableState {
    instance: String,
    dir: PathBuf,
}

impl DurableState {
    /// Current entry schema version.
    pub const CURRENT_VERSION: u32 = 1;

    /// Create a store over `dir` with a fresh random instance identifier.
    ///
    /// The directory is created if absent.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            instance: Uuid::new_v4().simple().to_string(),
            dir,
        })
    }

    /// This instance's identifier.
    pub fn instance_id(&self) -> &str {
        &self.instance
    }

    /// The backing directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key` for this instance.
    fn key_path(&self, key: &str) -> PathBuf {
        // Keys are logical names; anything outside [A-Za-z0-9_-] is mapped
        // to '_' so the file name stays flat.
        let safe: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}-{}.yml", self.instance, safe))
    }

    fn instance_prefix(&self) -> String {
        format!("{}-", self.instance)
    }
}

impl StateStore for DurableState {
    /// Persist `value` under `key` using atomic write.
    ///
    /// Uses the write-to-temp-then-rename pattern so entries are never
    /// partially written.
    fn update(&mut self, key: &str, value: Value) -> Result<()> {
        let entry = PersistedEntry {
            version: Self::CURRENT_VERSION,
            instance: self.instance.clone(),
            key: key.to_string(),
            written_at: Utc::now(),
            value,
        };

        let content = serde_yaml::to_string(&entry).map_err(|e| StepgateError::StateEntry {
            key: key.to_string(),
            message: e.to_string(),
        })?;

        let path = self.key_path(key);
        let temp_path = path.with_extension("yml.tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, &path)?;

        Ok(())
    }

    fn fetch(&self, key: &str) -> Result<Option<Value>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        let entry: PersistedEntry =
            serde_yaml::from_str(&content).map_err(|e| StepgateError::StateEntry {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        Ok(Some(entry.value))
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        let path = self.key_path(key);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    /// Remove every file carrying this instance's prefix.
    fn delete_all(&mut self) -> Result<()> {
        let prefix = self.instance_prefix();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            if name.to_string_lossy().starts_with(&prefix) {
                fs::remove_file(entry.path())?;
            }
        }
        Ok(())
    }
}
