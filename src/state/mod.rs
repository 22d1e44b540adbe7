//! Shared state stores.
//!
//! A state store is a mutable key→value map used for flag-based routing and
//! for carrying gate verdicts across execution boundaries. Two variants:
//!
//! - [`MemoryState`] — process-lifetime map, last write wins
//! - [`DurableState`] — file-backed, instance-isolated (see [`durable`])
//!
//! Both implement the [`StateStore`] trait. There is no locking or
//! versioning; each orchestration run is expected to use its own instance.

pub mod durable;

pub use durable::DurableState;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;

use crate::bundle::value_truthy;
use crate::error::Result;

/// Shared handle to a flag store.
///
/// Execution is single-threaded; steps capture a clone of this handle to
/// read and write flags while the engine holds another.
pub type SharedFlags = Rc<RefCell<MemoryState>>;

/// Mutable key→value store.
pub trait StateStore {
    /// Set `key` to `value`. Last write wins.
    fn update(&mut self, key: &str, value: Value) -> Result<()>;

    /// Fetch the value for `key`; absence is not an error.
    fn fetch(&self, key: &str) -> Result<Option<Value>>;

    /// Remove `key`; absence is a no-op.
    fn delete(&mut self, key: &str) -> Result<()>;

    /// Remove every key this store has written.
    fn delete_all(&mut self) -> Result<()>;
}

/// In-memory state with process lifetime.
#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    entries: HashMap<String, Value>,
}

impl MemoryState {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap the store in a shared handle for flag use.
    pub fn into_shared(self) -> SharedFlags {
        Rc::new(RefCell::new(self))
    }

    /// Set `key` to `value`.
    pub fn set(&mut self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value);
    }

    /// Get the value for `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Remove `key`.
    pub fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    /// JSON truthiness of the value under `key`; absent keys are falsy.
    pub fn truthy(&self, key: &str) -> bool {
        self.entries.get(key).map(value_truthy).unwrap_or(false)
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl StateStore for MemoryState {
    fn update(&mut self, key: &str, value: Value) -> Result<()> {
        self.set(key, value);
        Ok(())
    }

    fn fetch(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.get(key).cloned())
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        self.remove(key);
        Ok(())
    }

    fn delete_all(&mut self) -> Result<()> {
        self.entries.clear();
        Ok(())
    }
}
