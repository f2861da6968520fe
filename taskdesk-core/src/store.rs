//! Key-value persistence for JSON values.
//!
//! Reads fall back to a caller-supplied default without writing it; writes
//! replace the whole value under a key.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Key holding the full task collection.
pub const TASKS_KEY: &str = "app-tasks";
/// Key holding the full project collection.
pub const PROJECTS_KEY: &str = "app-projects";
/// Key holding the currently selected organization.
pub const ACTIVE_ORGANIZATION_KEY: &str = "active-company";

pub trait Store {
    /// Raw JSON text stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store every entry, or none of them.
    fn put_all(&self, entries: &[(&str, String)]) -> Result<()>;

    fn put(&self, key: &str, value: String) -> Result<()> {
        self.put_all(&[(key, value)])
    }

    fn read<T: DeserializeOwned>(&self, key: &str, default: T) -> Result<T> {
        match self.get(key)? {
            Some(raw) => serde_json::from_str(&raw)
                .with_context(|| format!("stored value for `{key}` is not valid")),
            None => Ok(default),
        }
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let json = encode(key, value)?;
        self.put(key, json)
    }
}

/// Serialize a value for storage under `key`.
pub fn encode<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<String> {
    serde_json::to_string(value).with_context(|| format!("failed to serialize `{key}`"))
}
