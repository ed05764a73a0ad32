//! Key-value storage adapter
//!
//! Repositories persist whole collections under a single key. The adapter
//! only needs `get` and `set`; it offers no transactions and no locking.

mod file;
mod memory;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::Result;

pub use file::FileKvStore;
pub use memory::MemoryKvStore;

/// Store key holding the serialized task collection
pub const TASKS_KEY: &str = "tasks";
/// Store key holding the serialized category collection
pub const CATEGORIES_KEY: &str = "categories";

/// Opaque string-valued key-value store
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`
    async fn set(&self, key: &str, value: String) -> Result<()>;
}

/// Load the raw entries of the collection stored under `key`.
///
/// A missing value, or one that is not a JSON array, yields an empty
/// collection. Only a failure of the store itself is reported.
pub async fn load_raw_collection(store: &dyn KeyValueStore, key: &str) -> Result<Vec<Value>> {
    let Some(raw) = store.get(key).await? else {
        return Ok(Vec::new());
    };

    match serde_json::from_str(&raw) {
        Ok(entries) => Ok(entries),
        Err(e) => {
            warn!("Discarding unparsable '{}' collection: {}", key, e);
            Ok(Vec::new())
        }
    }
}

/// Load a collection stored under `key`, decoding each entry on its own.
///
/// Entries that fail to decode are skipped; their siblings are kept.
pub async fn load_collection<T>(store: &dyn KeyValueStore, key: &str) -> Result<Vec<T>>
where
    T: DeserializeOwned,
{
    let entries = load_raw_collection(store, key).await?;
    Ok(entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!("Skipping unreadable '{}' entry {}: {}", key, index, e);
                None
            }
        })
        .collect())
}

/// Serialize `items` and replace the collection stored under `key`.
///
/// Serialization happens before the store is touched.
pub async fn save_collection<T>(store: &dyn KeyValueStore, key: &str, items: &[T]) -> Result<()>
where
    T: Serialize,
{
    let content = serde_json::to_string(items)?;
    store.set(key, content).await?;
    debug!("Persisted {} item(s) under '{}'", items.len(), key);
    Ok(())
}
