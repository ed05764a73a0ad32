//! Category persistent store
//!
//! Every mutation reads the whole `categories` collection, changes it in
//! memory and writes it back. Calls on one `CategoryStore` (and its clones)
//! are serialized; separate stores sharing the same key-value store are
//! last-writer-wins.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use crate::error::Error;
use crate::storage::{load_collection, save_collection, KeyValueStore, CATEGORIES_KEY};
use crate::Result;

use super::model::{Category, CategoryIdPool};

/// Category repository over a key-value store
#[derive(Clone)]
pub struct CategoryStore {
    store: Arc<dyn KeyValueStore>,
    pool: CategoryIdPool,
    /// Serializes read-modify-write cycles
    lock: Arc<Mutex<()>>,
}

impl CategoryStore {
    pub fn new(store: Arc<dyn KeyValueStore>, pool: CategoryIdPool) -> Self {
        Self {
            store,
            pool,
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn pool(&self) -> CategoryIdPool {
        self.pool
    }

    /// List all categories in stored order
    pub async fn list(&self) -> Result<Vec<Category>> {
        load_collection(self.store.as_ref(), CATEGORIES_KEY).await
    }

    /// Get a category by ID
    pub async fn get(&self, id: u32) -> Result<Option<Category>> {
        Ok(self.list().await?.into_iter().find(|c| c.id == id))
    }

    /// Category names, for the filter picker
    pub async fn names(&self) -> Result<Vec<String>> {
        Ok(self.list().await?.into_iter().map(|c| c.name).collect())
    }

    /// Add a category under the lowest free id of the pool
    pub async fn add(&self, name: &str) -> Result<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::EmptyName);
        }

        let _guard = self.lock.lock().await;
        let mut categories = self.list().await?;

        let id = self.pool.allocate(&categories).ok_or(Error::NoIdAvailable {
            pool_size: self.pool.size(),
        })?;
        let category = Category::new(id, name);
        categories.push(category.clone());

        self.persist(&categories).await?;
        info!("Added category {} '{}'", category.id, category.name);
        Ok(category)
    }

    /// Rename a category in place
    ///
    /// Tasks keep the category names they were saved with.
    pub async fn rename(&self, id: u32, new_name: &str) -> Result<Category> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(Error::EmptyName);
        }

        let _guard = self.lock.lock().await;
        let mut categories = self.list().await?;

        let category = categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| Error::NotFound(format!("Category {} not found", id)))?;
        category.name = new_name.to_string();
        let renamed = category.clone();

        self.persist(&categories).await?;
        info!("Renamed category {} to '{}'", renamed.id, renamed.name);
        Ok(renamed)
    }

    /// Delete a category by ID
    ///
    /// Tasks that carry the category's name are left untouched.
    pub async fn remove(&self, id: u32) -> Result<Category> {
        let _guard = self.lock.lock().await;
        let mut categories = self.list().await?;

        let index = categories
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| Error::NotFound(format!("Category {} not found", id)))?;
        let removed = categories.remove(index);

        self.persist(&categories).await?;
        info!("Removed category {} '{}'", removed.id, removed.name);
        Ok(removed)
    }

    /// Map selected ids to category names, in the given order.
    ///
    /// Ids without a live category are skipped.
    pub async fn resolve_names(&self, ids: &[u32]) -> Result<Vec<String>> {
        let categories = self.list().await?;
        Ok(ids
            .iter()
            .filter_map(|id| categories.iter().find(|c| c.id == *id))
            .map(|c| c.name.clone())
            .collect())
    }

    /// Ids of the live categories carrying the given names
    pub async fn ids_for_names(&self, names: &[String]) -> Result<Vec<u32>> {
        let categories = self.list().await?;
        Ok(names
            .iter()
            .filter_map(|name| categories.iter().find(|c| &c.name == name))
            .map(|c| c.id)
            .collect())
    }

    async fn persist(&self, categories: &[Category]) -> Result<()> {
        save_collection(self.store.as_ref(), CATEGORIES_KEY, categories).await
    }
}
