//! File-based key-value store
//!
//! Stores each key as `<dir>/<key>.json`.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::KeyValueStore;
use crate::{Error, Result};

/// Key-value store backed by one file per key
#[derive(Debug, Clone)]
pub struct FileKvStore {
    /// Directory holding the value files
    dir: PathBuf,
}

impl FileKvStore {
    /// Create a new FileKvStore
    ///
    /// The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(Error::StorageUnavailable(format!(
                "Invalid store key: '{}'",
                key
            )));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl KeyValueStore for FileKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::StorageUnavailable(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let path = self.path_for(key)?;

        // Ensure parent directory exists
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            Error::StorageUnavailable(format!("Failed to create directory: {}", e))
        })?;

        // Write beside the target, then swap it in
        let tmp_path = self.dir.join(format!(".{}.json.tmp", key));
        tokio::fs::write(&tmp_path, value).await.map_err(|e| {
            Error::StorageUnavailable(format!("Failed to write {}: {}", tmp_path.display(), e))
        })?;
        tokio::fs::rename(&tmp_path, &path).await.map_err(|e| {
            Error::StorageUnavailable(format!("Failed to replace {}: {}", path.display(), e))
        })?;

        debug!("Wrote store key '{}' to {}", key, path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKvStore::new(temp_dir.path());

        assert_eq!(store.get("tasks").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_creates_directory_and_file() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("nested").join("data");
        let store = FileKvStore::new(&dir);

        store.set("categories", "[]".to_string()).await.unwrap();

        assert!(dir.join("categories.json").exists());
        assert!(!dir.join(".categories.json.tmp").exists());
        assert_eq!(store.get("categories").await.unwrap(), Some("[]".to_string()));
    }

    #[tokio::test]
    async fn test_persistence_across_instances() {
        let temp_dir = TempDir::new().unwrap();

        {
            let store = FileKvStore::new(temp_dir.path());
            store.set("tasks", r#"[{"title":"a"}]"#.to_string()).await.unwrap();
        }

        let store = FileKvStore::new(temp_dir.path());
        assert_eq!(
            store.get("tasks").await.unwrap(),
            Some(r#"[{"title":"a"}]"#.to_string())
        );
    }

    #[tokio::test]
    async fn test_rejects_path_like_keys() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKvStore::new(temp_dir.path());

        for key in ["", "../tasks", "a/b", "tasks.json"] {
            match store.get(key).await {
                Err(Error::StorageUnavailable(msg)) => assert!(msg.contains("Invalid store key")),
                other => panic!("Expected StorageUnavailable for {:?}, got: {:?}", key, other),
            }
        }
    }
}
