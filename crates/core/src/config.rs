//! Runtime configuration
//!
//! Values come from defaults, optionally overridden by environment variables.

use std::path::PathBuf;

use crate::category::CategoryIdPool;
use crate::error::Error;
use crate::Result;

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "TASKBOOK_DATA_DIR";
/// Environment variable overriding the category id pool size
pub const CATEGORY_POOL_SIZE_ENV: &str = "TASKBOOK_CATEGORY_POOL_SIZE";

const DEFAULT_DATA_DIR: &str = ".taskbook-data";

/// Configuration for [`crate::AppState`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding one JSON file per store key
    pub data_dir: PathBuf,
    /// Number of ids available to categories (ids `1..=size`)
    pub category_pool_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            category_pool_size: CategoryIdPool::DEFAULT_SIZE,
        }
    }
}

impl Config {
    /// Build a config from the process environment, falling back to defaults
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = non_blank(lookup(DATA_DIR_ENV)) {
            config.data_dir = PathBuf::from(dir);
        }

        if let Some(raw) = non_blank(lookup(CATEGORY_POOL_SIZE_ENV)) {
            let size: u32 = raw.parse().map_err(|_| {
                Error::InvalidConfig(format!(
                    "{} must be a positive integer, got '{}'",
                    CATEGORY_POOL_SIZE_ENV, raw
                ))
            })?;
            if size == 0 {
                return Err(Error::InvalidConfig(format!(
                    "{} must be at least 1",
                    CATEGORY_POOL_SIZE_ENV
                )));
            }
            config.category_pool_size = size;
        }

        Ok(config)
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn with_category_pool_size(mut self, size: u32) -> Self {
        self.category_pool_size = size;
        self
    }

    /// The category id pool described by this config
    pub fn category_pool(&self) -> CategoryIdPool {
        CategoryIdPool::new(self.category_pool_size)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.category_pool_size, 4);
    }

    #[test]
    fn test_overrides_from_environment() {
        let config = Config::from_lookup(lookup_from(&[
            (DATA_DIR_ENV, "/tmp/taskbook"),
            (CATEGORY_POOL_SIZE_ENV, " 8 "),
        ]))
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/taskbook"));
        assert_eq!(config.category_pool_size, 8);
    }

    #[test]
    fn test_blank_values_fall_back() {
        let config = Config::from_lookup(lookup_from(&[
            (DATA_DIR_ENV, "   "),
            (CATEGORY_POOL_SIZE_ENV, ""),
        ]))
        .unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_rejects_bad_pool_size() {
        let err = Config::from_lookup(lookup_from(&[(CATEGORY_POOL_SIZE_ENV, "four")])).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));

        let err = Config::from_lookup(lookup_from(&[(CATEGORY_POOL_SIZE_ENV, "0")])).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }
}
