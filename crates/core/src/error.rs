//! Error types for the core library

use thiserror::Error;

use crate::task::TaskField;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Category name cannot be empty")]
    EmptyName,

    #[error("No category id available (pool of {pool_size} is exhausted)")]
    NoIdAvailable { pool_size: u32 },

    #[error("Missing or invalid fields: {}", format_fields(.0))]
    ValidationFailed(Vec<TaskField>),

    #[error("A task titled '{0}' already exists")]
    DuplicateTitle(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Whether the caller can fix the input and retry
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyName
                | Self::NoIdAvailable { .. }
                | Self::ValidationFailed(_)
                | Self::DuplicateTitle(_)
        )
    }
}

fn format_fields(fields: &[TaskField]) -> String {
    fields
        .iter()
        .map(|field| field.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
