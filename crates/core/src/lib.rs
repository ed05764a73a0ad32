//! Core library for Taskbook
//!
//! This crate contains the task-management logic behind the app screens:
//! - Category and task repositories over a key-value store
//! - Task list filtering
//! - Per-status summary counts

pub mod category;
pub mod config;
pub mod error;
pub mod filter;
pub mod state;
pub mod storage;
pub mod summary;
pub mod task;

pub use config::Config;
pub use error::Error;
pub use state::AppState;
pub type Result<T> = std::result::Result<T, Error>;
