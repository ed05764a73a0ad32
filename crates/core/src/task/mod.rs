//! Task module
//!
//! This module contains task-related types and the task repository.

mod model;
mod store;

pub use model::{StatusValue, Task, TaskField, TaskInput, TaskStatus};
pub use store::TaskStore;
