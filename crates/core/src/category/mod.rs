//! Category module
//!
//! Categories are a small user-managed lookup list. Tasks reference them by
//! name, captured when the task is saved.

mod model;
mod store;

pub use model::*;
pub use store::*;
