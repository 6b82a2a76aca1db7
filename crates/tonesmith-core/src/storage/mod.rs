//! Storage layer
//!
//! Handles persistence of the single JSON state document.
//!
//! ## Durability
//!
//! Every write replaces the whole document: serialize to `state.tmp`,
//! sync, then rename over `state.json`. Reads always go to disk, so there
//! is no cache to fall out of step with the committed file.

pub mod error;
pub mod persistence;

pub use error::{StorageError, StorageResult};
pub use persistence::{JsonPersistence, StorageStats};
