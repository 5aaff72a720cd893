//! Prelude module for convenient imports.

pub use crate::backend::{FileMetadata, StorageBackend};
pub use crate::config::StorageConfig;
pub use crate::error::{StorageError, StorageResult};
