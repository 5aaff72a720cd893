#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod azblob;
mod backend;
mod config;
mod dropbox;
mod error;
mod s3;

#[doc(hidden)]
pub mod prelude;

pub use backend::{FileMetadata, StorageBackend};
pub use config::StorageConfig;
pub use error::{StorageError, StorageResult};

/// Tracing target for storage operations.
pub const TRACING_TARGET: &str = "nvisy_opendal";
