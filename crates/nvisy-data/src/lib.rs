//! Foundational traits for data I/O operations.
//!
//! This crate provides the core storage-backend abstractions shared across
//! `nvisy` integrations: reading and writing bytes or byte streams under a
//! path, independent of the concrete backend.

#![forbid(unsafe_code)]

mod error;
mod input;
mod object_storage;
mod output;

pub use error::{DataError, DataErrorKind, DataResult};
pub use input::{DataInput, InputContext};
pub use object_storage::{
    ObjectStorage, StorageMetadata, ThumbnailUrlOptions, UploadOptions, UploadResult,
};
pub use output::{DataOutput, OutputContext};
