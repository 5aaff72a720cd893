//! Object storage trait: the minimal surface a file-processing pipeline
//! needs from a cloud storage backend (upload, delete, URL generation).
//!
//! This is deliberately narrower than [`crate::DataInput`] / [`crate::DataOutput`]:
//! those traits model raw path-addressed byte I/O, while [`ObjectStorage`]
//! models the richer "upload a file, get back a public id and URL" contract
//! that object-storage services (S3, Cloudinary-style transformation APIs,
//! ...) expose.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::DataResult;

/// Options accepted by [`ObjectStorage::upload`].
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    /// Logical folder/prefix to upload under.
    pub folder: Option<String>,
    /// Whether the backend should attempt to return a passthrough buffer to
    /// avoid a redundant download by the caller.
    pub return_buffer: bool,
}

/// Result of [`ObjectStorage::upload`].
#[derive(Debug, Clone)]
pub struct UploadResult {
    /// Backend-assigned identifier for the stored object.
    pub public_id: String,
    /// A URL suitable for direct (possibly time-limited) access.
    pub secure_url: String,
    /// Size of the stored object in bytes.
    pub size: u64,
    /// Normalized format/extension, e.g. "jpeg" or "pdf".
    pub format: Option<String>,
    /// Coarse resource type, e.g. "image", "raw".
    pub resource_type: String,
    /// Pixel width, when the backend can determine it (typically images).
    pub width: Option<u32>,
    /// Pixel height, when the backend can determine it (typically images).
    pub height: Option<u32>,
    /// Passthrough of the uploaded bytes, when `UploadOptions::return_buffer`
    /// was set and the backend has them on hand.
    pub buffer: Option<Bytes>,
}

/// Options accepted by [`ObjectStorage::thumbnail_url`].
#[derive(Debug, Clone, Default)]
pub struct ThumbnailUrlOptions {
    /// Desired thumbnail width in pixels.
    pub width: Option<u32>,
    /// Desired thumbnail height in pixels.
    pub height: Option<u32>,
}

/// Metadata returned by [`ObjectStorage::get_metadata`].
#[derive(Debug, Clone)]
pub struct StorageMetadata {
    /// Size in bytes.
    pub size: u64,
    /// MIME type, if known to the backend.
    pub content_type: Option<String>,
    /// Last modification time, if known to the backend.
    pub last_modified: Option<jiff::Timestamp>,
}

/// The storage collaborator a file-processing pipeline depends on.
///
/// Implementations must be retry-safe: `upload` may be called again after a
/// transient failure without corrupting prior state.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Uploads a buffer, returning a backend-assigned identifier and URL.
    async fn upload(
        &self,
        buffer: Bytes,
        original_name: &str,
        mimetype: &str,
        opts: UploadOptions,
    ) -> DataResult<UploadResult>;

    /// Deletes a previously uploaded object.
    async fn delete(&self, public_id: &str, resource_type: &str) -> DataResult<()>;

    /// Returns a URL for a thumbnail rendition of the object, if the backend
    /// supports server-side transformation.
    async fn thumbnail_url(
        &self,
        public_id: &str,
        opts: ThumbnailUrlOptions,
    ) -> DataResult<Option<String>>;

    /// Returns a URL suitable for downloading the object, optionally forcing
    /// a particular filename in the response.
    async fn download_url(
        &self,
        public_id: &str,
        resource_type: &str,
        filename: Option<&str>,
    ) -> DataResult<String>;

    /// Returns metadata for a previously uploaded object.
    async fn get_metadata(&self, public_id: &str, resource_type: &str)
    -> DataResult<StorageMetadata>;
}
