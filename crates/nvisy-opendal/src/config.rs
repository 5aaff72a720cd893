//! Storage configuration types.

use serde::{Deserialize, Serialize};

// Re-export configs from backend modules
pub use crate::azblob::AzureBlobConfig;
pub use crate::dropbox::DropboxConfig;
pub use crate::s3::S3Config;

/// Storage backend configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum StorageConfig {
    /// Amazon S3 compatible storage.
    S3(S3Config),
    /// Azure Blob Storage.
    AzureBlob(AzureBlobConfig),
    /// Dropbox.
    Dropbox(DropboxConfig),
}

impl StorageConfig {
    /// Returns the backend name as a static string.
    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::S3(_) => "s3",
            Self::AzureBlob(_) => "azblob",
            Self::Dropbox(_) => "dropbox",
        }
    }
}
