//! Persisted record shapes. These are metadata projections only — file
//! bytes themselves live behind the storage collaborator
//! ([`nvisy_data::ObjectStorage`] or similar), never in a repository record.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata for one uploaded file, scoped to its owning user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: Uuid,
    pub user_id: String,
    pub original_name: String,
    pub mimetype: String,
    pub size: u64,
    /// Storage-collaborator key (the `publicId` from `ObjectStorage::upload`).
    pub storage_ref: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// One version of a file's content, created on re-upload or processing
/// producing a derivative (e.g. a compressed copy).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileVersionRecord {
    pub id: Uuid,
    pub file_id: Uuid,
    pub version: u32,
    pub storage_ref: String,
    pub size: u64,
    pub created_at: Timestamp,
}

/// A shareable link granting read access to a file without authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareLinkRecord {
    pub token: String,
    pub file_id: Uuid,
    pub created_by: String,
    pub expires_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl ShareLinkRecord {
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }
}

/// A user's storage quota and current usage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaRecord {
    pub user_id: String,
    pub limit_bytes: u64,
    pub used_bytes: u64,
}

impl QuotaRecord {
    pub fn remaining(&self) -> u64 {
        self.limit_bytes.saturating_sub(self.used_bytes)
    }

    pub fn has_capacity(&self, additional_bytes: u64) -> bool {
        self.used_bytes.saturating_add(additional_bytes) <= self.limit_bytes
    }
}

/// Terminal and in-flight states a persisted batch can be in, mirroring the
/// batch coordinator's own lifecycle so the two never disagree about
/// vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BatchRecordStatus {
    Created,
    Processing,
    Completed,
    CompletedWithErrors,
    Failed,
    Cancelled,
}

/// A persisted summary of one batch ingestion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRecord {
    pub batch_id: Uuid,
    pub user_id: String,
    pub description: Option<String>,
    pub status: BatchRecordStatus,
    pub total_files: u32,
    pub successful_files: u32,
    pub failed_files: u32,
    pub created_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}
