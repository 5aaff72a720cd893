//! Repository collaborator contracts.
//!
//! Every trait here is scoped by `userId` wherever the underlying entity is
//! owned by a user, mirroring how callers actually reach for these records:
//! "give me this user's files", never "give me file N regardless of owner".

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::RepositoryResult;
use crate::model::{BatchRecord, FileRecord, FileVersionRecord, QuotaRecord, ShareLinkRecord};

/// CRUD for file metadata.
#[async_trait]
pub trait FileRepository: Send + Sync {
    async fn create_file(&self, file: FileRecord) -> RepositoryResult<FileRecord>;

    async fn get_file(&self, user_id: &str, id: Uuid) -> RepositoryResult<FileRecord>;

    async fn list_files(&self, user_id: &str) -> RepositoryResult<Vec<FileRecord>>;

    async fn update_file(&self, file: FileRecord) -> RepositoryResult<FileRecord>;

    async fn delete_file(&self, user_id: &str, id: Uuid) -> RepositoryResult<()>;
}

/// Version history for a file's content.
#[async_trait]
pub trait VersionRepository: Send + Sync {
    async fn add_version(&self, version: FileVersionRecord) -> RepositoryResult<FileVersionRecord>;

    async fn list_versions(&self, file_id: Uuid) -> RepositoryResult<Vec<FileVersionRecord>>;

    async fn latest_version(&self, file_id: Uuid) -> RepositoryResult<Option<FileVersionRecord>>;
}

/// Unauthenticated share links granting access to a single file.
#[async_trait]
pub trait ShareLinkRepository: Send + Sync {
    async fn create_share_link(&self, link: ShareLinkRecord) -> RepositoryResult<ShareLinkRecord>;

    async fn get_share_link(&self, token: &str) -> RepositoryResult<ShareLinkRecord>;

    async fn revoke_share_link(&self, token: &str) -> RepositoryResult<()>;
}

/// Per-user storage quota tracking.
#[async_trait]
pub trait QuotaRepository: Send + Sync {
    async fn get_quota(&self, user_id: &str) -> RepositoryResult<QuotaRecord>;

    /// Atomically charges `bytes` against the user's quota, failing without
    /// side effects if that would exceed the limit.
    async fn reserve(&self, user_id: &str, bytes: u64) -> RepositoryResult<QuotaRecord>;

    /// Releases previously-reserved bytes, e.g. after a delete.
    async fn release(&self, user_id: &str, bytes: u64) -> RepositoryResult<QuotaRecord>;
}

/// Persistence for batch ingestion summaries.
#[async_trait]
pub trait BatchRepository: Send + Sync {
    async fn create_batch(&self, batch: BatchRecord) -> RepositoryResult<BatchRecord>;

    async fn update_batch(&self, batch: BatchRecord) -> RepositoryResult<BatchRecord>;

    async fn get_batch(&self, user_id: &str, batch_id: Uuid) -> RepositoryResult<BatchRecord>;

    async fn list_batches(&self, user_id: &str) -> RepositoryResult<Vec<BatchRecord>>;
}

/// The full set of persistence collaborators the orchestrator and batch
/// coordinator depend on. Implemented once by [`crate::memory::InMemoryRepository`];
/// a Postgres-backed implementation would implement all five traits on one
/// connection-pool-holding struct the same way.
pub trait Repository:
    FileRepository + VersionRepository + ShareLinkRepository + QuotaRepository + BatchRepository
{
}

impl<T> Repository for T where
    T: FileRepository + VersionRepository + ShareLinkRepository + QuotaRepository + BatchRepository
{
}
