//! In-memory default [`Repository`] implementation, suitable for tests and
//! single-process deployments.

use std::collections::HashMap;

use async_trait::async_trait;
use jiff::Timestamp;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{RepositoryError, RepositoryResult};
use crate::model::{BatchRecord, FileRecord, FileVersionRecord, QuotaRecord, ShareLinkRecord};
use crate::traits::{
    BatchRepository, FileRepository, QuotaRepository, ShareLinkRepository, VersionRepository,
};

/// Tracing target for quota/repository state changes worth surfacing.
const TRACING_TARGET: &str = "nvisy_repository::memory";

/// Quota handed to a user the first time they're seen, if the repository
/// was never told otherwise.
pub const DEFAULT_QUOTA_BYTES: u64 = 10 * 1024 * 1024 * 1024;

#[derive(Default)]
struct State {
    files: HashMap<Uuid, FileRecord>,
    versions: HashMap<Uuid, Vec<FileVersionRecord>>,
    shares: HashMap<String, ShareLinkRecord>,
    quotas: HashMap<String, QuotaRecord>,
    batches: HashMap<Uuid, BatchRecord>,
}

/// A `HashMap`-backed repository guarded by a single lock. Fine for tests
/// and small deployments; a real backend would shard this per entity or
/// delegate to a database instead.
pub struct InMemoryRepository {
    default_quota_bytes: u64,
    state: RwLock<State>,
}

impl InMemoryRepository {
    pub fn new(default_quota_bytes: u64) -> Self {
        Self {
            default_quota_bytes,
            state: RwLock::new(State::default()),
        }
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new(DEFAULT_QUOTA_BYTES)
    }
}

#[async_trait]
impl FileRepository for InMemoryRepository {
    async fn create_file(&self, file: FileRecord) -> RepositoryResult<FileRecord> {
        let mut state = self.state.write().await;
        if state.files.contains_key(&file.id) {
            return Err(RepositoryError::already_exists("file", file.id));
        }
        state.files.insert(file.id, file.clone());
        Ok(file)
    }

    async fn get_file(&self, user_id: &str, id: Uuid) -> RepositoryResult<FileRecord> {
        let state = self.state.read().await;
        state
            .files
            .get(&id)
            .filter(|f| f.user_id == user_id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("file", id))
    }

    async fn list_files(&self, user_id: &str) -> RepositoryResult<Vec<FileRecord>> {
        let state = self.state.read().await;
        Ok(state
            .files
            .values()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update_file(&self, file: FileRecord) -> RepositoryResult<FileRecord> {
        let mut state = self.state.write().await;
        if !state.files.contains_key(&file.id) {
            return Err(RepositoryError::not_found("file", file.id));
        }
        state.files.insert(file.id, file.clone());
        Ok(file)
    }

    async fn delete_file(&self, user_id: &str, id: Uuid) -> RepositoryResult<()> {
        let mut state = self.state.write().await;
        match state.files.get(&id) {
            Some(f) if f.user_id == user_id => {
                state.files.remove(&id);
                state.versions.remove(&id);
                Ok(())
            }
            _ => Err(RepositoryError::not_found("file", id)),
        }
    }
}

#[async_trait]
impl VersionRepository for InMemoryRepository {
    async fn add_version(&self, version: FileVersionRecord) -> RepositoryResult<FileVersionRecord> {
        let mut state = self.state.write().await;
        state.versions.entry(version.file_id).or_default().push(version.clone());
        Ok(version)
    }

    async fn list_versions(&self, file_id: Uuid) -> RepositoryResult<Vec<FileVersionRecord>> {
        let state = self.state.read().await;
        Ok(state.versions.get(&file_id).cloned().unwrap_or_default())
    }

    async fn latest_version(&self, file_id: Uuid) -> RepositoryResult<Option<FileVersionRecord>> {
        let state = self.state.read().await;
        Ok(state
            .versions
            .get(&file_id)
            .and_then(|versions| versions.iter().max_by_key(|v| v.version).cloned()))
    }
}

#[async_trait]
impl ShareLinkRepository for InMemoryRepository {
    async fn create_share_link(&self, link: ShareLinkRecord) -> RepositoryResult<ShareLinkRecord> {
        let mut state = self.state.write().await;
        if state.shares.contains_key(&link.token) {
            return Err(RepositoryError::already_exists("share_link", link.token.clone()));
        }
        state.shares.insert(link.token.clone(), link.clone());
        Ok(link)
    }

    async fn get_share_link(&self, token: &str) -> RepositoryResult<ShareLinkRecord> {
        let state = self.state.read().await;
        state
            .shares
            .get(token)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("share_link", token))
    }

    async fn revoke_share_link(&self, token: &str) -> RepositoryResult<()> {
        let mut state = self.state.write().await;
        state
            .shares
            .remove(token)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found("share_link", token))
    }
}

#[async_trait]
impl QuotaRepository for InMemoryRepository {
    async fn get_quota(&self, user_id: &str) -> RepositoryResult<QuotaRecord> {
        let mut state = self.state.write().await;
        Ok(state
            .quotas
            .entry(user_id.to_string())
            .or_insert_with(|| QuotaRecord {
                user_id: user_id.to_string(),
                limit_bytes: self.default_quota_bytes,
                used_bytes: 0,
            })
            .clone())
    }

    async fn reserve(&self, user_id: &str, bytes: u64) -> RepositoryResult<QuotaRecord> {
        let mut state = self.state.write().await;
        let quota = state
            .quotas
            .entry(user_id.to_string())
            .or_insert_with(|| QuotaRecord {
                user_id: user_id.to_string(),
                limit_bytes: self.default_quota_bytes,
                used_bytes: 0,
            });

        if !quota.has_capacity(bytes) {
            tracing::warn!(
                target: TRACING_TARGET,
                user_id,
                requested = bytes,
                available = quota.remaining(),
                "quota exceeded"
            );
            return Err(RepositoryError::QuotaExceeded {
                user_id: user_id.to_string(),
                requested: bytes,
                available: quota.remaining(),
            });
        }
        quota.used_bytes += bytes;
        Ok(quota.clone())
    }

    async fn release(&self, user_id: &str, bytes: u64) -> RepositoryResult<QuotaRecord> {
        let mut state = self.state.write().await;
        let quota = state
            .quotas
            .entry(user_id.to_string())
            .or_insert_with(|| QuotaRecord {
                user_id: user_id.to_string(),
                limit_bytes: self.default_quota_bytes,
                used_bytes: 0,
            });
        quota.used_bytes = quota.used_bytes.saturating_sub(bytes);
        Ok(quota.clone())
    }
}

#[async_trait]
impl BatchRepository for InMemoryRepository {
    async fn create_batch(&self, batch: BatchRecord) -> RepositoryResult<BatchRecord> {
        let mut state = self.state.write().await;
        if state.batches.contains_key(&batch.batch_id) {
            return Err(RepositoryError::already_exists("batch", batch.batch_id));
        }
        state.batches.insert(batch.batch_id, batch.clone());
        Ok(batch)
    }

    async fn update_batch(&self, batch: BatchRecord) -> RepositoryResult<BatchRecord> {
        let mut state = self.state.write().await;
        if !state.batches.contains_key(&batch.batch_id) {
            return Err(RepositoryError::not_found("batch", batch.batch_id));
        }
        state.batches.insert(batch.batch_id, batch.clone());
        Ok(batch)
    }

    async fn get_batch(&self, user_id: &str, batch_id: Uuid) -> RepositoryResult<BatchRecord> {
        let state = self.state.read().await;
        state
            .batches
            .get(&batch_id)
            .filter(|b| b.user_id == user_id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("batch", batch_id))
    }

    async fn list_batches(&self, user_id: &str) -> RepositoryResult<Vec<BatchRecord>> {
        let state = self.state.read().await;
        Ok(state
            .batches
            .values()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BatchRecordStatus;

    fn file(user_id: &str) -> FileRecord {
        FileRecord {
            id: Uuid::now_v7(),
            user_id: user_id.to_string(),
            original_name: "report.pdf".to_string(),
            mimetype: "application/pdf".to_string(),
            size: 1024,
            storage_ref: "objects/report.pdf".to_string(),
            created_at: Timestamp::now(),
            updated_at: Timestamp::now(),
        }
    }

    #[tokio::test]
    async fn files_are_scoped_by_user() {
        let repo = InMemoryRepository::default();
        let f = repo.create_file(file("alice")).await.unwrap();

        assert!(repo.get_file("bob", f.id).await.is_err());
        assert_eq!(repo.get_file("alice", f.id).await.unwrap().id, f.id);
    }

    #[tokio::test]
    async fn deleting_a_file_drops_its_versions() {
        let repo = InMemoryRepository::default();
        let f = repo.create_file(file("alice")).await.unwrap();
        repo.add_version(FileVersionRecord {
            id: Uuid::now_v7(),
            file_id: f.id,
            version: 1,
            storage_ref: f.storage_ref.clone(),
            size: f.size,
            created_at: Timestamp::now(),
        })
        .await
        .unwrap();

        repo.delete_file("alice", f.id).await.unwrap();
        assert!(repo.list_versions(f.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn latest_version_picks_highest_version_number() {
        let repo = InMemoryRepository::default();
        let f = repo.create_file(file("alice")).await.unwrap();
        for v in 1..=3u32 {
            repo.add_version(FileVersionRecord {
                id: Uuid::now_v7(),
                file_id: f.id,
                version: v,
                storage_ref: f.storage_ref.clone(),
                size: f.size,
                created_at: Timestamp::now(),
            })
            .await
            .unwrap();
        }

        let latest = repo.latest_version(f.id).await.unwrap().unwrap();
        assert_eq!(latest.version, 3);
    }

    #[tokio::test]
    async fn reserve_rejects_once_quota_is_exhausted() {
        let repo = InMemoryRepository::new(100);
        assert!(repo.reserve("alice", 60).await.is_ok());
        let err = repo.reserve("alice", 60).await.unwrap_err();
        assert!(matches!(err, RepositoryError::QuotaExceeded { .. }));

        repo.release("alice", 60).await.unwrap();
        assert!(repo.reserve("alice", 60).await.is_ok());
    }

    #[tokio::test]
    async fn batch_records_round_trip_through_update() {
        let repo = InMemoryRepository::default();
        let batch = BatchRecord {
            batch_id: Uuid::now_v7(),
            user_id: "alice".to_string(),
            description: Some("nightly import".to_string()),
            status: BatchRecordStatus::Created,
            total_files: 10,
            successful_files: 0,
            failed_files: 0,
            created_at: Timestamp::now(),
            completed_at: None,
        };
        repo.create_batch(batch.clone()).await.unwrap();

        let mut updated = batch.clone();
        updated.status = BatchRecordStatus::Completed;
        updated.successful_files = 10;
        updated.completed_at = Some(Timestamp::now());
        repo.update_batch(updated.clone()).await.unwrap();

        let fetched = repo.get_batch("alice", batch.batch_id).await.unwrap();
        assert_eq!(fetched.status, BatchRecordStatus::Completed);
        assert_eq!(fetched.successful_files, 10);
    }
}
