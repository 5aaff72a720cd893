//! Bounded-concurrency batch ingestion on top of [`crate::orchestrator::FileProcessingOrchestrator`].
//!
//! A batch owns its file entries and their buffers until every entry reaches
//! a terminal status, then releases them — the orchestrator itself never
//! holds more than one file's bytes in memory at a time per entry.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use jiff::Timestamp;
use nvisy_data::{ObjectStorage, UploadOptions};
use nvisy_repository::{BatchRecord, BatchRecordStatus, BatchRepository};
use tokio::sync::{RwLock, Semaphore};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::orchestrator::FileProcessingOrchestrator;
use crate::payload::{FileMeta, ProcessingResult};

/// Default bound on concurrently-processing entries within one batch.
const DEFAULT_MAX_CONCURRENCY: usize = 3;

/// Caller-supplied role, used to authorize batch mutation/inspection against
/// whoever owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error(transparent)]
    Repository(#[from] nvisy_repository::RepositoryError),
    #[error("batch {0} not found")]
    NotFound(Uuid),
    #[error("batch {0} is already terminal")]
    AlreadyTerminal(Uuid),
    #[error("batch {0} is not in the created state")]
    NotCreated(Uuid),
    #[error("not authorized to act on batch {0}")]
    Forbidden(Uuid),
    #[error("maxConcurrency must be at least 1")]
    InvalidConcurrency,
}

/// One file submitted to [`BatchCoordinator::create_batch`].
#[derive(Debug, Clone)]
pub struct NewBatchFile {
    pub original_name: String,
    pub mimetype: String,
    pub buffer: Bytes,
}

/// Lifecycle of a single entry within a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchEntryStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// One file's progress through a batch, including its buffer while still in
/// flight.
#[derive(Debug, Clone)]
pub struct BatchEntry {
    pub index: usize,
    pub original_name: String,
    pub mimetype: String,
    pub size: u64,
    /// Dropped once the entry reaches a terminal status.
    pub buffer: Option<Bytes>,
    pub status: BatchEntryStatus,
    pub file_id: Option<Uuid>,
    pub storage_ref: Option<String>,
    pub error: Option<String>,
    pub processed_at: Option<Timestamp>,
    pub processing_result: Option<ProcessingResult>,
}

/// Caller-tunable options for [`BatchCoordinator::create_batch`].
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub description: Option<String>,
    pub process_in_parallel: bool,
    pub max_concurrency: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            description: None,
            process_in_parallel: true,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

/// A full snapshot of one batch, suitable for returning to an API caller.
#[derive(Debug, Clone)]
pub struct BatchSnapshot {
    pub record: BatchRecord,
    pub progress: u8,
    pub entries: Vec<BatchEntry>,
}

struct BatchState {
    record: BatchRecord,
    entries: Vec<BatchEntry>,
    process_in_parallel: bool,
    max_concurrency: usize,
    cancel: CancellationToken,
}

impl BatchState {
    fn progress(&self) -> u8 {
        if self.record.total_files == 0 {
            return 100;
        }
        let processed = self.record.successful_files + self.record.failed_files;
        ((processed as f64 / self.record.total_files as f64) * 100.0).round() as u8
    }
}

/// Creates batch records for N input buffers, runs them through
/// [`FileProcessingOrchestrator`] sequentially or with bounded per-batch
/// concurrency, and tracks per-file results.
pub struct BatchCoordinator {
    repository: Arc<dyn BatchRepository>,
    orchestrator: Arc<FileProcessingOrchestrator>,
    storage: Arc<dyn ObjectStorage>,
    batches: RwLock<HashMap<Uuid, BatchState>>,
}

impl BatchCoordinator {
    pub fn new(
        repository: Arc<dyn BatchRepository>,
        orchestrator: Arc<FileProcessingOrchestrator>,
        storage: Arc<dyn ObjectStorage>,
    ) -> Arc<Self> {
        Arc::new(Self {
            repository,
            orchestrator,
            storage,
            batches: RwLock::new(HashMap::new()),
        })
    }

    /// Allocates a batch id, captures the submitted buffers, and persists a
    /// `created` record. Does not start processing.
    pub async fn create_batch(
        &self,
        files: Vec<NewBatchFile>,
        user_id: String,
        opts: BatchOptions,
    ) -> Result<BatchSnapshot, BatchError> {
        if opts.max_concurrency < 1 {
            return Err(BatchError::InvalidConcurrency);
        }

        let batch_id = Uuid::now_v7();
        let total_files = files.len() as u32;
        let now = Timestamp::now();

        let entries: Vec<BatchEntry> = files
            .into_iter()
            .enumerate()
            .map(|(index, file)| BatchEntry {
                index,
                original_name: file.original_name,
                mimetype: file.mimetype,
                size: file.buffer.len() as u64,
                buffer: Some(file.buffer),
                status: BatchEntryStatus::Pending,
                file_id: None,
                storage_ref: None,
                error: None,
                processed_at: None,
                processing_result: None,
            })
            .collect();

        let record = BatchRecord {
            batch_id,
            user_id,
            description: opts.description.clone(),
            status: BatchRecordStatus::Created,
            total_files,
            successful_files: 0,
            failed_files: 0,
            created_at: now,
            completed_at: None,
        };
        let record = self.repository.create_batch(record).await?;

        let state = BatchState {
            record: record.clone(),
            entries,
            process_in_parallel: opts.process_in_parallel,
            max_concurrency: opts.max_concurrency,
            cancel: CancellationToken::new(),
        };
        let snapshot = BatchSnapshot {
            record: state.record.clone(),
            progress: state.progress(),
            entries: state.entries.clone(),
        };
        self.batches.write().await.insert(batch_id, state);
        Ok(snapshot)
    }

    /// Runs every entry in a `created` batch, sequentially or under a
    /// per-batch semaphore, to terminal status.
    #[tracing::instrument(skip(self), fields(batch_id = %batch_id))]
    pub async fn start_batch(self: &Arc<Self>, batch_id: Uuid) -> Result<BatchSnapshot, BatchError> {
        {
            let mut batches = self.batches.write().await;
            let state = batches.get_mut(&batch_id).ok_or(BatchError::NotFound(batch_id))?;
            if state.record.status != BatchRecordStatus::Created {
                return Err(BatchError::NotCreated(batch_id));
            }
            state.record.status = BatchRecordStatus::Processing;
        }

        self.persist(batch_id).await?;

        let (process_in_parallel, max_concurrency, cancel, indices) = {
            let batches = self.batches.read().await;
            let state = batches.get(&batch_id).unwrap();
            (
                state.process_in_parallel,
                state.max_concurrency,
                state.cancel.clone(),
                (0..state.entries.len()).collect::<Vec<_>>(),
            )
        };

        if process_in_parallel {
            let semaphore = Arc::new(Semaphore::new(max_concurrency));
            let mut handles = Vec::with_capacity(indices.len());
            for index in indices {
                if cancel.is_cancelled() {
                    break;
                }
                let this = self.clone();
                let semaphore = semaphore.clone();
                handles.push(tokio::spawn(async move {
                    let _permit = semaphore.acquire_owned().await.expect("batch semaphore is never closed");
                    this.run_entry(batch_id, index).await;
                }));
            }
            for handle in handles {
                let _ = handle.await;
            }
        } else {
            for index in indices {
                if cancel.is_cancelled() {
                    break;
                }
                self.run_entry(batch_id, index).await;
            }
        }

        self.finalize(batch_id).await
    }

    async fn run_entry(&self, batch_id: Uuid, index: usize) {
        let Some(buffer_entry) = self.take_entry_buffer(batch_id, index).await else {
            return;
        };
        let (original_name, mimetype, buffer) = buffer_entry;

        self.set_entry_status(batch_id, index, BatchEntryStatus::Processing).await;

        let outcome = self.process_entry(&original_name, &mimetype, buffer).await;

        let mut batches = self.batches.write().await;
        let Some(state) = batches.get_mut(&batch_id) else { return };
        let Some(entry) = state.entries.get_mut(index) else { return };

        match outcome {
            Ok((file_id, storage_ref, result)) => {
                entry.status = BatchEntryStatus::Completed;
                entry.file_id = Some(file_id);
                entry.storage_ref = Some(storage_ref);
                entry.processing_result = Some(result);
                entry.processed_at = Some(Timestamp::now());
                entry.buffer = None;
                state.record.successful_files += 1;
            }
            Err(message) => {
                entry.status = BatchEntryStatus::Failed;
                entry.error = Some(message);
                entry.processed_at = Some(Timestamp::now());
                entry.buffer = None;
                state.record.failed_files += 1;
            }
        }
    }

    async fn process_entry(
        &self,
        original_name: &str,
        mimetype: &str,
        buffer: Bytes,
    ) -> Result<(Uuid, String, ProcessingResult), String> {
        let size = buffer.len() as u64;
        let upload = self
            .storage
            .upload(buffer, original_name, mimetype, UploadOptions::default())
            .await
            .map_err(|err| err.to_string())?;

        let file_id = Uuid::now_v7();
        let file_meta = FileMeta {
            original_name: original_name.to_string(),
            mimetype: mimetype.to_string(),
            size,
            known_width: upload.width,
            known_height: upload.height,
            known_format: upload.format.clone(),
        };

        let result = self
            .orchestrator
            .process_file(file_meta, upload.public_id.clone())
            .await
            .map_err(|err| err.to_string())?;

        Ok((file_id, upload.public_id, result))
    }

    async fn take_entry_buffer(&self, batch_id: Uuid, index: usize) -> Option<(String, String, Bytes)> {
        let batches = self.batches.read().await;
        let state = batches.get(&batch_id)?;
        let entry = state.entries.get(index)?;
        let buffer = entry.buffer.clone()?;
        Some((entry.original_name.clone(), entry.mimetype.clone(), buffer))
    }

    async fn set_entry_status(&self, batch_id: Uuid, index: usize, status: BatchEntryStatus) {
        let mut batches = self.batches.write().await;
        if let Some(state) = batches.get_mut(&batch_id) {
            if let Some(entry) = state.entries.get_mut(index) {
                entry.status = status;
            }
        }
    }

    async fn finalize(&self, batch_id: Uuid) -> Result<BatchSnapshot, BatchError> {
        {
            let mut batches = self.batches.write().await;
            let state = batches.get_mut(&batch_id).ok_or(BatchError::NotFound(batch_id))?;
            if state.record.status == BatchRecordStatus::Cancelled {
                // cancelBatch already set the terminal status; don't overwrite it.
            } else {
                state.record.status = if state.record.failed_files > 0 {
                    BatchRecordStatus::CompletedWithErrors
                } else {
                    BatchRecordStatus::Completed
                };
            }
            state.record.completed_at = Some(Timestamp::now());
        }
        self.persist(batch_id).await?;
        self.snapshot(batch_id).await
    }

    async fn persist(&self, batch_id: Uuid) -> Result<(), BatchError> {
        let record = {
            let batches = self.batches.read().await;
            batches.get(&batch_id).ok_or(BatchError::NotFound(batch_id))?.record.clone()
        };
        self.repository.update_batch(record).await?;
        Ok(())
    }

    pub async fn snapshot(&self, batch_id: Uuid) -> Result<BatchSnapshot, BatchError> {
        let batches = self.batches.read().await;
        let state = batches.get(&batch_id).ok_or(BatchError::NotFound(batch_id))?;
        Ok(BatchSnapshot {
            record: state.record.clone(),
            progress: state.progress(),
            entries: state.entries.clone(),
        })
    }

    /// Marks a non-terminal batch cancelled. Entries already running are not
    /// interrupted — they complete or fail on their own, and the next entry
    /// boundary observes the cancellation and stops submitting new ones.
    pub async fn cancel_batch(&self, batch_id: Uuid, user_id: &str, role: Role) -> Result<BatchSnapshot, BatchError> {
        {
            let mut batches = self.batches.write().await;
            let state = batches.get_mut(&batch_id).ok_or(BatchError::NotFound(batch_id))?;
            authorize(&state.record, user_id, role, batch_id)?;
            if terminal(state.record.status) {
                return Err(BatchError::AlreadyTerminal(batch_id));
            }
            state.record.status = BatchRecordStatus::Cancelled;
            state.record.completed_at = Some(Timestamp::now());
            state.cancel.cancel();
        }
        self.persist(batch_id).await?;
        self.snapshot(batch_id).await
    }

    /// Drops the coordinator's in-memory tracking for a batch (buffers,
    /// per-entry results). The persisted summary record is left for
    /// `listBatches`/audit; there is no repository operation to expunge it.
    pub async fn delete_batch(&self, batch_id: Uuid, user_id: &str, role: Role) -> Result<(), BatchError> {
        let mut batches = self.batches.write().await;
        let state = batches.get(&batch_id).ok_or(BatchError::NotFound(batch_id))?;
        authorize(&state.record, user_id, role, batch_id)?;
        batches.remove(&batch_id);
        Ok(())
    }

    /// Owner-or-admin listing, sorted by `createdAt` descending. Scoped by
    /// `user_id` regardless of role: the repository's `listBatches` has no
    /// cross-user query, so an admin must still name the user whose batches
    /// they want.
    pub async fn list_batches(&self, user_id: &str, _role: Role) -> Result<Vec<BatchRecord>, BatchError> {
        let mut records = self.repository.list_batches(user_id).await?;
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }
}

fn terminal(status: BatchRecordStatus) -> bool {
    matches!(
        status,
        BatchRecordStatus::Completed
            | BatchRecordStatus::CompletedWithErrors
            | BatchRecordStatus::Failed
            | BatchRecordStatus::Cancelled
    )
}

fn authorize(record: &BatchRecord, user_id: &str, role: Role, batch_id: Uuid) -> Result<(), BatchError> {
    if role == Role::Admin || record.user_id == user_id {
        Ok(())
    } else {
        Err(BatchError::Forbidden(batch_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use nvisy_data::{DataResult, StorageMetadata, ThumbnailUrlOptions, UploadResult};
    use nvisy_repository::RepositoryResult;
    use std::sync::Mutex as StdMutex;

    struct StubStorage;

    #[async_trait]
    impl ObjectStorage for StubStorage {
        async fn upload(
            &self,
            buffer: Bytes,
            _original_name: &str,
            _mimetype: &str,
            _opts: UploadOptions,
        ) -> DataResult<UploadResult> {
            Ok(UploadResult {
                public_id: "stub-object".to_string(),
                secure_url: "https://storage.example/stub-object".to_string(),
                size: buffer.len() as u64,
                format: Some("csv".to_string()),
                resource_type: "raw".to_string(),
                width: None,
                height: None,
                buffer: None,
            })
        }

        async fn delete(&self, _public_id: &str, _resource_type: &str) -> DataResult<()> {
            Ok(())
        }

        async fn thumbnail_url(&self, _public_id: &str, _opts: ThumbnailUrlOptions) -> DataResult<Option<String>> {
            Ok(None)
        }

        async fn download_url(&self, public_id: &str, _resource_type: &str, _filename: Option<&str>) -> DataResult<String> {
            Ok(format!("https://storage.example/{public_id}"))
        }

        async fn get_metadata(&self, _public_id: &str, _resource_type: &str) -> DataResult<StorageMetadata> {
            Ok(StorageMetadata {
                size: 0,
                content_type: "text/csv".to_string(),
                last_modified: Timestamp::now(),
            })
        }
    }

    struct StubBatchRepository {
        records: StdMutex<HashMap<Uuid, BatchRecord>>,
    }

    impl StubBatchRepository {
        fn new() -> Self {
            Self {
                records: StdMutex::new(HashMap::new()),
            }
        }
    }

    #[async_trait]
    impl BatchRepository for StubBatchRepository {
        async fn create_batch(&self, batch: BatchRecord) -> RepositoryResult<BatchRecord> {
            self.records.lock().unwrap().insert(batch.batch_id, batch.clone());
            Ok(batch)
        }

        async fn update_batch(&self, batch: BatchRecord) -> RepositoryResult<BatchRecord> {
            self.records.lock().unwrap().insert(batch.batch_id, batch.clone());
            Ok(batch)
        }

        async fn get_batch(&self, _user_id: &str, batch_id: Uuid) -> RepositoryResult<BatchRecord> {
            self.records
                .lock()
                .unwrap()
                .get(&batch_id)
                .cloned()
                .ok_or_else(|| nvisy_repository::RepositoryError::not_found("batch", batch_id.to_string()))
        }

        async fn list_batches(&self, user_id: &str) -> RepositoryResult<Vec<BatchRecord>> {
            Ok(self
                .records
                .lock()
                .unwrap()
                .values()
                .filter(|b| b.user_id == user_id)
                .cloned()
                .collect())
        }
    }

    async fn test_coordinator() -> Arc<BatchCoordinator> {
        let storage: Arc<dyn ObjectStorage> = Arc::new(StubStorage);
        let repository: Arc<dyn BatchRepository> = Arc::new(StubBatchRepository::new());
        let orchestrator = FileProcessingOrchestrator::start(storage.clone()).await;
        BatchCoordinator::new(repository, orchestrator, storage)
    }

    fn csv_file(name: &str) -> NewBatchFile {
        NewBatchFile {
            original_name: name.to_string(),
            mimetype: "text/csv".to_string(),
            buffer: Bytes::from_static(b"a,b\n1,2\n"),
        }
    }

    #[tokio::test]
    async fn create_batch_rejects_zero_concurrency() {
        let coordinator = test_coordinator().await;
        let result = coordinator
            .create_batch(
                vec![csv_file("a.csv")],
                "user-1".to_string(),
                BatchOptions {
                    max_concurrency: 0,
                    ..BatchOptions::default()
                },
            )
            .await;
        assert!(matches!(result, Err(BatchError::InvalidConcurrency)));
    }

    #[tokio::test]
    async fn batch_with_all_successes_completes_cleanly() {
        let coordinator = test_coordinator().await;
        let snapshot = coordinator
            .create_batch(
                vec![csv_file("a.csv"), csv_file("b.csv")],
                "user-1".to_string(),
                BatchOptions::default(),
            )
            .await
            .unwrap();

        let result = coordinator.start_batch(snapshot.record.batch_id).await.unwrap();
        assert_eq!(result.record.status, BatchRecordStatus::Completed);
        assert_eq!(result.record.successful_files, 2);
        assert_eq!(result.record.failed_files, 0);
        assert_eq!(result.progress, 100);
        assert!(result.entries.iter().all(|e| e.buffer.is_none()));
    }

    #[tokio::test]
    async fn non_owner_cannot_cancel_another_users_batch() {
        let coordinator = test_coordinator().await;
        let snapshot = coordinator
            .create_batch(vec![csv_file("a.csv")], "user-1".to_string(), BatchOptions::default())
            .await
            .unwrap();

        let result = coordinator
            .cancel_batch(snapshot.record.batch_id, "user-2", Role::User)
            .await;
        assert!(matches!(result, Err(BatchError::Forbidden(_))));
    }
}
