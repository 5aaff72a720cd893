//! Dispatches `file_processing` / `file_compression` / `thumbnail_generation`
//! jobs by MIME type and tracks per-file bookkeeping on top of the queue.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use jiff::Timestamp;
use nvisy_data::ObjectStorage;
use nvisy_queue::{
    Job, JobHandle, JobOptions, JobQueue, JobQueueConfig, JobStatus, JobType, Processor,
    ProcessorFailure, ProcessorOutcome, QueueError, RetryExecutor, RetryPresetName,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::compressor::{Compressor, GzipCompressor};
use crate::error::ProcessingError;
use crate::fetch::{fetch_buffer, MimeFamily};
use crate::payload::{CompressionResult, FileMeta, ProcessingPayload, ProcessingResult};
use crate::processors::{CsvProcessor, ImageProcessor, PdfProcessor, TypedProcessor};

const PROCESSING_QUEUE_NAME: &str = "processing";
/// Bound on the re-download performed ahead of inline compression; matches
/// the largest typed-processor cap since any file accepted by one of them
/// must fit this ceiling too.
const COMPRESSION_MAX_BYTES: u64 = 50 * 1024 * 1024;

/// Errors [`FileProcessingOrchestrator::process_file`] can surface to a caller.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Queue(#[from] QueueError),
    #[error("job failed: {message}")]
    JobFailed { message: String },
    #[error("job was cancelled")]
    JobCancelled,
}

/// A snapshot of one tracked file's processing lifecycle.
#[derive(Debug, Clone)]
pub struct FileStatus {
    pub job_id: nvisy_queue::JobId,
    pub file_id: Uuid,
    pub status: JobStatus,
    pub start_time: Option<Timestamp>,
    pub progress: u8,
    pub result: Option<ProcessingResult>,
    pub error: Option<String>,
}

impl FileStatus {
    fn from_job(file_id: Uuid, job: Job<ProcessingPayload, ProcessingResult>) -> Self {
        let error = job.errors.last().map(|e| e.message.clone());
        Self {
            job_id: job.id,
            file_id,
            status: job.status,
            start_time: job.started_at,
            progress: job.progress,
            result: job.result,
            error,
        }
    }
}

struct Processors {
    image: Arc<ImageProcessor>,
    pdf: Arc<PdfProcessor>,
    csv: Arc<CsvProcessor>,
}

/// Registers handlers for `file_processing`, `file_compression`, and
/// `thumbnail_generation` on a dedicated "processing" queue, dispatches
/// `file_processing` jobs by MIME type, and tracks a per-file-id mapping to
/// the resulting job.
pub struct FileProcessingOrchestrator {
    queue: Arc<JobQueue<ProcessingPayload, ProcessingResult>>,
    file_jobs: RwLock<HashMap<Uuid, nvisy_queue::JobId>>,
}

impl FileProcessingOrchestrator {
    /// Builds the orchestrator and registers its three handlers on a queue
    /// configured per the spec: concurrency 3, maxJobs 500.
    pub async fn start(storage: Arc<dyn ObjectStorage>) -> Arc<Self> {
        Self::start_with_compressor(storage, Arc::new(GzipCompressor::new())).await
    }

    pub async fn start_with_compressor(
        storage: Arc<dyn ObjectStorage>,
        compressor: Arc<dyn Compressor>,
    ) -> Arc<Self> {
        let config = JobQueueConfig {
            concurrency: 3,
            max_jobs: 500,
            ..JobQueueConfig::default()
        };
        let queue = JobQueue::start(PROCESSING_QUEUE_NAME, config);

        let processors = Arc::new(Processors {
            image: Arc::new(ImageProcessor::new(storage.clone())),
            pdf: Arc::new(PdfProcessor::new(storage.clone())),
            csv: Arc::new(CsvProcessor::new(storage.clone())),
        });

        let retry = RetryExecutor::from_preset_name(RetryPresetName::FileProcessing);

        queue
            .register_processor(
                JobType::FileProcessing,
                FileProcessingHandler {
                    processors: processors.clone(),
                    storage: storage.clone(),
                    compressor: compressor.clone(),
                },
                retry,
            )
            .await;
        queue
            .register_processor(
                JobType::FileCompression,
                CompressionHandler {
                    storage: storage.clone(),
                    compressor: compressor.clone(),
                },
                RetryExecutor::from_preset_name(RetryPresetName::FileProcessing),
            )
            .await;
        queue
            .register_processor(
                JobType::ThumbnailGeneration,
                ThumbnailHandler {
                    image: processors.image.clone(),
                },
                RetryExecutor::from_preset_name(RetryPresetName::FileProcessing),
            )
            .await;

        Arc::new(Self {
            queue,
            file_jobs: RwLock::new(HashMap::new()),
        })
    }

    /// Enqueues a `file_processing` job for `file_id`, recording the mapping
    /// so [`Self::get_file_status`] can resolve it later.
    pub async fn start_job(
        &self,
        file_id: Uuid,
        file_meta: FileMeta,
        storage_ref: String,
        compression_enabled: bool,
        opts: JobOptions,
    ) -> Result<nvisy_queue::JobId, QueueError> {
        let payload = ProcessingPayload::FileProcessing {
            file_meta,
            storage_ref,
            compression_enabled,
        };
        let job_id = self.queue.add_job(JobType::FileProcessing, payload, opts).await?;
        self.file_jobs.write().await.insert(file_id, job_id);
        Ok(job_id)
    }

    pub async fn get_file_status(&self, file_id: Uuid) -> Option<FileStatus> {
        let job_id = *self.file_jobs.read().await.get(&file_id)?;
        let job = self.queue.get_job(job_id).await?;
        Some(FileStatus::from_job(file_id, job))
    }

    /// Drops the per-file bookkeeping entry. Does not touch the underlying
    /// job or its archive; call once a caller no longer needs to resolve
    /// `file_id` to a job.
    pub async fn cleanup_file(&self, file_id: Uuid) {
        self.file_jobs.write().await.remove(&file_id);
    }

    /// Submits a `file_processing` job and polls it at 1 s intervals until
    /// terminal, returning its result or surfacing its failure/cancellation.
    pub async fn process_file(
        &self,
        file_meta: FileMeta,
        storage_ref: String,
    ) -> Result<ProcessingResult, OrchestratorError> {
        let payload = ProcessingPayload::FileProcessing {
            file_meta,
            storage_ref,
            compression_enabled: true,
        };
        let job_id = self
            .queue
            .add_job(JobType::FileProcessing, payload, JobOptions::default())
            .await?;

        loop {
            let Some(job) = self.queue.get_job(job_id).await else {
                return Err(OrchestratorError::JobFailed {
                    message: "job disappeared before completing".to_string(),
                });
            };
            match job.status {
                JobStatus::Completed => {
                    return Ok(job.result.expect("completed jobs always carry a result"));
                }
                JobStatus::Failed => {
                    let message = job
                        .errors
                        .last()
                        .map(|e| e.message.clone())
                        .unwrap_or_else(|| "job failed with no recorded error".to_string());
                    return Err(OrchestratorError::JobFailed { message });
                }
                JobStatus::Cancelled => return Err(OrchestratorError::JobCancelled),
                _ => tokio::time::sleep(Duration::from_secs(1)).await,
            }
        }
    }

    pub fn queue(&self) -> &Arc<JobQueue<ProcessingPayload, ProcessingResult>> {
        &self.queue
    }
}

struct FileProcessingHandler {
    processors: Arc<Processors>,
    storage: Arc<dyn ObjectStorage>,
    compressor: Arc<dyn Compressor>,
}

#[async_trait::async_trait]
impl Processor<ProcessingPayload, ProcessingResult> for FileProcessingHandler {
    async fn process(
        &self,
        payload: &ProcessingPayload,
        handle: JobHandle<ProcessingPayload, ProcessingResult>,
    ) -> ProcessorOutcome<ProcessingResult> {
        let ProcessingPayload::FileProcessing {
            file_meta,
            storage_ref,
            compression_enabled,
        } = payload
        else {
            return Err(ProcessingError::permanent("wrong payload for file_processing job").into_failure());
        };

        handle.set_progress(10).await;

        let typed = match dispatch_typed(file_meta, storage_ref, &self.processors).await {
            Ok(typed) => typed,
            // A permanent failure inside the typed processor itself (corrupt
            // PDF, declared-too-large file, unsupported MIME type) can't be
            // fixed by retrying, so the job still completes and the failure
            // is recorded on the result instead of burning queue attempts.
            // Retryable failures (network blips while downloading) propagate
            // so the queue's own retry machinery can act on them.
            Err(err @ ProcessingError::Permanent { .. }) => {
                handle.set_progress(100).await;
                let result = ProcessingResult::success(
                    file_meta.original_name.clone(),
                    file_meta.mimetype.clone(),
                    storage_ref.clone(),
                    storage_ref.clone(),
                    file_meta.size,
                    file_meta.known_format.clone(),
                )
                .failed(err.to_string());
                return Ok(result);
            }
            Err(err) => return Err(err.into_failure()),
        };

        handle.set_progress(70).await;

        let resource_type = typed.resource_type();
        let secure_url = self
            .storage
            .download_url(storage_ref, resource_type, None)
            .await
            .unwrap_or_else(|_| storage_ref.clone());

        let mut result = ProcessingResult::success(
            file_meta.original_name.clone(),
            file_meta.mimetype.clone(),
            storage_ref.clone(),
            secure_url,
            file_meta.size,
            file_meta.known_format.clone(),
        );

        if *compression_enabled {
            match compress_inline(storage_ref, &self.storage, &*self.compressor).await {
                Ok(compression) => result = result.with_compression(compression),
                Err(err) => tracing::warn!(
                    storage_ref = %storage_ref,
                    error = %err,
                    "inline compression failed, leaving file uncompressed"
                ),
            }
        }

        handle.set_progress(90).await;
        result = result.with_typed(typed);
        handle.set_progress(100).await;

        Ok(result)
    }
}

async fn dispatch_typed(
    file_meta: &FileMeta,
    storage_ref: &str,
    processors: &Processors,
) -> Result<crate::payload::TypedResult, ProcessingError> {
    match file_meta.family() {
        MimeFamily::Image => processors.image.process(file_meta, storage_ref).await,
        MimeFamily::Pdf => processors.pdf.process(file_meta, storage_ref).await,
        MimeFamily::Csv => processors.csv.process(file_meta, storage_ref).await,
        MimeFamily::Unsupported => Err(ProcessingError::permanent("Unsupported MIME type")),
    }
}

async fn compress_inline(
    storage_ref: &str,
    storage: &Arc<dyn ObjectStorage>,
    compressor: &dyn Compressor,
) -> Result<CompressionResult, ProcessingError> {
    let url = storage
        .download_url(storage_ref, "raw", None)
        .await
        .map_err(ProcessingError::from)?;
    let original = fetch_buffer(&url, COMPRESSION_MAX_BYTES).await?;
    let original_size = original.len() as u64;

    let compressed = compressor.compress(&original)?;
    let compressed_size = compressed.len() as u64;

    let compressed_name = format!("{storage_ref}.gz");
    let upload = storage
        .upload(
            bytes::Bytes::from(compressed),
            &compressed_name,
            "application/gzip",
            nvisy_data::UploadOptions::default(),
        )
        .await
        .map_err(ProcessingError::from)?;

    Ok(CompressionResult {
        original_size,
        compressed_size,
        public_id: upload.public_id,
        secure_url: upload.secure_url,
    })
}

struct CompressionHandler {
    storage: Arc<dyn ObjectStorage>,
    compressor: Arc<dyn Compressor>,
}

#[async_trait::async_trait]
impl Processor<ProcessingPayload, ProcessingResult> for CompressionHandler {
    async fn process(
        &self,
        payload: &ProcessingPayload,
        handle: JobHandle<ProcessingPayload, ProcessingResult>,
    ) -> ProcessorOutcome<ProcessingResult> {
        let ProcessingPayload::FileCompression { file_meta, storage_ref } = payload else {
            return Err(ProcessingError::permanent("wrong payload for file_compression job").into_failure());
        };

        handle.set_progress(20).await;
        let compression = compress_inline(storage_ref, &self.storage, &*self.compressor)
            .await
            .map_err(ProcessingError::into_failure)?;
        handle.set_progress(100).await;

        let result = ProcessingResult::success(
            file_meta.original_name.clone(),
            file_meta.mimetype.clone(),
            storage_ref.clone(),
            compression.secure_url.clone(),
            file_meta.size,
            file_meta.known_format.clone(),
        )
        .with_compression(compression);
        Ok(result)
    }
}

struct ThumbnailHandler {
    image: Arc<ImageProcessor>,
}

#[async_trait::async_trait]
impl Processor<ProcessingPayload, ProcessingResult> for ThumbnailHandler {
    async fn process(
        &self,
        payload: &ProcessingPayload,
        handle: JobHandle<ProcessingPayload, ProcessingResult>,
    ) -> ProcessorOutcome<ProcessingResult> {
        let ProcessingPayload::ThumbnailGeneration { file_meta, storage_ref } = payload else {
            return Err(ProcessingError::permanent("wrong payload for thumbnail_generation job").into_failure());
        };

        handle.set_progress(30).await;
        let typed = self
            .image
            .process(file_meta, storage_ref)
            .await
            .map_err(ProcessingError::into_failure)?;
        handle.set_progress(100).await;

        let result = ProcessingResult::success(
            file_meta.original_name.clone(),
            file_meta.mimetype.clone(),
            storage_ref.clone(),
            storage_ref.clone(),
            file_meta.size,
            file_meta.known_format.clone(),
        )
        .with_typed(typed);
        Ok(result)
    }
}
