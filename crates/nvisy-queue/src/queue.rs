//! The generic, in-memory priority job queue.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use jiff::Timestamp;
use tokio::sync::{broadcast, Mutex, Notify, RwLock, Semaphore};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::classify::{ClassifiedError, ErrorClassifier, HandlerError};
use crate::error::{QueueError, Result};
use crate::job::{
    Job, JobErrorEntry, JobId, JobOptions, JobStatus, JobType, DEFAULT_MAX_ATTEMPTS,
};
use crate::retry::RetryExecutor;
use crate::stats::QueueStats;
use crate::TRACING_TARGET;

/// A failure reported by a [`Processor`], with an optional classification
/// override (see [`crate::classify`]).
#[derive(Debug, Clone)]
pub struct ProcessorFailure {
    pub error: HandlerError,
    pub tag: Option<ClassifiedError>,
}

/// Outcome of one processing attempt.
pub type ProcessorOutcome<R> = std::result::Result<R, ProcessorFailure>;

/// A handle passed to a running handler so it can publish progress updates
/// without holding the queue's lock across its own work. Mirrors the
/// scheduler's "immutable snapshot plus an update-status hook" contract:
/// the handler never touches `Job` state directly.
pub struct JobHandle<P, R> {
    queue: Weak<JobQueue<P, R>>,
    id: JobId,
}

impl<P, R> JobHandle<P, R>
where
    P: Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
{
    /// Publishes a new progress value (0..=100) for the running job, if the
    /// queue is still alive.
    pub async fn set_progress(&self, progress: u8) {
        if let Some(queue) = self.queue.upgrade() {
            queue.set_progress(self.id, progress).await;
        }
    }

    pub fn job_id(&self) -> JobId {
        self.id
    }
}

impl<P, R> Clone for JobHandle<P, R> {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
            id: self.id,
        }
    }
}

/// A registered handler for one [`JobType`].
///
/// The queue never interprets `P` or `R` — it only schedules the call,
/// bounds it with a per-job timeout, and classifies failures for retry.
#[async_trait]
pub trait Processor<P, R>: Send + Sync {
    async fn process(&self, payload: &P, handle: JobHandle<P, R>) -> ProcessorOutcome<R>;
}

#[async_trait]
impl<P, R, F, Fut> Processor<P, R> for F
where
    P: Send + Sync,
    R: Send + Sync,
    F: Fn(&P, JobHandle<P, R>) -> Fut + Send + Sync,
    Fut: Future<Output = ProcessorOutcome<R>> + Send,
{
    async fn process(&self, payload: &P, handle: JobHandle<P, R>) -> ProcessorOutcome<R> {
        (self)(payload, handle).await
    }
}

type BoxedProcessor<P, R> = Arc<dyn Processor<P, R>>;

/// Events emitted as jobs move through the queue. Subscribers that lag behind
/// the broadcast channel's buffer simply miss intermediate events — callers
/// needing a durable audit trail should read `getJob`/`getJobs` instead.
#[derive(Debug, Clone)]
pub enum JobQueueEvent {
    Added(JobId),
    Started(JobId),
    Completed(JobId),
    Failed(JobId),
    Retry(JobId),
    Cancelled(JobId),
}

/// Tunables for one [`JobQueue`] instance.
#[derive(Debug, Clone)]
pub struct JobQueueConfig {
    /// Maximum number of non-terminal jobs the queue will admit at once.
    pub max_jobs: usize,
    /// Maximum number of jobs processed concurrently.
    pub concurrency: usize,
    /// How often the retry sweep moves due `retrying` jobs back to `queued`.
    pub retry_sweep_interval: Duration,
    /// How often housekeeping drops archived terminal jobs older than `archive_ttl`.
    pub housekeeping_interval: Duration,
    /// Age past which an archived completed/failed job is dropped.
    pub archive_ttl: Duration,
    /// Ring buffer capacity for archived completed jobs.
    pub completed_capacity: usize,
    /// Ring buffer capacity for archived failed jobs.
    pub failed_capacity: usize,
}

impl Default for JobQueueConfig {
    fn default() -> Self {
        Self {
            max_jobs: 1_000,
            concurrency: 5,
            retry_sweep_interval: Duration::from_secs(30),
            housekeeping_interval: Duration::from_secs(60),
            archive_ttl: Duration::from_secs(24 * 60 * 60),
            completed_capacity: 100,
            failed_capacity: 50,
        }
    }
}

/// Filter applied by [`JobQueue::get_jobs`]. Every set field narrows the
/// result; `JobFilter::default()` matches everything.
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    pub status: Option<JobStatus>,
    pub user_id: Option<String>,
    pub job_type: Option<JobType>,
}

impl JobFilter {
    fn matches<P, R>(&self, job: &Job<P, R>) -> bool {
        self.status.is_none_or(|status| job.status == status)
            && self
                .user_id
                .as_deref()
                .is_none_or(|user_id| job.user_id.as_deref() == Some(user_id))
            && self.job_type.is_none_or(|job_type| job.job_type == job_type)
    }
}

struct ArchivedJob<P, R> {
    job: Job<P, R>,
    archived_at: Timestamp,
}

/// An in-memory, priority-ordered job queue generic over a handler-specific
/// payload `P` and result `R`.
///
/// Scheduling picks the highest-priority, oldest-created active job among
/// those in `queued` status, bounded by a concurrency [`Semaphore`]. A
/// background sweep promotes due `retrying` jobs back to `queued`; another
/// drops archived terminal jobs past their TTL.
pub struct JobQueue<P, R> {
    name: String,
    config: JobQueueConfig,
    classifier: ErrorClassifier,
    processors: RwLock<HashMap<JobType, BoxedProcessor<P, R>>>,
    retry_policies: RwLock<HashMap<JobType, RetryExecutor>>,
    jobs: RwLock<HashMap<JobId, Job<P, R>>>,
    completed: Mutex<VecDeque<ArchivedJob<P, R>>>,
    failed: Mutex<VecDeque<ArchivedJob<P, R>>>,
    stats: RwLock<QueueStats>,
    semaphore: Arc<Semaphore>,
    notify: Arc<Notify>,
    events: broadcast::Sender<JobQueueEvent>,
    cancel: CancellationToken,
    background: Mutex<Vec<JoinHandle<()>>>,
}

impl<P, R> JobQueue<P, R>
where
    P: Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
{
    /// Builds the queue and starts its background scheduler, retry sweep,
    /// and housekeeping tasks.
    pub fn start(name: impl Into<String>, config: JobQueueConfig) -> Arc<Self> {
        let queue = Arc::new(Self {
            name: name.into(),
            semaphore: Arc::new(Semaphore::new(config.concurrency)),
            config,
            classifier: ErrorClassifier::new(),
            processors: RwLock::new(HashMap::new()),
            retry_policies: RwLock::new(HashMap::new()),
            jobs: RwLock::new(HashMap::new()),
            completed: Mutex::new(VecDeque::new()),
            failed: Mutex::new(VecDeque::new()),
            stats: RwLock::new(QueueStats::default()),
            notify: Arc::new(Notify::new()),
            events: broadcast::channel(256).0,
            cancel: CancellationToken::new(),
            background: Mutex::new(Vec::new()),
        });

        let scheduler = tokio::spawn(Self::scheduler_loop(queue.clone()));
        let retry_sweep = tokio::spawn(Self::retry_sweep_loop(queue.clone()));
        let housekeeping = tokio::spawn(Self::housekeeping_loop(queue.clone()));

        // `try_lock` is safe here: no other task can see `queue` before this
        // constructor returns.
        if let Ok(mut background) = queue.background.try_lock() {
            background.push(scheduler);
            background.push(retry_sweep);
            background.push(housekeeping);
        }

        queue
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JobQueueEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: JobQueueEvent) {
        let _ = self.events.send(event);
    }

    /// Registers the handler invoked for jobs of `job_type`, with the retry
    /// policy used to back off between attempts.
    pub async fn register_processor(
        &self,
        job_type: JobType,
        processor: impl Processor<P, R> + 'static,
        retry: RetryExecutor,
    ) {
        self.processors
            .write()
            .await
            .insert(job_type, Arc::new(processor));
        self.retry_policies.write().await.insert(job_type, retry);
    }

    /// Admits a new job. Rejects admission once `max_jobs` active jobs are
    /// held, if no processor is registered for `job.job_type`, or once
    /// [`Self::shutdown`] has been called.
    pub async fn add_job(&self, job_type: JobType, payload: P, opts: JobOptions) -> Result<JobId> {
        if self.cancel.is_cancelled() {
            return Err(QueueError::ShuttingDown {
                queue: self.name.clone().into(),
            });
        }

        if !self.processors.read().await.contains_key(&job_type) {
            return Err(QueueError::NoProcessor {
                queue: self.name.clone().into(),
                job_type: job_type.to_string().into(),
            });
        }

        let max_attempts = match opts.max_attempts {
            Some(n) => n,
            None => self
                .retry_policies
                .read()
                .await
                .get(&job_type)
                .map(RetryExecutor::max_attempts)
                .unwrap_or(DEFAULT_MAX_ATTEMPTS),
        };

        let mut jobs = self.jobs.write().await;
        if jobs.len() >= self.config.max_jobs {
            return Err(QueueError::QueueFull {
                queue: self.name.clone().into(),
                max_jobs: self.config.max_jobs,
            });
        }

        let mut job = Job::new(job_type, payload, max_attempts, opts);
        job.status = JobStatus::Queued;
        let id = job.id;
        jobs.insert(id, job);
        drop(jobs);

        self.stats.write().await.record_added();
        self.emit(JobQueueEvent::Added(id));
        tracing::debug!(
            target: TRACING_TARGET,
            queue = %self.name,
            job_id = %id,
            %job_type,
            "job added"
        );
        self.notify.notify_one();
        Ok(id)
    }

    pub async fn get_job(&self, id: JobId) -> Option<Job<P, R>> {
        if let Some(job) = self.jobs.read().await.get(&id) {
            return Some(job.clone());
        }
        for archived in self.completed.lock().await.iter() {
            if archived.job.id == id {
                return Some(archived.job.clone());
            }
        }
        for archived in self.failed.lock().await.iter() {
            if archived.job.id == id {
                return Some(archived.job.clone());
            }
        }
        None
    }

    /// Returns every job the queue still tracks — active, plus archived
    /// completed and failed jobs — that matches `filter`.
    pub async fn get_jobs(&self, filter: &JobFilter) -> Vec<Job<P, R>> {
        let mut all: Vec<Job<P, R>> = self.jobs.read().await.values().cloned().collect();
        all.extend(self.completed.lock().await.iter().map(|a| a.job.clone()));
        all.extend(self.failed.lock().await.iter().map(|a| a.job.clone()));
        all.retain(|job| filter.matches(job));
        all
    }

    pub async fn get_stats(&self) -> QueueStats {
        self.stats.read().await.clone()
    }

    /// Updates a processing job's progress (clamped to 0..=100). A no-op if
    /// the job is no longer active (already terminal or evicted).
    pub async fn set_progress(&self, id: JobId, progress: u8) {
        if let Some(job) = self.jobs.write().await.get_mut(&id) {
            job.set_progress(progress);
        }
    }

    /// Cancels a job that has not yet started processing. A job already
    /// `processing` cannot be cancelled — it runs to completion or timeout.
    pub async fn cancel_job(&self, id: JobId) -> Result<()> {
        let mut jobs = self.jobs.write().await;
        let job = jobs.get_mut(&id).ok_or(QueueError::JobNotFound(id))?;

        match job.status {
            JobStatus::Processing => return Err(QueueError::CannotCancelProcessing(id)),
            status if status.is_terminal() => return Err(QueueError::AlreadyTerminal(id)),
            _ => {}
        }

        job.status = JobStatus::Cancelled;
        job.updated_at = Timestamp::now();
        drop(jobs);

        self.emit(JobQueueEvent::Cancelled(id));
        tracing::info!(target: TRACING_TARGET, queue = %self.name, job_id = %id, "job cancelled");
        Ok(())
    }

    /// Picks the highest-priority, oldest-created `queued` job whose
    /// `next_attempt_at` has arrived, if any.
    async fn select_next(&self) -> Option<JobId> {
        let now = Timestamp::now();
        let jobs = self.jobs.read().await;
        jobs.values()
            .filter(|j| j.status == JobStatus::Queued && j.next_attempt_at <= now)
            .min_by(|a, b| {
                b.priority
                    .cmp(&a.priority)
                    .then_with(|| a.created_at.cmp(&b.created_at))
                    .then_with(|| a.id.cmp(&b.id))
            })
            .map(|j| j.id)
    }

    async fn scheduler_loop(queue: Arc<Self>) {
        loop {
            tokio::select! {
                biased;
                _ = queue.cancel.cancelled() => return,
                _ = queue.notify.notified() => {}
                _ = tokio::time::sleep(Duration::from_millis(250)) => {}
            }

            while let Some(id) = queue.select_next().await {
                let Ok(permit) = queue.semaphore.clone().acquire_owned().await else {
                    return;
                };
                let queue = queue.clone();
                tokio::spawn(async move {
                    queue.clone().run_job(id).await;
                    drop(permit);
                    queue.notify.notify_one();
                });
            }
        }
    }

    async fn run_job(self: Arc<Self>, id: JobId) {
        let Some((payload, job_type, attempts, timeout)) = ({
            let mut jobs = self.jobs.write().await;
            match jobs.get_mut(&id) {
                Some(job) if job.status == JobStatus::Queued => {
                    job.status = JobStatus::Processing;
                    job.started_at = Some(Timestamp::now());
                    job.updated_at = Timestamp::now();
                    job.attempts += 1;
                    job.progress = 0;
                    Some((job.payload.clone(), job.job_type, job.attempts, job.timeout))
                }
                _ => None,
            }
        }) else {
            return;
        };

        self.emit(JobQueueEvent::Started(id));
        tracing::debug!(
            target: TRACING_TARGET,
            queue = %self.name,
            job_id = %id,
            attempt = attempts,
            "job started"
        );

        let processor = self.processors.read().await.get(&job_type).cloned();
        let Some(processor) = processor else {
            self.finish_as_failed(
                id,
                HandlerError {
                    message: format!("no processor registered for {job_type}"),
                    code: None,
                    http_status: None,
                },
                None,
                attempts,
            )
            .await;
            return;
        };

        let handle = JobHandle {
            queue: Arc::downgrade(&self),
            id,
        };
        let attempt_started = std::time::Instant::now();
        let outcome = tokio::time::timeout(timeout, processor.process(&payload, handle)).await;

        match outcome {
            Ok(Ok(result)) => self.finish_as_completed(id, result, attempt_started.elapsed()).await,
            Ok(Err(failure)) => {
                self.handle_failure(id, job_type, failure.error, failure.tag, attempts)
                    .await
            }
            Err(_) => {
                self.handle_failure(
                    id,
                    job_type,
                    HandlerError {
                        message: format!("Job timeout after {}ms", timeout.as_millis()),
                        code: Some("TIMEOUT_ERROR".to_string()),
                        http_status: None,
                    },
                    Some(ClassifiedError::Retryable),
                    attempts,
                )
                .await
            }
        }
    }

    async fn finish_as_completed(&self, id: JobId, result: R, elapsed: Duration) {
        let now = Timestamp::now();
        let mut jobs = self.jobs.write().await;
        if let Some(mut job) = jobs.remove(&id) {
            job.status = JobStatus::Completed;
            job.result = Some(result);
            job.completed_at = Some(now);
            job.updated_at = now;
            drop(jobs);

            self.archive(&self.completed, job, self.config.completed_capacity)
                .await;
            self.stats
                .write()
                .await
                .record_completion(elapsed.as_secs_f64() * 1000.0, now);
            self.emit(JobQueueEvent::Completed(id));
            tracing::info!(
                target: TRACING_TARGET,
                queue = %self.name,
                job_id = %id,
                elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                "job completed"
            );
        }
    }

    async fn handle_failure(
        &self,
        id: JobId,
        job_type: JobType,
        error: HandlerError,
        tag: Option<ClassifiedError>,
        attempts: u32,
    ) {
        let retryable = self.classifier.is_retryable(&error, tag);
        let max_attempts = self
            .jobs
            .read()
            .await
            .get(&id)
            .map(|j| j.max_attempts)
            .unwrap_or(attempts);
        let should_retry = retryable && attempts < max_attempts;

        if should_retry {
            let retry_policy = self.retry_policies.read().await.get(&job_type).copied();
            // Fall back to the spec's default curve (`min(1000 * 2^(a-1), 60000)`)
            // when this job's type has no registered `RetryExecutor`.
            let delay = match retry_policy {
                Some(policy) => policy.next_delay(attempts),
                None => {
                    let ms = 1000u64.saturating_mul(1u64 << attempts.saturating_sub(1).min(16));
                    Duration::from_millis(ms.min(60_000))
                }
            };
            let next_attempt_at = Timestamp::now() + jiff::Span::new().milliseconds(delay.as_millis() as i64);

            let mut jobs = self.jobs.write().await;
            if let Some(job) = jobs.get_mut(&id) {
                job.status = JobStatus::Retrying;
                job.next_attempt_at = next_attempt_at;
                job.updated_at = Timestamp::now();
                job.errors.push(JobErrorEntry {
                    message: error.message,
                    code: error.code,
                    attempt: attempts,
                    timestamp: Timestamp::now(),
                });
            }
            drop(jobs);

            self.stats.write().await.record_retry();
            self.emit(JobQueueEvent::Retry(id));
            tracing::warn!(
                target: TRACING_TARGET,
                queue = %self.name,
                job_id = %id,
                attempt = attempts,
                delay_ms = delay.as_millis() as u64,
                "job retrying"
            );
            return;
        }

        self.finish_as_failed(id, error, tag, attempts).await;
    }

    async fn finish_as_failed(
        &self,
        id: JobId,
        error: HandlerError,
        _tag: Option<ClassifiedError>,
        attempts: u32,
    ) {
        let now = Timestamp::now();
        let mut jobs = self.jobs.write().await;
        if let Some(mut job) = jobs.remove(&id) {
            job.status = JobStatus::Failed;
            job.completed_at = Some(now);
            job.updated_at = now;
            job.errors.push(JobErrorEntry {
                message: error.message,
                code: error.code,
                attempt: attempts,
                timestamp: now,
            });
            drop(jobs);

            self.archive(&self.failed, job, self.config.failed_capacity)
                .await;
            self.stats.write().await.record_failure(now);
            self.emit(JobQueueEvent::Failed(id));
            tracing::error!(
                target: TRACING_TARGET,
                queue = %self.name,
                job_id = %id,
                attempt = attempts,
                message = %error.message,
                "job failed"
            );
        }
    }

    async fn archive(&self, into: &Mutex<VecDeque<ArchivedJob<P, R>>>, job: Job<P, R>, capacity: usize) {
        let mut ring = into.lock().await;
        if ring.len() >= capacity {
            ring.pop_front();
        }
        ring.push_back(ArchivedJob {
            job,
            archived_at: Timestamp::now(),
        });
    }

    async fn retry_sweep_loop(queue: Arc<Self>) {
        let mut ticker = tokio::time::interval(queue.config.retry_sweep_interval);
        loop {
            tokio::select! {
                biased;
                _ = queue.cancel.cancelled() => return,
                _ = ticker.tick() => {}
            }

            let now = Timestamp::now();
            let mut due = Vec::new();
            {
                let mut jobs = queue.jobs.write().await;
                for job in jobs.values_mut() {
                    if job.status == JobStatus::Retrying && job.next_attempt_at <= now {
                        job.status = JobStatus::Queued;
                        job.updated_at = now;
                        due.push(job.id);
                    }
                }
            }
            if !due.is_empty() {
                queue.notify.notify_one();
            }
        }
    }

    async fn housekeeping_loop(queue: Arc<Self>) {
        let mut ticker = tokio::time::interval(queue.config.housekeeping_interval);
        loop {
            tokio::select! {
                biased;
                _ = queue.cancel.cancelled() => return,
                _ = ticker.tick() => {}
            }

            let now = Timestamp::now();
            let ttl = jiff::Span::new().seconds(queue.config.archive_ttl.as_secs() as i64);
            let cutoff = now - ttl;

            for ring in [&queue.completed, &queue.failed] {
                let mut ring = ring.lock().await;
                let before = ring.len();
                ring.retain(|archived| archived.archived_at > cutoff);
                let evicted = before - ring.len();
                if evicted > 0 {
                    tracing::debug!(
                        target: TRACING_TARGET,
                        queue = %queue.name,
                        evicted,
                        "housekeeping evicted archived jobs past TTL"
                    );
                }
            }
        }
    }

    /// Stops admitting new jobs, cancels the background loops, and waits for
    /// every in-flight `run_job` task to finish.
    ///
    /// Draining relies on the concurrency [`Semaphore`]: each running job
    /// holds one permit until its `run_job` task completes, so acquiring
    /// every configured permit can only succeed once none are left running.
    pub async fn shutdown(&self) {
        self.cancel.cancel();

        let mut handles = self.background.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        drop(handles);

        if let Ok(permits) = self
            .semaphore
            .clone()
            .acquire_many_owned(self.config.concurrency as u32)
            .await
        {
            drop(permits);
        }
    }
}
