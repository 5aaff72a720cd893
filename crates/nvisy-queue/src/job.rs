//! Job identity, priority, status, and the generic [`Job`] record itself.

use std::time::Duration;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default per-job processing timeout, per the spec's `metadata.timeout` default.
pub const DEFAULT_JOB_TIMEOUT: Duration = Duration::from_millis(300_000);

/// Default retry ceiling for jobs whose queue has no processor-specific
/// [`crate::RetryExecutor`] registered.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Opaque identifier for a single queued job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct JobId(Uuid);

impl JobId {
    /// Mints a new, time-ordered job id.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The closed set of job kinds this workspace's queue is instantiated with.
///
/// Handlers register against one variant; `addJob` rejects any job whose
/// type has no registered processor.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    FileUpload,
    FileProcessing,
    FileCompression,
    ThumbnailGeneration,
    VirusScan,
    BatchProcessing,
    FileCleanup,
}

/// Scheduling priority. Higher numeric value is serviced first; ties break
/// on `created_at` (oldest first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum JobPriority {
    Low = 1,
    Normal = 2,
    High = 3,
    Urgent = 4,
    Critical = 5,
}

impl Default for JobPriority {
    fn default() -> Self {
        Self::Normal
    }
}

/// Lifecycle status of a job.
///
/// Valid transitions:
/// `pending -> queued -> processing -> {completed, failed}`,
/// `processing -> retrying -> queued` (when retryable and `attempts < max_attempts`),
/// any non-terminal status `-> cancelled`.
/// Any other transition is a bug and is rejected by [`crate::JobQueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Queued,
    Processing,
    Completed,
    Failed,
    Cancelled,
    Retrying,
}

impl JobStatus {
    /// Terminal statuses are never revisited; they are only ever archived.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// A single recorded failure from one processing attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobErrorEntry {
    /// Human-readable error message.
    pub message: String,
    /// Producer-supplied error code, if any (used by [`crate::classify::ErrorClassifier`]).
    pub code: Option<String>,
    /// 1-indexed attempt number this failure occurred on.
    pub attempt: u32,
    /// When this failure was recorded.
    pub timestamp: Timestamp,
}

/// Caller-supplied options for `addJob`, beyond the payload itself.
#[derive(Debug, Clone)]
pub struct JobOptions {
    pub priority: JobPriority,
    pub user_id: Option<String>,
    /// Initial wait before the job becomes eligible for scheduling.
    pub delay: Duration,
    /// Overrides the queue's processor-bound retry ceiling when set.
    pub max_attempts: Option<u32>,
    /// Per-job processing timeout; defaults to [`DEFAULT_JOB_TIMEOUT`].
    pub timeout: Duration,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self {
            priority: JobPriority::default(),
            user_id: None,
            delay: Duration::ZERO,
            max_attempts: None,
            timeout: DEFAULT_JOB_TIMEOUT,
        }
    }
}

/// A job tracked by a [`crate::JobQueue`].
///
/// Generic over a handler-specific payload `P` and result `R`; the queue
/// never inspects either — it only schedules, times out, and retries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job<P, R> {
    pub id: JobId,
    pub job_type: JobType,
    pub priority: JobPriority,
    pub status: JobStatus,
    pub payload: P,
    pub user_id: Option<String>,
    pub result: Option<R>,
    pub errors: Vec<JobErrorEntry>,
    /// Attempts made so far, starting at 0 before the first attempt.
    pub attempts: u32,
    /// Attempt ceiling; once reached, a failure is terminal rather than retried.
    pub max_attempts: u32,
    /// Progress within the current attempt, 0..=100. Resets to 0 when a retry starts processing.
    pub progress: u8,
    /// Per-job processing timeout.
    pub timeout: Duration,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    /// Earliest time the job becomes eligible: set from `delay` at creation,
    /// and advanced by the retry sweep after each retryable failure.
    pub next_attempt_at: Timestamp,
}

impl<P, R> Job<P, R> {
    /// Builds a new job in the `pending` status with zero attempts recorded.
    pub fn new(job_type: JobType, payload: P, max_attempts: u32, opts: JobOptions) -> Self {
        let now = Timestamp::now();
        let next_attempt_at = now
            + jiff::Span::new().milliseconds(opts.delay.as_millis() as i64);
        Self {
            id: JobId::new(),
            job_type,
            priority: opts.priority,
            status: JobStatus::Pending,
            payload,
            user_id: opts.user_id,
            result: None,
            errors: Vec::new(),
            attempts: 0,
            max_attempts,
            progress: 0,
            timeout: opts.timeout,
            created_at: now,
            updated_at: now,
            started_at: None,
            completed_at: None,
            next_attempt_at,
        }
    }

    /// Sets `progress`, clamped to the valid 0..=100 range.
    pub fn set_progress(&mut self, progress: u8) {
        self.progress = progress.min(100);
        self.updated_at = Timestamp::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_ordering_favors_higher_variant() {
        assert!(JobPriority::Critical > JobPriority::Urgent);
        assert!(JobPriority::Urgent > JobPriority::High);
        assert!(JobPriority::High > JobPriority::Normal);
        assert!(JobPriority::Normal > JobPriority::Low);
    }

    #[test]
    fn terminal_statuses_are_exactly_three() {
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Queued.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
        assert!(!JobStatus::Retrying.is_terminal());
    }

    #[test]
    fn job_type_round_trips_through_snake_case() {
        use std::str::FromStr;
        assert_eq!(JobType::ThumbnailGeneration.to_string(), "thumbnail_generation");
        assert_eq!(
            JobType::from_str("file_compression").unwrap(),
            JobType::FileCompression
        );
    }

    #[test]
    fn new_job_starts_pending_with_zero_attempts() {
        let job: Job<u32, u32> = Job::new(JobType::FileUpload, 42, 3, JobOptions::default());
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.attempts, 0);
        assert_eq!(job.payload, 42);
        assert_eq!(job.progress, 0);
        assert!(job.result.is_none());
        assert!(job.next_attempt_at <= Timestamp::now());
    }

    #[test]
    fn delayed_job_is_not_eligible_immediately() {
        let opts = JobOptions {
            delay: Duration::from_secs(60),
            ..JobOptions::default()
        };
        let job: Job<u32, u32> = Job::new(JobType::FileUpload, 1, 3, opts);
        assert!(job.next_attempt_at > Timestamp::now());
    }

    #[test]
    fn set_progress_clamps_to_one_hundred() {
        let mut job: Job<u32, u32> = Job::new(JobType::FileUpload, 1, 3, JobOptions::default());
        job.set_progress(150);
        assert_eq!(job.progress, 100);
    }
}
