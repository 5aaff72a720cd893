//! Errors produced by the queue itself (admission control, lookups), as
//! distinct from errors produced by handlers (see [`crate::classify`]).

use std::borrow::Cow;

use crate::job::JobId;

/// Result type alias for `nvisy-queue` operations.
pub type Result<T, E = QueueError> = std::result::Result<T, E>;

/// Errors raised by [`crate::JobQueue`] and [`crate::QueueRegistry`] admission
/// control and lookup operations.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// `addJob` was rejected because the queue already holds `maxJobs` active jobs.
    #[error("queue '{queue}' is full ({max_jobs} active jobs)")]
    QueueFull {
        /// Name of the queue that rejected admission.
        queue: Cow<'static, str>,
        /// The queue's configured admission cap.
        max_jobs: usize,
    },

    /// `addJob` was called for a job type with no registered handler.
    #[error("no processor registered for job type '{job_type}' on queue '{queue}'")]
    NoProcessor {
        /// Name of the queue.
        queue: Cow<'static, str>,
        /// The unregistered job type.
        job_type: Cow<'static, str>,
    },

    /// The referenced job does not exist in the active set or archives.
    #[error("job {0} not found")]
    JobNotFound(JobId),

    /// `cancelJob` was called on a job currently being processed.
    #[error("job {0} cannot be cancelled while processing")]
    CannotCancelProcessing(JobId),

    /// The job has already reached a terminal status.
    #[error("job {0} is already in a terminal state")]
    AlreadyTerminal(JobId),

    /// `addJob` was called after `shutdown` began; the queue no longer admits work.
    #[error("queue '{queue}' is shutting down and no longer accepts jobs")]
    ShuttingDown {
        /// Name of the queue that refused admission.
        queue: Cow<'static, str>,
    },
}
