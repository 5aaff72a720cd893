#![doc = include_str!("../README.md")]

/// Tracing target used for all scheduler state-transition events.
pub const TRACING_TARGET: &str = "nvisy_queue";

mod classify;
mod error;
mod job;
mod queue;
mod registry;
mod retry;
mod stats;

pub use classify::{Classification, ClassifiedError, ErrorClassifier, HandlerError};
pub use error::{QueueError, Result};
pub use job::{
    Job, JobErrorEntry, JobId, JobOptions, JobPriority, JobStatus, JobType, DEFAULT_JOB_TIMEOUT,
    DEFAULT_MAX_ATTEMPTS,
};
pub use queue::{
    JobFilter, JobHandle, JobQueue, JobQueueConfig, JobQueueEvent, Processor, ProcessorFailure,
    ProcessorOutcome,
};
pub use registry::QueueRegistry;
pub use retry::{RetryExecutor, RetryPreset, RetryPresetName};
pub use stats::QueueStats;

/// Re-exports the common set of types needed to register a processor and
/// submit jobs to a [`JobQueue`].
pub mod prelude {
    pub use crate::{
        Classification, ClassifiedError, ErrorClassifier, HandlerError, Job, JobErrorEntry, JobFilter,
        JobHandle, JobId, JobOptions, JobPriority, JobQueue, JobQueueConfig, JobQueueEvent, JobStatus,
        JobType, Processor, ProcessorFailure, ProcessorOutcome, QueueError, QueueRegistry, QueueStats,
        Result, RetryExecutor, RetryPreset, RetryPresetName,
    };
}
