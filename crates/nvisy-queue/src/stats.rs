//! Aggregate counters exposed by a running [`crate::JobQueue`].

use jiff::Timestamp;
use serde::Serialize;

/// Snapshot of a queue's lifetime counters, returned by `getStats`.
#[derive(Debug, Clone, Serialize)]
pub struct QueueStats {
    pub total_jobs: u64,
    pub completed_jobs: u64,
    pub failed_jobs: u64,
    pub retried_jobs: u64,
    /// Mean wall-clock processing time across all completed jobs, in milliseconds.
    pub average_processing_time_ms: f64,
    pub last_processed_at: Option<Timestamp>,
}

impl Default for QueueStats {
    fn default() -> Self {
        Self {
            total_jobs: 0,
            completed_jobs: 0,
            failed_jobs: 0,
            retried_jobs: 0,
            average_processing_time_ms: 0.0,
            last_processed_at: None,
        }
    }
}

impl QueueStats {
    pub(crate) fn record_added(&mut self) {
        self.total_jobs += 1;
    }

    pub(crate) fn record_retry(&mut self) {
        self.retried_jobs += 1;
    }

    pub(crate) fn record_completion(&mut self, processing_time_ms: f64, now: Timestamp) {
        let n = self.completed_jobs as f64;
        self.average_processing_time_ms =
            (self.average_processing_time_ms * n + processing_time_ms) / (n + 1.0);
        self.completed_jobs += 1;
        self.last_processed_at = Some(now);
    }

    pub(crate) fn record_failure(&mut self, now: Timestamp) {
        self.failed_jobs += 1;
        self.last_processed_at = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_processing_time_accumulates_correctly() {
        let mut stats = QueueStats::default();
        let now = Timestamp::now();
        stats.record_completion(100.0, now);
        stats.record_completion(200.0, now);
        assert_eq!(stats.completed_jobs, 2);
        assert!((stats.average_processing_time_ms - 150.0).abs() < f64::EPSILON);
    }
}
