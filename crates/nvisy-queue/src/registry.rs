//! Named collection of [`JobQueue`] instances sharing one lifecycle.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::queue::{JobQueue, JobQueueConfig};
use crate::stats::QueueStats;

/// Creates [`JobQueue`] instances on first access by name and tears all of
/// them down together.
///
/// A workspace with several independent job classes (uploads, thumbnails,
/// batch jobs) typically holds one `QueueRegistry` and looks queues up by
/// name rather than threading each `Arc<JobQueue<_, _>>` through the
/// application individually.
pub struct QueueRegistry<P, R> {
    default_config: JobQueueConfig,
    queues: RwLock<HashMap<String, Arc<JobQueue<P, R>>>>,
}

impl<P, R> QueueRegistry<P, R>
where
    P: Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
{
    pub fn new(default_config: JobQueueConfig) -> Self {
        Self {
            default_config,
            queues: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the named queue, starting it with the registry's default
    /// config the first time it's requested.
    pub async fn get_or_create(&self, name: &str) -> Arc<JobQueue<P, R>> {
        if let Some(queue) = self.queues.read().await.get(name) {
            return queue.clone();
        }

        let mut queues = self.queues.write().await;
        queues
            .entry(name.to_string())
            .or_insert_with(|| {
                tracing::debug!(target: crate::TRACING_TARGET, queue = %name, "queue created");
                JobQueue::start(name.to_string(), self.default_config.clone())
            })
            .clone()
    }

    /// Starts a named queue with an explicit config, overriding the
    /// registry's default for that queue only. No-op if the queue already exists.
    pub async fn get_or_create_with(&self, name: &str, config: JobQueueConfig) -> Arc<JobQueue<P, R>> {
        if let Some(queue) = self.queues.read().await.get(name) {
            return queue.clone();
        }

        let mut queues = self.queues.write().await;
        queues
            .entry(name.to_string())
            .or_insert_with(|| JobQueue::start(name.to_string(), config))
            .clone()
    }

    pub async fn get(&self, name: &str) -> Option<Arc<JobQueue<P, R>>> {
        self.queues.read().await.get(name).cloned()
    }

    pub async fn get_all_stats(&self) -> HashMap<String, QueueStats> {
        let queues = self.queues.read().await;
        let mut stats = HashMap::with_capacity(queues.len());
        for (name, queue) in queues.iter() {
            stats.insert(name.clone(), queue.get_stats().await);
        }
        stats
    }

    /// Shuts down every queue the registry has created, concurrently.
    pub async fn shutdown(&self) {
        let queues: Vec<_> = self.queues.read().await.values().cloned().collect();
        let shutdowns = queues.iter().map(|q| q.shutdown());
        futures::future::join_all(shutdowns).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{JobOptions, JobType};
    use crate::retry::RetryExecutor;

    #[tokio::test]
    async fn get_or_create_reuses_existing_queue() {
        let registry: QueueRegistry<u32, u32> = QueueRegistry::new(JobQueueConfig::default());
        let a = registry.get_or_create("uploads").await;
        let b = registry.get_or_create("uploads").await;
        assert!(Arc::ptr_eq(&a, &b));
        registry.shutdown().await;
    }

    #[tokio::test]
    async fn distinct_names_yield_distinct_queues() {
        let registry: QueueRegistry<u32, u32> = QueueRegistry::new(JobQueueConfig::default());
        let uploads = registry.get_or_create("uploads").await;
        let thumbnails = registry.get_or_create("thumbnails").await;
        assert!(!Arc::ptr_eq(&uploads, &thumbnails));

        uploads
            .register_processor(
                JobType::FileUpload,
                |_p: &u32, _handle: crate::queue::JobHandle<u32, u32>| async move { Ok(1u32) },
                RetryExecutor::from_preset_name(crate::retry::RetryPresetName::FileUpload),
            )
            .await;
        uploads
            .add_job(JobType::FileUpload, 7, JobOptions::default())
            .await
            .unwrap();

        let stats = registry.get_all_stats().await;
        assert_eq!(stats.get("uploads").unwrap().total_jobs, 1);
        assert_eq!(stats.get("thumbnails").unwrap().total_jobs, 0);
        registry.shutdown().await;
    }
}
