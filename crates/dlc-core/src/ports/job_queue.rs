use async_trait::async_trait;

use crate::schedule::{JobInfo, JobRequest};

/// Durable, named, delayed jobs.
///
/// Enqueuing a name that is already pending replaces the pending job.
#[async_trait]
pub trait DurableJobQueuePort: Send + Sync {
    async fn enqueue_unique(&self, request: JobRequest) -> anyhow::Result<()>;

    async fn query(&self, name: &str) -> anyhow::Result<Option<JobInfo>>;

    async fn cancel(&self, name: &str) -> anyhow::Result<()>;
}
