use async_trait::async_trait;

/// Collaborator that ends the enrollment lifecycle.
#[async_trait]
pub trait FinalizationPort: Send + Sync {
    /// Provisioning succeeded; release the device from the agent.
    async fn finalize_enrolled(&self) -> anyhow::Result<()>;

    /// Device will never be enrolled; clean up and stop checking in.
    async fn finalize_not_enrolled(&self) -> anyhow::Result<()>;

    /// Factory-reset the device.
    async fn reset_device(&self) -> anyhow::Result<()>;
}
