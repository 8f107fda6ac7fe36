use async_trait::async_trait;

/// Outbound signals to the provisioning UI and installer.
#[async_trait]
pub trait ProvisionSignalPort: Send + Sync {
    async fn provisioning_ready(&self) -> anyhow::Result<()>;

    async fn install_kiosk_app(&self) -> anyhow::Result<()>;

    /// Show the deferred-provisioning notice; provisioning resumes at
    /// `resume_at_ms` (epoch millis).
    async fn deferred_provisioning(&self, resume_at_ms: i64) -> anyhow::Result<()>;
}
