use async_trait::async_trait;

#[async_trait]
pub trait PushTokenPort: Send + Sync {
    /// Current push registration token, `None` when not yet retrieved.
    async fn registration_token(&self) -> anyhow::Result<Option<String>>;
}
