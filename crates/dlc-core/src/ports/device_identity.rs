use async_trait::async_trait;

use crate::check_in::DeviceIdentity;

#[async_trait]
pub trait DeviceIdentityPort: Send + Sync {
    /// Identifiers of the kinds this device is configured to report. May be
    /// empty.
    async fn device_ids(&self) -> anyhow::Result<DeviceIdentity>;

    async fn carrier_info(&self) -> anyhow::Result<Option<String>>;
}
