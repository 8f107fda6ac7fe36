//! Device facts taken from the agent configuration.
//!
//! On a real handset these come from the telephony stack; the agent reads
//! them from the `[device]` config section instead.

use async_trait::async_trait;
use dlc_core::check_in::{DeviceIdType, DeviceIdentity};
use dlc_core::config::DeviceConfig;
use dlc_core::ports::{DeviceIdentityPort, PushTokenPort};
use tracing::debug;

/// Reports the configured IMEI/MEID values whose kind is enabled by the
/// configured device-id type bitmap.
pub struct ConfiguredDeviceIdentity {
    config: DeviceConfig,
}

impl ConfiguredDeviceIdentity {
    pub fn new(config: DeviceConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl DeviceIdentityPort for ConfiguredDeviceIdentity {
    async fn device_ids(&self) -> anyhow::Result<DeviceIdentity> {
        let bitmap = self.config.id_type_bitmap;
        let mut identity = DeviceIdentity::new();

        if DeviceIdType::Imei.enabled_in(bitmap) {
            for imei in &self.config.imei {
                identity.insert(DeviceIdType::Imei, imei.as_str());
            }
        }
        if DeviceIdType::Meid.enabled_in(bitmap) {
            for meid in &self.config.meid {
                identity.insert(DeviceIdType::Meid, meid.as_str());
            }
        }

        debug!(bitmap, count = identity.len(), "collected device identifiers");
        Ok(identity)
    }

    async fn carrier_info(&self) -> anyhow::Result<Option<String>> {
        Ok(self.config.carrier.clone())
    }
}

pub struct ConfiguredPushToken {
    token: Option<String>,
}

impl ConfiguredPushToken {
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }
}

#[async_trait]
impl PushTokenPort for ConfiguredPushToken {
    async fn registration_token(&self) -> anyhow::Result<Option<String>> {
        Ok(self
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string))
    }
}
