//! Parameter store ports.
//!
//! Each setter writes one whole field. Callers re-read after any operation
//! that may have mutated the store instead of caching values.

use async_trait::async_trait;

use crate::parameters::{GlobalParameters, ScheduleField, SetupParameters, UserParameters};
use crate::provision::DeviceState;

#[async_trait]
pub trait GlobalParametersPort: Send + Sync {
    async fn load(&self) -> anyhow::Result<GlobalParameters>;

    async fn set_registered_device_id(&self, id: Option<String>) -> anyhow::Result<()>;

    async fn set_provision_forced(&self, forced: bool) -> anyhow::Result<()>;

    async fn set_provision_ready(&self, ready: bool) -> anyhow::Result<()>;

    async fn set_need_check_in(&self, need: bool) -> anyhow::Result<()>;

    async fn set_enrollment_token(&self, token: Option<String>) -> anyhow::Result<()>;

    /// Debug only.
    async fn clear(&self) -> anyhow::Result<()>;

    async fn is_provision_forced(&self) -> anyhow::Result<bool> {
        Ok(self.load().await?.provision_forced)
    }
}

#[async_trait]
pub trait UserParametersPort: Send + Sync {
    async fn load(&self) -> anyhow::Result<UserParameters>;

    async fn set_provision_state(&self, state: DeviceState) -> anyhow::Result<()>;

    async fn set_timestamp(&self, field: ScheduleField, value_ms: i64) -> anyhow::Result<()>;

    async fn set_days_left_until_reset(&self, days: i32) -> anyhow::Result<()>;

    async fn set_need_initial_check_in(&self, need: bool) -> anyhow::Result<()>;

    /// Reset to defaults, keeping `boot_time_millis`. Debug only.
    async fn clear(&self) -> anyhow::Result<()>;

    async fn provision_state(&self) -> anyhow::Result<DeviceState> {
        Ok(self.load().await?.provision_state)
    }

    async fn timestamp(&self, field: ScheduleField) -> anyhow::Result<i64> {
        Ok(self.load().await?.timestamp(field))
    }
}

#[async_trait]
pub trait SetupParametersPort: Send + Sync {
    async fn load(&self) -> anyhow::Result<Option<SetupParameters>>;

    async fn store(&self, params: &SetupParameters) -> anyhow::Result<()>;

    async fn clear(&self) -> anyhow::Result<()>;
}
