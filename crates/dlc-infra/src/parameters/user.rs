use async_trait::async_trait;
use dlc_core::parameters::{ScheduleField, UserParameters};
use dlc_core::ports::UserParametersPort;
use dlc_core::provision::DeviceState;
use std::path::PathBuf;

use crate::fs::JsonFileStore;

pub const DEFAULT_USER_PARAMETERS_FILE: &str = "user_parameters.json";

/// Provisioning state and the absolute schedule intents.
pub struct FileUserParameters {
    store: JsonFileStore<UserParameters>,
}

impl FileUserParameters {
    pub fn new(path: PathBuf) -> Self {
        Self {
            store: JsonFileStore::new(path),
        }
    }

    pub fn with_defaults(base_dir: PathBuf) -> Self {
        Self::new(base_dir.join(DEFAULT_USER_PARAMETERS_FILE))
    }
}

#[async_trait]
impl UserParametersPort for FileUserParameters {
    async fn load(&self) -> anyhow::Result<UserParameters> {
        self.store.load().await
    }

    async fn set_provision_state(&self, state: DeviceState) -> anyhow::Result<()> {
        self.store.update(|p| p.provision_state = state).await?;
        Ok(())
    }

    async fn set_timestamp(&self, field: ScheduleField, value_ms: i64) -> anyhow::Result<()> {
        self.store.update(|p| p.set_timestamp(field, value_ms)).await?;
        Ok(())
    }

    async fn set_days_left_until_reset(&self, days: i32) -> anyhow::Result<()> {
        self.store.update(|p| p.days_left_until_reset = days).await?;
        Ok(())
    }

    async fn set_need_initial_check_in(&self, need: bool) -> anyhow::Result<()> {
        self.store.update(|p| p.need_initial_check_in = need).await?;
        Ok(())
    }

    async fn clear(&self) -> anyhow::Result<()> {
        self.store.update(|p| *p = p.cleared()).await?;
        Ok(())
    }
}
