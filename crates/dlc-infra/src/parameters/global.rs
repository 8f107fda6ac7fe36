use async_trait::async_trait;
use dlc_core::parameters::GlobalParameters;
use dlc_core::ports::GlobalParametersPort;
use std::path::PathBuf;

use crate::fs::JsonFileStore;

pub const DEFAULT_GLOBAL_PARAMETERS_FILE: &str = "global_parameters.json";

pub struct FileGlobalParameters {
    store: JsonFileStore<GlobalParameters>,
}

impl FileGlobalParameters {
    pub fn new(path: PathBuf) -> Self {
        Self {
            store: JsonFileStore::new(path),
        }
    }

    pub fn with_defaults(base_dir: PathBuf) -> Self {
        Self::new(base_dir.join(DEFAULT_GLOBAL_PARAMETERS_FILE))
    }
}

#[async_trait]
impl GlobalParametersPort for FileGlobalParameters {
    async fn load(&self) -> anyhow::Result<GlobalParameters> {
        self.store.load().await
    }

    async fn set_registered_device_id(&self, id: Option<String>) -> anyhow::Result<()> {
        self.store.update(|p| p.registered_device_id = id).await?;
        Ok(())
    }

    async fn set_provision_forced(&self, forced: bool) -> anyhow::Result<()> {
        self.store.update(|p| p.provision_forced = forced).await?;
        Ok(())
    }

    async fn set_provision_ready(&self, ready: bool) -> anyhow::Result<()> {
        self.store.update(|p| p.provision_ready = ready).await?;
        Ok(())
    }

    async fn set_need_check_in(&self, need: bool) -> anyhow::Result<()> {
        self.store.update(|p| p.need_check_in = need).await?;
        Ok(())
    }

    async fn set_enrollment_token(&self, token: Option<String>) -> anyhow::Result<()> {
        self.store.update(|p| p.enrollment_token = token).await?;
        Ok(())
    }

    async fn clear(&self) -> anyhow::Result<()> {
        self.store.save(&GlobalParameters::default()).await
    }
}
