use async_trait::async_trait;
use dlc_core::parameters::SetupParameters;
use dlc_core::ports::SetupParametersPort;
use std::path::PathBuf;

use crate::fs::JsonFileStore;

pub const DEFAULT_SETUP_PARAMETERS_FILE: &str = "setup_parameters.json";

/// Setup parameters received from a successful check-in. Absent until then.
pub struct FileSetupParameters {
    store: JsonFileStore<Option<SetupParameters>>,
}

impl FileSetupParameters {
    pub fn new(path: PathBuf) -> Self {
        Self {
            store: JsonFileStore::new(path),
        }
    }

    pub fn with_defaults(base_dir: PathBuf) -> Self {
        Self::new(base_dir.join(DEFAULT_SETUP_PARAMETERS_FILE))
    }
}

#[async_trait]
impl SetupParametersPort for FileSetupParameters {
    async fn load(&self) -> anyhow::Result<Option<SetupParameters>> {
        self.store.load().await
    }

    async fn store(&self, params: &SetupParameters) -> anyhow::Result<()> {
        self.store.save(&Some(params.clone())).await
    }

    async fn clear(&self) -> anyhow::Result<()> {
        self.store.remove().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlc_core::parameters::{ProvisioningConfiguration, ProvisioningType};
    use tempfile::TempDir;

    fn sample() -> SetupParameters {
        SetupParameters {
            configuration: ProvisioningConfiguration {
                kiosk_app_package: "com.example.kiosk".into(),
                provider_name: "Example Finance".into(),
                terms_and_conditions_url: "https://example.com/terms".into(),
                support_url: "https://example.com/support".into(),
                allowed_packages: vec!["com.example.dialer".into()],
            },
            provisioning_type: ProvisioningType::Financed,
            mandatory: true,
            debug_allowed: false,
        }
    }

    #[tokio::test]
    async fn test_load_returns_none_before_store() {
        let temp_dir = TempDir::new().unwrap();
        let repo = FileSetupParameters::with_defaults(temp_dir.path().to_path_buf());

        assert!(repo.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let repo = FileSetupParameters::with_defaults(temp_dir.path().to_path_buf());

        repo.store(&sample()).await.unwrap();

        assert_eq!(repo.load().await.unwrap(), Some(sample()));
    }

    #[tokio::test]
    async fn test_clear_removes_parameters() {
        let temp_dir = TempDir::new().unwrap();
        let repo = FileSetupParameters::with_defaults(temp_dir.path().to_path_buf());
        repo.store(&sample()).await.unwrap();

        repo.clear().await.unwrap();

        assert!(repo.load().await.unwrap().is_none());
    }
}
