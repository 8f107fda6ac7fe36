use std::sync::Arc;

use tracing::{info, warn};

use dlc_core::ports::{GlobalParametersPort, SetupParametersPort, UserParametersPort};

#[derive(Debug, thiserror::Error)]
pub enum ResetParametersError {
    #[error("parameter reset is only available on debug builds")]
    NotAllowed,
    #[error("failed to clear parameters: {0}")]
    Store(#[from] anyhow::Error),
}

/// Debug-only use case that clears every parameter store.
///
/// The recorded boot time survives so clock-change detection keeps working.
pub struct ResetParameters {
    global_params: Arc<dyn GlobalParametersPort>,
    user_params: Arc<dyn UserParametersPort>,
    setup_params: Arc<dyn SetupParametersPort>,
    allowed: bool,
}

impl ResetParameters {
    pub fn new(
        global_params: Arc<dyn GlobalParametersPort>,
        user_params: Arc<dyn UserParametersPort>,
        setup_params: Arc<dyn SetupParametersPort>,
        allowed: bool,
    ) -> Self {
        Self {
            global_params,
            user_params,
            setup_params,
            allowed,
        }
    }

    pub async fn execute(&self) -> Result<(), ResetParametersError> {
        if !self.allowed {
            warn!("parameter reset rejected");
            return Err(ResetParametersError::NotAllowed);
        }
        self.global_params.clear().await?;
        self.user_params.clear().await?;
        self.setup_params.clear().await?;
        info!("all parameters cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        InMemoryGlobalParameters, InMemorySetupParameters, InMemoryUserParameters,
    };
    use dlc_core::{DeviceState, ScheduleField, SetupParameters};

    async fn seeded() -> (
        Arc<InMemoryGlobalParameters>,
        Arc<InMemoryUserParameters>,
        Arc<InMemorySetupParameters>,
    ) {
        let global = Arc::new(InMemoryGlobalParameters::default());
        let user = Arc::new(InMemoryUserParameters::default());
        let setup = Arc::new(InMemorySetupParameters::default());
        global.set_provision_forced(true).await.unwrap();
        user.set_provision_state(DeviceState::ProvisionPaused)
            .await
            .unwrap();
        user.set_timestamp(ScheduleField::BootTime, 1234)
            .await
            .unwrap();
        setup.store(&SetupParameters::default()).await.unwrap();
        (global, user, setup)
    }

    #[tokio::test]
    async fn reset_clears_everything_but_boot_time() {
        let (global, user, setup) = seeded().await;
        let reset = ResetParameters::new(global.clone(), user.clone(), setup.clone(), true);

        reset.execute().await.unwrap();

        assert!(!global.snapshot().provision_forced);
        let params = user.snapshot();
        assert_eq!(params.provision_state, DeviceState::Unprovisioned);
        assert_eq!(params.boot_time_millis, 1234);
        assert!(setup.snapshot().is_none());
    }

    #[tokio::test]
    async fn reset_is_rejected_when_not_allowed() {
        let (global, user, setup) = seeded().await;
        let reset = ResetParameters::new(global.clone(), user.clone(), setup, false);

        let result = reset.execute().await;

        assert!(matches!(result, Err(ResetParametersError::NotAllowed)));
        assert!(global.snapshot().provision_forced);
        assert_eq!(user.snapshot().provision_state, DeviceState::ProvisionPaused);
    }
}
