use std::sync::Arc;

use serde::Serialize;

use dlc_core::ports::{GlobalParametersPort, SetupParametersPort, UserParametersPort};
use dlc_core::{GlobalParameters, SetupParameters, UserParameters};

/// Point-in-time copy of every parameter store.
#[derive(Debug, Clone, Serialize)]
pub struct ParametersSnapshot {
    pub global: GlobalParameters,
    pub user: UserParameters,
    pub setup: Option<SetupParameters>,
}

pub struct DumpParameters {
    global_params: Arc<dyn GlobalParametersPort>,
    user_params: Arc<dyn UserParametersPort>,
    setup_params: Arc<dyn SetupParametersPort>,
}

impl DumpParameters {
    pub fn new(
        global_params: Arc<dyn GlobalParametersPort>,
        user_params: Arc<dyn UserParametersPort>,
        setup_params: Arc<dyn SetupParametersPort>,
    ) -> Self {
        Self {
            global_params,
            user_params,
            setup_params,
        }
    }

    pub async fn execute(&self) -> anyhow::Result<ParametersSnapshot> {
        Ok(ParametersSnapshot {
            global: self.global_params.load().await?,
            user: self.user_params.load().await?,
            setup: self.setup_params.load().await?,
        })
    }
}
