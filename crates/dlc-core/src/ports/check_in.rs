use async_trait::async_trait;
use thiserror::Error;

use crate::check_in::{CheckInResponse, DeviceIdentity};

/// Transport-level failure of a check-in call. Any of these is treated as a
/// non-recoverable remote failure.
#[derive(Debug, Error)]
pub enum CheckInServiceError {
    #[error("check-in transport failed: {0}")]
    Transport(String),

    #[error("check-in service is not configured")]
    NotConfigured,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[async_trait]
pub trait CheckInServicePort: Send + Sync {
    async fn check_in(
        &self,
        identity: &DeviceIdentity,
        carrier_info: &str,
        push_token: Option<&str>,
    ) -> Result<CheckInResponse, CheckInServiceError>;
}
