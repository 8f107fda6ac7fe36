use std::sync::Arc;

use tracing::{info, warn};

use dlc_core::ports::PushTokenPort;
use dlc_core::JobOutcome;

/// Job runner for push registration token retrieval.
///
/// Retrieval is the whole job. The token is not handed anywhere: the port
/// owns it and every check-in attempt reads it afresh, so the next scheduled
/// check-in carries it. A missing token keeps the job on its backoff.
pub struct RetrievePushToken {
    push_token: Arc<dyn PushTokenPort>,
}

impl RetrievePushToken {
    pub fn new(push_token: Arc<dyn PushTokenPort>) -> Self {
        Self { push_token }
    }

    pub async fn execute(&self) -> JobOutcome {
        match self.push_token.registration_token().await {
            Ok(Some(token)) if !token.trim().is_empty() => {
                info!("push registration token available");
                JobOutcome::Success
            }
            Ok(_) => {
                warn!("push registration token still missing");
                JobOutcome::Retry
            }
            Err(err) => {
                warn!(error = %err, "push registration token retrieval failed");
                JobOutcome::Retry
            }
        }
    }
}
