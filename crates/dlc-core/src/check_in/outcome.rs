use serde::{Deserialize, Serialize};

use crate::parameters::{ProvisioningConfiguration, ProvisioningType};

/// Interpreted result of a check-in call.
///
/// Consumers match on this exhaustively; adding a variant must fail to
/// compile wherever a case is not handled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckInOutcome {
    ReadyForProvision {
        config: Option<ProvisioningConfiguration>,
        provisioning_type: ProvisioningType,
        mandatory: bool,
        debug_allowed: bool,
        provision_forced: bool,
    },
    RetryCheckIn {
        /// Absolute epoch millis at which the server wants the next attempt.
        next_check_in_time_ms: i64,
    },
    StopCheckIn,
    Unspecified,
    /// Transient failure; the job queue retries with backoff.
    RecoverableError,
    /// The attempt was cancelled before a response arrived.
    Interrupted,
    NonRecoverableError,
}

impl CheckInOutcome {
    pub fn name(&self) -> &'static str {
        match self {
            CheckInOutcome::ReadyForProvision { .. } => "ready_for_provision",
            CheckInOutcome::RetryCheckIn { .. } => "retry_check_in",
            CheckInOutcome::StopCheckIn => "stop_check_in",
            CheckInOutcome::Unspecified => "unspecified",
            CheckInOutcome::RecoverableError => "recoverable_error",
            CheckInOutcome::Interrupted => "interrupted",
            CheckInOutcome::NonRecoverableError => "non_recoverable_error",
        }
    }
}

/// Response returned by the check-in service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInResponse {
    pub registered_device_id: Option<String>,
    pub outcome: CheckInOutcome,
}

impl CheckInResponse {
    pub fn new(outcome: CheckInOutcome) -> Self {
        Self {
            registered_device_id: None,
            outcome,
        }
    }

    pub fn with_registered_device_id(mut self, id: impl Into<String>) -> Self {
        self.registered_device_id = Some(id.into());
        self
    }
}
