use serde::{Deserialize, Serialize};

/// Why a check-in attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckInFailureCause {
    ResponseUnspecified,
    ConfigUnavailable,
    NetworkTimeUnavailable,
    RemoteCallFailed,
    Interrupted,
    DeviceIdentifierUnavailable,
}

impl CheckInFailureCause {
    pub fn as_str(self) -> &'static str {
        match self {
            CheckInFailureCause::ResponseUnspecified => "RESPONSE_UNSPECIFIED",
            CheckInFailureCause::ConfigUnavailable => "CONFIG_UNAVAILABLE",
            CheckInFailureCause::NetworkTimeUnavailable => "NETWORK_TIME_UNAVAILABLE",
            CheckInFailureCause::RemoteCallFailed => "RPC_FAILURE",
            CheckInFailureCause::Interrupted => "INTERRUPTED",
            CheckInFailureCause::DeviceIdentifierUnavailable => "DEVICE_ID_UNAVAILABLE",
        }
    }

    /// Whether the job queue should run the attempt again with its backoff.
    ///
    /// `RemoteCallFailed` is excluded because the handler has already
    /// scheduled its own fixed-delay retry.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            CheckInFailureCause::ResponseUnspecified
                | CheckInFailureCause::ConfigUnavailable
                | CheckInFailureCause::NetworkTimeUnavailable
        )
    }
}

impl std::fmt::Display for CheckInFailureCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one check-in attempt as seen by the job runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckInReport {
    /// Response interpreted and acted upon.
    Handled,
    /// Transient problem; run the job again.
    Retry,
    Failed(CheckInFailureCause),
}
