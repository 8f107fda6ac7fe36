use std::sync::Arc;

use tracing::{error, info};

use dlc_core::{CheckInReport, JobOutcome};

use super::handler::CheckInProtocolHandler;

/// Job runner for the unique check-in job.
pub struct DeviceCheckInWorker {
    handler: Arc<CheckInProtocolHandler>,
}

impl DeviceCheckInWorker {
    pub fn new(handler: Arc<CheckInProtocolHandler>) -> Self {
        Self { handler }
    }

    pub async fn run(&self) -> JobOutcome {
        let outcome = match self.handler.handle().await {
            Ok(report) => outcome_for(report),
            Err(err) => {
                error!(error = %err, "check-in attempt aborted");
                JobOutcome::Retry
            }
        };
        info!(?outcome, "check-in job finished");
        outcome
    }
}

fn outcome_for(report: CheckInReport) -> JobOutcome {
    match report {
        CheckInReport::Handled => JobOutcome::Success,
        CheckInReport::Retry => JobOutcome::Retry,
        CheckInReport::Failed(cause) if cause.is_retryable() => JobOutcome::Retry,
        CheckInReport::Failed(_) => JobOutcome::Failure,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlc_core::CheckInFailureCause;

    #[test]
    fn handled_succeeds() {
        assert_eq!(outcome_for(CheckInReport::Handled), JobOutcome::Success);
    }

    #[test]
    fn unhandled_responses_retry() {
        assert_eq!(outcome_for(CheckInReport::Retry), JobOutcome::Retry);
        for cause in [
            CheckInFailureCause::ResponseUnspecified,
            CheckInFailureCause::ConfigUnavailable,
            CheckInFailureCause::NetworkTimeUnavailable,
        ] {
            assert_eq!(outcome_for(CheckInReport::Failed(cause)), JobOutcome::Retry);
        }
    }

    #[test]
    fn terminal_failures_fail() {
        for cause in [
            CheckInFailureCause::RemoteCallFailed,
            CheckInFailureCause::Interrupted,
            CheckInFailureCause::DeviceIdentifierUnavailable,
        ] {
            assert_eq!(outcome_for(CheckInReport::Failed(cause)), JobOutcome::Failure);
        }
    }
}
