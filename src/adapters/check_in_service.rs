//! Check-in service adapters.
//!
//! [`HttpCheckInService`] talks JSON over HTTPS to the enrollment backend.
//! [`UnlinkedCheckInService`] is wired when no endpoint is configured.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dlc_core::check_in::{CheckInOutcome, CheckInResponse, DeviceIdType, DeviceIdentity};
use dlc_core::parameters::{ProvisioningConfiguration, ProvisioningType};
use dlc_core::ports::{CheckInServiceError, CheckInServicePort};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const CHECK_IN_PATH: &str = "/v1/device-check-in";

#[derive(Debug, Serialize)]
struct WireDeviceId<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    value: &'a str,
}

#[derive(Debug, Serialize)]
struct WireCheckInRequest<'a> {
    device_ids: Vec<WireDeviceId<'a>>,
    carrier_info: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    push_registration_token: Option<&'a str>,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum WireCheckInStatus {
    ReadyForProvision,
    RetryCheckIn,
    StopCheckIn,
    #[serde(other)]
    StatusUnspecified,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum WireProvisioningType {
    Financed,
    Subsidy,
    #[default]
    #[serde(other)]
    Unknown,
}

impl From<WireProvisioningType> for ProvisioningType {
    fn from(value: WireProvisioningType) -> Self {
        match value {
            WireProvisioningType::Financed => ProvisioningType::Financed,
            WireProvisioningType::Subsidy => ProvisioningType::Subsidy,
            WireProvisioningType::Unknown => ProvisioningType::Unknown,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireCheckInResponse {
    device_check_in_status: WireCheckInStatus,
    #[serde(default)]
    registered_device_identifier: Option<String>,
    #[serde(default)]
    next_check_in_time: Option<DateTime<Utc>>,
    #[serde(default)]
    provisioning_config: Option<ProvisioningConfiguration>,
    #[serde(default)]
    provisioning_type: WireProvisioningType,
    #[serde(default)]
    provisioning_mandatory: bool,
    #[serde(default)]
    debugging_allowed: bool,
    #[serde(default)]
    provision_forced: bool,
}

impl WireCheckInResponse {
    fn into_domain(self) -> CheckInResponse {
        let outcome = match self.device_check_in_status {
            WireCheckInStatus::ReadyForProvision => CheckInOutcome::ReadyForProvision {
                config: self.provisioning_config,
                provisioning_type: self.provisioning_type.into(),
                mandatory: self.provisioning_mandatory,
                debug_allowed: self.debugging_allowed,
                provision_forced: self.provision_forced,
            },
            WireCheckInStatus::RetryCheckIn => match self.next_check_in_time {
                Some(at) => CheckInOutcome::RetryCheckIn {
                    next_check_in_time_ms: at.timestamp_millis(),
                },
                None => {
                    warn!("retry response without next check-in time");
                    CheckInOutcome::Unspecified
                }
            },
            WireCheckInStatus::StopCheckIn => CheckInOutcome::StopCheckIn,
            WireCheckInStatus::StatusUnspecified => CheckInOutcome::Unspecified,
        };

        CheckInResponse {
            registered_device_id: self.registered_device_identifier,
            outcome,
        }
    }
}

fn wire_kind(kind: DeviceIdType) -> &'static str {
    match kind {
        DeviceIdType::Imei => "IMEI",
        DeviceIdType::Meid => "MEID",
    }
}

/// Server-side statuses worth retrying with backoff.
fn is_recoverable_status(status: StatusCode) -> bool {
    status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
}

/// JSON-over-HTTPS check-in client.
pub struct HttpCheckInService {
    client: reqwest::Client,
    url: String,
}

impl HttpCheckInService {
    pub fn new(endpoint: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build check-in HTTP client")?;
        Ok(Self {
            client,
            url: format!("{}{}", endpoint.trim_end_matches('/'), CHECK_IN_PATH),
        })
    }
}

#[async_trait]
impl CheckInServicePort for HttpCheckInService {
    async fn check_in(
        &self,
        identity: &DeviceIdentity,
        carrier_info: &str,
        push_token: Option<&str>,
    ) -> Result<CheckInResponse, CheckInServiceError> {
        let ids = identity.ids();
        let request = WireCheckInRequest {
            device_ids: ids
                .iter()
                .map(|id| WireDeviceId {
                    kind: wire_kind(id.kind),
                    value: &id.value,
                })
                .collect(),
            carrier_info,
            push_registration_token: push_token,
        };

        let response = match self.client.post(&self.url).json(&request).send().await {
            Ok(response) => response,
            Err(err) if err.is_timeout() => {
                warn!(error = %err, "check-in request timed out");
                return Ok(CheckInResponse::new(CheckInOutcome::RecoverableError));
            }
            Err(err) => return Err(CheckInServiceError::Transport(err.to_string())),
        };

        let status = response.status();
        debug!(%status, "check-in response received");
        if !status.is_success() {
            let outcome = if is_recoverable_status(status) {
                CheckInOutcome::RecoverableError
            } else {
                CheckInOutcome::NonRecoverableError
            };
            return Ok(CheckInResponse::new(outcome));
        }

        match response.json::<WireCheckInResponse>().await {
            Ok(body) => Ok(body.into_domain()),
            Err(err) if err.is_timeout() => {
                Ok(CheckInResponse::new(CheckInOutcome::RecoverableError))
            }
            Err(err) => {
                warn!(error = %err, "malformed check-in response");
                Ok(CheckInResponse::new(CheckInOutcome::Unspecified))
            }
        }
    }
}

/// Used when no check-in endpoint is configured. Every attempt fails as a
/// remote failure, which schedules the coarse failure retry.
pub struct UnlinkedCheckInService;

#[async_trait]
impl CheckInServicePort for UnlinkedCheckInService {
    async fn check_in(
        &self,
        _identity: &DeviceIdentity,
        _carrier_info: &str,
        _push_token: Option<&str>,
    ) -> Result<CheckInResponse, CheckInServiceError> {
        Err(CheckInServiceError::NotConfigured)
    }
}
