//! Logging adapters for the provisioning collaborators.
//!
//! The agent has no kiosk installer or policy engine of its own; these adapters
//! record what would be asked of them so the state machine can run end to end.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use dlc_core::ports::{FinalizationPort, ProvisionSignalPort};
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// LoggingProvisionSignals
// ---------------------------------------------------------------------------

pub struct LoggingProvisionSignals;

#[async_trait]
impl ProvisionSignalPort for LoggingProvisionSignals {
    async fn provisioning_ready(&self) -> Result<()> {
        info!("Provisioning ready; waiting for the user to start");
        Ok(())
    }

    async fn install_kiosk_app(&self) -> Result<()> {
        info!("Kiosk app installation requested");
        Ok(())
    }

    async fn deferred_provisioning(&self, resume_at_ms: i64) -> Result<()> {
        let resume_at = Utc
            .timestamp_millis_opt(resume_at_ms)
            .single()
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| resume_at_ms.to_string());
        info!(resume_at_ms, %resume_at, "Provisioning deferred");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// LoggingFinalization
// ---------------------------------------------------------------------------

pub struct LoggingFinalization;

#[async_trait]
impl FinalizationPort for LoggingFinalization {
    async fn finalize_enrolled(&self) -> Result<()> {
        info!("Device enrolled; releasing agent restrictions");
        Ok(())
    }

    async fn finalize_not_enrolled(&self) -> Result<()> {
        info!("Device not enrolled; clearing restrictions and stopping check-in");
        Ok(())
    }

    async fn reset_device(&self) -> Result<()> {
        warn!("Device reset requested");
        Ok(())
    }
}
