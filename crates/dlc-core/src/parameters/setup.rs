use serde::{Deserialize, Serialize};

/// Provisioning configuration delivered by a "ready for provision" check-in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisioningConfiguration {
    pub kiosk_app_package: String,
    pub provider_name: String,
    pub terms_and_conditions_url: String,
    pub support_url: String,
    /// Packages allowed to run while the device is locked.
    pub allowed_packages: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisioningType {
    Financed,
    Subsidy,
    #[default]
    Unknown,
}

/// Parameters handed to the provisioning flow.
///
/// 下发给配置流程的参数。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetupParameters {
    pub configuration: ProvisioningConfiguration,
    pub provisioning_type: ProvisioningType,
    pub mandatory: bool,
    pub debug_allowed: bool,
}
