use serde::{Deserialize, Serialize};

/// Device-wide parameters, one copy per device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalParameters {
    /// Identifier the server registered the device under.
    pub registered_device_id: Option<String>,
    /// Provisioning can no longer be deferred by the user.
    pub provision_forced: bool,
    /// Setup parameters are stored and provisioning may start.
    pub provision_ready: bool,
    pub need_check_in: bool,
    pub enrollment_token: Option<String>,
}

impl Default for GlobalParameters {
    fn default() -> Self {
        Self {
            registered_device_id: None,
            provision_forced: false,
            provision_ready: false,
            need_check_in: true,
            enrollment_token: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let params: GlobalParameters =
            serde_json::from_str(r#"{"provision_forced": true}"#).unwrap();
        assert!(params.provision_forced);
        assert!(params.need_check_in);
        assert!(params.registered_device_id.is_none());
    }
}
