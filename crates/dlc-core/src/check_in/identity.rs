use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceIdType {
    Imei,
    Meid,
}

impl DeviceIdType {
    /// Bit of this kind in a device-id type bitmap.
    pub fn bit(self) -> i32 {
        match self {
            DeviceIdType::Imei => 1 << 0,
            DeviceIdType::Meid => 1 << 1,
        }
    }

    /// Whether `bitmap` enables this kind. A non-positive bitmap enables none.
    pub fn enabled_in(self, bitmap: i32) -> bool {
        bitmap > 0 && bitmap & self.bit() != 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceId {
    pub kind: DeviceIdType,
    pub value: String,
}

/// Hardware identifiers of the device, deduplicated by value.
///
/// An empty identity is valid and means the device cannot be enrolled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceIdentity {
    ids: BTreeMap<String, DeviceIdType>,
}

impl DeviceIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an identifier. Blank values are skipped; a repeated value keeps the
    /// first kind it was added with.
    pub fn insert(&mut self, kind: DeviceIdType, value: impl Into<String>) {
        let value = value.into();
        let value = value.trim();
        if value.is_empty() {
            return;
        }
        self.ids.entry(value.to_string()).or_insert(kind);
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn ids(&self) -> Vec<DeviceId> {
        self.ids
            .iter()
            .map(|(value, kind)| DeviceId {
                kind: *kind,
                value: value.clone(),
            })
            .collect()
    }
}

impl FromIterator<DeviceId> for DeviceIdentity {
    fn from_iter<T: IntoIterator<Item = DeviceId>>(iter: T) -> Self {
        let mut identity = DeviceIdentity::new();
        for id in iter {
            identity.insert(id.kind, id.value);
        }
        identity
    }
}
