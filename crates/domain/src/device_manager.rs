//! Device manager: an aggregating device (a gateway) that owns other devices
//! and other managers.

use serde::{Deserialize, Serialize};

use crate::device::{Device, DevicePatch, DeviceRecord};
use crate::id::DeviceManagerId;
use crate::reference::Reference;

/// A device manager as submitted and as stored.
///
/// Sub-device and sub-manager sets are optional associations.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeviceManagerRecord {
    #[serde(flatten)]
    pub device: DeviceRecord<DeviceManagerId>,
    #[serde(default)]
    pub devices: Vec<Reference>,
    #[serde(default)]
    pub managers: Vec<Reference>,
}

/// A fully resolved device manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceManager {
    #[serde(flatten)]
    pub device: Device<DeviceManagerId>,
    pub devices: Vec<Device>,
    pub managers: Vec<DeviceManager>,
}

impl DeviceManager {
    #[must_use]
    pub fn id(&self) -> DeviceManagerId {
        self.device.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.device.name
    }

    /// The storable form, with every association collapsed to its id.
    #[must_use]
    pub fn to_record(&self) -> DeviceManagerRecord {
        DeviceManagerRecord {
            device: self.device.to_record(),
            devices: self
                .devices
                .iter()
                .map(|d| Reference::by_id(d.id))
                .collect(),
            managers: self
                .managers
                .iter()
                .map(|m| Reference::by_id(m.id()))
                .collect(),
        }
    }
}

/// Partial update for a device manager. Present sets replace the stored ones.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceManagerPatch {
    #[serde(flatten)]
    pub device: DevicePatch,
    pub devices: Option<Vec<Reference>>,
    pub managers: Option<Vec<Reference>>,
}
