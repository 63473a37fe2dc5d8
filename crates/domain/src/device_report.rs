//! Device report: which value descriptors a device is expected to report
//! when a schedule event fires.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::DeviceReportId;
use crate::patch::{Identity, merge};
use crate::time::Audit;

/// Both associations are by name: `device` names a device and `event` names
/// a schedule event.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceReport {
    #[serde(default)]
    pub id: DeviceReportId,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub audit: Audit,
    #[serde(default)]
    pub device: String,
    #[serde(default)]
    pub event: String,
    #[serde(default)]
    pub expected: Vec<String>,
}

impl DeviceReport {
    /// Check the invariants that need no lookup.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule: empty name, then missing device or
    /// event name.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.device.is_empty() {
            return Err(ValidationError::NullField("device"));
        }
        if self.event.is_empty() {
            return Err(ValidationError::NullField("event"));
        }
        Ok(())
    }
}

/// Partial update for a [`DeviceReport`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceReportPatch {
    #[serde(flatten)]
    pub identity: Identity,
    pub device: Option<String>,
    pub event: Option<String>,
    pub expected: Option<Vec<String>>,
}

impl DeviceReportPatch {
    /// Merge every present field into `target`, excluding the name.
    pub fn apply(self, target: &mut DeviceReport) {
        merge(&mut target.device, self.device.filter(|d| !d.is_empty()));
        merge(&mut target.event, self.event.filter(|e| !e.is_empty()));
        merge(&mut target.expected, self.expected);
    }
}
