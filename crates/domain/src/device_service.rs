//! Device service: the external service that owns and drives devices.

use serde::{Deserialize, Serialize};

use crate::addressable::Addressable;
use crate::error::ValidationError;
use crate::id::DeviceServiceId;
use crate::patch::{Identity, merge, merge_opt, merge_ref};
use crate::reference::Reference;
use crate::state::{AdminState, OperatingState};
use crate::time::{Audit, Timestamp};

/// A device service as submitted and as stored: its addressable is a
/// [`Reference`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceServiceRecord {
    #[serde(default)]
    pub id: DeviceServiceId,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub audit: Audit,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub addressable: Reference,
    #[serde(default)]
    pub operating_state: Option<OperatingState>,
    #[serde(default)]
    pub admin_state: Option<AdminState>,
    #[serde(default)]
    pub last_connected: Option<Timestamp>,
    #[serde(default)]
    pub last_reported: Option<Timestamp>,
}

impl DeviceServiceRecord {
    /// Check the invariants that need no lookup.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule: empty name, then null states.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.operating_state.is_none() {
            return Err(ValidationError::NullField("operating state"));
        }
        if self.admin_state.is_none() {
            return Err(ValidationError::NullField("admin state"));
        }
        Ok(())
    }

    /// Combine this record with its resolved addressable.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NullField`] when a state is missing.
    pub fn attach(self, addressable: Addressable) -> Result<DeviceService, ValidationError> {
        Ok(DeviceService {
            operating_state: self
                .operating_state
                .ok_or(ValidationError::NullField("operating state"))?,
            admin_state: self
                .admin_state
                .ok_or(ValidationError::NullField("admin state"))?,
            id: self.id,
            name: self.name,
            audit: self.audit,
            description: self.description,
            labels: self.labels,
            addressable,
            last_connected: self.last_connected,
            last_reported: self.last_reported,
        })
    }
}

/// A fully resolved device service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceService {
    pub id: DeviceServiceId,
    pub name: String,
    #[serde(flatten)]
    pub audit: Audit,
    pub description: String,
    pub labels: Vec<String>,
    pub addressable: Addressable,
    pub operating_state: OperatingState,
    pub admin_state: AdminState,
    pub last_connected: Option<Timestamp>,
    pub last_reported: Option<Timestamp>,
}

impl DeviceService {
    /// The storable form, with the addressable collapsed to its id.
    #[must_use]
    pub fn to_record(&self) -> DeviceServiceRecord {
        DeviceServiceRecord {
            id: self.id,
            name: self.name.clone(),
            audit: self.audit,
            description: self.description.clone(),
            labels: self.labels.clone(),
            addressable: Reference::by_id(self.addressable.id),
            operating_state: Some(self.operating_state),
            admin_state: Some(self.admin_state),
            last_connected: self.last_connected,
            last_reported: self.last_reported,
        }
    }
}

/// Partial update for a device service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceServicePatch {
    #[serde(flatten)]
    pub identity: Identity,
    pub description: Option<String>,
    pub labels: Option<Vec<String>>,
    #[serde(default)]
    pub addressable: Reference,
    pub operating_state: Option<OperatingState>,
    pub admin_state: Option<AdminState>,
    pub last_connected: Option<Timestamp>,
    pub last_reported: Option<Timestamp>,
}

impl DeviceServicePatch {
    /// Merge every present field into `target`, excluding the name.
    pub fn apply(self, target: &mut DeviceServiceRecord) {
        merge(&mut target.description, self.description);
        merge(&mut target.labels, self.labels);
        merge_ref(&mut target.addressable, &self.addressable);
        merge_opt(&mut target.operating_state, self.operating_state);
        merge_opt(&mut target.admin_state, self.admin_state);
        merge_opt(&mut target.last_connected, self.last_connected);
        merge_opt(&mut target.last_reported, self.last_reported);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> DeviceServiceRecord {
        DeviceServiceRecord {
            name: "S1".to_string(),
            addressable: Reference::by_name("A1"),
            operating_state: Some(OperatingState::Enabled),
            admin_state: Some(AdminState::Unlocked),
            ..DeviceServiceRecord::default()
        }
    }

    #[test]
    fn should_reject_null_operating_state() {
        let mut record = record();
        record.operating_state = None;
        assert_eq!(
            record.validate(),
            Err(ValidationError::NullField("operating state"))
        );
    }

    #[test]
    fn should_collapse_addressable_to_id_in_record() {
        let addressable = Addressable::builder().name("A1").build().unwrap();
        let addressable_id = addressable.id;
        let service = record().attach(addressable).unwrap();
        assert_eq!(
            service.to_record().addressable,
            Reference::by_id(addressable_id)
        );
    }

    #[test]
    fn should_decode_submission_with_reference_by_name() {
        let json = r#"{
            "name": "S1",
            "addressable": {"name": "A1"},
            "operating_state": "ENABLED",
            "admin_state": "UNLOCKED"
        }"#;
        let record: DeviceServiceRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.addressable, Reference::by_name("A1"));
        assert!(record.validate().is_ok());
    }
}
