//! Device: a physical or virtual thing managed by a device service.
//!
//! [`DeviceRecord`] is what clients submit and what the store keeps; its
//! addressable, service and profile are [`Reference`]s. [`Device`] is the
//! resolved graph handed back to callers. Both are generic over the id type
//! so that [`DeviceManager`](crate::device_manager::DeviceManager) can reuse
//! them.

use serde::{Deserialize, Serialize};

use crate::addressable::Addressable;
use crate::device_profile::DeviceProfile;
use crate::device_service::DeviceService;
use crate::error::ValidationError;
use crate::id::DeviceId;
use crate::patch::{Identity, merge, merge_opt, merge_ref};
use crate::reference::Reference;
use crate::state::{AdminState, OperatingState};
use crate::time::{Audit, Timestamp};

/// A device as submitted and as stored.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeviceRecord<I = DeviceId> {
    #[serde(default)]
    pub id: I,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub audit: Audit,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub location: serde_json::Value,
    #[serde(default)]
    pub addressable: Reference,
    #[serde(default)]
    pub service: Reference,
    #[serde(default)]
    pub profile: Reference,
    #[serde(default)]
    pub operating_state: Option<OperatingState>,
    #[serde(default)]
    pub admin_state: Option<AdminState>,
    #[serde(default)]
    pub last_connected: Option<Timestamp>,
    #[serde(default)]
    pub last_reported: Option<Timestamp>,
}

impl<I> DeviceRecord<I> {
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

    /// Combine this record with its three resolved associations.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NullField`] when a state is missing.
    pub fn attach(
        self,
        addressable: Addressable,
        service: DeviceService,
        profile: DeviceProfile,
    ) -> Result<Device<I>, ValidationError> {
        Ok(Device {
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
            location: self.location,
            addressable,
            service,
            profile,
            last_connected: self.last_connected,
            last_reported: self.last_reported,
        })
    }
}

/// A fully resolved device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device<I = DeviceId> {
    pub id: I,
    pub name: String,
    #[serde(flatten)]
    pub audit: Audit,
    pub description: String,
    pub labels: Vec<String>,
    pub location: serde_json::Value,
    pub addressable: Addressable,
    pub service: DeviceService,
    pub profile: DeviceProfile,
    pub operating_state: OperatingState,
    pub admin_state: AdminState,
    pub last_connected: Option<Timestamp>,
    pub last_reported: Option<Timestamp>,
}

impl<I: Copy> Device<I> {
    /// The storable form, with every association collapsed to its id.
    #[must_use]
    pub fn to_record(&self) -> DeviceRecord<I> {
        DeviceRecord {
            id: self.id,
            name: self.name.clone(),
            audit: self.audit,
            description: self.description.clone(),
            labels: self.labels.clone(),
            location: self.location.clone(),
            addressable: Reference::by_id(self.addressable.id),
            service: Reference::by_id(self.service.id),
            profile: Reference::by_id(self.profile.id),
            operating_state: Some(self.operating_state),
            admin_state: Some(self.admin_state),
            last_connected: self.last_connected,
            last_reported: self.last_reported,
        }
    }
}

/// Partial update for a device (or the device part of a manager).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DevicePatch {
    #[serde(flatten)]
    pub identity: Identity,
    pub description: Option<String>,
    pub labels: Option<Vec<String>>,
    pub location: Option<serde_json::Value>,
    #[serde(default)]
    pub addressable: Reference,
    #[serde(default)]
    pub service: Reference,
    #[serde(default)]
    pub profile: Reference,
    pub operating_state: Option<OperatingState>,
    pub admin_state: Option<AdminState>,
    pub last_connected: Option<Timestamp>,
    pub last_reported: Option<Timestamp>,
}

impl DevicePatch {
    /// Whether the patch changes any association.
    #[must_use]
    pub fn touches_associations(&self) -> bool {
        !(self.addressable.is_unset() && self.service.is_unset() && self.profile.is_unset())
    }

    /// Merge every present field into `target`, excluding the name.
    pub fn apply<I>(self, target: &mut DeviceRecord<I>) {
        merge(&mut target.description, self.description);
        merge(&mut target.labels, self.labels);
        merge(&mut target.location, self.location);
        merge_ref(&mut target.addressable, &self.addressable);
        merge_ref(&mut target.service, &self.service);
        merge_ref(&mut target.profile, &self.profile);
        merge_opt(&mut target.operating_state, self.operating_state);
        merge_opt(&mut target.admin_state, self.admin_state);
        merge_opt(&mut target.last_connected, self.last_connected);
        merge_opt(&mut target.last_reported, self.last_reported);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> DeviceRecord {
        DeviceRecord {
            name: "D1".to_string(),
            addressable: Reference::by_name("A1"),
            service: Reference::by_name("S1"),
            profile: Reference::by_name("P1"),
            operating_state: Some(OperatingState::Enabled),
            admin_state: Some(AdminState::Unlocked),
            ..DeviceRecord::default()
        }
    }

    #[test]
    fn should_accept_complete_record() {
        assert!(record().validate().is_ok());
    }

    #[test]
    fn should_report_empty_name_before_null_state() {
        let mut record = record();
        record.name = String::new();
        record.admin_state = None;
        assert_eq!(record.validate(), Err(ValidationError::EmptyName));
    }

    #[test]
    fn should_reject_null_admin_state() {
        let mut record = record();
        record.admin_state = None;
        assert_eq!(
            record.validate(),
            Err(ValidationError::NullField("admin state"))
        );
    }

    #[test]
    fn should_leave_associations_alone_when_patch_has_none() {
        let mut record = record();
        let patch = DevicePatch {
            operating_state: Some(OperatingState::Disabled),
            ..DevicePatch::default()
        };
        assert!(!patch.touches_associations());
        patch.apply(&mut record);
        assert_eq!(record.operating_state, Some(OperatingState::Disabled));
        assert_eq!(record.profile, Reference::by_name("P1"));
    }

    #[test]
    fn should_swap_association_when_patch_carries_one() {
        let mut record = record();
        let patch = DevicePatch {
            profile: Reference::by_name("P2"),
            ..DevicePatch::default()
        };
        assert!(patch.touches_associations());
        patch.apply(&mut record);
        assert_eq!(record.profile, Reference::by_name("P2"));
    }
}
