//! Provision watcher: identifier matchers used to auto-detect new devices
//! and the profile/service they should be provisioned with.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::device_profile::DeviceProfile;
use crate::device_service::DeviceService;
use crate::error::ValidationError;
use crate::id::ProvisionWatcherId;
use crate::patch::{Identity, merge, merge_ref};
use crate::reference::Reference;
use crate::state::OperatingState;
use crate::time::Audit;

/// A provision watcher as submitted and as stored.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProvisionWatcherRecord {
    #[serde(default)]
    pub id: ProvisionWatcherId,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub audit: Audit,
    #[serde(default)]
    pub identifiers: BTreeMap<String, String>,
    #[serde(default)]
    pub profile: Reference,
    #[serde(default)]
    pub service: Reference,
    #[serde(default)]
    pub operating_state: OperatingState,
}

impl ProvisionWatcherRecord {
    /// Check the invariants that need no lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] for an unnamed watcher.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(())
    }

    #[must_use]
    pub fn attach(self, profile: DeviceProfile, service: DeviceService) -> ProvisionWatcher {
        ProvisionWatcher {
            id: self.id,
            name: self.name,
            audit: self.audit,
            identifiers: self.identifiers,
            profile,
            service,
            operating_state: self.operating_state,
        }
    }
}

/// A provision watcher with profile and service resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisionWatcher {
    pub id: ProvisionWatcherId,
    pub name: String,
    #[serde(flatten)]
    pub audit: Audit,
    pub identifiers: BTreeMap<String, String>,
    pub profile: DeviceProfile,
    pub service: DeviceService,
    pub operating_state: OperatingState,
}

impl ProvisionWatcher {
    #[must_use]
    pub fn to_record(&self) -> ProvisionWatcherRecord {
        ProvisionWatcherRecord {
            id: self.id,
            name: self.name.clone(),
            audit: self.audit,
            identifiers: self.identifiers.clone(),
            profile: Reference::by_id(self.profile.id),
            service: Reference::by_id(self.service.id),
            operating_state: self.operating_state,
        }
    }
}

/// Partial update for a provision watcher. Present identifiers replace the
/// stored matcher set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvisionWatcherPatch {
    #[serde(flatten)]
    pub identity: Identity,
    pub identifiers: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub profile: Reference,
    #[serde(default)]
    pub service: Reference,
    pub operating_state: Option<OperatingState>,
}

impl ProvisionWatcherPatch {
    /// Merge every present field into `target`, excluding the name.
    pub fn apply(self, target: &mut ProvisionWatcherRecord) {
        merge(&mut target.identifiers, self.identifiers);
        merge_ref(&mut target.profile, &self.profile);
        merge_ref(&mut target.service, &self.service);
        merge(&mut target.operating_state, self.operating_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_to_enabled_when_state_is_omitted() {
        let record: ProvisionWatcherRecord = serde_json::from_str(
            r#"{"name":"W1","identifiers":{"mac":"00:11:.*"},"profile":{"name":"P1"},"service":{"name":"S1"}}"#,
        )
        .unwrap();
        assert_eq!(record.operating_state, OperatingState::Enabled);
        assert_eq!(record.identifiers.get("mac").map(String::as_str), Some("00:11:.*"));
    }

    #[test]
    fn should_build_default_record_as_enabled() {
        let record = ProvisionWatcherRecord::default();
        assert_eq!(record.operating_state, OperatingState::Enabled);
        assert!(record.profile.is_unset());
    }

    #[test]
    fn should_replace_identifiers_from_patch() {
        let mut record = ProvisionWatcherRecord {
            name: "W1".to_string(),
            identifiers: BTreeMap::from([("mac".to_string(), "00:11".to_string())]),
            ..ProvisionWatcherRecord::default()
        };
        let patch = ProvisionWatcherPatch {
            identifiers: Some(BTreeMap::from([("serial".to_string(), "X-.*".to_string())])),
            ..ProvisionWatcherPatch::default()
        };
        patch.apply(&mut record);
        assert!(!record.identifiers.contains_key("mac"));
        assert!(record.identifiers.contains_key("serial"));
    }
}
