//! Schedule event: an action fired on a schedule against an addressable.

use serde::{Deserialize, Serialize};

use crate::addressable::Addressable;
use crate::error::ValidationError;
use crate::id::ScheduleEventId;
use crate::patch::{Identity, merge, merge_ref};
use crate::reference::Reference;
use crate::time::Audit;

/// A schedule event as submitted and as stored.
///
/// `schedule` and `service` name their targets; `addressable` is a reference.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScheduleEventRecord {
    #[serde(default)]
    pub id: ScheduleEventId,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub audit: Audit,
    #[serde(default)]
    pub schedule: String,
    #[serde(default)]
    pub addressable: Reference,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub parameters: String,
}

impl ScheduleEventRecord {
    /// Check the invariants that need no lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] for an unnamed event.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(())
    }

    #[must_use]
    pub fn attach(self, addressable: Addressable) -> ScheduleEvent {
        ScheduleEvent {
            id: self.id,
            name: self.name,
            audit: self.audit,
            schedule: self.schedule,
            addressable,
            service: self.service,
            parameters: self.parameters,
        }
    }
}

/// A schedule event with its addressable resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEvent {
    pub id: ScheduleEventId,
    pub name: String,
    #[serde(flatten)]
    pub audit: Audit,
    pub schedule: String,
    pub addressable: Addressable,
    pub service: String,
    pub parameters: String,
}

impl ScheduleEvent {
    #[must_use]
    pub fn to_record(&self) -> ScheduleEventRecord {
        ScheduleEventRecord {
            id: self.id,
            name: self.name.clone(),
            audit: self.audit,
            schedule: self.schedule.clone(),
            addressable: Reference::by_id(self.addressable.id),
            service: self.service.clone(),
            parameters: self.parameters.clone(),
        }
    }
}

/// Partial update for a schedule event.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleEventPatch {
    #[serde(flatten)]
    pub identity: Identity,
    pub schedule: Option<String>,
    #[serde(default)]
    pub addressable: Reference,
    pub service: Option<String>,
    pub parameters: Option<String>,
}

impl ScheduleEventPatch {
    /// Merge every present field into `target`, excluding the name.
    pub fn apply(self, target: &mut ScheduleEventRecord) {
        merge(&mut target.schedule, self.schedule);
        merge_ref(&mut target.addressable, &self.addressable);
        merge(&mut target.service, self.service);
        merge(&mut target.parameters, self.parameters);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_keep_schedule_name_when_patch_omits_it() {
        let mut record = ScheduleEventRecord {
            name: "E1".to_string(),
            schedule: "every-15s".to_string(),
            addressable: Reference::by_name("A1"),
            ..ScheduleEventRecord::default()
        };
        let patch = ScheduleEventPatch {
            parameters: Some("{\"reading\":true}".to_string()),
            ..ScheduleEventPatch::default()
        };
        patch.apply(&mut record);
        assert_eq!(record.schedule, "every-15s");
        assert_eq!(record.parameters, "{\"reading\":true}");
    }

    #[test]
    fn should_reject_unnamed_event() {
        assert_eq!(
            ScheduleEventRecord::default().validate(),
            Err(ValidationError::EmptyName)
        );
    }
}
