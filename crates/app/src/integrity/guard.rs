//! Association guard: refuse deletes and renames that would orphan a
//! dependent document.
//!
//! Each guarded entity lists the dependents that pin it as existence
//! queries. The guard only answers; callers perform the write.

use metacat_domain::addressable::Addressable;
use metacat_domain::command::Command;
use metacat_domain::device::DeviceRecord;
use metacat_domain::device_manager::DeviceManagerRecord;
use metacat_domain::device_profile::DeviceProfile;
use metacat_domain::device_report::DeviceReport;
use metacat_domain::device_service::DeviceServiceRecord;
use metacat_domain::error::{MetacatError, ValidationError};
use metacat_domain::provision_watcher::ProvisionWatcherRecord;
use metacat_domain::schedule::Schedule;
use metacat_domain::schedule_event::ScheduleEventRecord;

use crate::ports::{Collection, DocumentStore, Filter};
use crate::store::Store;

/// A collection whose documents may point at the guarded entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Dependent {
    pub collection: Collection,
    /// Entity name used in the refusal message.
    pub entity: &'static str,
    pub filter: Filter,
}

impl Dependent {
    fn new(collection: Collection, entity: &'static str, filter: Filter) -> Self {
        Self {
            collection,
            entity,
            filter,
        }
    }
}

/// An entity other documents may depend on.
pub trait Guarded {
    const KIND: &'static str;

    fn guarded_name(&self) -> &str;

    /// Dependents that block a delete.
    fn delete_dependents(&self) -> Vec<Dependent>;

    /// Dependents that block a rename. Most associations are by id, so by
    /// default nothing does.
    fn rename_dependents(&self) -> Vec<Dependent> {
        Vec::new()
    }
}

/// Runs dependent existence checks. Never writes.
pub struct AssociationGuard<S> {
    store: Store<S>,
}

impl<S> Clone for AssociationGuard<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: DocumentStore> AssociationGuard<S> {
    pub fn new(store: Store<S>) -> Self {
        Self { store }
    }

    /// Clear `entity` for deletion.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::StillReferenced`] naming the first
    /// dependent collection with a match.
    pub async fn may_delete<G: Guarded + Sync>(&self, entity: &G) -> Result<(), MetacatError> {
        match self.first_dependent(&entity.delete_dependents()).await? {
            Some(dependent) => Err(still_referenced(entity, dependent)),
            None => Ok(()),
        }
    }

    /// Clear `entity` for renaming to `new_name`. Keeping the current name
    /// is always allowed.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::StillReferenced`] naming the first
    /// dependent collection with a match.
    pub async fn may_rename<G: Guarded + Sync>(
        &self,
        entity: &G,
        new_name: &str,
    ) -> Result<(), MetacatError> {
        if new_name == entity.guarded_name() {
            return Ok(());
        }
        match self.first_dependent(&entity.rename_dependents()).await? {
            Some(dependent) => Err(still_referenced(entity, dependent)),
            None => Ok(()),
        }
    }

    /// The first delete dependent that currently exists, if any.
    ///
    /// # Errors
    ///
    /// Returns [`MetacatError::Service`] on store failure.
    pub async fn remaining_dependent<G: Guarded + Sync>(
        &self,
        entity: &G,
    ) -> Result<Option<&'static str>, MetacatError> {
        Ok(self
            .first_dependent(&entity.delete_dependents())
            .await?
            .map(|dependent| dependent.entity))
    }

    async fn first_dependent<'d>(
        &self,
        dependents: &'d [Dependent],
    ) -> Result<Option<&'d Dependent>, MetacatError> {
        for dependent in dependents {
            if self
                .store
                .exists(dependent.collection, &dependent.filter)
                .await?
            {
                return Ok(Some(dependent));
            }
        }
        Ok(None)
    }
}

fn still_referenced<G: Guarded>(entity: &G, dependent: &Dependent) -> MetacatError {
    tracing::debug!(
        entity = G::KIND,
        name = entity.guarded_name(),
        dependent = dependent.entity,
        "refused: still referenced"
    );
    ValidationError::StillReferenced {
        entity: G::KIND,
        name: entity.guarded_name().to_owned(),
        dependent: dependent.entity,
    }
    .into()
}

fn by_id(collection: Collection, entity: &'static str, field: &str, id: String) -> Dependent {
    Dependent::new(collection, entity, Filter::equals(field, id))
}

impl Guarded for Addressable {
    const KIND: &'static str = "addressable";

    fn guarded_name(&self) -> &str {
        &self.name
    }

    fn delete_dependents(&self) -> Vec<Dependent> {
        let id = self.id.to_string();
        vec![
            by_id(Collection::Device, "device", "addressable.id", id.clone()),
            by_id(
                Collection::DeviceService,
                "device service",
                "addressable.id",
                id.clone(),
            ),
            by_id(
                Collection::DeviceManager,
                "device manager",
                "addressable.id",
                id.clone(),
            ),
            by_id(
                Collection::ScheduleEvent,
                "schedule event",
                "addressable.id",
                id,
            ),
        ]
    }
}

impl Guarded for DeviceServiceRecord {
    const KIND: &'static str = "device service";

    fn guarded_name(&self) -> &str {
        &self.name
    }

    fn delete_dependents(&self) -> Vec<Dependent> {
        let id = self.id.to_string();
        let mut dependents = vec![
            by_id(Collection::Device, "device", "service.id", id.clone()),
            by_id(
                Collection::DeviceManager,
                "device manager",
                "service.id",
                id.clone(),
            ),
            by_id(
                Collection::ProvisionWatcher,
                "provision watcher",
                "service.id",
                id,
            ),
        ];
        dependents.extend(self.rename_dependents());
        dependents
    }

    fn rename_dependents(&self) -> Vec<Dependent> {
        vec![Dependent::new(
            Collection::ScheduleEvent,
            "schedule event",
            Filter::equals("service", self.name.as_str()),
        )]
    }
}

impl Guarded for DeviceProfile {
    const KIND: &'static str = "device profile";

    fn guarded_name(&self) -> &str {
        &self.name
    }

    fn delete_dependents(&self) -> Vec<Dependent> {
        let id = self.id.to_string();
        vec![
            by_id(Collection::Device, "device", "profile.id", id.clone()),
            by_id(
                Collection::ProvisionWatcher,
                "provision watcher",
                "profile.id",
                id.clone(),
            ),
            by_id(
                Collection::DeviceManager,
                "device manager",
                "profile.id",
                id,
            ),
        ]
    }
}

impl Guarded for Command {
    const KIND: &'static str = "command";

    fn guarded_name(&self) -> &str {
        &self.name
    }

    fn delete_dependents(&self) -> Vec<Dependent> {
        vec![Dependent::new(
            Collection::DeviceProfile,
            "device profile",
            Filter::contains_where("commands", "id", self.id.to_string()),
        )]
    }
}

impl Guarded for DeviceRecord {
    const KIND: &'static str = "device";

    fn guarded_name(&self) -> &str {
        &self.name
    }

    fn delete_dependents(&self) -> Vec<Dependent> {
        vec![Dependent::new(
            Collection::DeviceManager,
            "device manager",
            Filter::contains_where("devices", "id", self.id.to_string()),
        )]
    }
}

impl Guarded for DeviceManagerRecord {
    const KIND: &'static str = "device manager";

    fn guarded_name(&self) -> &str {
        &self.device.name
    }

    fn delete_dependents(&self) -> Vec<Dependent> {
        vec![Dependent::new(
            Collection::DeviceManager,
            "device manager",
            Filter::contains_where("managers", "id", self.device.id.to_string()),
        )]
    }
}

impl Guarded for Schedule {
    const KIND: &'static str = "schedule";

    fn guarded_name(&self) -> &str {
        &self.name
    }

    fn delete_dependents(&self) -> Vec<Dependent> {
        self.rename_dependents()
    }

    fn rename_dependents(&self) -> Vec<Dependent> {
        vec![Dependent::new(
            Collection::ScheduleEvent,
            "schedule event",
            Filter::equals("schedule", self.name.as_str()),
        )]
    }
}

impl Guarded for ScheduleEventRecord {
    const KIND: &'static str = "schedule event";

    fn guarded_name(&self) -> &str {
        &self.name
    }

    fn delete_dependents(&self) -> Vec<Dependent> {
        self.rename_dependents()
    }

    fn rename_dependents(&self) -> Vec<Dependent> {
        vec![Dependent::new(
            Collection::DeviceReport,
            "device report",
            Filter::equals("event", self.name.as_str()),
        )]
    }
}

impl Guarded for DeviceReport {
    const KIND: &'static str = "device report";

    fn guarded_name(&self) -> &str {
        &self.name
    }

    fn delete_dependents(&self) -> Vec<Dependent> {
        Vec::new()
    }
}

impl Guarded for ProvisionWatcherRecord {
    const KIND: &'static str = "provision watcher";

    fn guarded_name(&self) -> &str {
        &self.name
    }

    fn delete_dependents(&self) -> Vec<Dependent> {
        Vec::new()
    }
}
