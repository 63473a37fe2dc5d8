//! Graph attachment: turn a record whose associations are [`Reference`]s
//! into the fully resolved entity.
//!
//! Two entry points per entity:
//! - `attach_*` runs on a draft before it is persisted. A mandatory
//!   reference that does not resolve is a client error
//!   ([`ValidationError::MissingAssociation`]).
//! - `hydrate_*` runs on a stored record when it is read back. A reference
//!   that no longer resolves can only come from the guard race, so it is a
//!   service failure naming the inconsistent document.
//!
//! Nested entities pulled in while attaching a draft (a device's service, a
//! manager's members) are already persisted and are always hydrated.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;

use metacat_domain::addressable::Addressable;
use metacat_domain::device::{Device, DeviceRecord};
use metacat_domain::device_manager::{DeviceManager, DeviceManagerRecord};
use metacat_domain::device_profile::DeviceProfile;
use metacat_domain::device_report::DeviceReport;
use metacat_domain::device_service::{DeviceService, DeviceServiceRecord};
use metacat_domain::error::{MetacatError, ValidationError};
use metacat_domain::id::DeviceManagerId;
use metacat_domain::provision_watcher::{ProvisionWatcher, ProvisionWatcherRecord};
use metacat_domain::reference::Reference;
use metacat_domain::schedule::Schedule;
use metacat_domain::schedule_event::{ScheduleEvent, ScheduleEventRecord};

use crate::integrity::resolver::KeyResolver;
use crate::ports::DocumentStore;
use crate::store::Document;

/// A stored document whose associations no longer hold.
#[derive(Debug, thiserror::Error)]
#[error("stored {entity} {name} is inconsistent")]
pub struct InconsistentDocument {
    pub entity: &'static str,
    pub name: String,
    #[source]
    pub source: ValidationError,
}

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Reference by name, where an empty name means no reference.
#[must_use]
pub fn named(name: &str) -> Reference {
    Reference::from_parts(None, Some(name.to_owned()))
}

/// Builds resolved graphs from records. Only reads.
pub struct GraphAttacher<S> {
    resolver: KeyResolver<S>,
}

impl<S> Clone for GraphAttacher<S> {
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
        }
    }
}

impl<S: DocumentStore> GraphAttacher<S> {
    pub fn new(resolver: KeyResolver<S>) -> Self {
        Self { resolver }
    }

    /// Resolve a reference that must point at an existing `D`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingAssociation`] when the reference is
    /// unset or does not resolve.
    pub async fn mandatory<D: Document>(&self, reference: &Reference) -> Result<D, MetacatError> {
        self.resolver
            .resolve(reference)
            .await?
            .ok_or_else(|| ValidationError::MissingAssociation(D::ENTITY).into())
    }

    /// Resolve an optional reference: unset is fine, a supplied one must
    /// resolve.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingAssociation`] when a supplied
    /// reference does not resolve.
    pub async fn optional<D: Document>(
        &self,
        reference: &Reference,
    ) -> Result<Option<D>, MetacatError> {
        if reference.is_unset() {
            return Ok(None);
        }
        self.mandatory(reference).await.map(Some)
    }

    /// # Errors
    ///
    /// Returns a validation error when the addressable is missing or a
    /// state is null.
    pub async fn attach_service(
        &self,
        record: DeviceServiceRecord,
    ) -> Result<DeviceService, MetacatError> {
        let addressable: Addressable = self.mandatory(&record.addressable).await?;
        Ok(record.attach(addressable)?)
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::Service`] when the stored record no longer
    /// resolves.
    pub async fn hydrate_service(
        &self,
        record: DeviceServiceRecord,
    ) -> Result<DeviceService, MetacatError> {
        let name = record.name.clone();
        stored::<DeviceServiceRecord, _>(&name, self.attach_service(record).await)
    }

    /// Resolve addressable, service and profile of a device (or of the
    /// device part of a manager).
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingAssociation`] naming the first
    /// association that does not resolve.
    pub async fn attach_device<I: Send>(
        &self,
        record: DeviceRecord<I>,
    ) -> Result<Device<I>, MetacatError> {
        let addressable: Addressable = self.mandatory(&record.addressable).await?;
        let service: DeviceServiceRecord = self.mandatory(&record.service).await?;
        let profile: DeviceProfile = self.mandatory(&record.profile).await?;
        let service = self.hydrate_service(service).await?;
        Ok(record.attach(addressable, service, profile)?)
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::Service`] when the stored record no longer
    /// resolves.
    pub async fn hydrate_device(&self, record: DeviceRecord) -> Result<Device, MetacatError> {
        let name = record.name.clone();
        stored::<DeviceRecord, _>(&name, self.attach_device(record).await)
    }

    /// Resolve a manager draft, its members and its sub-managers.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingAssociation`] for an unresolvable
    /// reference and [`ValidationError::AggregationCycle`] when the manager
    /// would aggregate itself, directly or through sub-managers.
    pub async fn attach_manager(
        &self,
        record: DeviceManagerRecord,
    ) -> Result<DeviceManager, MetacatError> {
        let mut path = HashSet::from([record.device.id]);
        self.manager_graph(record, &mut path, false).await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::Service`] when the stored record no longer
    /// resolves.
    pub async fn hydrate_manager(
        &self,
        record: DeviceManagerRecord,
    ) -> Result<DeviceManager, MetacatError> {
        let name = record.device.name.clone();
        stored::<DeviceManagerRecord, _>(&name, self.attach_manager(record).await)
    }

    /// Resolve a replacement member set.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingAssociation`] for the first member
    /// that does not resolve.
    pub async fn attach_members(&self, references: &[Reference]) -> Result<Vec<Device>, MetacatError> {
        self.members(references, false).await
    }

    /// Resolve a replacement sub-manager set for `owner`.
    ///
    /// # Errors
    ///
    /// Same as [`attach_manager`](Self::attach_manager).
    pub async fn attach_sub_managers(
        &self,
        owner: DeviceManagerId,
        references: &[Reference],
    ) -> Result<Vec<DeviceManager>, MetacatError> {
        let mut path = HashSet::from([owner]);
        self.sub_managers(references, &mut path, false).await
    }

    async fn members(
        &self,
        references: &[Reference],
        nested: bool,
    ) -> Result<Vec<Device>, MetacatError> {
        let mut members = Vec::with_capacity(references.len());
        for reference in references {
            let record: DeviceRecord = nested_result(nested, self.mandatory(reference).await)?;
            members.push(self.hydrate_device(record).await?);
        }
        Ok(members)
    }

    async fn sub_managers(
        &self,
        references: &[Reference],
        path: &mut HashSet<DeviceManagerId>,
        nested: bool,
    ) -> Result<Vec<DeviceManager>, MetacatError> {
        let mut managers = Vec::with_capacity(references.len());
        for reference in references {
            let record: DeviceManagerRecord =
                nested_result(nested, self.mandatory(reference).await)?;
            let id = record.device.id;
            if !path.insert(id) {
                return Err(ValidationError::AggregationCycle(record.device.name).into());
            }
            let manager = self.manager_graph(record, path, true).await;
            path.remove(&id);
            managers.push(manager?);
        }
        Ok(managers)
    }

    fn manager_graph<'a>(
        &'a self,
        record: DeviceManagerRecord,
        path: &'a mut HashSet<DeviceManagerId>,
        nested: bool,
    ) -> BoxFuture<'a, Result<DeviceManager, MetacatError>> {
        Box::pin(async move {
            let DeviceManagerRecord {
                device,
                devices,
                managers,
            } = record;
            let device = nested_result(nested, self.attach_device(device).await)?;
            let devices = self.members(&devices, nested).await?;
            let managers = self.sub_managers(&managers, path, nested).await?;
            Ok(DeviceManager {
                device,
                devices,
                managers,
            })
        })
    }

    /// Check the schedule, addressable and optional service of an event.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingAssociation`] naming the first
    /// association that does not resolve.
    pub async fn attach_event(
        &self,
        record: ScheduleEventRecord,
    ) -> Result<ScheduleEvent, MetacatError> {
        self.mandatory::<Schedule>(&named(&record.schedule)).await?;
        let addressable: Addressable = self.mandatory(&record.addressable).await?;
        self.optional::<DeviceServiceRecord>(&named(&record.service))
            .await?;
        Ok(record.attach(addressable))
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::Service`] when the stored record no longer
    /// resolves.
    pub async fn hydrate_event(
        &self,
        record: ScheduleEventRecord,
    ) -> Result<ScheduleEvent, MetacatError> {
        let addressable: Addressable =
            stored::<ScheduleEventRecord, _>(&record.name, self.mandatory(&record.addressable).await)?;
        Ok(record.attach(addressable))
    }

    /// # Errors
    ///
    /// Returns [`ValidationError::MissingAssociation`] naming the first
    /// association that does not resolve.
    pub async fn attach_watcher(
        &self,
        record: ProvisionWatcherRecord,
    ) -> Result<ProvisionWatcher, MetacatError> {
        let profile: DeviceProfile = self.mandatory(&record.profile).await?;
        let service: DeviceServiceRecord = self.mandatory(&record.service).await?;
        let service = self.hydrate_service(service).await?;
        Ok(record.attach(profile, service))
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::Service`] when the stored record no longer
    /// resolves.
    pub async fn hydrate_watcher(
        &self,
        record: ProvisionWatcherRecord,
    ) -> Result<ProvisionWatcher, MetacatError> {
        let name = record.name.clone();
        stored::<ProvisionWatcherRecord, _>(&name, self.attach_watcher(record).await)
    }

    /// Check that the device and schedule event a report names exist.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingAssociation`] naming the first
    /// association that does not resolve.
    pub async fn check_report(&self, report: &DeviceReport) -> Result<(), MetacatError> {
        self.mandatory::<DeviceRecord>(&named(&report.device)).await?;
        self.mandatory::<ScheduleEventRecord>(&named(&report.event))
            .await?;
        Ok(())
    }
}

/// Re-label a validation failure found on an already-persisted document.
fn stored<D: Document, T>(name: &str, result: Result<T, MetacatError>) -> Result<T, MetacatError> {
    result.map_err(|err| match err {
        MetacatError::Validation(source) => {
            tracing::error!(entity = D::ENTITY, name, error = %source, "inconsistent stored document");
            MetacatError::service(InconsistentDocument {
                entity: D::ENTITY,
                name: name.to_owned(),
                source,
            })
        }
        other => other,
    })
}

fn nested_result<T>(nested: bool, result: Result<T, MetacatError>) -> Result<T, MetacatError> {
    if nested {
        stored::<DeviceManagerRecord, _>("sub-manager", result)
    } else {
        result
    }
}
