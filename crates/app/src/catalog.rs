//! Catalogs: one use-case struct per entity family.
//!
//! Every write follows the same order: validate the submission, resolve and
//! attach its associations, clear deletes/renames with the guard, then
//! persist. Nothing is written before every check has passed.

pub mod addressable;
pub mod command;
pub mod device;
pub mod device_manager;
pub mod device_profile;
pub mod device_report;
pub mod device_service;
pub mod provision_watcher;
pub mod schedule;
pub mod schedule_event;

use std::sync::Arc;

use metacat_domain::addressable::Addressable;
use metacat_domain::device_service::DeviceServiceRecord;
use metacat_domain::error::{MetacatError, NotFoundError};
use metacat_domain::patch::Identity;
use metacat_domain::reference::Reference;

pub use addressable::AddressableCatalog;
pub use command::CommandCatalog;
pub use device::DeviceCatalog;
pub use device_manager::DeviceManagerCatalog;
pub use device_profile::DeviceProfileCatalog;
pub use device_report::DeviceReportCatalog;
pub use device_service::DeviceServiceCatalog;
pub use provision_watcher::ProvisionWatcherCatalog;
pub use schedule::ScheduleCatalog;
pub use schedule_event::ScheduleEventCatalog;

use crate::integrity::{AssociationGuard, GraphAttacher, Guarded, KeyResolver};
use crate::notifier::ChangeNotifier;
use crate::ports::DocumentStore;
use crate::store::{Document, Limits, Store};

/// Collaborators shared by every catalog.
pub struct Context<S> {
    pub store: Store<S>,
    pub resolver: KeyResolver<S>,
    pub attacher: GraphAttacher<S>,
    pub guard: AssociationGuard<S>,
    pub notifier: ChangeNotifier,
}

impl<S> Clone for Context<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            resolver: self.resolver.clone(),
            attacher: self.attacher.clone(),
            guard: self.guard.clone(),
            notifier: self.notifier.clone(),
        }
    }
}

impl<S: DocumentStore> Context<S> {
    pub fn new(store: Arc<S>, limits: Limits, notifier: ChangeNotifier) -> Self {
        let store = Store::new(store, limits);
        let resolver = KeyResolver::new(store.clone());
        Self {
            attacher: GraphAttacher::new(resolver.clone()),
            guard: AssociationGuard::new(store.clone()),
            resolver,
            store,
            notifier,
        }
    }

    /// Direct lookup by id.
    ///
    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] on a miss.
    pub async fn by_id<D: Document>(&self, id: &str) -> Result<D, MetacatError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| NotFoundError::new(D::ENTITY, id).into())
    }

    /// Direct lookup by name.
    ///
    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] on a miss.
    pub async fn by_name<D: Document>(&self, name: &str) -> Result<D, MetacatError> {
        self.store
            .get_by_name(name)
            .await?
            .ok_or_else(|| NotFoundError::new(D::ENTITY, name).into())
    }

    /// The stored document an update targets.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingIdentity`](metacat_domain::error::ValidationError::MissingIdentity)
    /// when the patch names no target, then [`MetacatError::NotFound`].
    pub async fn target<D: Document>(&self, identity: &Identity) -> Result<D, MetacatError> {
        let target = identity.target()?;
        self.resolver.require(&target).await
    }

    /// The new name an update carries, once the guard has cleared it.
    ///
    /// # Errors
    ///
    /// Returns the guard's refusal.
    pub async fn rename<D: Document + Guarded>(
        &self,
        current: &D,
        identity: &Identity,
    ) -> Result<Option<String>, MetacatError> {
        let Some(new_name) = identity.rename_from(Document::name(current)) else {
            return Ok(None);
        };
        self.guard.may_rename(current, new_name).await?;
        Ok(Some(new_name.to_owned()))
    }

    /// Guarded delete: check dependents, delete, then verify none appeared
    /// while the delete was in flight.
    ///
    /// # Errors
    ///
    /// Returns the guard's refusal or [`MetacatError::NotFound`] when the
    /// document vanished concurrently.
    pub async fn remove<D: Document + Guarded>(&self, entity: &D) -> Result<(), MetacatError> {
        self.guard.may_delete(entity).await?;
        let id = entity.key();
        if !self.store.delete::<D>(&id).await? {
            return Err(NotFoundError::new(D::ENTITY, id).into());
        }
        if let Some(dependent) = self.guard.remaining_dependent(entity).await? {
            tracing::error!(
                entity = D::ENTITY,
                name = Document::name(entity),
                dependent,
                "dependent created while deleting, its reference now dangles"
            );
        }
        tracing::info!(entity = D::ENTITY, id = %id, "deleted");
        Ok(())
    }

    /// The addressable of the device service behind `service`, for change
    /// notices. Any failure means no notification.
    pub async fn owner(&self, service: &Reference) -> Option<Addressable> {
        let lookup = async {
            let Some(record) = self.resolver.resolve::<DeviceServiceRecord>(service).await? else {
                return Ok(None);
            };
            self.resolver
                .resolve::<Addressable>(&record.addressable)
                .await
        };
        match lookup.await {
            Ok(owner) => owner,
            Err(err) => {
                tracing::warn!(%service, error = %err, "owning service lookup failed");
                None
            }
        }
    }
}
