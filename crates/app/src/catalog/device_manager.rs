//! Device manager catalog: devices that aggregate other devices and managers.

use metacat_domain::device_manager::{DeviceManager, DeviceManagerPatch, DeviceManagerRecord};
use metacat_domain::device_profile::DeviceProfile;
use metacat_domain::device_service::DeviceServiceRecord;
use metacat_domain::error::MetacatError;
use metacat_domain::id::DeviceManagerId;
use metacat_domain::notification::{ChangeAction, SubjectType};
use metacat_domain::reference::Reference;
use metacat_domain::time::Audit;

use crate::catalog::Context;
use crate::catalog::device::apply_patch;
use crate::ports::{DocumentStore, Filter};

/// Application service for device managers.
pub struct DeviceManagerCatalog<S> {
    ctx: Context<S>,
}

impl<S: DocumentStore> DeviceManagerCatalog<S> {
    pub fn new(ctx: Context<S>) -> Self {
        Self { ctx }
    }

    async fn hydrate_all(
        &self,
        records: Vec<DeviceManagerRecord>,
    ) -> Result<Vec<DeviceManager>, MetacatError> {
        let mut managers = Vec::with_capacity(records.len());
        for record in records {
            managers.push(self.ctx.attacher.hydrate_manager(record).await?);
        }
        Ok(managers)
    }

    async fn find(&self, filter: Filter) -> Result<Vec<DeviceManager>, MetacatError> {
        let records = self.ctx.store.find(&filter).await?;
        self.hydrate_all(records).await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::LimitExceeded`] above the listing limit.
    pub async fn list(&self) -> Result<Vec<DeviceManager>, MetacatError> {
        let records = self.ctx.store.list().await?;
        self.hydrate_all(records).await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] when no manager has `id`.
    pub async fn get(&self, id: &str) -> Result<DeviceManager, MetacatError> {
        let record = self.ctx.by_id(id).await?;
        self.ctx.attacher.hydrate_manager(record).await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] when no manager has `name`.
    pub async fn get_by_name(&self, name: &str) -> Result<DeviceManager, MetacatError> {
        let record = self.ctx.by_name(name).await?;
        self.ctx.attacher.hydrate_manager(record).await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] for an unknown profile.
    pub async fn find_by_profile(&self, profile_id: &str) -> Result<Vec<DeviceManager>, MetacatError> {
        let profile: DeviceProfile = self.ctx.by_id(profile_id).await?;
        self.find(Filter::equals("profile.id", profile.id.to_string()))
            .await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] for an unknown service.
    pub async fn find_by_service(&self, service_id: &str) -> Result<Vec<DeviceManager>, MetacatError> {
        let service: DeviceServiceRecord = self.ctx.by_id(service_id).await?;
        self.find(Filter::equals("service.id", service.id.to_string()))
            .await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::LimitExceeded`] above the listing limit.
    pub async fn find_by_label(&self, label: &str) -> Result<Vec<DeviceManager>, MetacatError> {
        self.find(Filter::contains("labels", label)).await
    }

    /// Attach and persist a new manager with its members; returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`MetacatError::Validation`] for an empty or taken name, a
    /// null state, an unresolvable association or member, or an
    /// aggregation cycle.
    #[tracing::instrument(skip(self, record), fields(name = %record.device.name))]
    pub async fn create(&self, mut record: DeviceManagerRecord) -> Result<DeviceManagerId, MetacatError> {
        record.device.validate()?;
        record.device.id = DeviceManagerId::new();
        let mut manager = self.ctx.attacher.attach_manager(record).await?;
        manager.device.audit = Audit::stamp();
        self.ctx.store.insert(&manager.to_record()).await?;
        tracing::info!(
            id = %manager.id(),
            devices = manager.devices.len(),
            managers = manager.managers.len(),
            "device manager created"
        );
        self.ctx.notifier.notify(
            Some(&manager.device.service.addressable),
            manager.id(),
            ChangeAction::Create,
            SubjectType::Manager,
        );
        Ok(manager.id())
    }

    /// Merge `patch` into the manager it identifies. Present member sets
    /// replace the stored ones.
    ///
    /// # Errors
    ///
    /// Returns [`MetacatError::Validation`] for a missing identity, a taken
    /// name, an unresolvable association or member, or an aggregation
    /// cycle; [`MetacatError::NotFound`] for an unknown target.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update(&self, patch: DeviceManagerPatch) -> Result<(), MetacatError> {
        let DeviceManagerPatch {
            device,
            devices,
            managers,
        } = patch;
        let mut record: DeviceManagerRecord = self.ctx.target(&device.identity).await?;
        if let Some(name) = self.ctx.rename(&record, &device.identity).await? {
            record.device.name = name;
        }
        apply_patch(&self.ctx, device, &mut record.device).await?;
        if let Some(devices) = devices {
            let members = self.ctx.attacher.attach_members(&devices).await?;
            record.devices = members.iter().map(|d| Reference::by_id(d.id)).collect();
        }
        if let Some(managers) = managers {
            let subs = self
                .ctx
                .attacher
                .attach_sub_managers(record.device.id, &managers)
                .await?;
            record.managers = subs.iter().map(|m| Reference::by_id(m.id())).collect();
        }
        record.device.audit.touch();
        record.device.validate()?;
        self.ctx.store.replace(&record).await?;
        let owner = self.ctx.owner(&record.device.service).await;
        self.ctx.notifier.notify(
            owner.as_ref(),
            record.device.id,
            ChangeAction::Update,
            SubjectType::Manager,
        );
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] for an unknown id and
    /// [`MetacatError::Validation`] while another manager aggregates it.
    #[tracing::instrument(skip(self))]
    pub async fn delete_by_id(&self, id: &str) -> Result<(), MetacatError> {
        let record: DeviceManagerRecord = self.ctx.by_id(id).await?;
        self.delete(record).await
    }

    /// # Errors
    ///
    /// Same as [`delete_by_id`](Self::delete_by_id).
    #[tracing::instrument(skip(self))]
    pub async fn delete_by_name(&self, name: &str) -> Result<(), MetacatError> {
        let record: DeviceManagerRecord = self.ctx.by_name(name).await?;
        self.delete(record).await
    }

    async fn delete(&self, record: DeviceManagerRecord) -> Result<(), MetacatError> {
        let owner = self.ctx.owner(&record.device.service).await;
        self.ctx.remove(&record).await?;
        self.ctx.notifier.notify(
            owner.as_ref(),
            record.device.id,
            ChangeAction::Delete,
            SubjectType::Manager,
        );
        Ok(())
    }
}
