//! Device service catalog.

use metacat_domain::addressable::Addressable;
use metacat_domain::device_service::{DeviceService, DeviceServicePatch, DeviceServiceRecord};
use metacat_domain::error::MetacatError;
use metacat_domain::id::DeviceServiceId;
use metacat_domain::reference::Reference;
use metacat_domain::time::Audit;

use crate::catalog::Context;
use crate::ports::{DocumentStore, Filter};

/// Application service for device services.
pub struct DeviceServiceCatalog<S> {
    ctx: Context<S>,
}

impl<S: DocumentStore> DeviceServiceCatalog<S> {
    pub fn new(ctx: Context<S>) -> Self {
        Self { ctx }
    }

    async fn hydrate_all(
        &self,
        records: Vec<DeviceServiceRecord>,
    ) -> Result<Vec<DeviceService>, MetacatError> {
        let mut services = Vec::with_capacity(records.len());
        for record in records {
            services.push(self.ctx.attacher.hydrate_service(record).await?);
        }
        Ok(services)
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::LimitExceeded`] above the listing limit.
    pub async fn list(&self) -> Result<Vec<DeviceService>, MetacatError> {
        let records = self.ctx.store.list().await?;
        self.hydrate_all(records).await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] when no service has `id`.
    pub async fn get(&self, id: &str) -> Result<DeviceService, MetacatError> {
        let record = self.ctx.by_id(id).await?;
        self.ctx.attacher.hydrate_service(record).await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] when no service has `name`.
    pub async fn get_by_name(&self, name: &str) -> Result<DeviceService, MetacatError> {
        let record = self.ctx.by_name(name).await?;
        self.ctx.attacher.hydrate_service(record).await
    }

    /// Services reachable at the addressable with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] when the addressable does not exist.
    pub async fn find_by_addressable(&self, id: &str) -> Result<Vec<DeviceService>, MetacatError> {
        let addressable: Addressable = self.ctx.by_id(id).await?;
        self.by_addressable(&addressable).await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] when the addressable does not exist.
    pub async fn find_by_addressable_name(
        &self,
        name: &str,
    ) -> Result<Vec<DeviceService>, MetacatError> {
        let addressable: Addressable = self.ctx.by_name(name).await?;
        self.by_addressable(&addressable).await
    }

    async fn by_addressable(
        &self,
        addressable: &Addressable,
    ) -> Result<Vec<DeviceService>, MetacatError> {
        let filter = Filter::equals("addressable.id", addressable.id.to_string());
        let records = self.ctx.store.find(&filter).await?;
        self.hydrate_all(records).await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::LimitExceeded`] above the listing limit.
    pub async fn find_by_label(&self, label: &str) -> Result<Vec<DeviceService>, MetacatError> {
        let records = self.ctx.store.find(&Filter::contains("labels", label)).await?;
        self.hydrate_all(records).await
    }

    /// Attach and persist a new device service; returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`MetacatError::Validation`] for an empty or taken name, a
    /// null state or an unknown addressable.
    #[tracing::instrument(skip(self, record), fields(name = %record.name))]
    pub async fn create(&self, record: DeviceServiceRecord) -> Result<DeviceServiceId, MetacatError> {
        record.validate()?;
        let mut service = self.ctx.attacher.attach_service(record).await?;
        service.id = DeviceServiceId::new();
        service.audit = Audit::stamp();
        self.ctx.store.insert(&service.to_record()).await?;
        tracing::info!(id = %service.id, "device service created");
        Ok(service.id)
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::Validation`] for a missing identity, a taken
    /// name, an unknown addressable or a rename while schedule events name
    /// the service; [`MetacatError::NotFound`] for an unknown target.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update(&self, patch: DeviceServicePatch) -> Result<(), MetacatError> {
        let mut record: DeviceServiceRecord = self.ctx.target(&patch.identity).await?;
        if let Some(name) = self.ctx.rename(&record, &patch.identity).await? {
            record.name = name;
        }
        if !patch.addressable.is_unset() {
            let addressable: Addressable = self.ctx.attacher.mandatory(&patch.addressable).await?;
            record.addressable = Reference::by_id(addressable.id);
        }
        patch.apply(&mut record);
        record.audit.touch();
        record.validate()?;
        self.ctx.store.replace(&record).await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::Validation`] while devices, managers,
    /// provision watchers or schedule events depend on the service.
    #[tracing::instrument(skip(self))]
    pub async fn delete_by_id(&self, id: &str) -> Result<(), MetacatError> {
        let record: DeviceServiceRecord = self.ctx.by_id(id).await?;
        self.ctx.remove(&record).await
    }

    /// # Errors
    ///
    /// Same as [`delete_by_id`](Self::delete_by_id).
    #[tracing::instrument(skip(self))]
    pub async fn delete_by_name(&self, name: &str) -> Result<(), MetacatError> {
        let record: DeviceServiceRecord = self.ctx.by_name(name).await?;
        self.ctx.remove(&record).await
    }
}
