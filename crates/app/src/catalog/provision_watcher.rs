//! Provision watcher catalog.

use metacat_domain::device_profile::DeviceProfile;
use metacat_domain::device_service::DeviceServiceRecord;
use metacat_domain::error::MetacatError;
use metacat_domain::id::ProvisionWatcherId;
use metacat_domain::notification::{ChangeAction, SubjectType};
use metacat_domain::provision_watcher::{
    ProvisionWatcher, ProvisionWatcherPatch, ProvisionWatcherRecord,
};
use metacat_domain::reference::Reference;
use metacat_domain::time::Audit;

use crate::catalog::Context;
use crate::ports::{DocumentStore, FieldPath, Filter};

/// Application service for provision watchers. Changes are announced to the
/// watching device service.
pub struct ProvisionWatcherCatalog<S> {
    ctx: Context<S>,
}

impl<S: DocumentStore> ProvisionWatcherCatalog<S> {
    pub fn new(ctx: Context<S>) -> Self {
        Self { ctx }
    }

    async fn hydrate_all(
        &self,
        records: Vec<ProvisionWatcherRecord>,
    ) -> Result<Vec<ProvisionWatcher>, MetacatError> {
        let mut watchers = Vec::with_capacity(records.len());
        for record in records {
            watchers.push(self.ctx.attacher.hydrate_watcher(record).await?);
        }
        Ok(watchers)
    }

    async fn find(&self, filter: Filter) -> Result<Vec<ProvisionWatcher>, MetacatError> {
        let records = self.ctx.store.find(&filter).await?;
        self.hydrate_all(records).await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::LimitExceeded`] above the listing limit.
    pub async fn list(&self) -> Result<Vec<ProvisionWatcher>, MetacatError> {
        let records = self.ctx.store.list().await?;
        self.hydrate_all(records).await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] when no watcher has `id`.
    pub async fn get(&self, id: &str) -> Result<ProvisionWatcher, MetacatError> {
        let record = self.ctx.by_id(id).await?;
        self.ctx.attacher.hydrate_watcher(record).await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] when no watcher has `name`.
    pub async fn get_by_name(&self, name: &str) -> Result<ProvisionWatcher, MetacatError> {
        let record = self.ctx.by_name(name).await?;
        self.ctx.attacher.hydrate_watcher(record).await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] for an unknown profile.
    pub async fn find_by_profile(&self, profile_id: &str) -> Result<Vec<ProvisionWatcher>, MetacatError> {
        let profile: DeviceProfile = self.ctx.by_id(profile_id).await?;
        self.find(Filter::equals("profile.id", profile.id.to_string()))
            .await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] for an unknown service.
    pub async fn find_by_service(&self, service_id: &str) -> Result<Vec<ProvisionWatcher>, MetacatError> {
        let service: DeviceServiceRecord = self.ctx.by_id(service_id).await?;
        self.find(Filter::equals("service.id", service.id.to_string()))
            .await
    }

    /// Watchers whose matcher for `key` is exactly `value`.
    ///
    /// # Errors
    ///
    /// Returns [`MetacatError::LimitExceeded`] above the listing limit.
    pub async fn find_by_identifier(
        &self,
        key: &str,
        value: &str,
    ) -> Result<Vec<ProvisionWatcher>, MetacatError> {
        self.find(Filter::equals(FieldPath::from("identifiers").child(key), value))
            .await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::Validation`] for an empty or taken name or an
    /// unknown profile or service.
    #[tracing::instrument(skip(self, record), fields(name = %record.name))]
    pub async fn create(&self, record: ProvisionWatcherRecord) -> Result<ProvisionWatcherId, MetacatError> {
        record.validate()?;
        let mut watcher = self.ctx.attacher.attach_watcher(record).await?;
        watcher.id = ProvisionWatcherId::new();
        watcher.audit = Audit::stamp();
        self.ctx.store.insert(&watcher.to_record()).await?;
        tracing::info!(id = %watcher.id, "provision watcher created");
        self.ctx.notifier.notify(
            Some(&watcher.service.addressable),
            watcher.id,
            ChangeAction::Create,
            SubjectType::ProvisionWatcher,
        );
        Ok(watcher.id)
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::Validation`] for a missing identity, a taken
    /// name or a patched association that does not resolve;
    /// [`MetacatError::NotFound`] for an unknown target.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update(&self, patch: ProvisionWatcherPatch) -> Result<(), MetacatError> {
        let mut record: ProvisionWatcherRecord = self.ctx.target(&patch.identity).await?;
        if let Some(name) = self.ctx.rename(&record, &patch.identity).await? {
            record.name = name;
        }
        let profile: Option<DeviceProfile> = self.ctx.attacher.optional(&patch.profile).await?;
        let service: Option<DeviceServiceRecord> = self.ctx.attacher.optional(&patch.service).await?;
        patch.apply(&mut record);
        if let Some(profile) = profile {
            record.profile = Reference::by_id(profile.id);
        }
        if let Some(service) = service {
            record.service = Reference::by_id(service.id);
        }
        record.audit.touch();
        record.validate()?;
        self.ctx.store.replace(&record).await?;
        let owner = self.ctx.owner(&record.service).await;
        self.ctx.notifier.notify(
            owner.as_ref(),
            record.id,
            ChangeAction::Update,
            SubjectType::ProvisionWatcher,
        );
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] for an unknown id.
    #[tracing::instrument(skip(self))]
    pub async fn delete_by_id(&self, id: &str) -> Result<(), MetacatError> {
        let record: ProvisionWatcherRecord = self.ctx.by_id(id).await?;
        self.delete(record).await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] for an unknown name.
    #[tracing::instrument(skip(self))]
    pub async fn delete_by_name(&self, name: &str) -> Result<(), MetacatError> {
        let record: ProvisionWatcherRecord = self.ctx.by_name(name).await?;
        self.delete(record).await
    }

    async fn delete(&self, record: ProvisionWatcherRecord) -> Result<(), MetacatError> {
        let owner = self.ctx.owner(&record.service).await;
        self.ctx.remove(&record).await?;
        self.ctx.notifier.notify(
            owner.as_ref(),
            record.id,
            ChangeAction::Delete,
            SubjectType::ProvisionWatcher,
        );
        Ok(())
    }
}
