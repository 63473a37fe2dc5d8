//! Device catalog.

use metacat_domain::addressable::Addressable;
use metacat_domain::device::{Device, DevicePatch, DeviceRecord};
use metacat_domain::device_profile::DeviceProfile;
use metacat_domain::device_report::DeviceReport;
use metacat_domain::device_service::DeviceServiceRecord;
use metacat_domain::error::MetacatError;
use metacat_domain::id::DeviceId;
use metacat_domain::notification::{ChangeAction, SubjectType};
use metacat_domain::reference::Reference;
use metacat_domain::state::{AdminState, OperatingState};
use metacat_domain::time::{Audit, Timestamp};

use crate::catalog::Context;
use crate::ports::{DocumentStore, Filter};

/// Application service for devices.
///
/// Creates, updates, state changes and deletes are announced to the owning
/// device service through the change notifier.
pub struct DeviceCatalog<S> {
    ctx: Context<S>,
}

impl<S: DocumentStore> DeviceCatalog<S> {
    pub fn new(ctx: Context<S>) -> Self {
        Self { ctx }
    }

    async fn hydrate_all(&self, records: Vec<DeviceRecord>) -> Result<Vec<Device>, MetacatError> {
        let mut devices = Vec::with_capacity(records.len());
        for record in records {
            devices.push(self.ctx.attacher.hydrate_device(record).await?);
        }
        Ok(devices)
    }

    async fn find(&self, filter: Filter) -> Result<Vec<Device>, MetacatError> {
        let records = self.ctx.store.find(&filter).await?;
        self.hydrate_all(records).await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::LimitExceeded`] above the listing limit.
    pub async fn list(&self) -> Result<Vec<Device>, MetacatError> {
        let records = self.ctx.store.list().await?;
        self.hydrate_all(records).await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] when no device has `id`.
    pub async fn get(&self, id: &str) -> Result<Device, MetacatError> {
        let record = self.ctx.by_id(id).await?;
        self.ctx.attacher.hydrate_device(record).await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] when no device has `name`.
    pub async fn get_by_name(&self, name: &str) -> Result<Device, MetacatError> {
        let record = self.ctx.by_name(name).await?;
        self.ctx.attacher.hydrate_device(record).await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] for an unknown profile.
    pub async fn find_by_profile(&self, profile_id: &str) -> Result<Vec<Device>, MetacatError> {
        let profile: DeviceProfile = self.ctx.by_id(profile_id).await?;
        self.find(Filter::equals("profile.id", profile.id.to_string()))
            .await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] for an unknown service.
    pub async fn find_by_service(&self, service_id: &str) -> Result<Vec<Device>, MetacatError> {
        let service: DeviceServiceRecord = self.ctx.by_id(service_id).await?;
        self.find(Filter::equals("service.id", service.id.to_string()))
            .await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] for an unknown service.
    pub async fn find_by_service_name(&self, name: &str) -> Result<Vec<Device>, MetacatError> {
        let service: DeviceServiceRecord = self.ctx.by_name(name).await?;
        self.find(Filter::equals("service.id", service.id.to_string()))
            .await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] for an unknown addressable.
    pub async fn find_by_addressable(&self, addressable_id: &str) -> Result<Vec<Device>, MetacatError> {
        let addressable: Addressable = self.ctx.by_id(addressable_id).await?;
        self.find(Filter::equals("addressable.id", addressable.id.to_string()))
            .await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::LimitExceeded`] above the listing limit.
    pub async fn find_by_label(&self, label: &str) -> Result<Vec<Device>, MetacatError> {
        self.find(Filter::contains("labels", label)).await
    }

    /// Attach and persist a new device; returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`MetacatError::Validation`] for an empty or taken name, a
    /// null state or an association that does not resolve.
    #[tracing::instrument(skip(self, record), fields(name = %record.name))]
    pub async fn create(&self, record: DeviceRecord) -> Result<DeviceId, MetacatError> {
        record.validate()?;
        let mut device = self.ctx.attacher.attach_device(record).await?;
        device.id = DeviceId::new();
        device.audit = Audit::stamp();
        self.ctx.store.insert(&device.to_record()).await?;
        tracing::info!(id = %device.id, "device created");
        self.ctx.notifier.notify(
            Some(&device.service.addressable),
            device.id,
            ChangeAction::Create,
            SubjectType::Device,
        );
        Ok(device.id)
    }

    /// Merge `patch` into the device it identifies.
    ///
    /// A rename is carried over to the device reports naming the device.
    ///
    /// # Errors
    ///
    /// Returns [`MetacatError::Validation`] for a missing identity, a taken
    /// name or a patched association that does not resolve;
    /// [`MetacatError::NotFound`] for an unknown target.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update(&self, patch: DevicePatch) -> Result<(), MetacatError> {
        let mut record: DeviceRecord = self.ctx.target(&patch.identity).await?;
        let previous_name = record.name.clone();
        let renamed = self.ctx.rename(&record, &patch.identity).await?;
        if let Some(name) = &renamed {
            record.name.clone_from(name);
        }
        apply_patch(&self.ctx, patch, &mut record).await?;
        self.save(record, ChangeAction::Update).await?;
        if let Some(name) = renamed {
            self.rename_reports(&previous_name, &name).await?;
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] for an unknown device.
    #[tracing::instrument(skip(self))]
    pub async fn set_operating_state(&self, id: &str, state: OperatingState) -> Result<(), MetacatError> {
        let mut record: DeviceRecord = self.ctx.by_id(id).await?;
        record.operating_state = Some(state);
        self.save(record, ChangeAction::Update).await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] for an unknown device.
    #[tracing::instrument(skip(self))]
    pub async fn set_admin_state(&self, id: &str, state: AdminState) -> Result<(), MetacatError> {
        let mut record: DeviceRecord = self.ctx.by_id(id).await?;
        record.admin_state = Some(state);
        self.save(record, ChangeAction::Update).await
    }

    /// Record the last time the device connected. Not announced.
    ///
    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] for an unknown device.
    #[tracing::instrument(skip(self))]
    pub async fn set_last_connected(&self, id: &str, at: Timestamp) -> Result<(), MetacatError> {
        let mut record: DeviceRecord = self.ctx.by_id(id).await?;
        record.last_connected = Some(at);
        record.audit.touch();
        self.ctx.store.replace(&record).await
    }

    /// Record the last time the device reported. Not announced.
    ///
    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] for an unknown device.
    #[tracing::instrument(skip(self))]
    pub async fn set_last_reported(&self, id: &str, at: Timestamp) -> Result<(), MetacatError> {
        let mut record: DeviceRecord = self.ctx.by_id(id).await?;
        record.last_reported = Some(at);
        record.audit.touch();
        self.ctx.store.replace(&record).await
    }

    /// Delete a device and the reports naming it.
    ///
    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] for an unknown id and
    /// [`MetacatError::Validation`] while a device manager aggregates it.
    #[tracing::instrument(skip(self))]
    pub async fn delete_by_id(&self, id: &str) -> Result<(), MetacatError> {
        let record: DeviceRecord = self.ctx.by_id(id).await?;
        self.delete(record).await
    }

    /// # Errors
    ///
    /// Same as [`delete_by_id`](Self::delete_by_id).
    #[tracing::instrument(skip(self))]
    pub async fn delete_by_name(&self, name: &str) -> Result<(), MetacatError> {
        let record: DeviceRecord = self.ctx.by_name(name).await?;
        self.delete(record).await
    }

    /// Reports naming the device go only once the device itself is gone.
    async fn delete(&self, record: DeviceRecord) -> Result<(), MetacatError> {
        let owner = self.ctx.owner(&record.service).await;
        self.ctx.remove(&record).await?;
        let reports: Vec<DeviceReport> = self
            .ctx
            .store
            .find(&Filter::equals("device", record.name.as_str()))
            .await?;
        for report in &reports {
            self.ctx.store.delete::<DeviceReport>(&report.id.to_string()).await?;
        }
        if !reports.is_empty() {
            tracing::info!(device = %record.name, count = reports.len(), "device reports removed");
        }
        self.ctx.notifier.notify(
            owner.as_ref(),
            record.id,
            ChangeAction::Delete,
            SubjectType::Device,
        );
        Ok(())
    }

    async fn save(&self, mut record: DeviceRecord, action: ChangeAction) -> Result<(), MetacatError> {
        record.audit.touch();
        record.validate()?;
        self.ctx.store.replace(&record).await?;
        let owner = self.ctx.owner(&record.service).await;
        self.ctx
            .notifier
            .notify(owner.as_ref(), record.id, action, SubjectType::Device);
        Ok(())
    }

    async fn rename_reports(&self, from: &str, to: &str) -> Result<(), MetacatError> {
        let reports: Vec<DeviceReport> = self.ctx.store.find(&Filter::equals("device", from)).await?;
        for mut report in reports {
            to.clone_into(&mut report.device);
            report.audit.touch();
            self.ctx.store.replace(&report).await?;
        }
        Ok(())
    }
}

/// Merge a device patch, resolving only the associations it carries and
/// storing them by id.
pub(crate) async fn apply_patch<S: DocumentStore, I: Send>(
    ctx: &Context<S>,
    patch: DevicePatch,
    record: &mut DeviceRecord<I>,
) -> Result<(), MetacatError> {
    let addressable: Option<Addressable> = ctx.attacher.optional(&patch.addressable).await?;
    let service: Option<DeviceServiceRecord> = ctx.attacher.optional(&patch.service).await?;
    let profile: Option<DeviceProfile> = ctx.attacher.optional(&patch.profile).await?;
    patch.apply(record);
    if let Some(addressable) = addressable {
        record.addressable = Reference::by_id(addressable.id);
    }
    if let Some(service) = service {
        record.service = Reference::by_id(service.id);
    }
    if let Some(profile) = profile {
        record.profile = Reference::by_id(profile.id);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use metacat_domain::device_manager::DeviceManagerRecord;
    use metacat_domain::error::ValidationError;
    use metacat_domain::id::DeviceManagerId;
    use metacat_domain::patch::Identity;
    use metacat_domain::schedule::Schedule;
    use metacat_domain::schedule_event::ScheduleEventRecord;

    use super::*;
    use crate::catalog::testing;
    use crate::memory::{InMemoryStore, RecordingSender, fixtures};
    use crate::notifier::{ChangeNotifier, NotifierConfig};
    use crate::store::Limits;

    #[tokio::test]
    async fn should_resolve_names_and_store_ids_on_create() {
        let ctx = testing::seeded().await;
        let catalog = DeviceCatalog::new(ctx.clone());

        let id = catalog
            .create(fixtures::device("D1", "A1", "S1", "P1"))
            .await
            .unwrap();

        let stored: DeviceRecord = ctx.by_id(&id.to_string()).await.unwrap();
        assert!(matches!(stored.addressable, Reference::ById(_)));
        assert!(matches!(stored.service, Reference::ById(_)));
        assert!(matches!(stored.profile, Reference::ById(_)));

        let device = catalog.get_by_name("D1").await.unwrap();
        assert_eq!(device.addressable.name, "A1");
        assert_eq!(device.service.name, "S1");
        assert_eq!(device.service.addressable.name, "A1");
        assert_eq!(device.profile.commands[0].name, "C1");
    }

    #[tokio::test]
    async fn should_reject_unknown_profile_and_write_nothing() {
        let catalog = DeviceCatalog::new(testing::seeded().await);
        let err = catalog
            .create(fixtures::device("D2", "A1", "S1", "nope"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MetacatError::Validation(ValidationError::MissingAssociation("device profile"))
        ));
        assert!(catalog.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_refuse_deleting_addressable_and_profile_in_use() {
        let ctx = testing::seeded().await;
        let catalog = DeviceCatalog::new(ctx.clone());
        catalog
            .create(fixtures::device("D1", "A1", "S1", "P1"))
            .await
            .unwrap();

        let a1: Addressable = ctx.by_name("A1").await.unwrap();
        assert!(matches!(
            ctx.remove(&a1).await,
            Err(MetacatError::Validation(ValidationError::StillReferenced { .. }))
        ));
        let p1: DeviceProfile = ctx.by_name("P1").await.unwrap();
        assert!(matches!(
            ctx.remove(&p1).await,
            Err(MetacatError::Validation(ValidationError::StillReferenced { .. }))
        ));

        catalog.delete_by_name("D1").await.unwrap();
        ctx.remove(&p1).await.unwrap();
    }

    #[tokio::test]
    async fn should_repoint_only_patched_associations() {
        let ctx = testing::seeded().await;
        ctx.store
            .insert(&fixtures::profile("P2", &["C1"]))
            .await
            .unwrap();
        let catalog = DeviceCatalog::new(ctx.clone());
        let id = catalog
            .create(fixtures::device("D1", "A1", "S1", "P1"))
            .await
            .unwrap();

        catalog
            .update(DevicePatch {
                identity: Identity::by_id(id),
                profile: Reference::by_name("P2"),
                ..DevicePatch::default()
            })
            .await
            .unwrap();
        let device = catalog.get(&id.to_string()).await.unwrap();
        assert_eq!(device.profile.name, "P2");
        assert_eq!(device.service.name, "S1");
        assert!(device.audit.modified > device.audit.created);

        let err = catalog
            .update(DevicePatch {
                identity: Identity::by_id(id),
                service: Reference::by_name("S9"),
                ..DevicePatch::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MetacatError::Validation(ValidationError::MissingAssociation("device service"))
        ));
    }

    async fn with_report(ctx: &Context<InMemoryStore>) {
        ctx.store
            .insert(&Schedule::every("every-15s", "PT15S"))
            .await
            .unwrap();
        ctx.store
            .insert(&ScheduleEventRecord {
                name: "E1".to_string(),
                schedule: "every-15s".to_string(),
                ..ScheduleEventRecord::default()
            })
            .await
            .unwrap();
        ctx.store
            .insert(&DeviceReport {
                name: "R1".to_string(),
                device: "D1".to_string(),
                event: "E1".to_string(),
                ..DeviceReport::default()
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn should_rewrite_reports_on_rename() {
        let ctx = testing::seeded().await;
        let catalog = DeviceCatalog::new(ctx.clone());
        let id = catalog
            .create(fixtures::device("D1", "A1", "S1", "P1"))
            .await
            .unwrap();
        with_report(&ctx).await;

        catalog
            .update(DevicePatch {
                identity: Identity::by_id(id).renamed("D2"),
                ..DevicePatch::default()
            })
            .await
            .unwrap();

        let report: DeviceReport = ctx.by_name("R1").await.unwrap();
        assert_eq!(report.device, "D2");
    }

    #[tokio::test]
    async fn should_remove_reports_with_the_device() {
        let ctx = testing::seeded().await;
        let catalog = DeviceCatalog::new(ctx.clone());
        catalog
            .create(fixtures::device("D1", "A1", "S1", "P1"))
            .await
            .unwrap();
        with_report(&ctx).await;

        catalog.delete_by_name("D1").await.unwrap();
        let reports: Vec<DeviceReport> = ctx.store.list().await.unwrap();
        assert!(reports.is_empty());
    }

    #[tokio::test]
    async fn should_keep_reports_when_device_delete_is_refused() {
        let ctx = testing::seeded().await;
        let catalog = DeviceCatalog::new(ctx.clone());
        let id = catalog
            .create(fixtures::device("D1", "A1", "S1", "P1"))
            .await
            .unwrap();
        with_report(&ctx).await;
        ctx.store
            .insert(&DeviceManagerRecord {
                device: DeviceRecord {
                    id: DeviceManagerId::new(),
                    name: "M1".to_string(),
                    ..DeviceRecord::default()
                },
                devices: vec![Reference::by_id(id)],
                managers: Vec::new(),
            })
            .await
            .unwrap();

        let err = catalog.delete_by_name("D1").await.unwrap_err();
        assert!(matches!(
            err,
            MetacatError::Validation(ValidationError::StillReferenced { .. })
        ));
        let reports: Vec<DeviceReport> = ctx.store.list().await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].device, "D1");
    }

    #[tokio::test]
    async fn should_notify_owning_service_of_lifecycle_changes() {
        let sender = Arc::new(RecordingSender::default());
        let (notifier, workers) = ChangeNotifier::spawn(Arc::clone(&sender), NotifierConfig::default());
        let ctx = Context::new(Arc::new(InMemoryStore::default()), Limits::default(), notifier);
        let seeded = testing::seeded().await;
        for addressable in seeded.store.list::<Addressable>().await.unwrap() {
            ctx.store.insert(&addressable).await.unwrap();
        }
        for service in seeded.store.list::<DeviceServiceRecord>().await.unwrap() {
            ctx.store.insert(&service).await.unwrap();
        }
        for profile in seeded.store.list::<DeviceProfile>().await.unwrap() {
            ctx.store.insert(&profile).await.unwrap();
        }
        let catalog = DeviceCatalog::new(ctx);

        let id = catalog
            .create(fixtures::device("D1", "A1", "S1", "P1"))
            .await
            .unwrap();
        catalog
            .set_operating_state(&id.to_string(), OperatingState::Disabled)
            .await
            .unwrap();
        catalog
            .set_last_connected(&id.to_string(), metacat_domain::time::now())
            .await
            .unwrap();
        catalog.delete_by_id(&id.to_string()).await.unwrap();
        drop(catalog);
        for worker in workers {
            worker.await.unwrap();
        }

        let delivered = sender.delivered.lock().unwrap();
        let mut actions: Vec<ChangeAction> = delivered.iter().map(|n| n.action).collect();
        actions.sort_by_key(ToString::to_string);
        assert_eq!(
            actions,
            vec![ChangeAction::Create, ChangeAction::Delete, ChangeAction::Update]
        );
        assert!(delivered.iter().all(|n| n.target.name == "A1"));
        assert!(delivered.iter().all(|n| n.subject_id == id.to_string()));
    }
}
