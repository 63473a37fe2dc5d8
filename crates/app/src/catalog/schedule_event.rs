//! Schedule event catalog.

use metacat_domain::addressable::Addressable;
use metacat_domain::device_service::DeviceServiceRecord;
use metacat_domain::error::MetacatError;
use metacat_domain::id::ScheduleEventId;
use metacat_domain::reference::Reference;
use metacat_domain::schedule::Schedule;
use metacat_domain::schedule_event::{ScheduleEvent, ScheduleEventPatch, ScheduleEventRecord};
use metacat_domain::time::Audit;

use crate::catalog::Context;
use crate::integrity::attacher::named;
use crate::ports::{DocumentStore, Filter};

/// Application service for schedule events.
pub struct ScheduleEventCatalog<S> {
    ctx: Context<S>,
}

impl<S: DocumentStore> ScheduleEventCatalog<S> {
    pub fn new(ctx: Context<S>) -> Self {
        Self { ctx }
    }

    async fn hydrate_all(
        &self,
        records: Vec<ScheduleEventRecord>,
    ) -> Result<Vec<ScheduleEvent>, MetacatError> {
        let mut events = Vec::with_capacity(records.len());
        for record in records {
            events.push(self.ctx.attacher.hydrate_event(record).await?);
        }
        Ok(events)
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::LimitExceeded`] above the listing limit.
    pub async fn list(&self) -> Result<Vec<ScheduleEvent>, MetacatError> {
        let records = self.ctx.store.list().await?;
        self.hydrate_all(records).await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] when no event has `id`.
    pub async fn get(&self, id: &str) -> Result<ScheduleEvent, MetacatError> {
        let record = self.ctx.by_id(id).await?;
        self.ctx.attacher.hydrate_event(record).await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] when no event has `name`.
    pub async fn get_by_name(&self, name: &str) -> Result<ScheduleEvent, MetacatError> {
        let record = self.ctx.by_name(name).await?;
        self.ctx.attacher.hydrate_event(record).await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] for an unknown addressable.
    pub async fn find_by_addressable(
        &self,
        addressable_id: &str,
    ) -> Result<Vec<ScheduleEvent>, MetacatError> {
        let addressable: Addressable = self.ctx.by_id(addressable_id).await?;
        let filter = Filter::equals("addressable.id", addressable.id.to_string());
        let records = self.ctx.store.find(&filter).await?;
        self.hydrate_all(records).await
    }

    /// Events run on behalf of the service called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`MetacatError::LimitExceeded`] above the listing limit.
    pub async fn find_by_service_name(&self, name: &str) -> Result<Vec<ScheduleEvent>, MetacatError> {
        let records = self.ctx.store.find(&Filter::equals("service", name)).await?;
        self.hydrate_all(records).await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::Validation`] for an empty or taken name, an
    /// unknown schedule or addressable, or a named service that does not
    /// exist.
    #[tracing::instrument(skip(self, record), fields(name = %record.name))]
    pub async fn create(&self, record: ScheduleEventRecord) -> Result<ScheduleEventId, MetacatError> {
        record.validate()?;
        let mut event = self.ctx.attacher.attach_event(record).await?;
        event.id = ScheduleEventId::new();
        event.audit = Audit::stamp();
        self.ctx.store.insert(&event.to_record()).await?;
        tracing::info!(id = %event.id, schedule = %event.schedule, "schedule event created");
        Ok(event.id)
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::Validation`] for a missing identity, a taken
    /// name, a patched association that does not resolve or a rename while
    /// device reports name the event; [`MetacatError::NotFound`] for an
    /// unknown target.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update(&self, patch: ScheduleEventPatch) -> Result<(), MetacatError> {
        let mut record: ScheduleEventRecord = self.ctx.target(&patch.identity).await?;
        if let Some(name) = self.ctx.rename(&record, &patch.identity).await? {
            record.name = name;
        }
        if let Some(schedule) = &patch.schedule {
            self.ctx.attacher.mandatory::<Schedule>(&named(schedule)).await?;
        }
        if let Some(service) = &patch.service {
            self.ctx
                .attacher
                .optional::<DeviceServiceRecord>(&named(service))
                .await?;
        }
        let addressable: Option<Addressable> = self.ctx.attacher.optional(&patch.addressable).await?;
        patch.apply(&mut record);
        if let Some(addressable) = addressable {
            record.addressable = Reference::by_id(addressable.id);
        }
        record.audit.touch();
        record.validate()?;
        self.ctx.store.replace(&record).await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::Validation`] while device reports name it.
    #[tracing::instrument(skip(self))]
    pub async fn delete_by_id(&self, id: &str) -> Result<(), MetacatError> {
        let record: ScheduleEventRecord = self.ctx.by_id(id).await?;
        self.ctx.remove(&record).await
    }

    /// # Errors
    ///
    /// Same as [`delete_by_id`](Self::delete_by_id).
    #[tracing::instrument(skip(self))]
    pub async fn delete_by_name(&self, name: &str) -> Result<(), MetacatError> {
        let record: ScheduleEventRecord = self.ctx.by_name(name).await?;
        self.ctx.remove(&record).await
    }
}

#[cfg(test)]
mod tests {
    use metacat_domain::device_report::DeviceReport;
    use metacat_domain::error::ValidationError;
    use metacat_domain::patch::Identity;

    use super::*;
    use crate::catalog::testing;
    use crate::memory::InMemoryStore;

    fn event(name: &str, schedule: &str, service: &str) -> ScheduleEventRecord {
        ScheduleEventRecord {
            name: name.to_string(),
            schedule: schedule.to_string(),
            addressable: Reference::by_name("A1"),
            service: service.to_string(),
            ..ScheduleEventRecord::default()
        }
    }

    async fn catalog() -> (Context<InMemoryStore>, ScheduleEventCatalog<InMemoryStore>) {
        let ctx = testing::seeded().await;
        ctx.store
            .insert(&Schedule::every("every-15s", "PT15S"))
            .await
            .unwrap();
        (ctx.clone(), ScheduleEventCatalog::new(ctx))
    }

    #[tokio::test]
    async fn should_resolve_schedule_addressable_and_service() {
        let (_, catalog) = catalog().await;
        catalog.create(event("E1", "every-15s", "S1")).await.unwrap();
        let e1 = catalog.get_by_name("E1").await.unwrap();
        assert_eq!(e1.addressable.name, "A1");
        assert_eq!(catalog.find_by_service_name("S1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_accept_event_without_service_but_reject_unknown_one() {
        let (_, catalog) = catalog().await;
        catalog.create(event("E1", "every-15s", "")).await.unwrap();
        let err = catalog
            .create(event("E2", "every-15s", "S9"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MetacatError::Validation(ValidationError::MissingAssociation("device service"))
        ));
        let err = catalog
            .create(event("E3", "hourly", ""))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MetacatError::Validation(ValidationError::MissingAssociation("schedule"))
        ));
    }

    #[tokio::test]
    async fn should_refuse_rename_and_delete_while_a_report_names_it() {
        let (ctx, catalog) = catalog().await;
        let id = catalog.create(event("E1", "every-15s", "S1")).await.unwrap();
        ctx.store
            .insert(&DeviceReport {
                name: "R1".to_string(),
                device: "D1".to_string(),
                event: "E1".to_string(),
                ..DeviceReport::default()
            })
            .await
            .unwrap();

        let err = catalog
            .update(ScheduleEventPatch {
                identity: Identity::by_id(id).renamed("E2"),
                ..ScheduleEventPatch::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MetacatError::Validation(ValidationError::StillReferenced { .. })
        ));
        assert!(catalog.delete_by_name("E1").await.is_err());

        catalog
            .update(ScheduleEventPatch {
                identity: Identity::by_id(id).renamed("E1"),
                parameters: Some("{\"read\":true}".to_string()),
                ..ScheduleEventPatch::default()
            })
            .await
            .unwrap();
        let e1 = catalog.get(&id.to_string()).await.unwrap();
        assert_eq!(e1.name, "E1");
        assert_eq!(e1.parameters, "{\"read\":true}");
    }

    #[tokio::test]
    async fn should_refuse_deleting_schedule_named_by_an_event() {
        let (ctx, catalog) = catalog().await;
        catalog.create(event("E1", "every-15s", "S1")).await.unwrap();
        let schedule: Schedule = ctx.by_name("every-15s").await.unwrap();
        assert!(matches!(
            ctx.remove(&schedule).await,
            Err(MetacatError::Validation(ValidationError::StillReferenced { .. }))
        ));
        catalog.delete_by_name("E1").await.unwrap();
        ctx.remove(&schedule).await.unwrap();
    }
}
