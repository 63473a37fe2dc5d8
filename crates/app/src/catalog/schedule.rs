//! Schedule catalog.

use metacat_domain::error::MetacatError;
use metacat_domain::id::ScheduleId;
use metacat_domain::schedule::{Schedule, SchedulePatch};
use metacat_domain::time::Audit;

use crate::catalog::Context;
use crate::ports::DocumentStore;

/// Application service for schedules.
pub struct ScheduleCatalog<S> {
    ctx: Context<S>,
}

impl<S: DocumentStore> ScheduleCatalog<S> {
    pub fn new(ctx: Context<S>) -> Self {
        Self { ctx }
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::LimitExceeded`] above the listing limit.
    pub async fn list(&self) -> Result<Vec<Schedule>, MetacatError> {
        self.ctx.store.list().await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] when no schedule has `id`.
    pub async fn get(&self, id: &str) -> Result<Schedule, MetacatError> {
        self.ctx.by_id(id).await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] when no schedule has `name`.
    pub async fn get_by_name(&self, name: &str) -> Result<Schedule, MetacatError> {
        self.ctx.by_name(name).await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::Validation`] for an empty or taken name, a
    /// malformed window, frequency or cron expression.
    #[tracing::instrument(skip(self, schedule), fields(name = %schedule.name))]
    pub async fn create(&self, mut schedule: Schedule) -> Result<ScheduleId, MetacatError> {
        schedule.validate()?;
        schedule.id = ScheduleId::new();
        schedule.audit = Audit::stamp();
        self.ctx.store.insert(&schedule).await?;
        tracing::info!(id = %schedule.id, "schedule created");
        Ok(schedule.id)
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::Validation`] for a missing identity, a
    /// malformed field, a taken name or a rename while schedule events name
    /// the schedule; [`MetacatError::NotFound`] for an unknown target.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update(&self, patch: SchedulePatch) -> Result<(), MetacatError> {
        patch.validate()?;
        let mut schedule: Schedule = self.ctx.target(&patch.identity).await?;
        if let Some(name) = self.ctx.rename(&schedule, &patch.identity).await? {
            schedule.name = name;
        }
        patch.apply(&mut schedule);
        schedule.validate()?;
        schedule.audit.touch();
        self.ctx.store.replace(&schedule).await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::Validation`] while schedule events name it.
    #[tracing::instrument(skip(self))]
    pub async fn delete_by_id(&self, id: &str) -> Result<(), MetacatError> {
        let schedule: Schedule = self.ctx.by_id(id).await?;
        self.ctx.remove(&schedule).await
    }

    /// # Errors
    ///
    /// Same as [`delete_by_id`](Self::delete_by_id).
    #[tracing::instrument(skip(self))]
    pub async fn delete_by_name(&self, name: &str) -> Result<(), MetacatError> {
        let schedule: Schedule = self.ctx.by_name(name).await?;
        self.ctx.remove(&schedule).await
    }
}
