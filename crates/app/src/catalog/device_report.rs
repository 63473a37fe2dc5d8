//! Device report catalog.

use std::collections::BTreeSet;

use metacat_domain::device_report::{DeviceReport, DeviceReportPatch};
use metacat_domain::error::MetacatError;
use metacat_domain::id::DeviceReportId;
use metacat_domain::time::Audit;

use crate::catalog::Context;
use crate::ports::{DocumentStore, Filter};

/// Application service for device reports.
pub struct DeviceReportCatalog<S> {
    ctx: Context<S>,
}

impl<S: DocumentStore> DeviceReportCatalog<S> {
    pub fn new(ctx: Context<S>) -> Self {
        Self { ctx }
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::LimitExceeded`] above the listing limit.
    pub async fn list(&self) -> Result<Vec<DeviceReport>, MetacatError> {
        self.ctx.store.list().await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] when no report has `id`.
    pub async fn get(&self, id: &str) -> Result<DeviceReport, MetacatError> {
        self.ctx.by_id(id).await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] when no report has `name`.
    pub async fn get_by_name(&self, name: &str) -> Result<DeviceReport, MetacatError> {
        self.ctx.by_name(name).await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::LimitExceeded`] above the listing limit.
    pub async fn find_by_device_name(&self, device: &str) -> Result<Vec<DeviceReport>, MetacatError> {
        self.ctx.store.find(&Filter::equals("device", device)).await
    }

    /// Every value descriptor name the reports of `device` expect, without
    /// repetitions.
    ///
    /// # Errors
    ///
    /// Returns [`MetacatError::LimitExceeded`] above the listing limit.
    pub async fn value_descriptors_for(&self, device: &str) -> Result<Vec<String>, MetacatError> {
        let reports = self.find_by_device_name(device).await?;
        let names: BTreeSet<String> = reports.into_iter().flat_map(|r| r.expected).collect();
        Ok(names.into_iter().collect())
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::Validation`] for an empty or taken name, or
    /// an unknown device or schedule event.
    #[tracing::instrument(skip(self, report), fields(name = %report.name))]
    pub async fn create(&self, mut report: DeviceReport) -> Result<DeviceReportId, MetacatError> {
        report.validate()?;
        self.ctx.attacher.check_report(&report).await?;
        report.id = DeviceReportId::new();
        report.audit = Audit::stamp();
        self.ctx.store.insert(&report).await?;
        tracing::info!(id = %report.id, device = %report.device, "device report created");
        Ok(report.id)
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::Validation`] for a missing identity, a taken
    /// name or an unknown device or event; [`MetacatError::NotFound`] for
    /// an unknown target.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update(&self, patch: DeviceReportPatch) -> Result<(), MetacatError> {
        let mut report: DeviceReport = self.ctx.target(&patch.identity).await?;
        if let Some(name) = self.ctx.rename(&report, &patch.identity).await? {
            report.name = name;
        }
        let associations_changed = patch.device.is_some() || patch.event.is_some();
        patch.apply(&mut report);
        report.validate()?;
        if associations_changed {
            self.ctx.attacher.check_report(&report).await?;
        }
        report.audit.touch();
        self.ctx.store.replace(&report).await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] for an unknown id.
    #[tracing::instrument(skip(self))]
    pub async fn delete_by_id(&self, id: &str) -> Result<(), MetacatError> {
        let report: DeviceReport = self.ctx.by_id(id).await?;
        self.ctx.remove(&report).await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] for an unknown name.
    #[tracing::instrument(skip(self))]
    pub async fn delete_by_name(&self, name: &str) -> Result<(), MetacatError> {
        let report: DeviceReport = self.ctx.by_name(name).await?;
        self.ctx.remove(&report).await
    }
}
