//! Shared application state for axum handlers.

use std::sync::Arc;

use metacat_app::catalog::{
    AddressableCatalog, CommandCatalog, Context, DeviceCatalog, DeviceManagerCatalog,
    DeviceProfileCatalog, DeviceReportCatalog, DeviceServiceCatalog, ProvisionWatcherCatalog,
    ScheduleCatalog, ScheduleEventCatalog,
};
use metacat_app::ports::DocumentStore;
use metacat_app::profile_import::ProfileDocumentImporter;

/// Application state shared across all axum handlers.
///
/// Generic over the document store to avoid dynamic dispatch.
/// `Clone` is implemented manually so the store itself does not need to be
/// `Clone`; only the `Arc` wrappers are cloned.
pub struct AppState<S> {
    pub addressables: Arc<AddressableCatalog<S>>,
    pub device_services: Arc<DeviceServiceCatalog<S>>,
    pub device_profiles: Arc<DeviceProfileCatalog<S>>,
    pub commands: Arc<CommandCatalog<S>>,
    pub devices: Arc<DeviceCatalog<S>>,
    pub device_managers: Arc<DeviceManagerCatalog<S>>,
    pub schedules: Arc<ScheduleCatalog<S>>,
    pub schedule_events: Arc<ScheduleEventCatalog<S>>,
    pub device_reports: Arc<DeviceReportCatalog<S>>,
    pub provision_watchers: Arc<ProvisionWatcherCatalog<S>>,
    /// YAML import/export of device profiles.
    pub profile_documents: Arc<ProfileDocumentImporter<S>>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            addressables: Arc::clone(&self.addressables),
            device_services: Arc::clone(&self.device_services),
            device_profiles: Arc::clone(&self.device_profiles),
            commands: Arc::clone(&self.commands),
            devices: Arc::clone(&self.devices),
            device_managers: Arc::clone(&self.device_managers),
            schedules: Arc::clone(&self.schedules),
            schedule_events: Arc::clone(&self.schedule_events),
            device_reports: Arc::clone(&self.device_reports),
            provision_watchers: Arc::clone(&self.provision_watchers),
            profile_documents: Arc::clone(&self.profile_documents),
        }
    }
}

impl<S: DocumentStore> AppState<S> {
    /// Build every catalog over one shared context.
    pub fn new(ctx: &Context<S>) -> Self {
        Self {
            addressables: Arc::new(AddressableCatalog::new(ctx.clone())),
            device_services: Arc::new(DeviceServiceCatalog::new(ctx.clone())),
            device_profiles: Arc::new(DeviceProfileCatalog::new(ctx.clone())),
            commands: Arc::new(CommandCatalog::new(ctx.clone())),
            devices: Arc::new(DeviceCatalog::new(ctx.clone())),
            device_managers: Arc::new(DeviceManagerCatalog::new(ctx.clone())),
            schedules: Arc::new(ScheduleCatalog::new(ctx.clone())),
            schedule_events: Arc::new(ScheduleEventCatalog::new(ctx.clone())),
            device_reports: Arc::new(DeviceReportCatalog::new(ctx.clone())),
            provision_watchers: Arc::new(ProvisionWatcherCatalog::new(ctx.clone())),
            profile_documents: Arc::new(ProfileDocumentImporter::new(DeviceProfileCatalog::new(
                ctx.clone(),
            ))),
        }
    }
}
