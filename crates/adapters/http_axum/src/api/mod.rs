//! JSON REST API handler modules, one per resource family.

#[allow(clippy::missing_errors_doc)]
pub mod addressables;
#[allow(clippy::missing_errors_doc)]
pub mod commands;
#[allow(clippy::missing_errors_doc)]
pub mod device_managers;
#[allow(clippy::missing_errors_doc)]
pub mod device_profiles;
#[allow(clippy::missing_errors_doc)]
pub mod device_reports;
#[allow(clippy::missing_errors_doc)]
pub mod device_services;
#[allow(clippy::missing_errors_doc)]
pub mod devices;
#[allow(clippy::missing_errors_doc)]
pub mod provision_watchers;
#[allow(clippy::missing_errors_doc)]
pub mod schedule_events;
#[allow(clippy::missing_errors_doc)]
pub mod schedules;

use axum::Router;
use axum::routing::get;

use metacat_app::ports::DocumentStore;

use crate::state::AppState;

/// Build the `/api/v1` sub-router.
pub fn routes<S: DocumentStore>() -> Router<AppState<S>> {
    Router::new()
        .route("/ping", get(ping))
        .merge(addressables::routes())
        .merge(device_services::routes())
        .merge(device_profiles::routes())
        .merge(commands::routes())
        .merge(devices::routes())
        .merge(device_managers::routes())
        .merge(schedules::routes())
        .merge(schedule_events::routes())
        .merge(device_reports::routes())
        .merge(provision_watchers::routes())
}

/// `GET /api/v1/ping`
async fn ping() -> &'static str {
    "pong"
}
