//! `/api/v1/devicereport` handlers.

use axum::extract::{Path, State};
use axum::routing::{delete, get};
use axum::{Json, Router};

use metacat_app::ports::DocumentStore;
use metacat_domain::device_report::{DeviceReport, DeviceReportPatch};

use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::state::AppState;

pub fn routes<S: DocumentStore>() -> Router<AppState<S>> {
    Router::new()
        .route(
            "/devicereport",
            get(list::<S>).post(create::<S>).put(update::<S>),
        )
        .route(
            "/devicereport/{id}",
            get(get_by_id::<S>).delete(delete_by_id::<S>),
        )
        .route("/devicereport/id/{id}", delete(delete_by_id::<S>))
        .route(
            "/devicereport/name/{name}",
            get(get_by_name::<S>).delete(delete_by_name::<S>),
        )
        .route("/devicereport/devicename/{name}", get(by_device_name::<S>))
        .route(
            "/devicereport/valueDescriptorsFor/{devicename}",
            get(value_descriptors_for::<S>),
        )
}

/// `GET /api/v1/devicereport`
pub async fn list<S: DocumentStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<DeviceReport>>, ApiError> {
    Ok(Json(state.device_reports.list().await?))
}

/// `GET /api/v1/devicereport/{id}`
pub async fn get_by_id<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<DeviceReport>, ApiError> {
    Ok(Json(state.device_reports.get(&id).await?))
}

/// `GET /api/v1/devicereport/name/{name}`
pub async fn get_by_name<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(name): Path<String>,
) -> Result<Json<DeviceReport>, ApiError> {
    Ok(Json(state.device_reports.get_by_name(&name).await?))
}

/// `GET /api/v1/devicereport/devicename/{name}`
pub async fn by_device_name<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(name): Path<String>,
) -> Result<Json<Vec<DeviceReport>>, ApiError> {
    Ok(Json(state.device_reports.find_by_device_name(&name).await?))
}

/// `GET /api/v1/devicereport/valueDescriptorsFor/{devicename}`
pub async fn value_descriptors_for<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(device): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.device_reports.value_descriptors_for(&device).await?))
}

/// `POST /api/v1/devicereport`: responds with the new id.
pub async fn create<S: DocumentStore>(
    State(state): State<AppState<S>>,
    JsonBody(report): JsonBody<DeviceReport>,
) -> Result<String, ApiError> {
    Ok(state.device_reports.create(report).await?.to_string())
}

/// `PUT /api/v1/devicereport`
pub async fn update<S: DocumentStore>(
    State(state): State<AppState<S>>,
    JsonBody(patch): JsonBody<DeviceReportPatch>,
) -> Result<Json<bool>, ApiError> {
    state.device_reports.update(patch).await?;
    Ok(Json(true))
}

/// `DELETE /api/v1/devicereport/{id}`
pub async fn delete_by_id<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<bool>, ApiError> {
    state.device_reports.delete_by_id(&id).await?;
    Ok(Json(true))
}

/// `DELETE /api/v1/devicereport/name/{name}`
pub async fn delete_by_name<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(name): Path<String>,
) -> Result<Json<bool>, ApiError> {
    state.device_reports.delete_by_name(&name).await?;
    Ok(Json(true))
}
