//! `/api/v1/device` handlers.

use axum::extract::{Path, State};
use axum::routing::{delete, get, put};
use axum::{Json, Router};

use metacat_app::ports::DocumentStore;
use metacat_domain::device::{Device, DevicePatch, DeviceRecord};
use metacat_domain::error::InputError;
use metacat_domain::state::{AdminState, OperatingState};
use metacat_domain::time::{self, Timestamp};

use crate::error::ApiError;
use crate::extract::{JsonBody, param};
use crate::state::AppState;

pub fn routes<S: DocumentStore>() -> Router<AppState<S>> {
    Router::new()
        .route("/device", get(list::<S>).post(create::<S>).put(update::<S>))
        .route("/device/{id}", get(get_by_id::<S>).delete(delete_by_id::<S>))
        .route("/device/id/{id}", delete(delete_by_id::<S>))
        .route(
            "/device/name/{name}",
            get(get_by_name::<S>).delete(delete_by_name::<S>),
        )
        .route("/device/profile/{id}", get(by_profile::<S>))
        .route("/device/service/{id}", get(by_service::<S>))
        .route("/device/servicename/{name}", get(by_service_name::<S>))
        .route("/device/addressable/{id}", get(by_addressable::<S>))
        .route("/device/label/{label}", get(by_label::<S>))
        .route("/device/{id}/opstate/{state}", put(set_operating_state::<S>))
        .route("/device/{id}/adminstate/{state}", put(set_admin_state::<S>))
        .route(
            "/device/{id}/lastconnected/{millis}",
            put(set_last_connected::<S>),
        )
        .route(
            "/device/{id}/lastreported/{millis}",
            put(set_last_reported::<S>),
        )
}

/// Epoch milliseconds from a path segment.
fn millis(value: &str) -> Result<Timestamp, ApiError> {
    let millis: i64 = param("millis", value)?;
    time::from_millis(millis).ok_or_else(|| {
        ApiError::from(InputError::InvalidParameter {
            name: "millis",
            value: value.to_string(),
        })
    })
}

/// `GET /api/v1/device`
pub async fn list<S: DocumentStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<Device>>, ApiError> {
    Ok(Json(state.devices.list().await?))
}

/// `GET /api/v1/device/{id}`
pub async fn get_by_id<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<Device>, ApiError> {
    Ok(Json(state.devices.get(&id).await?))
}

/// `GET /api/v1/device/name/{name}`
pub async fn get_by_name<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(name): Path<String>,
) -> Result<Json<Device>, ApiError> {
    Ok(Json(state.devices.get_by_name(&name).await?))
}

/// `GET /api/v1/device/profile/{id}`
pub async fn by_profile<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Device>>, ApiError> {
    Ok(Json(state.devices.find_by_profile(&id).await?))
}

/// `GET /api/v1/device/service/{id}`
pub async fn by_service<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Device>>, ApiError> {
    Ok(Json(state.devices.find_by_service(&id).await?))
}

/// `GET /api/v1/device/servicename/{name}`
pub async fn by_service_name<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(name): Path<String>,
) -> Result<Json<Vec<Device>>, ApiError> {
    Ok(Json(state.devices.find_by_service_name(&name).await?))
}

/// `GET /api/v1/device/addressable/{id}`
pub async fn by_addressable<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Device>>, ApiError> {
    Ok(Json(state.devices.find_by_addressable(&id).await?))
}

/// `GET /api/v1/device/label/{label}`
pub async fn by_label<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(label): Path<String>,
) -> Result<Json<Vec<Device>>, ApiError> {
    Ok(Json(state.devices.find_by_label(&label).await?))
}

/// `POST /api/v1/device`: responds with the new id.
pub async fn create<S: DocumentStore>(
    State(state): State<AppState<S>>,
    JsonBody(record): JsonBody<DeviceRecord>,
) -> Result<String, ApiError> {
    Ok(state.devices.create(record).await?.to_string())
}

/// `PUT /api/v1/device`
pub async fn update<S: DocumentStore>(
    State(state): State<AppState<S>>,
    JsonBody(patch): JsonBody<DevicePatch>,
) -> Result<Json<bool>, ApiError> {
    state.devices.update(patch).await?;
    Ok(Json(true))
}

/// `PUT /api/v1/device/{id}/opstate/{state}`
pub async fn set_operating_state<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path((id, value)): Path<(String, String)>,
) -> Result<Json<bool>, ApiError> {
    let operating: OperatingState = value.parse()?;
    state.devices.set_operating_state(&id, operating).await?;
    Ok(Json(true))
}

/// `PUT /api/v1/device/{id}/adminstate/{state}`
pub async fn set_admin_state<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path((id, value)): Path<(String, String)>,
) -> Result<Json<bool>, ApiError> {
    let admin: AdminState = value.parse()?;
    state.devices.set_admin_state(&id, admin).await?;
    Ok(Json(true))
}

/// `PUT /api/v1/device/{id}/lastconnected/{millis}`
pub async fn set_last_connected<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path((id, value)): Path<(String, String)>,
) -> Result<Json<bool>, ApiError> {
    state.devices.set_last_connected(&id, millis(&value)?).await?;
    Ok(Json(true))
}

/// `PUT /api/v1/device/{id}/lastreported/{millis}`
pub async fn set_last_reported<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path((id, value)): Path<(String, String)>,
) -> Result<Json<bool>, ApiError> {
    state.devices.set_last_reported(&id, millis(&value)?).await?;
    Ok(Json(true))
}

/// `DELETE /api/v1/device/{id}`
pub async fn delete_by_id<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<bool>, ApiError> {
    state.devices.delete_by_id(&id).await?;
    Ok(Json(true))
}

/// `DELETE /api/v1/device/name/{name}`
pub async fn delete_by_name<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(name): Path<String>,
) -> Result<Json<bool>, ApiError> {
    state.devices.delete_by_name(&name).await?;
    Ok(Json(true))
}
