//! `/api/v1/devicemanager` handlers.

use axum::extract::{Path, State};
use axum::routing::{delete, get};
use axum::{Json, Router};

use metacat_app::ports::DocumentStore;
use metacat_domain::device_manager::{DeviceManager, DeviceManagerPatch, DeviceManagerRecord};

use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::state::AppState;

pub fn routes<S: DocumentStore>() -> Router<AppState<S>> {
    Router::new()
        .route(
            "/devicemanager",
            get(list::<S>).post(create::<S>).put(update::<S>),
        )
        .route(
            "/devicemanager/{id}",
            get(get_by_id::<S>).delete(delete_by_id::<S>),
        )
        .route("/devicemanager/id/{id}", delete(delete_by_id::<S>))
        .route(
            "/devicemanager/name/{name}",
            get(get_by_name::<S>).delete(delete_by_name::<S>),
        )
        .route("/devicemanager/profile/{id}", get(by_profile::<S>))
        .route("/devicemanager/service/{id}", get(by_service::<S>))
        .route("/devicemanager/label/{label}", get(by_label::<S>))
}

/// `GET /api/v1/devicemanager`
pub async fn list<S: DocumentStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<DeviceManager>>, ApiError> {
    Ok(Json(state.device_managers.list().await?))
}

/// `GET /api/v1/devicemanager/{id}`
pub async fn get_by_id<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<DeviceManager>, ApiError> {
    Ok(Json(state.device_managers.get(&id).await?))
}

/// `GET /api/v1/devicemanager/name/{name}`
pub async fn get_by_name<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(name): Path<String>,
) -> Result<Json<DeviceManager>, ApiError> {
    Ok(Json(state.device_managers.get_by_name(&name).await?))
}

/// `GET /api/v1/devicemanager/profile/{id}`
pub async fn by_profile<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<DeviceManager>>, ApiError> {
    Ok(Json(state.device_managers.find_by_profile(&id).await?))
}

/// `GET /api/v1/devicemanager/service/{id}`
pub async fn by_service<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<DeviceManager>>, ApiError> {
    Ok(Json(state.device_managers.find_by_service(&id).await?))
}

/// `GET /api/v1/devicemanager/label/{label}`
pub async fn by_label<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(label): Path<String>,
) -> Result<Json<Vec<DeviceManager>>, ApiError> {
    Ok(Json(state.device_managers.find_by_label(&label).await?))
}

/// `POST /api/v1/devicemanager`: responds with the new id.
pub async fn create<S: DocumentStore>(
    State(state): State<AppState<S>>,
    JsonBody(record): JsonBody<DeviceManagerRecord>,
) -> Result<String, ApiError> {
    Ok(state.device_managers.create(record).await?.to_string())
}

/// `PUT /api/v1/devicemanager`
pub async fn update<S: DocumentStore>(
    State(state): State<AppState<S>>,
    JsonBody(patch): JsonBody<DeviceManagerPatch>,
) -> Result<Json<bool>, ApiError> {
    state.device_managers.update(patch).await?;
    Ok(Json(true))
}

/// `DELETE /api/v1/devicemanager/{id}`
pub async fn delete_by_id<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<bool>, ApiError> {
    state.device_managers.delete_by_id(&id).await?;
    Ok(Json(true))
}

/// `DELETE /api/v1/devicemanager/name/{name}`
pub async fn delete_by_name<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(name): Path<String>,
) -> Result<Json<bool>, ApiError> {
    state.device_managers.delete_by_name(&name).await?;
    Ok(Json(true))
}
