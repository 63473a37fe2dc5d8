//! `/api/v1/deviceservice` handlers.

use axum::extract::{Path, State};
use axum::routing::{delete, get};
use axum::{Json, Router};

use metacat_app::ports::DocumentStore;
use metacat_domain::device_service::{DeviceService, DeviceServicePatch, DeviceServiceRecord};

use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::state::AppState;

pub fn routes<S: DocumentStore>() -> Router<AppState<S>> {
    Router::new()
        .route(
            "/deviceservice",
            get(list::<S>).post(create::<S>).put(update::<S>),
        )
        .route(
            "/deviceservice/{id}",
            get(get_by_id::<S>).delete(delete_by_id::<S>),
        )
        .route("/deviceservice/id/{id}", delete(delete_by_id::<S>))
        .route(
            "/deviceservice/name/{name}",
            get(get_by_name::<S>).delete(delete_by_name::<S>),
        )
        .route("/deviceservice/addressable/{id}", get(by_addressable::<S>))
        .route(
            "/deviceservice/addressablename/{name}",
            get(by_addressable_name::<S>),
        )
        .route("/deviceservice/label/{label}", get(by_label::<S>))
}

/// `GET /api/v1/deviceservice`
pub async fn list<S: DocumentStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<DeviceService>>, ApiError> {
    Ok(Json(state.device_services.list().await?))
}

/// `GET /api/v1/deviceservice/{id}`
pub async fn get_by_id<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<DeviceService>, ApiError> {
    Ok(Json(state.device_services.get(&id).await?))
}

/// `GET /api/v1/deviceservice/name/{name}`
pub async fn get_by_name<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(name): Path<String>,
) -> Result<Json<DeviceService>, ApiError> {
    Ok(Json(state.device_services.get_by_name(&name).await?))
}

/// `GET /api/v1/deviceservice/addressable/{id}`
pub async fn by_addressable<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<DeviceService>>, ApiError> {
    Ok(Json(state.device_services.find_by_addressable(&id).await?))
}

/// `GET /api/v1/deviceservice/addressablename/{name}`
pub async fn by_addressable_name<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(name): Path<String>,
) -> Result<Json<Vec<DeviceService>>, ApiError> {
    Ok(Json(
        state.device_services.find_by_addressable_name(&name).await?,
    ))
}

/// `GET /api/v1/deviceservice/label/{label}`
pub async fn by_label<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(label): Path<String>,
) -> Result<Json<Vec<DeviceService>>, ApiError> {
    Ok(Json(state.device_services.find_by_label(&label).await?))
}

/// `POST /api/v1/deviceservice`: responds with the new id.
pub async fn create<S: DocumentStore>(
    State(state): State<AppState<S>>,
    JsonBody(record): JsonBody<DeviceServiceRecord>,
) -> Result<String, ApiError> {
    Ok(state.device_services.create(record).await?.to_string())
}

/// `PUT /api/v1/deviceservice`
pub async fn update<S: DocumentStore>(
    State(state): State<AppState<S>>,
    JsonBody(patch): JsonBody<DeviceServicePatch>,
) -> Result<Json<bool>, ApiError> {
    state.device_services.update(patch).await?;
    Ok(Json(true))
}

/// `DELETE /api/v1/deviceservice/{id}`
pub async fn delete_by_id<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<bool>, ApiError> {
    state.device_services.delete_by_id(&id).await?;
    Ok(Json(true))
}

/// `DELETE /api/v1/deviceservice/name/{name}`
pub async fn delete_by_name<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(name): Path<String>,
) -> Result<Json<bool>, ApiError> {
    state.device_services.delete_by_name(&name).await?;
    Ok(Json(true))
}
