//! `/api/v1/provisionwatcher` handlers.

use axum::extract::{Path, State};
use axum::routing::{delete, get};
use axum::{Json, Router};

use metacat_app::ports::DocumentStore;
use metacat_domain::provision_watcher::{
    ProvisionWatcher, ProvisionWatcherPatch, ProvisionWatcherRecord,
};

use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::state::AppState;

pub fn routes<S: DocumentStore>() -> Router<AppState<S>> {
    Router::new()
        .route(
            "/provisionwatcher",
            get(list::<S>).post(create::<S>).put(update::<S>),
        )
        .route(
            "/provisionwatcher/{id}",
            get(get_by_id::<S>).delete(delete_by_id::<S>),
        )
        .route("/provisionwatcher/id/{id}", delete(delete_by_id::<S>))
        .route(
            "/provisionwatcher/name/{name}",
            get(get_by_name::<S>).delete(delete_by_name::<S>),
        )
        .route("/provisionwatcher/profile/{id}", get(by_profile::<S>))
        .route("/provisionwatcher/service/{id}", get(by_service::<S>))
        .route(
            "/provisionwatcher/identifier/{key}/{value}",
            get(by_identifier::<S>),
        )
}

/// `GET /api/v1/provisionwatcher`
pub async fn list<S: DocumentStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<ProvisionWatcher>>, ApiError> {
    Ok(Json(state.provision_watchers.list().await?))
}

/// `GET /api/v1/provisionwatcher/{id}`
pub async fn get_by_id<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<ProvisionWatcher>, ApiError> {
    Ok(Json(state.provision_watchers.get(&id).await?))
}

/// `GET /api/v1/provisionwatcher/name/{name}`
pub async fn get_by_name<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(name): Path<String>,
) -> Result<Json<ProvisionWatcher>, ApiError> {
    Ok(Json(state.provision_watchers.get_by_name(&name).await?))
}

/// `GET /api/v1/provisionwatcher/profile/{id}`
pub async fn by_profile<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ProvisionWatcher>>, ApiError> {
    Ok(Json(state.provision_watchers.find_by_profile(&id).await?))
}

/// `GET /api/v1/provisionwatcher/service/{id}`
pub async fn by_service<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ProvisionWatcher>>, ApiError> {
    Ok(Json(state.provision_watchers.find_by_service(&id).await?))
}

/// `GET /api/v1/provisionwatcher/identifier/{key}/{value}`
pub async fn by_identifier<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path((key, value)): Path<(String, String)>,
) -> Result<Json<Vec<ProvisionWatcher>>, ApiError> {
    Ok(Json(
        state.provision_watchers.find_by_identifier(&key, &value).await?,
    ))
}

/// `POST /api/v1/provisionwatcher`: responds with the new id.
pub async fn create<S: DocumentStore>(
    State(state): State<AppState<S>>,
    JsonBody(record): JsonBody<ProvisionWatcherRecord>,
) -> Result<String, ApiError> {
    Ok(state.provision_watchers.create(record).await?.to_string())
}

/// `PUT /api/v1/provisionwatcher`
pub async fn update<S: DocumentStore>(
    State(state): State<AppState<S>>,
    JsonBody(patch): JsonBody<ProvisionWatcherPatch>,
) -> Result<Json<bool>, ApiError> {
    state.provision_watchers.update(patch).await?;
    Ok(Json(true))
}

/// `DELETE /api/v1/provisionwatcher/{id}`
pub async fn delete_by_id<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<bool>, ApiError> {
    state.provision_watchers.delete_by_id(&id).await?;
    Ok(Json(true))
}

/// `DELETE /api/v1/provisionwatcher/name/{name}`
pub async fn delete_by_name<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(name): Path<String>,
) -> Result<Json<bool>, ApiError> {
    state.provision_watchers.delete_by_name(&name).await?;
    Ok(Json(true))
}
