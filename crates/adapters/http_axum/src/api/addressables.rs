//! `/api/v1/addressable` handlers.

use axum::extract::{Path, State};
use axum::routing::{delete, get};
use axum::{Json, Router};

use metacat_app::ports::DocumentStore;
use metacat_domain::addressable::{Addressable, AddressablePatch};

use crate::error::ApiError;
use crate::extract::{JsonBody, param};
use crate::state::AppState;

pub fn routes<S: DocumentStore>() -> Router<AppState<S>> {
    Router::new()
        .route(
            "/addressable",
            get(list::<S>).post(create::<S>).put(update::<S>),
        )
        .route("/addressable/{id}", get(get_by_id::<S>).delete(delete_by_id::<S>))
        .route("/addressable/id/{id}", delete(delete_by_id::<S>))
        .route(
            "/addressable/name/{name}",
            get(get_by_name::<S>).delete(delete_by_name::<S>),
        )
        .route("/addressable/address/{address}", get(by_address::<S>))
        .route("/addressable/port/{port}", get(by_port::<S>))
        .route("/addressable/publisher/{publisher}", get(by_publisher::<S>))
        .route("/addressable/topic/{topic}", get(by_topic::<S>))
}

/// `GET /api/v1/addressable`
pub async fn list<S: DocumentStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<Addressable>>, ApiError> {
    Ok(Json(state.addressables.list().await?))
}

/// `GET /api/v1/addressable/{id}`
pub async fn get_by_id<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<Addressable>, ApiError> {
    Ok(Json(state.addressables.get(&id).await?))
}

/// `GET /api/v1/addressable/name/{name}`
pub async fn get_by_name<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(name): Path<String>,
) -> Result<Json<Addressable>, ApiError> {
    Ok(Json(state.addressables.get_by_name(&name).await?))
}

/// `GET /api/v1/addressable/address/{address}`
pub async fn by_address<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(address): Path<String>,
) -> Result<Json<Vec<Addressable>>, ApiError> {
    Ok(Json(state.addressables.find_by_address(&address).await?))
}

/// `GET /api/v1/addressable/port/{port}`
pub async fn by_port<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(port): Path<String>,
) -> Result<Json<Vec<Addressable>>, ApiError> {
    let port = param("port", &port)?;
    Ok(Json(state.addressables.find_by_port(port).await?))
}

/// `GET /api/v1/addressable/publisher/{publisher}`
pub async fn by_publisher<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(publisher): Path<String>,
) -> Result<Json<Vec<Addressable>>, ApiError> {
    Ok(Json(state.addressables.find_by_publisher(&publisher).await?))
}

/// `GET /api/v1/addressable/topic/{topic}`
pub async fn by_topic<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(topic): Path<String>,
) -> Result<Json<Vec<Addressable>>, ApiError> {
    Ok(Json(state.addressables.find_by_topic(&topic).await?))
}

/// `POST /api/v1/addressable`: responds with the new id.
pub async fn create<S: DocumentStore>(
    State(state): State<AppState<S>>,
    JsonBody(addressable): JsonBody<Addressable>,
) -> Result<String, ApiError> {
    Ok(state.addressables.create(addressable).await?.to_string())
}

/// `PUT /api/v1/addressable`
pub async fn update<S: DocumentStore>(
    State(state): State<AppState<S>>,
    JsonBody(patch): JsonBody<AddressablePatch>,
) -> Result<Json<bool>, ApiError> {
    state.addressables.update(patch).await?;
    Ok(Json(true))
}

/// `DELETE /api/v1/addressable/{id}`
pub async fn delete_by_id<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<bool>, ApiError> {
    state.addressables.delete_by_id(&id).await?;
    Ok(Json(true))
}

/// `DELETE /api/v1/addressable/name/{name}`
pub async fn delete_by_name<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(name): Path<String>,
) -> Result<Json<bool>, ApiError> {
    state.addressables.delete_by_name(&name).await?;
    Ok(Json(true))
}
