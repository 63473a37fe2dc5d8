//! `/api/v1/command` handlers. Commands are created through their profile.

use axum::extract::{Path, State};
use axum::routing::{delete, get};
use axum::{Json, Router};

use metacat_app::ports::DocumentStore;
use metacat_domain::command::{Command, CommandPatch};

use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::state::AppState;

pub fn routes<S: DocumentStore>() -> Router<AppState<S>> {
    Router::new()
        .route("/command", get(list::<S>).put(update::<S>))
        .route("/command/{id}", get(get_by_id::<S>).delete(delete_by_id::<S>))
        .route("/command/id/{id}", delete(delete_by_id::<S>))
        .route(
            "/command/name/{name}",
            get(get_by_name::<S>).delete(delete_by_name::<S>),
        )
}

/// `GET /api/v1/command`
pub async fn list<S: DocumentStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<Command>>, ApiError> {
    Ok(Json(state.commands.list().await?))
}

/// `GET /api/v1/command/{id}`
pub async fn get_by_id<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<Command>, ApiError> {
    Ok(Json(state.commands.get(&id).await?))
}

/// `GET /api/v1/command/name/{name}`: every command with that name.
pub async fn get_by_name<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(name): Path<String>,
) -> Result<Json<Vec<Command>>, ApiError> {
    Ok(Json(state.commands.get_by_name(&name).await?))
}

/// `PUT /api/v1/command`
pub async fn update<S: DocumentStore>(
    State(state): State<AppState<S>>,
    JsonBody(patch): JsonBody<CommandPatch>,
) -> Result<Json<bool>, ApiError> {
    state.commands.update(patch).await?;
    Ok(Json(true))
}

/// `DELETE /api/v1/command/{id}`
pub async fn delete_by_id<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<bool>, ApiError> {
    state.commands.delete_by_id(&id).await?;
    Ok(Json(true))
}

/// `DELETE /api/v1/command/name/{name}`
pub async fn delete_by_name<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(name): Path<String>,
) -> Result<Json<bool>, ApiError> {
    state.commands.delete_by_name(&name).await?;
    Ok(Json(true))
}
