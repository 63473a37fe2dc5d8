//! `/api/v1/schedule` handlers.

use axum::extract::{Path, State};
use axum::routing::{delete, get};
use axum::{Json, Router};

use metacat_app::ports::DocumentStore;
use metacat_domain::schedule::{Schedule, SchedulePatch};

use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::state::AppState;

pub fn routes<S: DocumentStore>() -> Router<AppState<S>> {
    Router::new()
        .route(
            "/schedule",
            get(list::<S>).post(create::<S>).put(update::<S>),
        )
        .route("/schedule/{id}", get(get_by_id::<S>).delete(delete_by_id::<S>))
        .route("/schedule/id/{id}", delete(delete_by_id::<S>))
        .route(
            "/schedule/name/{name}",
            get(get_by_name::<S>).delete(delete_by_name::<S>),
        )
}

/// `GET /api/v1/schedule`
pub async fn list<S: DocumentStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<Schedule>>, ApiError> {
    Ok(Json(state.schedules.list().await?))
}

/// `GET /api/v1/schedule/{id}`
pub async fn get_by_id<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<Schedule>, ApiError> {
    Ok(Json(state.schedules.get(&id).await?))
}

/// `GET /api/v1/schedule/name/{name}`
pub async fn get_by_name<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(name): Path<String>,
) -> Result<Json<Schedule>, ApiError> {
    Ok(Json(state.schedules.get_by_name(&name).await?))
}

/// `POST /api/v1/schedule`: responds with the new id.
pub async fn create<S: DocumentStore>(
    State(state): State<AppState<S>>,
    JsonBody(schedule): JsonBody<Schedule>,
) -> Result<String, ApiError> {
    Ok(state.schedules.create(schedule).await?.to_string())
}

/// `PUT /api/v1/schedule`
pub async fn update<S: DocumentStore>(
    State(state): State<AppState<S>>,
    JsonBody(patch): JsonBody<SchedulePatch>,
) -> Result<Json<bool>, ApiError> {
    state.schedules.update(patch).await?;
    Ok(Json(true))
}

/// `DELETE /api/v1/schedule/{id}`
pub async fn delete_by_id<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<bool>, ApiError> {
    state.schedules.delete_by_id(&id).await?;
    Ok(Json(true))
}

/// `DELETE /api/v1/schedule/name/{name}`
pub async fn delete_by_name<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(name): Path<String>,
) -> Result<Json<bool>, ApiError> {
    state.schedules.delete_by_name(&name).await?;
    Ok(Json(true))
}
