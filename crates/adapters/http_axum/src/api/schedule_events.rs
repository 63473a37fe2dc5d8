//! `/api/v1/scheduleevent` handlers.

use axum::extract::{Path, State};
use axum::routing::{delete, get};
use axum::{Json, Router};

use metacat_app::ports::DocumentStore;
use metacat_domain::schedule_event::{ScheduleEvent, ScheduleEventPatch, ScheduleEventRecord};

use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::state::AppState;

pub fn routes<S: DocumentStore>() -> Router<AppState<S>> {
    Router::new()
        .route(
            "/scheduleevent",
            get(list::<S>).post(create::<S>).put(update::<S>),
        )
        .route(
            "/scheduleevent/{id}",
            get(get_by_id::<S>).delete(delete_by_id::<S>),
        )
        .route("/scheduleevent/id/{id}", delete(delete_by_id::<S>))
        .route(
            "/scheduleevent/name/{name}",
            get(get_by_name::<S>).delete(delete_by_name::<S>),
        )
        .route("/scheduleevent/addressable/{id}", get(by_addressable::<S>))
        .route("/scheduleevent/servicename/{name}", get(by_service_name::<S>))
}

/// `GET /api/v1/scheduleevent`
pub async fn list<S: DocumentStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<ScheduleEvent>>, ApiError> {
    Ok(Json(state.schedule_events.list().await?))
}

/// `GET /api/v1/scheduleevent/{id}`
pub async fn get_by_id<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<ScheduleEvent>, ApiError> {
    Ok(Json(state.schedule_events.get(&id).await?))
}

/// `GET /api/v1/scheduleevent/name/{name}`
pub async fn get_by_name<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(name): Path<String>,
) -> Result<Json<ScheduleEvent>, ApiError> {
    Ok(Json(state.schedule_events.get_by_name(&name).await?))
}

/// `GET /api/v1/scheduleevent/addressable/{id}`
pub async fn by_addressable<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ScheduleEvent>>, ApiError> {
    Ok(Json(state.schedule_events.find_by_addressable(&id).await?))
}

/// `GET /api/v1/scheduleevent/servicename/{name}`
pub async fn by_service_name<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(name): Path<String>,
) -> Result<Json<Vec<ScheduleEvent>>, ApiError> {
    Ok(Json(state.schedule_events.find_by_service_name(&name).await?))
}

/// `POST /api/v1/scheduleevent`: responds with the new id.
pub async fn create<S: DocumentStore>(
    State(state): State<AppState<S>>,
    JsonBody(record): JsonBody<ScheduleEventRecord>,
) -> Result<String, ApiError> {
    Ok(state.schedule_events.create(record).await?.to_string())
}

/// `PUT /api/v1/scheduleevent`
pub async fn update<S: DocumentStore>(
    State(state): State<AppState<S>>,
    JsonBody(patch): JsonBody<ScheduleEventPatch>,
) -> Result<Json<bool>, ApiError> {
    state.schedule_events.update(patch).await?;
    Ok(Json(true))
}

/// `DELETE /api/v1/scheduleevent/{id}`
pub async fn delete_by_id<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<bool>, ApiError> {
    state.schedule_events.delete_by_id(&id).await?;
    Ok(Json(true))
}

/// `DELETE /api/v1/scheduleevent/name/{name}`
pub async fn delete_by_name<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(name): Path<String>,
) -> Result<Json<bool>, ApiError> {
    state.schedule_events.delete_by_name(&name).await?;
    Ok(Json(true))
}
