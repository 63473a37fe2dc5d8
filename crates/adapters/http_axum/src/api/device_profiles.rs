//! `/api/v1/deviceprofile` handlers, including YAML document upload and
//! download.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};

use metacat_app::ports::DocumentStore;
use metacat_domain::command::Command;
use metacat_domain::device_profile::{DeviceProfile, DeviceProfilePatch};
use metacat_domain::error::InputError;

use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::state::AppState;

const YAML: &str = "application/x-yaml";

pub fn routes<S: DocumentStore>() -> Router<AppState<S>> {
    Router::new()
        .route(
            "/deviceprofile",
            get(list::<S>).post(create::<S>).put(update::<S>),
        )
        .route(
            "/deviceprofile/{id}",
            get(get_by_id::<S>).delete(delete_by_id::<S>),
        )
        .route("/deviceprofile/id/{id}", delete(delete_by_id::<S>))
        .route(
            "/deviceprofile/name/{name}",
            get(get_by_name::<S>).delete(delete_by_name::<S>),
        )
        .route(
            "/deviceprofile/manufacturer/{manufacturer}",
            get(by_manufacturer::<S>),
        )
        .route("/deviceprofile/model/{model}", get(by_model::<S>))
        .route("/deviceprofile/label/{label}", get(by_label::<S>))
        .route("/deviceprofile/{id}/command", post(add_command::<S>))
        .route(
            "/deviceprofile/{id}/command/{command_id}",
            delete(remove_command::<S>),
        )
        .route("/deviceprofile/upload", post(upload::<S>))
        .route("/deviceprofile/uploadfile", post(upload_file::<S>))
        .route("/deviceprofile/yaml/{id}", get(yaml_by_id::<S>))
        .route("/deviceprofile/yaml/name/{name}", get(yaml_by_name::<S>))
}

/// `GET /api/v1/deviceprofile`
pub async fn list<S: DocumentStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<DeviceProfile>>, ApiError> {
    Ok(Json(state.device_profiles.list().await?))
}

/// `GET /api/v1/deviceprofile/{id}`
pub async fn get_by_id<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<DeviceProfile>, ApiError> {
    Ok(Json(state.device_profiles.get(&id).await?))
}

/// `GET /api/v1/deviceprofile/name/{name}`
pub async fn get_by_name<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(name): Path<String>,
) -> Result<Json<DeviceProfile>, ApiError> {
    Ok(Json(state.device_profiles.get_by_name(&name).await?))
}

/// `GET /api/v1/deviceprofile/manufacturer/{manufacturer}`
pub async fn by_manufacturer<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(manufacturer): Path<String>,
) -> Result<Json<Vec<DeviceProfile>>, ApiError> {
    Ok(Json(
        state.device_profiles.find_by_manufacturer(&manufacturer).await?,
    ))
}

/// `GET /api/v1/deviceprofile/model/{model}`
pub async fn by_model<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(model): Path<String>,
) -> Result<Json<Vec<DeviceProfile>>, ApiError> {
    Ok(Json(state.device_profiles.find_by_model(&model).await?))
}

/// `GET /api/v1/deviceprofile/label/{label}`
pub async fn by_label<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(label): Path<String>,
) -> Result<Json<Vec<DeviceProfile>>, ApiError> {
    Ok(Json(state.device_profiles.find_by_label(&label).await?))
}

/// `POST /api/v1/deviceprofile`: responds with the new id.
pub async fn create<S: DocumentStore>(
    State(state): State<AppState<S>>,
    JsonBody(profile): JsonBody<DeviceProfile>,
) -> Result<String, ApiError> {
    Ok(state.device_profiles.create(profile).await?.to_string())
}

/// `PUT /api/v1/deviceprofile`
pub async fn update<S: DocumentStore>(
    State(state): State<AppState<S>>,
    JsonBody(patch): JsonBody<DeviceProfilePatch>,
) -> Result<Json<bool>, ApiError> {
    state.device_profiles.update(patch).await?;
    Ok(Json(true))
}

/// `POST /api/v1/deviceprofile/{id}/command`: responds with the command id.
pub async fn add_command<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    JsonBody(command): JsonBody<Command>,
) -> Result<String, ApiError> {
    Ok(state.device_profiles.add_command(&id, command).await?.to_string())
}

/// `DELETE /api/v1/deviceprofile/{id}/command/{command_id}`
pub async fn remove_command<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path((id, command_id)): Path<(String, String)>,
) -> Result<Json<bool>, ApiError> {
    state.device_profiles.remove_command(&id, &command_id).await?;
    Ok(Json(true))
}

/// `POST /api/v1/deviceprofile/upload`: raw YAML body; responds with the
/// new id.
pub async fn upload<S: DocumentStore>(
    State(state): State<AppState<S>>,
    document: String,
) -> Result<String, ApiError> {
    Ok(state.profile_documents.import(&document).await?.to_string())
}

/// `POST /api/v1/deviceprofile/uploadfile`: multipart form with a `file`
/// field holding the YAML document.
pub async fn upload_file<S: DocumentStore>(
    State(state): State<AppState<S>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<String, ApiError> {
    let mut multipart =
        multipart.map_err(|rejection| InputError::Unparseable(rejection.body_text()))?;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| InputError::Unparseable(err.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let document = field
            .text()
            .await
            .map_err(|err| InputError::Unparseable(err.body_text()))?;
        return Ok(state.profile_documents.import(&document).await?.to_string());
    }
    Err(InputError::EmptyDocument.into())
}

/// `GET /api/v1/deviceprofile/yaml/{id}`
pub async fn yaml_by_id<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let document = state.profile_documents.export_by_id(&id).await?;
    Ok(([(header::CONTENT_TYPE, YAML)], document))
}

/// `GET /api/v1/deviceprofile/yaml/name/{name}`
pub async fn yaml_by_name<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let document = state.profile_documents.export_by_name(&name).await?;
    Ok(([(header::CONTENT_TYPE, YAML)], document))
}

/// `DELETE /api/v1/deviceprofile/{id}`
pub async fn delete_by_id<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<bool>, ApiError> {
    state.device_profiles.delete_by_id(&id).await?;
    Ok(Json(true))
}

/// `DELETE /api/v1/deviceprofile/name/{name}`
pub async fn delete_by_name<S: DocumentStore>(
    State(state): State<AppState<S>>,
    Path(name): Path<String>,
) -> Result<Json<bool>, ApiError> {
    state.device_profiles.delete_by_name(&name).await?;
    Ok(Json(true))
}
