//! Device profile documents: YAML in, YAML out.
//!
//! A document uses the camelCase field names device vendors publish
//! profiles with. Imported documents take the same path as a profile
//! submitted through the API.

use std::collections::BTreeMap;

use metacat_domain::command::{Command, CommandAction, CommandResponse};
use metacat_domain::device_profile::{DeviceProfile, DeviceResource};
use metacat_domain::error::{InputError, MetacatError};
use metacat_domain::id::{CommandId, DeviceProfileId};
use metacat_domain::time::Audit;
use serde::{Deserialize, Serialize};

use crate::catalog::DeviceProfileCatalog;
use crate::ports::DocumentStore;

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileDocument {
    #[serde(default)]
    name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    manufacturer: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    model: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    device_resources: Vec<ResourceDocument>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    commands: Vec<CommandDocument>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceDocument {
    name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    description: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    properties: serde_json::Value,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    attributes: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommandDocument {
    #[serde(default)]
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    get: Option<ActionDocument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    put: Option<ActionDocument>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActionDocument {
    #[serde(default)]
    path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    parameter_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    responses: Vec<ResponseDocument>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseDocument {
    #[serde(default)]
    code: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    expected_values: Vec<String>,
}

impl From<ProfileDocument> for DeviceProfile {
    fn from(doc: ProfileDocument) -> Self {
        DeviceProfile {
            id: DeviceProfileId::new(),
            name: doc.name,
            audit: Audit::default(),
            description: doc.description,
            manufacturer: doc.manufacturer,
            model: doc.model,
            labels: doc.labels,
            device_resources: doc
                .device_resources
                .into_iter()
                .map(|r| DeviceResource {
                    name: r.name,
                    description: r.description,
                    properties: r.properties,
                    attributes: r.attributes,
                })
                .collect(),
            commands: doc.commands.into_iter().map(Command::from).collect(),
        }
    }
}

impl From<CommandDocument> for Command {
    fn from(doc: CommandDocument) -> Self {
        Command {
            id: CommandId::new(),
            name: doc.name,
            audit: Audit::default(),
            get: doc.get.map(CommandAction::from),
            put: doc.put.map(CommandAction::from),
        }
    }
}

impl From<ActionDocument> for CommandAction {
    fn from(doc: ActionDocument) -> Self {
        CommandAction {
            path: doc.path,
            parameter_names: doc.parameter_names,
            responses: doc
                .responses
                .into_iter()
                .map(|r| CommandResponse {
                    code: r.code,
                    description: r.description,
                    expected_values: r.expected_values,
                })
                .collect(),
        }
    }
}

impl From<&DeviceProfile> for ProfileDocument {
    fn from(profile: &DeviceProfile) -> Self {
        ProfileDocument {
            name: profile.name.clone(),
            description: profile.description.clone(),
            manufacturer: profile.manufacturer.clone(),
            model: profile.model.clone(),
            labels: profile.labels.clone(),
            device_resources: profile
                .device_resources
                .iter()
                .map(|r| ResourceDocument {
                    name: r.name.clone(),
                    description: r.description.clone(),
                    properties: r.properties.clone(),
                    attributes: r.attributes.clone(),
                })
                .collect(),
            commands: profile
                .commands
                .iter()
                .map(|c| CommandDocument {
                    name: c.name.clone(),
                    get: c.get.as_ref().map(ActionDocument::from),
                    put: c.put.as_ref().map(ActionDocument::from),
                })
                .collect(),
        }
    }
}

impl From<&CommandAction> for ActionDocument {
    fn from(action: &CommandAction) -> Self {
        ActionDocument {
            path: action.path.clone(),
            parameter_names: action.parameter_names.clone(),
            responses: action
                .responses
                .iter()
                .map(|r| ResponseDocument {
                    code: r.code.clone(),
                    description: r.description.clone(),
                    expected_values: r.expected_values.clone(),
                })
                .collect(),
        }
    }
}

/// Parse a profile document without touching the store.
///
/// # Errors
///
/// Returns [`InputError::EmptyDocument`] for a blank document and
/// [`InputError::Unparseable`] when it is not a profile mapping.
pub fn parse(document: &str) -> Result<DeviceProfile, InputError> {
    if document.trim().is_empty() {
        return Err(InputError::EmptyDocument);
    }
    let doc: ProfileDocument =
        serde_yaml_ng::from_str(document).map_err(|err| InputError::Unparseable(err.to_string()))?;
    Ok(doc.into())
}

/// Render a profile as a document [`parse`] accepts.
///
/// # Errors
///
/// Returns [`MetacatError::Service`] if serialization fails.
pub fn render(profile: &DeviceProfile) -> Result<String, MetacatError> {
    serde_yaml_ng::to_string(&ProfileDocument::from(profile)).map_err(MetacatError::service)
}

/// Imports and exports device profiles as YAML documents.
pub struct ProfileDocumentImporter<S> {
    profiles: DeviceProfileCatalog<S>,
}

impl<S: DocumentStore> ProfileDocumentImporter<S> {
    pub fn new(profiles: DeviceProfileCatalog<S>) -> Self {
        Self { profiles }
    }

    /// Create a profile from a YAML document; returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`MetacatError::InvalidInput`] for an empty or unparseable
    /// document, then whatever the regular profile create returns.
    #[tracing::instrument(skip_all, fields(bytes = document.len()))]
    pub async fn import(&self, document: &str) -> Result<DeviceProfileId, MetacatError> {
        let profile = parse(document).inspect_err(|err| {
            tracing::debug!(error = %err, "profile document rejected");
        })?;
        self.profiles.create(profile).await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] when no profile has `id`.
    pub async fn export_by_id(&self, id: &str) -> Result<String, MetacatError> {
        render(&self.profiles.get(id).await?)
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] when no profile has `name`.
    pub async fn export_by_name(&self, name: &str) -> Result<String, MetacatError> {
        render(&self.profiles.get_by_name(name).await?)
    }
}
