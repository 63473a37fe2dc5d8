//! Device profile: a template describing a class of device and its commands.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::error::{MetacatError, ValidationError};
use crate::id::DeviceProfileId;
use crate::patch::{Identity, merge};
use crate::time::Audit;

/// A readable/writable value exposed by devices of a profile.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeviceResource {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub properties: serde_json::Value,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

/// Capabilities shared by every device built from this profile.
///
/// Commands are owned inline: the profile document is the only place a
/// command is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceProfile {
    #[serde(default)]
    pub id: DeviceProfileId,
    pub name: String,
    #[serde(flatten)]
    pub audit: Audit,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub device_resources: Vec<DeviceResource>,
    #[serde(default)]
    pub commands: Vec<Command>,
}

impl DeviceProfile {
    /// Create a builder for constructing a [`DeviceProfile`].
    #[must_use]
    pub fn builder() -> DeviceProfileBuilder {
        DeviceProfileBuilder::default()
    }

    /// Check domain invariants that do not need the store.
    ///
    /// # Errors
    ///
    /// Returns [`MetacatError::Validation`] when the profile or one of its
    /// commands has an empty name.
    pub fn validate(&self) -> Result<(), MetacatError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        self.commands.iter().try_for_each(Command::validate)
    }

    #[must_use]
    pub fn command(&self, id: &str) -> Option<&Command> {
        self.commands.iter().find(|c| c.id.to_string() == id)
    }
}

/// Step-by-step builder for [`DeviceProfile`].
#[derive(Debug, Default)]
pub struct DeviceProfileBuilder {
    name: Option<String>,
    description: Option<String>,
    manufacturer: Option<String>,
    model: Option<String>,
    labels: Vec<String>,
    commands: Vec<Command>,
}

impl DeviceProfileBuilder {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = Some(manufacturer.into());
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    #[must_use]
    pub fn command(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    /// Consume the builder, validate, and return a [`DeviceProfile`].
    ///
    /// # Errors
    ///
    /// Returns [`MetacatError::Validation`] if `name` is missing or empty.
    pub fn build(self) -> Result<DeviceProfile, MetacatError> {
        let profile = DeviceProfile {
            id: DeviceProfileId::new(),
            name: self.name.unwrap_or_default(),
            audit: Audit::default(),
            description: self.description.unwrap_or_default(),
            manufacturer: self.manufacturer.unwrap_or_default(),
            model: self.model.unwrap_or_default(),
            labels: self.labels,
            device_resources: Vec::new(),
            commands: self.commands,
        };
        profile.validate()?;
        Ok(profile)
    }
}

/// Partial update for a [`DeviceProfile`].
///
/// A present `commands` list replaces the whole command set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceProfilePatch {
    #[serde(flatten)]
    pub identity: Identity,
    pub description: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub labels: Option<Vec<String>>,
    pub device_resources: Option<Vec<DeviceResource>>,
    pub commands: Option<Vec<Command>>,
}

impl DeviceProfilePatch {
    /// Check what the patch carries on its own, before any lookup.
    ///
    /// # Errors
    ///
    /// Returns [`MetacatError::Validation`] for an unnamed command or two
    /// commands submitted with the same id.
    pub fn validate(&self) -> Result<(), MetacatError> {
        let Some(commands) = &self.commands else {
            return Ok(());
        };
        let mut seen = BTreeSet::new();
        for command in commands {
            command.validate()?;
            if !seen.insert(command.id) {
                return Err(ValidationError::DuplicateCommandId(command.id.to_string()).into());
            }
        }
        Ok(())
    }

    /// Merge every present field into `target`, excluding the name.
    pub fn apply(self, target: &mut DeviceProfile) {
        merge(&mut target.description, self.description);
        merge(&mut target.manufacturer, self.manufacturer);
        merge(&mut target.model, self.model);
        merge(&mut target.labels, self.labels);
        merge(&mut target.device_resources, self.device_resources);
        merge(&mut target.commands, self.commands);
    }
}
