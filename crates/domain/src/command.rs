//! Command: a named request/response shape owned by one device profile.

use serde::{Deserialize, Serialize};

use crate::error::{MetacatError, ValidationError};
use crate::id::CommandId;
use crate::patch::{Identity, merge_opt};
use crate::time::Audit;

/// One possible answer to a command invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommandResponse {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub expected_values: Vec<String>,
}

/// The request half of a command (`get` reads, `put` writes).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommandAction {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub parameter_names: Vec<String>,
    #[serde(default)]
    pub responses: Vec<CommandResponse>,
}

/// A named operation defined by a [`DeviceProfile`](crate::device_profile::DeviceProfile).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    #[serde(default)]
    pub id: CommandId,
    pub name: String,
    #[serde(flatten)]
    pub audit: Audit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<CommandAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<CommandAction>,
}

impl Command {
    /// A command with only a name; actions are attached by the caller.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: CommandId::new(),
            name: name.into(),
            audit: Audit::default(),
            get: None,
            put: None,
        }
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`MetacatError::Validation`] when `name` is empty.
    pub fn validate(&self) -> Result<(), MetacatError> {
        if self.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(())
    }

    /// Every value descriptor name the `get` responses may carry.
    #[must_use]
    pub fn expected_values(&self) -> Vec<&str> {
        self.get
            .iter()
            .flat_map(|action| action.responses.iter())
            .flat_map(|response| response.expected_values.iter())
            .map(String::as_str)
            .collect()
    }
}

/// Partial update for a [`Command`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommandPatch {
    #[serde(flatten)]
    pub identity: Identity,
    pub get: Option<CommandAction>,
    pub put: Option<CommandAction>,
}

impl CommandPatch {
    /// Merge every present field into `target`, excluding the name.
    pub fn apply(self, target: &mut Command) {
        merge_opt(&mut target.get, self.get);
        merge_opt(&mut target.put, self.put);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_collect_expected_values_from_get_responses() {
        let mut command = Command::named("temperature");
        command.get = Some(CommandAction {
            path: "/api/v1/device/{deviceId}/temperature".to_string(),
            parameter_names: vec![],
            responses: vec![
                CommandResponse {
                    code: "200".to_string(),
                    description: String::new(),
                    expected_values: vec!["temperature".to_string(), "unit".to_string()],
                },
                CommandResponse {
                    code: "503".to_string(),
                    description: "service unavailable".to_string(),
                    expected_values: vec![],
                },
            ],
        });
        assert_eq!(command.expected_values(), vec!["temperature", "unit"]);
    }

    #[test]
    fn should_reject_unnamed_command() {
        assert!(Command::named("").validate().is_err());
    }

    #[test]
    fn should_keep_actions_not_mentioned_in_patch() {
        let mut command = Command::named("switch");
        command.get = Some(CommandAction::default());
        let patch = CommandPatch {
            put: Some(CommandAction {
                parameter_names: vec!["on".to_string()],
                ..CommandAction::default()
            }),
            ..CommandPatch::default()
        };
        patch.apply(&mut command);
        assert!(command.get.is_some());
        assert_eq!(command.put.unwrap().parameter_names, vec!["on"]);
    }
}
