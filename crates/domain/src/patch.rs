//! Partial-update plumbing shared by every `*Patch` type.
//!
//! A patch only overwrites what it carries: absent (`None`) fields leave the
//! stored value untouched.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::reference::Reference;

/// How a patch names the entity it applies to.
///
/// With an `id` the entity is looked up by id and a differing `name` is a
/// rename. With only a `name` the entity is looked up by name and keeps it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Identity {
    #[must_use]
    pub fn by_id(id: impl ToString) -> Self {
        Self {
            id: Some(id.to_string()),
            name: None,
        }
    }

    #[must_use]
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
        }
    }

    /// Attach a new name, turning an id-targeted patch into a rename.
    #[must_use]
    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Reference used to locate the target.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingIdentity`] when neither part is set.
    pub fn target(&self) -> Result<Reference, ValidationError> {
        match Reference::from_parts(self.id.clone(), self.name.clone()) {
            Reference::Unset => Err(ValidationError::MissingIdentity),
            reference => Ok(reference),
        }
    }

    /// The new name when this patch renames an entity currently called `current`.
    #[must_use]
    pub fn rename_from(&self, current: &str) -> Option<&str> {
        match (&self.id, &self.name) {
            (Some(id), Some(name)) if !id.is_empty() && !name.is_empty() && name != current => {
                Some(name.as_str())
            }
            _ => None,
        }
    }
}

/// Overwrite `slot` when the patch carries a value.
pub fn merge<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

/// Overwrite an optional `slot` when the patch carries a value.
pub fn merge_opt<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

/// Overwrite a reference slot when the patch carries a set reference.
pub fn merge_ref(slot: &mut Reference, value: &Reference) {
    if !value.is_unset() {
        *slot = value.clone();
    }
}
