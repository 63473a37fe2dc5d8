//! Change notices sent to the device service that owns a changed entity.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::addressable::Addressable;

/// What happened to the subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeAction {
    Create,
    Update,
    Delete,
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        })
    }
}

/// Kind of entity a notice is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubjectType {
    Device,
    Manager,
    #[serde(rename = "PROVISIONWATCHER")]
    ProvisionWatcher,
}

impl fmt::Display for SubjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Device => "DEVICE",
            Self::Manager => "MANAGER",
            Self::ProvisionWatcher => "PROVISIONWATCHER",
        })
    }
}

/// One outbound notification: deliver `action` on `subject_id` to `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeNotice {
    pub target: Addressable,
    pub subject_id: String,
    pub action: ChangeAction,
    pub subject: SubjectType,
}

/// JSON body of a callback request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackBody {
    #[serde(rename = "type")]
    pub subject: SubjectType,
    pub id: String,
}

impl ChangeNotice {
    #[must_use]
    pub fn body(&self) -> CallbackBody {
        CallbackBody {
            subject: self.subject,
            id: self.subject_id.clone(),
        }
    }
}
