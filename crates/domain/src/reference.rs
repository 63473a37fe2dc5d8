//! Identifier-or-name references between catalog entities.

use serde::{Deserialize, Serialize};

/// A pointer to another persisted entity.
///
/// On the wire a reference is an object carrying `id` and/or `name`. When
/// both are present the id wins; empty strings count as absent and a missing
/// or `null` object is [`Reference::Unset`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<Wire>", into = "Option<Wire>")]
pub enum Reference {
    ById(String),
    ByName(String),
    #[default]
    Unset,
}

impl Reference {
    /// Build a reference from optional id and name parts.
    #[must_use]
    pub fn from_parts(id: Option<String>, name: Option<String>) -> Self {
        match (non_empty(id), non_empty(name)) {
            (Some(id), _) => Self::ById(id),
            (None, Some(name)) => Self::ByName(name),
            (None, None) => Self::Unset,
        }
    }

    #[must_use]
    pub fn by_id(id: impl ToString) -> Self {
        Self::ById(id.to_string())
    }

    #[must_use]
    pub fn by_name(name: impl Into<String>) -> Self {
        Self::ByName(name.into())
    }

    #[must_use]
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    /// The raw key, for log fields and not-found messages.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::ById(key) | Self::ByName(key) => key,
            Self::Unset => "",
        }
    }
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ById(id) => write!(f, "id:{id}"),
            Self::ByName(name) => write!(f, "name:{name}"),
            Self::Unset => f.write_str("unset"),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

#[derive(Serialize, Deserialize)]
struct Wire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

impl From<Option<Wire>> for Reference {
    fn from(wire: Option<Wire>) -> Self {
        match wire {
            Some(Wire { id, name }) => Self::from_parts(id, name),
            None => Self::Unset,
        }
    }
}

impl From<Reference> for Option<Wire> {
    fn from(reference: Reference) -> Self {
        match reference {
            Reference::ById(id) => Some(Wire {
                id: Some(id),
                name: None,
            }),
            Reference::ByName(name) => Some(Wire {
                id: None,
                name: Some(name),
            }),
            Reference::Unset => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_prefer_id_when_both_parts_present() {
        let reference = Reference::from_parts(Some("abc".into()), Some("A1".into()));
        assert_eq!(reference, Reference::ById("abc".into()));
    }

    #[test]
    fn should_treat_empty_strings_as_absent() {
        let reference = Reference::from_parts(Some(String::new()), Some("A1".into()));
        assert_eq!(reference, Reference::ByName("A1".into()));
        assert!(Reference::from_parts(Some(String::new()), None).is_unset());
    }

    #[test]
    fn should_decode_full_entity_object_as_reference() {
        let json = r#"{"id":"abc","name":"A1","address":"localhost","port":48081}"#;
        let reference: Reference = serde_json::from_str(json).unwrap();
        assert_eq!(reference, Reference::ById("abc".into()));
    }

    #[test]
    fn should_decode_null_as_unset() {
        let reference: Reference = serde_json::from_str("null").unwrap();
        assert!(reference.is_unset());
    }

    #[test]
    fn should_encode_only_the_winning_key() {
        let json = serde_json::to_string(&Reference::by_name("S1")).unwrap();
        assert_eq!(json, r#"{"name":"S1"}"#);
        let json = serde_json::to_string(&Reference::Unset).unwrap();
        assert_eq!(json, "null");
    }
}
