//! Operating and administrative states of services, devices and watchers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// Whether the thing is currently able to operate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperatingState {
    #[default]
    Enabled,
    Disabled,
}

/// Whether an administrator allows the thing to operate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdminState {
    Locked,
    Unlocked,
}

impl fmt::Display for OperatingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enabled => f.write_str("ENABLED"),
            Self::Disabled => f.write_str("DISABLED"),
        }
    }
}

impl fmt::Display for AdminState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Locked => f.write_str("LOCKED"),
            Self::Unlocked => f.write_str("UNLOCKED"),
        }
    }
}

impl FromStr for OperatingState {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ENABLED" => Ok(Self::Enabled),
            "DISABLED" => Ok(Self::Disabled),
            _ => Err(InputError::InvalidParameter {
                name: "operating state",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for AdminState {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LOCKED" => Ok(Self::Locked),
            "UNLOCKED" => Ok(Self::Unlocked),
            _ => Err(InputError::InvalidParameter {
                name: "admin state",
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_state_case_insensitively() {
        assert_eq!("enabled".parse::<OperatingState>().unwrap(), OperatingState::Enabled);
        assert_eq!("LOCKED".parse::<AdminState>().unwrap(), AdminState::Locked);
    }

    #[test]
    fn should_reject_unknown_state() {
        assert!("sleeping".parse::<OperatingState>().is_err());
    }

    #[test]
    fn should_serialize_in_upper_case() {
        let json = serde_json::to_string(&AdminState::Unlocked).unwrap();
        assert_eq!(json, "\"UNLOCKED\"");
    }
}
