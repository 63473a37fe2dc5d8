//! Time and timestamp helpers.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// UTC timestamp used for `created`, `modified`, `last_connected`, etc.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Convert epoch milliseconds (as used by path parameters) into a [`Timestamp`].
#[must_use]
pub fn from_millis(millis: i64) -> Option<Timestamp> {
    DateTime::from_timestamp_millis(millis)
}

/// Creation and last-modification stamps carried by every catalog entity.
///
/// `created == modified` holds exactly once, right after [`Audit::stamp`];
/// every [`Audit::touch`] moves `modified` strictly forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Audit {
    #[serde(default)]
    pub created: Timestamp,
    #[serde(default)]
    pub modified: Timestamp,
}

impl Audit {
    /// Stamps for a brand-new entity.
    #[must_use]
    pub fn stamp() -> Self {
        let ts = now();
        Self {
            created: ts,
            modified: ts,
        }
    }

    /// Advance `modified` for a new persisted write.
    ///
    /// When the clock has not moved since the previous write the stamp is
    /// bumped by one millisecond so two writes never share a `modified`.
    pub fn touch(&mut self) {
        let ts = now();
        self.modified = if ts > self.modified {
            ts
        } else {
            self.modified + Duration::milliseconds(1)
        };
    }
}
