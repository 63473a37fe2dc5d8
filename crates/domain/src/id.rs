//! Typed durable identifiers backed by UUIDs.
//!
//! Identifiers are assigned when an entity is first persisted and never
//! change afterwards. On the wire and in the store they are plain strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl Default for $name {
            fn default() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }

        impl $name {
            /// Generate a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self::default()
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Access the inner UUID.
            #[must_use]
            pub fn as_uuid(self) -> uuid::Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                uuid::Uuid::parse_str(s).map(Self)
            }
        }
    };
}

define_id!(
    /// Identifier of an [`Addressable`](crate::addressable::Addressable).
    AddressableId
);

define_id!(
    /// Identifier of a [`DeviceService`](crate::device_service::DeviceService).
    DeviceServiceId
);

define_id!(
    /// Identifier of a [`DeviceProfile`](crate::device_profile::DeviceProfile).
    DeviceProfileId
);

define_id!(
    /// Identifier of a [`Command`](crate::command::Command).
    CommandId
);

define_id!(
    /// Identifier of a [`Device`](crate::device::Device).
    DeviceId
);

define_id!(
    /// Identifier of a [`DeviceManager`](crate::device_manager::DeviceManager).
    DeviceManagerId
);

define_id!(
    /// Identifier of a [`Schedule`](crate::schedule::Schedule).
    ScheduleId
);

define_id!(
    /// Identifier of a [`ScheduleEvent`](crate::schedule_event::ScheduleEvent).
    ScheduleEventId
);

define_id!(
    /// Identifier of a [`DeviceReport`](crate::device_report::DeviceReport).
    DeviceReportId
);

define_id!(
    /// Identifier of a [`ProvisionWatcher`](crate::provision_watcher::ProvisionWatcher).
    ProvisionWatcherId
);
