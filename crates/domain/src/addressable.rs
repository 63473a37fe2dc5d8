//! Addressable: a network endpoint used to reach a service or device.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MetacatError, ValidationError};
use crate::id::AddressableId;
use crate::patch::{Identity, merge};
use crate::time::Audit;

/// Transport family of an [`Addressable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Protocol {
    #[default]
    Http,
    Https,
    Tcp,
    Mac,
    Zmq,
    Mqtt,
    Other,
}

impl Protocol {
    /// URL scheme used when rendering the endpoint.
    #[must_use]
    pub fn scheme(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
            Self::Tcp => "tcp",
            Self::Mac => "mac",
            Self::Zmq => "zmq",
            Self::Mqtt => "mqtt",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scheme())
    }
}

/// A network endpoint (protocol, host, port, path, publisher/topic).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Addressable {
    #[serde(default)]
    pub id: AddressableId,
    pub name: String,
    #[serde(flatten)]
    pub audit: Audit,
    #[serde(default)]
    pub protocol: Protocol,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub publisher: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub topic: String,
}

impl Addressable {
    /// Create a builder for constructing an [`Addressable`].
    #[must_use]
    pub fn builder() -> AddressableBuilder {
        AddressableBuilder::default()
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

    /// `scheme://address:port`
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.protocol.scheme(), self.address, self.port)
    }

    /// `scheme://address:port/path`
    #[must_use]
    pub fn url(&self) -> String {
        if self.path.is_empty() || self.path.starts_with('/') {
            format!("{}{}", self.base_url(), self.path)
        } else {
            format!("{}/{}", self.base_url(), self.path)
        }
    }
}

/// Step-by-step builder for [`Addressable`].
#[derive(Debug, Default)]
pub struct AddressableBuilder {
    name: Option<String>,
    protocol: Protocol,
    method: Option<String>,
    address: Option<String>,
    port: u16,
    path: Option<String>,
    publisher: Option<String>,
    topic: Option<String>,
}

impl AddressableBuilder {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    #[must_use]
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    #[must_use]
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = Some(publisher.into());
        self
    }

    #[must_use]
    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Consume the builder, validate, and return an [`Addressable`].
    ///
    /// # Errors
    ///
    /// Returns [`MetacatError::Validation`] if `name` is missing or empty.
    pub fn build(self) -> Result<Addressable, MetacatError> {
        let addressable = Addressable {
            id: AddressableId::new(),
            name: self.name.unwrap_or_default(),
            audit: Audit::default(),
            protocol: self.protocol,
            method: self.method.unwrap_or_default(),
            address: self.address.unwrap_or_default(),
            port: self.port,
            path: self.path.unwrap_or_default(),
            publisher: self.publisher.unwrap_or_default(),
            user: String::new(),
            password: String::new(),
            topic: self.topic.unwrap_or_default(),
        };
        addressable.validate()?;
        Ok(addressable)
    }
}

/// Partial update for an [`Addressable`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressablePatch {
    #[serde(flatten)]
    pub identity: Identity,
    pub protocol: Option<Protocol>,
    pub method: Option<String>,
    pub address: Option<String>,
    pub port: Option<u16>,
    pub path: Option<String>,
    pub publisher: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub topic: Option<String>,
}

impl AddressablePatch {
    /// Merge every present field into `target`, excluding the name.
    pub fn apply(self, target: &mut Addressable) {
        merge(&mut target.protocol, self.protocol);
        merge(&mut target.method, self.method);
        merge(&mut target.address, self.address);
        merge(&mut target.port, self.port.filter(|port| *port != 0));
        merge(&mut target.path, self.path);
        merge(&mut target.publisher, self.publisher);
        merge(&mut target.user, self.user);
        merge(&mut target.password, self.password);
        merge(&mut target.topic, self.topic);
    }
}
