//! Typed access to the [`DocumentStore`] port.
//!
//! [`Store`] encodes and decodes entity documents, enforces the listing
//! limit and routes every store failure through the name-collision
//! translation in [`crate::integrity::collision`].

use std::sync::Arc;

use metacat_domain::addressable::Addressable;
use metacat_domain::device::DeviceRecord;
use metacat_domain::device_manager::DeviceManagerRecord;
use metacat_domain::device_profile::DeviceProfile;
use metacat_domain::device_report::DeviceReport;
use metacat_domain::device_service::DeviceServiceRecord;
use metacat_domain::error::{LimitExceededError, MetacatError};
use metacat_domain::provision_watcher::ProvisionWatcherRecord;
use metacat_domain::schedule::Schedule;
use metacat_domain::schedule_event::ScheduleEventRecord;
use metacat_domain::time::Audit;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::ports::{Collection, DocumentStore, Filter, RawDocument};

/// An entity persisted as one document.
pub trait Document: Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: Collection;
    /// Human-readable entity name used in error messages.
    const ENTITY: &'static str;

    fn key(&self) -> String;
    fn name(&self) -> &str;
    fn audit_mut(&mut self) -> &mut Audit;
}

macro_rules! impl_document {
    ($ty:ty, $collection:ident, $entity:literal, |$d:ident| $inner:expr) => {
        impl Document for $ty {
            const COLLECTION: Collection = Collection::$collection;
            const ENTITY: &'static str = $entity;

            fn key(&self) -> String {
                let $d = self;
                $inner.id.to_string()
            }

            fn name(&self) -> &str {
                let $d = self;
                &$inner.name
            }

            fn audit_mut(&mut self) -> &mut Audit {
                let $d = self;
                &mut $inner.audit
            }
        }
    };
}

impl_document!(Addressable, Addressable, "addressable", |d| d);
impl_document!(DeviceServiceRecord, DeviceService, "device service", |d| d);
impl_document!(DeviceProfile, DeviceProfile, "device profile", |d| d);
impl_document!(DeviceRecord, Device, "device", |d| d);
impl_document!(DeviceManagerRecord, DeviceManager, "device manager", |d| d.device);
impl_document!(Schedule, Schedule, "schedule", |d| d);
impl_document!(ScheduleEventRecord, ScheduleEvent, "schedule event", |d| d);
impl_document!(DeviceReport, DeviceReport, "device report", |d| d);
impl_document!(ProvisionWatcherRecord, ProvisionWatcher, "provision watcher", |d| d);

/// Read limits applied to every listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Largest number of entities a single listing may return.
    pub max_results: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_results: 100_000,
        }
    }
}

/// Typed, limit-aware wrapper around a [`DocumentStore`].
pub struct Store<S> {
    inner: Arc<S>,
    limits: Limits,
}

impl<S> Clone for Store<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            limits: self.limits,
        }
    }
}

impl<S: DocumentStore> Store<S> {
    pub fn new(inner: Arc<S>, limits: Limits) -> Self {
        Self { inner, limits }
    }

    #[must_use]
    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::Service`] when the store fails or the stored
    /// document cannot be decoded.
    pub async fn get<D: Document>(&self, id: &str) -> Result<Option<D>, MetacatError> {
        tracing::debug!(collection = %D::COLLECTION, id, "get");
        let body = self.inner.get(D::COLLECTION, id).await?;
        body.map(decode).transpose()
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::Service`] when the store fails or the stored
    /// document cannot be decoded.
    pub async fn get_by_name<D: Document>(&self, name: &str) -> Result<Option<D>, MetacatError> {
        tracing::debug!(collection = %D::COLLECTION, name, "get by name");
        let body = self.inner.get_by_name(D::COLLECTION, name).await?;
        body.map(decode).transpose()
    }

    /// Every document of the collection.
    ///
    /// # Errors
    ///
    /// Returns [`MetacatError::LimitExceeded`] when the collection holds more
    /// than [`Limits::max_results`] documents.
    pub async fn list<D: Document>(&self) -> Result<Vec<D>, MetacatError> {
        let bodies = self
            .inner
            .list(D::COLLECTION, self.limits.max_results.saturating_add(1))
            .await?;
        self.decode_limited::<D>(bodies)
    }

    /// Every document matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`MetacatError::LimitExceeded`] when more than
    /// [`Limits::max_results`] documents match.
    pub async fn find<D: Document>(&self, filter: &Filter) -> Result<Vec<D>, MetacatError> {
        tracing::debug!(collection = %D::COLLECTION, ?filter, "find");
        let bodies = self
            .inner
            .find(
                D::COLLECTION,
                filter,
                self.limits.max_results.saturating_add(1),
            )
            .await?;
        self.decode_limited::<D>(bodies)
    }

    /// The first document matching `filter`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`MetacatError::Service`] on store failure.
    pub async fn find_one<D: Document>(&self, filter: &Filter) -> Result<Option<D>, MetacatError> {
        let mut bodies = self.inner.find(D::COLLECTION, filter, 1).await?;
        bodies.pop().map(decode).transpose()
    }

    /// Existence query; short-circuits in the store.
    ///
    /// # Errors
    ///
    /// Returns [`MetacatError::Service`] on store failure.
    pub async fn exists(&self, collection: Collection, filter: &Filter) -> Result<bool, MetacatError> {
        Ok(self.inner.exists(collection, filter).await?)
    }

    /// # Errors
    ///
    /// Returns [`ValidationError::NameNotUnique`](metacat_domain::error::ValidationError::NameNotUnique)
    /// when the name is taken, or [`MetacatError::Service`] on store failure.
    pub async fn insert<D: Document>(&self, document: &D) -> Result<(), MetacatError> {
        let raw = encode(document)?;
        self.inner.insert(D::COLLECTION, raw).await?;
        Ok(())
    }

    /// Overwrite an existing document.
    ///
    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] when the document vanished, a
    /// name-collision validation error, or [`MetacatError::Service`].
    pub async fn replace<D: Document>(&self, document: &D) -> Result<(), MetacatError> {
        let raw = encode(document)?;
        let id = raw.id.clone();
        if self.inner.replace(D::COLLECTION, raw).await? {
            Ok(())
        } else {
            Err(metacat_domain::error::NotFoundError::new(D::ENTITY, id).into())
        }
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::Service`] on store failure.
    pub async fn delete<D: Document>(&self, id: &str) -> Result<bool, MetacatError> {
        Ok(self.inner.delete(D::COLLECTION, id).await?)
    }

    fn decode_limited<D: Document>(
        &self,
        bodies: Vec<serde_json::Value>,
    ) -> Result<Vec<D>, MetacatError> {
        if bodies.len() > self.limits.max_results {
            return Err(LimitExceededError {
                collection: D::COLLECTION.as_str(),
                limit: self.limits.max_results,
            }
            .into());
        }
        bodies.into_iter().map(decode).collect()
    }
}

fn encode<D: Document>(document: &D) -> Result<RawDocument, MetacatError> {
    Ok(RawDocument {
        id: document.key(),
        name: document.name().to_owned(),
        body: serde_json::to_value(document).map_err(MetacatError::service)?,
    })
}

fn decode<D: Document>(body: serde_json::Value) -> Result<D, MetacatError> {
    serde_json::from_value(body).map_err(MetacatError::service)
}
