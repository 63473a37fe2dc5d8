//! Document store port: schema-less persistence for catalog entities.
//!
//! Every entity is one JSON document in a [`Collection`], keyed by its id and
//! unique by name within the collection. The store offers no foreign keys,
//! no cascades and no multi-document transactions: single-document writes
//! are atomic, nothing more.

use std::fmt;
use std::future::Future;

use serde_json::Value;

/// One document collection per entity family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Addressable,
    DeviceService,
    DeviceProfile,
    Device,
    DeviceManager,
    Schedule,
    ScheduleEvent,
    DeviceReport,
    ProvisionWatcher,
}

impl Collection {
    /// Stable storage name of the collection.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Addressable => "addressable",
            Self::DeviceService => "deviceService",
            Self::DeviceProfile => "deviceProfile",
            Self::Device => "device",
            Self::DeviceManager => "deviceManager",
            Self::Schedule => "schedule",
            Self::ScheduleEvent => "scheduleEvent",
            Self::DeviceReport => "deviceReport",
            Self::ProvisionWatcher => "provisionWatcher",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A path to a field inside a document body, one segment per object key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Extend the path with one more key.
    #[must_use]
    pub fn child(mut self, key: impl Into<String>) -> Self {
        self.0.push(key.into());
        self
    }

    /// Follow the path through `value`.
    #[must_use]
    pub fn lookup<'v>(&self, value: &'v Value) -> Option<&'v Value> {
        self.0
            .iter()
            .try_fold(value, |current, key| current.get(key.as_str()))
    }
}

impl From<&str> for FieldPath {
    /// Dotted form: `"addressable.id"`.
    fn from(path: &str) -> Self {
        Self(path.split('.').map(str::to_owned).collect())
    }
}

/// Predicate over document bodies.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// The field at `path` equals `value`.
    Eq { path: FieldPath, value: Value },
    /// The array at `array` holds an element equal to `value`, or, with
    /// `field`, an element whose `field` equals `value`.
    Contains {
        array: FieldPath,
        field: Option<FieldPath>,
        value: Value,
    },
}

impl Filter {
    #[must_use]
    pub fn equals(path: impl Into<FieldPath>, value: impl Into<Value>) -> Self {
        Self::Eq {
            path: path.into(),
            value: value.into(),
        }
    }

    /// Array of plain values containing `value`.
    #[must_use]
    pub fn contains(array: impl Into<FieldPath>, value: impl Into<Value>) -> Self {
        Self::Contains {
            array: array.into(),
            field: None,
            value: value.into(),
        }
    }

    /// Array of objects, one of which has `field == value`.
    #[must_use]
    pub fn contains_where(
        array: impl Into<FieldPath>,
        field: impl Into<FieldPath>,
        value: impl Into<Value>,
    ) -> Self {
        Self::Contains {
            array: array.into(),
            field: Some(field.into()),
            value: value.into(),
        }
    }

    /// Evaluate the predicate against a document body.
    #[must_use]
    pub fn matches(&self, body: &Value) -> bool {
        match self {
            Self::Eq { path, value } => path.lookup(body) == Some(value),
            Self::Contains {
                array,
                field,
                value,
            } => array
                .lookup(body)
                .and_then(Value::as_array)
                .is_some_and(|items| {
                    items.iter().any(|item| match field {
                        Some(field) => field.lookup(item) == Some(value),
                        None => item == value,
                    })
                }),
        }
    }
}

/// A document ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDocument {
    pub id: String,
    pub name: String,
    pub body: Value,
}

/// Failures reported by a [`DocumentStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The unique name index rejected the write.
    #[error("duplicate name {name} in {collection}")]
    DuplicateName {
        collection: Collection,
        name: String,
    },

    /// Anything else the backend reports.
    #[error("document store failure")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Persistence port for catalog documents.
///
/// Listing operations return bodies ordered by name and never more than
/// `limit` of them.
pub trait DocumentStore: Send + Sync + 'static {
    /// Fetch a document body by id.
    fn get(
        &self,
        collection: Collection,
        id: &str,
    ) -> impl Future<Output = Result<Option<Value>, StoreError>> + Send;

    /// Fetch a document body through the unique name index.
    fn get_by_name(
        &self,
        collection: Collection,
        name: &str,
    ) -> impl Future<Output = Result<Option<Value>, StoreError>> + Send;

    /// Up to `limit` document bodies of the collection.
    fn list(
        &self,
        collection: Collection,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Value>, StoreError>> + Send;

    /// Up to `limit` document bodies matching `filter`.
    fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Value>, StoreError>> + Send;

    /// Whether at least one document matches `filter`.
    fn exists(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Insert a new document.
    ///
    /// Reports [`StoreError::DuplicateName`] when the name is taken.
    fn insert(
        &self,
        collection: Collection,
        document: RawDocument,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Replace the document with the same id. Returns `false` when none exists.
    ///
    /// Reports [`StoreError::DuplicateName`] when the new name is taken.
    fn replace(
        &self,
        collection: Collection,
        document: RawDocument,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Delete by id. Returns `false` when nothing was deleted.
    fn delete(
        &self,
        collection: Collection,
        id: &str,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;
}
