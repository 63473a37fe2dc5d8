//! Error taxonomy shared by every layer.
//!
//! Each failed operation surfaces exactly one [`MetacatError`] variant.
//! Adapters keep their own typed errors and convert into
//! [`MetacatError::Service`] at their boundary.

/// Top-level error returned by catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum MetacatError {
    /// A client-correctable rule was violated.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A direct lookup by id or name found nothing.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// A listing would exceed the configured maximum.
    #[error("limit exceeded")]
    LimitExceeded(#[from] LimitExceededError),

    /// The submitted input could not be interpreted at all.
    #[error("invalid input")]
    InvalidInput(#[from] InputError),

    /// Anything else: infrastructure failure, store outage, corrupt document.
    #[error("service failure")]
    Service(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl MetacatError {
    /// Wrap an arbitrary infrastructure error.
    pub fn service(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Service(Box::new(err))
    }
}

/// Violations of catalog rules. Always reported to the caller with the rule
/// that failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("name is not unique: {0}")]
    NameNotUnique(String),

    #[error("must be associated to a known {0}")]
    MissingAssociation(&'static str),

    #[error("{entity} {name} is still referenced by at least one {dependent}")]
    StillReferenced {
        entity: &'static str,
        name: String,
        dependent: &'static str,
    },

    #[error("duplicate command name in profile: {0}")]
    DuplicateCommandName(String),

    #[error("duplicate command id in profile: {0}")]
    DuplicateCommandId(String),

    #[error("{0} must not be null")]
    NullField(&'static str),

    #[error("an update must identify its target by id or name")]
    MissingIdentity,

    #[error("invalid frequency: {0}")]
    InvalidFrequency(String),

    #[error("invalid cron expression: {0}")]
    InvalidCron(String),

    #[error("invalid schedule time: {0}")]
    InvalidScheduleTime(String),

    #[error("device manager {0} cannot aggregate itself")]
    AggregationCycle(String),
}

/// Returned when a lookup by id or name misses.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} not found: {key}")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub key: String,
}

impl NotFoundError {
    #[must_use]
    pub fn new(entity: &'static str, key: impl Into<String>) -> Self {
        Self {
            entity,
            key: key.into(),
        }
    }
}

/// Returned when a collection listing is larger than allowed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("more than {limit} {collection} documents match")]
pub struct LimitExceededError {
    pub collection: &'static str,
    pub limit: usize,
}

/// Client input that cannot be interpreted (as opposed to well-formed but
/// inconsistent content, which is a [`ValidationError`]).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("document is empty")]
    EmptyDocument,

    #[error("document could not be parsed: {0}")]
    Unparseable(String),

    #[error("invalid parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: String },
}
