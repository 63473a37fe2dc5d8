//! Name-collision translation.
//!
//! The store's unique name index is the only mutual exclusion for names. Its
//! duplicate-key condition is a permanent client error, never retried.

use metacat_domain::error::{MetacatError, ValidationError};

use crate::ports::StoreError;

/// Map a store failure into the domain taxonomy.
#[must_use]
pub fn translate(err: StoreError) -> MetacatError {
    match err {
        StoreError::DuplicateName { collection, name } => {
            tracing::debug!(%collection, %name, "name collision");
            ValidationError::NameNotUnique(name).into()
        }
        StoreError::Backend(source) => MetacatError::Service(source),
    }
}

impl From<StoreError> for MetacatError {
    fn from(err: StoreError) -> Self {
        translate(err)
    }
}
