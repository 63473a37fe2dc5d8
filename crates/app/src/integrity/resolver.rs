//! Key resolution: turn an id-or-name [`Reference`] into a stored document.

use metacat_domain::error::{MetacatError, NotFoundError, ValidationError};
use metacat_domain::reference::Reference;

use crate::ports::DocumentStore;
use crate::store::{Document, Store};

/// Resolves references against the store. Never writes.
pub struct KeyResolver<S> {
    store: Store<S>,
}

impl<S> Clone for KeyResolver<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: DocumentStore> KeyResolver<S> {
    pub fn new(store: Store<S>) -> Self {
        Self { store }
    }

    /// Resolve `reference` in `D`'s collection.
    ///
    /// An id is a direct key lookup, a name goes through the unique name
    /// index, and [`Reference::Unset`] resolves to `None`. An id that is not
    /// a known key (including malformed ones) simply misses.
    ///
    /// # Errors
    ///
    /// Returns [`MetacatError::Service`] when the store fails.
    pub async fn resolve<D: Document>(&self, reference: &Reference) -> Result<Option<D>, MetacatError> {
        match reference {
            Reference::ById(id) => self.store.get(id).await,
            Reference::ByName(name) => self.store.get_by_name(name).await,
            Reference::Unset => Ok(None),
        }
    }

    /// Resolve a direct lookup, where a miss is a not-found.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingIdentity`] for an unset reference,
    /// [`MetacatError::NotFound`] on a miss.
    pub async fn require<D: Document>(&self, reference: &Reference) -> Result<D, MetacatError> {
        if reference.is_unset() {
            return Err(ValidationError::MissingIdentity.into());
        }
        self.resolve(reference)
            .await?
            .ok_or_else(|| NotFoundError::new(D::ENTITY, reference.key()).into())
    }
}
