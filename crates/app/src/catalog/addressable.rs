//! Addressable catalog: use-cases for network endpoints.

use metacat_domain::addressable::{Addressable, AddressablePatch};
use metacat_domain::error::MetacatError;
use metacat_domain::id::AddressableId;
use metacat_domain::time::Audit;

use crate::catalog::Context;
use crate::ports::{DocumentStore, Filter};

/// Application service for addressable CRUD operations.
pub struct AddressableCatalog<S> {
    ctx: Context<S>,
}

impl<S: DocumentStore> AddressableCatalog<S> {
    /// Create a new catalog over the shared context.
    pub fn new(ctx: Context<S>) -> Self {
        Self { ctx }
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::LimitExceeded`] above the listing limit.
    pub async fn list(&self) -> Result<Vec<Addressable>, MetacatError> {
        self.ctx.store.list().await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] when no addressable has `id`.
    pub async fn get(&self, id: &str) -> Result<Addressable, MetacatError> {
        self.ctx.by_id(id).await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] when no addressable has `name`.
    pub async fn get_by_name(&self, name: &str) -> Result<Addressable, MetacatError> {
        self.ctx.by_name(name).await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::LimitExceeded`] above the listing limit.
    pub async fn find_by_address(&self, address: &str) -> Result<Vec<Addressable>, MetacatError> {
        self.ctx.store.find(&Filter::equals("address", address)).await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::LimitExceeded`] above the listing limit.
    pub async fn find_by_port(&self, port: u16) -> Result<Vec<Addressable>, MetacatError> {
        self.ctx.store.find(&Filter::equals("port", port)).await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::LimitExceeded`] above the listing limit.
    pub async fn find_by_publisher(&self, publisher: &str) -> Result<Vec<Addressable>, MetacatError> {
        self.ctx
            .store
            .find(&Filter::equals("publisher", publisher))
            .await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::LimitExceeded`] above the listing limit.
    pub async fn find_by_topic(&self, topic: &str) -> Result<Vec<Addressable>, MetacatError> {
        self.ctx.store.find(&Filter::equals("topic", topic)).await
    }

    /// Persist a new addressable and return its id.
    ///
    /// # Errors
    ///
    /// Returns [`MetacatError::Validation`] for an empty or taken name.
    #[tracing::instrument(skip(self, addressable), fields(name = %addressable.name))]
    pub async fn create(&self, mut addressable: Addressable) -> Result<AddressableId, MetacatError> {
        addressable.validate()?;
        addressable.id = AddressableId::new();
        addressable.audit = Audit::stamp();
        self.ctx.store.insert(&addressable).await?;
        tracing::info!(id = %addressable.id, "addressable created");
        Ok(addressable.id)
    }

    /// Merge `patch` into the addressable it identifies.
    ///
    /// # Errors
    ///
    /// Returns [`MetacatError::Validation`] for a missing identity or a taken
    /// name, [`MetacatError::NotFound`] when the target does not exist.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update(&self, patch: AddressablePatch) -> Result<(), MetacatError> {
        let mut addressable: Addressable = self.ctx.target(&patch.identity).await?;
        if let Some(name) = self.ctx.rename(&addressable, &patch.identity).await? {
            addressable.name = name;
        }
        patch.apply(&mut addressable);
        addressable.audit.touch();
        addressable.validate()?;
        self.ctx.store.replace(&addressable).await
    }

    /// # Errors
    ///
    /// Returns [`MetacatError::NotFound`] for an unknown id and
    /// [`MetacatError::Validation`] while anything still references it.
    #[tracing::instrument(skip(self))]
    pub async fn delete_by_id(&self, id: &str) -> Result<(), MetacatError> {
        let addressable: Addressable = self.ctx.by_id(id).await?;
        self.ctx.remove(&addressable).await
    }

    /// # Errors
    ///
    /// Same as [`delete_by_id`](Self::delete_by_id).
    #[tracing::instrument(skip(self))]
    pub async fn delete_by_name(&self, name: &str) -> Result<(), MetacatError> {
        let addressable: Addressable = self.ctx.by_name(name).await?;
        self.ctx.remove(&addressable).await
    }
}
