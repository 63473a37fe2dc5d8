//! Failures of the `SQLite` document store, folded into [`StoreError`] at the
//! port boundary.

use metacat_app::ports::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Connection, query or constraint failure reported by sqlx.
    #[error("sqlite query failed")]
    Database(#[from] sqlx::Error),

    /// A document body could not be encoded or decoded.
    #[error("document body is not valid JSON")]
    Json(#[from] serde_json::Error),

    /// The embedded schema could not be applied.
    #[error("schema migration failed")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<StorageError> for StoreError {
    fn from(err: StorageError) -> Self {
        Self::Backend(Box::new(err))
    }
}
