//! # metacat-adapter-storage-sqlite-sqlx
//!
//! `SQLite` document store using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the `DocumentStore` port defined in `metacat-app::ports`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Translate document filters into `JSON1` predicates
//!
//! ## Dependency rule
//! Depends on `metacat-app` (for the port trait) only.
//! The `app` and `domain` crates must never reference this adapter.

pub mod document_store;
pub mod error;
pub mod pool;

pub use document_store::SqliteDocumentStore;
pub use error::StorageError;
pub use pool::{Config, Database};
