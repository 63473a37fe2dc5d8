//! # metacat-app
//!
//! Application layer: use-cases, the association-integrity layer and
//! **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `DocumentStore`: schema-less JSON documents keyed by id, unique by name
//!   - `CallbackSender`: outbound change callbacks to device services
//! - Provide the **integrity layer** every write goes through:
//!   - `KeyResolver`: id-or-name reference resolution
//!   - `GraphAttacher`: record → fully resolved entity
//!   - name-collision translation and command-name uniqueness
//!   - `AssociationGuard`: refuse deletes/renames that would orphan dependents
//! - Define **driving/inbound ports** as catalog structs, one per entity family
//! - Provide **in-process infrastructure** (the change notifier worker pool)
//!
//! ## Dependency rule
//! Depends on `metacat-domain` only (plus `tokio` for channels and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod catalog;
pub mod integrity;
pub mod notifier;
pub mod ports;
pub mod profile_import;
pub mod store;

#[cfg(test)]
pub(crate) mod memory;
