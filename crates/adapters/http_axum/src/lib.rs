//! # metacat-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the catalog **REST API** under `/api/v1`, one resource family per
//!   entity type (`/api/v1/addressable`, `/api/v1/device`, …)
//! - Accept device profile documents as raw YAML or multipart uploads and
//!   serve them back as YAML
//! - Map HTTP requests into catalog calls (driving adapter)
//! - Map [`MetacatError`](metacat_domain::error::MetacatError) variants onto
//!   status codes with a `{"error": "..."}` body
//!
//! ## Dependency rule
//! Depends on `metacat-app` (for catalogs and the store port) and
//! `metacat-domain` (for request/response types). Never leaks axum types
//! into the domain.

pub mod api;
pub mod error;
pub mod extract;
pub mod router;
pub mod state;
