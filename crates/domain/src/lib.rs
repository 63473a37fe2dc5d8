//! # metacat-domain
//!
//! Pure domain model for the metacat device-fleet metadata catalog.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error taxonomy, timestamps
//! - Define **References** (id-or-name pointers between catalog entities)
//! - Define the catalog entities: addressables, device services, device
//!   profiles with their inline commands, devices, device managers,
//!   schedules, schedule events, device reports and provision watchers
//! - Define the **record** (as stored, references unresolved) and
//!   **resolved** (references replaced by entities) shape of each entity
//!   that points at others
//! - Define **patches** (partial updates) and the rules for merging them
//! - Define **change notices** sent to owning device services
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod patch;
pub mod reference;
pub mod state;
pub mod time;

pub mod addressable;
pub mod command;
pub mod device;
pub mod device_manager;
pub mod device_profile;
pub mod device_report;
pub mod device_service;
pub mod notification;
pub mod provision_watcher;
pub mod schedule;
pub mod schedule_event;
