//! # metacat-adapter-callback-reqwest
//!
//! Delivers change notices to device services over HTTP using
//! [reqwest](https://docs.rs/reqwest).
//!
//! ## Responsibilities
//! - Implement the `CallbackSender` port defined in `metacat-app::ports`
//! - Pick the HTTP method from the change action (`POST` / `PUT` / `DELETE`)
//! - Send the `{"type": ..., "id": ...}` body to the owning service's
//!   addressable URL and report only success or failure
//!
//! ## Dependency rule
//! Depends on `metacat-app` (for the port trait) and `metacat-domain` (for
//! the notice types). Never retries: the notifier owns delivery policy.

pub mod error;
pub mod sender;

pub use error::CallbackError;
pub use sender::HttpCallbackSender;
