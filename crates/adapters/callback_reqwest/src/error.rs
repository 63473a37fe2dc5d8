//! Callback-specific error type wrapping reqwest errors.

use metacat_domain::error::MetacatError;

/// Errors originating from an outbound callback.
#[derive(Debug, thiserror::Error)]
pub enum CallbackError {
    /// The HTTP client could not be built.
    #[error("callback client setup failed")]
    Client(#[source] reqwest::Error),

    /// The request could not be sent or timed out.
    #[error("callback to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-success status.
    #[error("callback to {url} answered {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

impl From<CallbackError> for MetacatError {
    fn from(err: CallbackError) -> Self {
        Self::service(err)
    }
}
