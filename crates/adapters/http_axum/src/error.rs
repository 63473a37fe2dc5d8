//! HTTP error response mapping.

use std::error::Error;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use metacat_domain::error::{InputError, MetacatError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`MetacatError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(MetacatError);

impl From<MetacatError> for ApiError {
    fn from(err: MetacatError) -> Self {
        Self(err)
    }
}

impl From<InputError> for ApiError {
    fn from(err: InputError) -> Self {
        Self(err.into())
    }
}

impl ApiError {
    /// Status code the wrapped error maps to.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            MetacatError::Validation(_) => StatusCode::CONFLICT,
            MetacatError::NotFound(_) => StatusCode::NOT_FOUND,
            MetacatError::LimitExceeded(_) => StatusCode::PAYLOAD_TOO_LARGE,
            MetacatError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            MetacatError::Service(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self.0 {
            MetacatError::Validation(err) => err.to_string(),
            MetacatError::NotFound(err) => err.to_string(),
            MetacatError::LimitExceeded(err) => err.to_string(),
            MetacatError::InvalidInput(err) => err.to_string(),
            MetacatError::Service(err) => {
                tracing::error!(error = %causes(err.as_ref()), "service failure");
                "service unavailable".to_string()
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// `err` followed by every underlying source, outermost first.
fn causes(err: &(dyn Error + 'static)) -> String {
    std::iter::successors(Some(err), |&err| err.source())
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(": ")
}
