//! Request extractors whose rejections use the API error format.

use std::str::FromStr;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;

use metacat_domain::error::InputError;

use crate::error::ApiError;

/// JSON request body. A body that is not JSON, or not the expected shape,
/// is a `400` with a `{"error": ...}` body.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(body_error(&rejection).into()),
        }
    }
}

fn body_error(rejection: &JsonRejection) -> InputError {
    InputError::Unparseable(rejection.body_text())
}

/// Parse a path segment, reporting failures as a bad parameter.
///
/// # Errors
///
/// Returns [`InputError::InvalidParameter`] when `value` does not parse.
pub fn param<T: FromStr>(name: &'static str, value: &str) -> Result<T, ApiError> {
    value.parse().map_err(|_| {
        ApiError::from(InputError::InvalidParameter {
            name,
            value: value.to_string(),
        })
    })
}
