//! Custom Axum extractors.
//!
//! Provides `JsonBody<T>`, a JSON body extractor whose rejection uses the
//! shared `{"detail": ...}` error body instead of Axum's plain-text one.

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;

use super::error_response;

/// Deserializes the request body as JSON.
pub struct JsonBody<T>(pub T);

/// The request body was missing, not JSON, or did not match the schema.
#[derive(Debug)]
pub struct JsonBodyError(JsonRejection);

impl IntoResponse for JsonBodyError {
    fn into_response(self) -> Response {
        error_response(StatusCode::UNPROCESSABLE_ENTITY, self.0.body_text())
    }
}

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = JsonBodyError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(JsonBodyError)?;
        Ok(JsonBody(value))
    }
}
