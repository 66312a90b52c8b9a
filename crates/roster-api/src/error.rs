//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Internal detail (store messages, hashing failures) is logged here and
//! never written to the response body.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use roster_core::Error;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub Error);

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self.0 {
      Error::Validation(violation) => {
        tracing::debug!(key = %violation.key(), "rejected invalid record");
        let body = json!({
          "error": "validation failed",
          "key":   violation.key(),
          "field": violation.field,
          "bound": violation.bound(),
        });
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
      }
      Error::NotFound { entity, id } => {
        tracing::debug!(%entity, id, "record not found");
        let message = format!("{entity} {id} not found");
        (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
      }
      Error::Conflict(detail) => {
        tracing::warn!(%detail, "write conflicted with a stored record");
        let body = json!({ "error": "a record with the same unique value already exists" });
        (StatusCode::CONFLICT, Json(body)).into_response()
      }
      other => {
        tracing::error!(error = %other, "request failed");
        let body = json!({ "error": "internal server error" });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
      }
    }
  }
}

pub type Result<T, E = ApiError> = std::result::Result<T, E>;
