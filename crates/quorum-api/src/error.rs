//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use quorum_core::Error as DomainError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Domain(#[from] DomainError),

  #[error("a reminder scan is already running")]
  ScanBusy,
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::Domain(e) => match e {
        DomainError::ArticleNotFound(_)
        | DomainError::ReviewerNotFound(_)
        | DomainError::JournalNotFound(_) => StatusCode::NOT_FOUND,
        DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
        DomainError::ConstraintViolation(_)
        | DomainError::AlreadySubmitted { .. } => StatusCode::CONFLICT,
        DomainError::Transient(_) => StatusCode::SERVICE_UNAVAILABLE,
      },
      ApiError::ScanBusy => StatusCode::CONFLICT,
    };
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}
