//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("tabular error: {0}")]
  Tabular(#[from] turnstile_tabular::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<turnstile_core::Error> for ApiError {
  fn from(e: turnstile_core::Error) -> Self {
    use turnstile_core::Error as Core;
    match e {
      Core::EmptyName => ApiError::BadRequest(e.to_string()),
      Core::PersonNotFound(id) => ApiError::NotFound(format!("person {id} not found")),
      other => ApiError::Store(Box::new(other)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    use turnstile_tabular::Error as Tab;
    let status = match &self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Tabular(Tab::Csv(_) | Tab::MissingColumn(_)) => StatusCode::BAD_REQUEST,
      ApiError::Tabular(_) | ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}
