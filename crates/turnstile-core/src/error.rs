//! Error types for `turnstile-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("name must not be empty")]
  EmptyName,

  #[error("person not found: {0}")]
  PersonNotFound(Uuid),

  #[error("could not allocate a unique code for {0:?}")]
  CodeSpaceExhausted(String),

  #[error("scanner unavailable: {0}")]
  ScannerUnavailable(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("persistence error: {0}")]
  Persistence(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn persistence(
    e: impl std::error::Error + Send + Sync + 'static,
  ) -> Self {
    Self::Persistence(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
