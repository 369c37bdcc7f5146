//! Error type for `turnstile-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// The value read back after a write differs from the value written.
  #[error("read-back mismatch for key {0:?}")]
  ReadBackMismatch(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
