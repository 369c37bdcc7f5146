//! Error types for the tabular adapter.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The input is not parseable as delimited text.
  #[error("malformed table: {0}")]
  Csv(#[from] csv::Error),

  #[error("missing required column: {0}")]
  MissingColumn(&'static str),

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("output is not valid UTF-8: {0}")]
  Encoding(#[from] std::string::FromUtf8Error),

  #[error("JSON error: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
