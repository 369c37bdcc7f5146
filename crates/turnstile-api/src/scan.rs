//! Handler for `POST /scan`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/scan` | Body: `{"code":"..."}`; evaluates, logs, returns the [`LogEntry`] |

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Deserialize;
use turnstile_core::{blob::BlobStore, engine, log::LogEntry};

use crate::{Desk, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ScanBody {
  pub code: String,
}

/// `POST /scan` with body `{"code":"ACC-..."}`
///
/// The code is matched exactly as presented. Blank codes are rejected without
/// touching the log.
pub async fn handler<B: BlobStore>(
  State(desk): State<Arc<Desk<B>>>,
  Json(body): Json<ScanBody>,
) -> Result<Json<LogEntry>, ApiError> {
  if body.code.trim().is_empty() {
    return Err(ApiError::BadRequest("code must not be empty".into()));
  }

  // Entries are stamped under the log lock; the log stays in time order.
  let directory = desk.directory.read().await;
  let mut log = desk.log.lock().await;
  let entry = engine::evaluate(&body.code, &*directory);
  log.append(entry.clone()).await?;
  Ok(Json(entry))
}
