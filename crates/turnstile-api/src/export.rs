//! Download endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/export` | JSON [`Snapshot`](turnstile_tabular::Snapshot) of people and log |
//! | `GET`  | `/export/people.csv` | One row per person |
//! | `GET`  | `/export/log.csv` | One row per decision, most recent first |
//! | `GET`  | `/template.csv` | Sample import sheet |
//!
//! Dates and times in the sheets are rendered in the server's local zone.

use std::sync::Arc;

use axum::{
  extract::State,
  http::{HeaderName, header},
  response::IntoResponse,
};
use chrono::{Local, Utc};
use turnstile_core::blob::BlobStore;

use crate::{Desk, error::ApiError};

const JSON: &str = "application/json";
const CSV: &str = "text/csv; charset=utf-8";

fn download(content_type: &str, file_name: &str, body: String) -> impl IntoResponse + use<> {
  let headers: [(HeaderName, String); 2] = [
    (header::CONTENT_TYPE, content_type.to_owned()),
    (
      header::CONTENT_DISPOSITION,
      format!("attachment; filename=\"{file_name}\""),
    ),
  ];
  (headers, body)
}

/// `GET /export`
pub async fn snapshot<B: BlobStore>(
  State(desk): State<Arc<Desk<B>>>,
) -> Result<impl IntoResponse, ApiError> {
  let directory = desk.directory.read().await;
  let log = desk.log.lock().await;
  let body = turnstile_tabular::snapshot_json(directory.all(), log.all(), Utc::now())?;
  let name = turnstile_tabular::snapshot_file_name(Local::now().date_naive());
  Ok(download(JSON, &name, body))
}

/// `GET /export/people.csv`
pub async fn people<B: BlobStore>(
  State(desk): State<Arc<Desk<B>>>,
) -> Result<impl IntoResponse, ApiError> {
  let directory = desk.directory.read().await;
  let body = turnstile_tabular::people_csv(directory.all(), &Local)?;
  Ok(download(CSV, "people.csv", body))
}

/// `GET /export/log.csv`
pub async fn log<B: BlobStore>(
  State(desk): State<Arc<Desk<B>>>,
) -> Result<impl IntoResponse, ApiError> {
  let log = desk.log.lock().await;
  let body = turnstile_tabular::log_csv(log.all(), &Local)?;
  Ok(download(CSV, "access-log.csv", body))
}

/// `GET /template.csv`
pub async fn template() -> impl IntoResponse {
  download(CSV, "template.csv", turnstile_tabular::TEMPLATE_CSV.to_owned())
}
