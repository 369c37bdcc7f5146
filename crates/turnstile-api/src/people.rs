//! Handlers for `/people` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/people` | Optional `?active=true\|false` |
//! | `POST`   | `/people` | Body: [`NewPerson`]; returns 201 + stored person |
//! | `POST`   | `/people/import` | Body: raw CSV; returns [`BulkImport`] |
//! | `GET`    | `/people/{id}` | 404 if not found |
//! | `POST`   | `/people/{id}/toggle` | Flips `active`; returns the updated person |
//! | `DELETE` | `/people/{id}` | 204; the person's log entries are kept |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use bytes::Bytes;
use serde::Deserialize;
use turnstile_core::{
  blob::BlobStore,
  directory::BulkImport,
  person::{NewPerson, Person},
};
use uuid::Uuid;

use crate::{Desk, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub active: Option<bool>,
}

/// `GET /people[?active=<bool>]`
pub async fn list<B: BlobStore>(
  State(desk): State<Arc<Desk<B>>>,
  Query(params): Query<ListParams>,
) -> Json<Vec<Person>> {
  let directory = desk.directory.read().await;
  let people = directory
    .all()
    .iter()
    .filter(|p| params.active.is_none_or(|a| p.active == a))
    .cloned()
    .collect();
  Json(people)
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /people/{id}`
pub async fn get_one<B: BlobStore>(
  State(desk): State<Arc<Desk<B>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Person>, ApiError> {
  let directory = desk.directory.read().await;
  let person = directory
    .get(id)
    .cloned()
    .ok_or_else(|| ApiError::NotFound(format!("person {id} not found")))?;
  Ok(Json(person))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /people` with body `{"name":"...","email":"..."}`
pub async fn create<B: BlobStore>(
  State(desk): State<Arc<Desk<B>>>,
  Json(body): Json<NewPerson>,
) -> Result<impl IntoResponse, ApiError> {
  let person = desk.directory.write().await.add(body).await?;
  Ok((StatusCode::CREATED, Json(person)))
}

// ─── Import ───────────────────────────────────────────────────────────────────

/// `POST /people/import` with a CSV body: a name column and an optional email
/// column.
///
/// A sheet that fails to parse is rejected whole. Rows with a blank name are
/// counted in `skipped`.
pub async fn import<B: BlobStore>(
  State(desk): State<Arc<Desk<B>>>,
  body: Bytes,
) -> Result<Json<BulkImport>, ApiError> {
  let sheet = turnstile_tabular::import_people(&body)?;
  let mut result = desk.directory.write().await.bulk_add(sheet.rows).await?;
  result.skipped += sheet.skipped;
  tracing::info!(
    imported = result.imported,
    skipped = result.skipped,
    "people imported"
  );
  Ok(Json(result))
}

// ─── Toggle ───────────────────────────────────────────────────────────────────

/// `POST /people/{id}/toggle`
pub async fn toggle<B: BlobStore>(
  State(desk): State<Arc<Desk<B>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Person>, ApiError> {
  let person = desk.directory.write().await.toggle_active(id).await?;
  Ok(Json(person))
}

// ─── Remove ───────────────────────────────────────────────────────────────────

/// `DELETE /people/{id}`
pub async fn remove<B: BlobStore>(
  State(desk): State<Arc<Desk<B>>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  desk.directory.write().await.remove(id).await?;
  Ok(StatusCode::NO_CONTENT)
}
