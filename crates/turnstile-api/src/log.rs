//! Handlers for the access log and the dashboard numbers.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/log` | Most recent first; optional `?decision=granted\|denied`, `?limit=N` |
//! | `GET`  | `/stats` | [`Stats`]; "today" is the server's local day |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use serde::Deserialize;
use turnstile_core::{
  access_log::Stats,
  blob::BlobStore,
  log::{Decision, LogEntry},
};

use crate::Desk;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub decision: Option<Decision>,
  pub limit:    Option<usize>,
}

/// `GET /log[?decision=<granted|denied>][&limit=<n>]`
pub async fn list<B: BlobStore>(
  State(desk): State<Arc<Desk<B>>>,
  Query(params): Query<ListParams>,
) -> Json<Vec<LogEntry>> {
  let log = desk.log.lock().await;
  let entries = log
    .all()
    .iter()
    .filter(|e| params.decision.is_none_or(|d| e.decision == d))
    .take(params.limit.unwrap_or(usize::MAX))
    .cloned()
    .collect();
  Json(entries)
}

// ─── Stats ────────────────────────────────────────────────────────────────────

/// `GET /stats`
pub async fn stats<B: BlobStore>(State(desk): State<Arc<Desk<B>>>) -> Json<Stats> {
  let directory = desk.directory.read().await;
  let log = desk.log.lock().await;
  Json(Stats::now(directory.all(), &log))
}
