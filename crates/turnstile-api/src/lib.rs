//! JSON REST API for Turnstile.
//!
//! Exposes an axum [`Router`] over a [`Desk`]: the attendee directory and the
//! access log, each behind its own lock. Auth, TLS, and transport concerns are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", turnstile_api::api_router(desk.clone()))
//! ```

pub mod error;
pub mod export;
pub mod log;
pub mod people;
pub mod scan;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use tokio::sync::{Mutex, RwLock};
use turnstile_core::{access_log::AccessLog, blob::BlobStore, directory::DirectoryStore};

pub use error::ApiError;

// ─── Shared state ────────────────────────────────────────────────────────────

/// The two stores a check-in desk operates on.
///
/// Each store has its own lock. Handlers that need both always take the
/// directory first.
pub struct Desk<B> {
  pub directory: RwLock<DirectoryStore<B>>,
  pub log:       Mutex<AccessLog<B>>,
}

impl<B: BlobStore> Desk<B> {
  pub fn new(directory: DirectoryStore<B>, log: AccessLog<B>) -> Self {
    Self { directory: RwLock::new(directory), log: Mutex::new(log) }
  }

  /// Load both stores from `blobs`, keeping at most `retention` log entries.
  pub async fn load(blobs: Arc<B>, retention: usize) -> turnstile_core::Result<Self> {
    let directory = DirectoryStore::load(blobs.clone()).await?;
    let log = AccessLog::load(blobs, retention).await?;
    Ok(Self::new(directory, log))
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `desk`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<B>(desk: Arc<Desk<B>>) -> Router<()>
where
  B: BlobStore + 'static,
{
  Router::new()
    // People
    .route("/people", get(people::list::<B>).post(people::create::<B>))
    .route("/people/import", post(people::import::<B>))
    .route("/people/{id}", get(people::get_one::<B>).delete(people::remove::<B>))
    .route("/people/{id}/toggle", post(people::toggle::<B>))
    // Check-in
    .route("/scan", post(scan::handler::<B>))
    .route("/log", get(log::list::<B>))
    .route("/stats", get(log::stats::<B>))
    // Export
    .route("/export", get(export::snapshot::<B>))
    .route("/export/people.csv", get(export::people::<B>))
    .route("/export/log.csv", get(export::log::<B>))
    .route("/template.csv", get(export::template))
    .with_state(desk)
}

// ─── Integration tests ───────────────────────────────────────────────────────
