//! HTTP host for a Turnstile check-in desk.
//!
//! Serves the [`turnstile_api`] router under `/api`, behind HTTP Basic auth,
//! with per-request tracing.

pub mod auth;
pub mod error;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, middleware};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use turnstile_api::Desk;
use turnstile_core::{access_log::DEFAULT_RETENTION, blob::BlobStore};

use auth::{AuthConfig, require_auth};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `TURNSTILE_*` environment variables.
#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:               String,
  #[serde(default = "default_port")]
  pub port:               u16,
  pub store_path:         PathBuf,
  /// Maximum number of access-log entries kept.
  #[serde(default = "default_retention")]
  pub retention_limit:    usize,
  /// Seed the demo roster when the store has never held a directory.
  #[serde(default)]
  pub seed_demo:          bool,
  pub auth_username:      String,
  pub auth_password_hash: String,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

fn default_retention() -> usize { DEFAULT_RETENTION }

// ─── Application state ────────────────────────────────────────────────────────

/// Everything the router needs.
pub struct AppState<B> {
  pub desk: Arc<Desk<B>>,
  pub auth: Arc<AuthConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the server's axum [`Router`].
pub fn router<B>(state: AppState<B>) -> Router
where
  B: BlobStore + 'static,
{
  Router::new()
    .nest("/api", turnstile_api::api_router(state.desk))
    .layer(middleware::from_fn_with_state(state.auth, require_auth))
    .layer(TraceLayer::new_for_http())
}

// ─── Tests ────────────────────────────────────────────────────────────────────
