//! [`SqliteBlobStore`]: the SQLite implementation of [`BlobStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use turnstile_core::blob::BlobStore;

use crate::{Error, Result, schema::SCHEMA};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A blob store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteBlobStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteBlobStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── BlobStore impl ──────────────────────────────────────────────────────────

impl BlobStore for SqliteBlobStore {
  type Error = Error;

  async fn get(&self, key: &str) -> Result<Option<String>> {
    let key = key.to_owned();

    let value = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT value FROM blobs WHERE key = ?1",
              rusqlite::params![key],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    Ok(value)
  }

  /// Upsert `value` and read it back inside one transaction. The transaction
  /// only commits if the stored value matches what was written.
  async fn set(&self, key: &str, value: String) -> Result<()> {
    let key_str = key.to_owned();
    let at_str  = Utc::now().to_rfc3339();

    let verified = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO blobs (key, value, updated_at) VALUES (?1, ?2, ?3)
           ON CONFLICT (key) DO UPDATE
             SET value = excluded.value, updated_at = excluded.updated_at",
          rusqlite::params![key_str, value, at_str],
        )?;

        let stored: String = tx.query_row(
          "SELECT value FROM blobs WHERE key = ?1",
          rusqlite::params![key_str],
          |row| row.get(0),
        )?;
        if stored != value {
          // Dropping `tx` rolls the write back.
          return Ok(false);
        }

        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !verified {
      tracing::error!(key, "blob read-back did not match the written value");
      return Err(Error::ReadBackMismatch(key.to_owned()));
    }
    Ok(())
  }
}
