//! The `BlobStore` trait: opaque get/set-by-key persistence.
//!
//! The directory and the access log each persist as one JSON document under a
//! fixed key, overwritten wholesale on every mutation. Backends (e.g.
//! `turnstile-store-sqlite`) only need to move strings in and out.

use std::{
  collections::HashMap,
  convert::Infallible,
  future::Future,
  sync::{Mutex, PoisonError},
};

use serde::{Serialize, de::DeserializeOwned};

use crate::{Error, Result};

/// Key holding the JSON array of [`crate::person::Person`] records.
pub const USERS_KEY: &str = "users";
/// Key holding the JSON array of [`crate::log::LogEntry`] records.
pub const ACCESS_LOG_KEY: &str = "access-log";

/// Abstraction over a key/value blob backend.
///
/// All methods return `Send` futures so the stores built on top can live
/// behind tokio locks in a multi-threaded server.
pub trait BlobStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fetch the value stored under `key`. Returns `None` if never set.
  fn get(
    &self,
    key: &str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send;

  /// Replace the value stored under `key`.
  fn set(
    &self,
    key: &str,
    value: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Decode the JSON document under `key`, if any.
pub(crate) async fn read_json<B, T>(blobs: &B, key: &str) -> Result<Option<T>>
where
  B: BlobStore,
  T: DeserializeOwned,
{
  let raw = blobs.get(key).await.map_err(Error::persistence)?;
  raw
    .map(|s| serde_json::from_str(&s))
    .transpose()
    .map_err(Error::from)
}

/// Encode `value` as JSON and overwrite `key` with it.
pub(crate) async fn write_json<B, T>(blobs: &B, key: &str, value: &T) -> Result<()>
where
  B: BlobStore,
  T: Serialize + ?Sized,
{
  let raw = serde_json::to_string(value)?;
  blobs.set(key, raw).await.map_err(Error::persistence)
}

// ─── In-memory backend ───────────────────────────────────────────────────────

/// A process-local blob store. Nothing survives a restart; useful for tests
/// and throwaway desks.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
  blobs: Mutex<HashMap<String, String>>,
}

impl MemoryBlobStore {
  pub fn new() -> Self { Self::default() }

  /// Raw value under `key`, bypassing the async interface.
  pub fn peek(&self, key: &str) -> Option<String> {
    self
      .blobs
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .get(key)
      .cloned()
  }
}

impl BlobStore for MemoryBlobStore {
  type Error = Infallible;

  async fn get(&self, key: &str) -> Result<Option<String>, Infallible> {
    Ok(self.peek(key))
  }

  async fn set(&self, key: &str, value: String) -> Result<(), Infallible> {
    self
      .blobs
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .insert(key.to_owned(), value);
    Ok(())
  }
}

/// A blob store whose writes can be made to fail on demand.
#[cfg(test)]
pub(crate) mod full_disk {
  use std::sync::atomic::{AtomicBool, Ordering};

  use super::*;

  #[derive(Debug, thiserror::Error)]
  #[error("disk full")]
  pub struct DiskFull;

  /// Reads always succeed; writes fail while `full` is set.
  #[derive(Debug, Default)]
  pub struct FullDisk {
    inner:    MemoryBlobStore,
    pub full: AtomicBool,
  }

  impl FullDisk {
    /// A store that rejects every write from the start.
    pub fn full() -> Self {
      Self { inner: MemoryBlobStore::new(), full: AtomicBool::new(true) }
    }
  }

  impl BlobStore for FullDisk {
    type Error = DiskFull;

    async fn get(&self, key: &str) -> Result<Option<String>, DiskFull> {
      Ok(self.inner.peek(key))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), DiskFull> {
      if self.full.load(Ordering::SeqCst) {
        return Err(DiskFull);
      }
      self.inner.set(key, value).await.map_err(|e| match e {})
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn memory_store_roundtrip() {
    let store = MemoryBlobStore::new();
    assert_eq!(store.get(USERS_KEY).await.unwrap(), None);

    store.set(USERS_KEY, "[]".into()).await.unwrap();
    store.set(USERS_KEY, "[1]".into()).await.unwrap();
    assert_eq!(store.get(USERS_KEY).await.unwrap().as_deref(), Some("[1]"));
    assert_eq!(store.peek(ACCESS_LOG_KEY), None);
  }

  #[tokio::test]
  async fn json_helpers_roundtrip() {
    let store = MemoryBlobStore::new();
    write_json(&store, "nums", &[1, 2, 3]).await.unwrap();
    let back: Option<Vec<i32>> = read_json(&store, "nums").await.unwrap();
    assert_eq!(back, Some(vec![1, 2, 3]));
  }

  #[tokio::test]
  async fn corrupt_document_is_a_serialization_error() {
    let store = MemoryBlobStore::new();
    store.set("nums", "not json".into()).await.unwrap();
    let result: Result<Option<Vec<i32>>> = read_json(&store, "nums").await;
    assert!(matches!(result, Err(Error::Serialization(_))));
  }
}
