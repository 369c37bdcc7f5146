//! Integration tests for `SqliteBlobStore`, both raw and underneath the
//! directory and access-log stores.

use std::sync::Arc;

use turnstile_core::{
  access_log::AccessLog,
  blob::{ACCESS_LOG_KEY, BlobStore, USERS_KEY},
  directory::DirectoryStore,
  engine,
  log::Decision,
  person::NewPerson,
};

use crate::SqliteBlobStore;

async fn store() -> SqliteBlobStore {
  SqliteBlobStore::open_in_memory()
    .await
    .expect("in-memory store")
}

// ─── Raw blobs ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_missing_key_returns_none() {
  let s = store().await;
  assert_eq!(s.get(USERS_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn set_then_get() {
  let s = store().await;
  s.set(USERS_KEY, "[]".into()).await.unwrap();
  assert_eq!(s.get(USERS_KEY).await.unwrap().as_deref(), Some("[]"));
  assert_eq!(s.get(ACCESS_LOG_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn set_overwrites_wholesale() {
  let s = store().await;
  s.set(USERS_KEY, r#"[{"a":1},{"b":2}]"#.into()).await.unwrap();
  s.set(USERS_KEY, "[]".into()).await.unwrap();
  assert_eq!(s.get(USERS_KEY).await.unwrap().as_deref(), Some("[]"));
}

#[tokio::test]
async fn keys_are_independent() {
  let s = store().await;
  s.set(USERS_KEY, "users".into()).await.unwrap();
  s.set(ACCESS_LOG_KEY, "log".into()).await.unwrap();
  assert_eq!(s.get(USERS_KEY).await.unwrap().as_deref(), Some("users"));
  assert_eq!(s.get(ACCESS_LOG_KEY).await.unwrap().as_deref(), Some("log"));
}

#[tokio::test]
async fn unicode_values_survive() {
  let s = store().await;
  s.set("k", "María García ✓".into()).await.unwrap();
  assert_eq!(s.get("k").await.unwrap().as_deref(), Some("María García ✓"));
}

// ─── Stores on top ───────────────────────────────────────────────────────────

#[tokio::test]
async fn directory_and_log_survive_reopen() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("turnstile.db");

  let (ana, entry) = {
    let blobs = Arc::new(SqliteBlobStore::open(&path).await.unwrap());
    let mut people = DirectoryStore::load(blobs.clone()).await.unwrap();
    let mut log = AccessLog::load(blobs, 500).await.unwrap();

    let ana = people
      .add(NewPerson::new("Ana", Some("ana@example.com".into())))
      .await
      .unwrap();
    let entry = engine::evaluate(&ana.code, &people);
    log.append(entry.clone()).await.unwrap();
    (ana, entry)
  };

  let blobs = Arc::new(SqliteBlobStore::open(&path).await.unwrap());
  let people = DirectoryStore::load(blobs.clone()).await.unwrap();
  let log = AccessLog::load(blobs, 500).await.unwrap();

  assert_eq!(people.all(), &[ana.clone()]);
  assert_eq!(log.all(), &[entry]);
  assert_eq!(log.all()[0].decision, Decision::Granted);
  assert_eq!(log.all()[0].person_id, Some(ana.id));
}

#[tokio::test]
async fn deleting_a_person_keeps_their_history() {
  let blobs = Arc::new(store().await);
  let mut people = DirectoryStore::load(blobs.clone()).await.unwrap();
  let mut log = AccessLog::load(blobs.clone(), 500).await.unwrap();

  let ana = people.add(NewPerson::new("Ana", None)).await.unwrap();
  log.append(engine::evaluate(&ana.code, &people)).await.unwrap();
  people.remove(ana.id).await.unwrap();

  let log = AccessLog::load(blobs, 500).await.unwrap();
  assert_eq!(log.len(), 1);
  assert_eq!(log.all()[0].person_name, "Ana");
  assert_eq!(log.all()[0].person_id, Some(ana.id));
}

#[tokio::test]
async fn persisted_document_is_a_json_array() {
  let blobs = Arc::new(store().await);
  let mut people = DirectoryStore::load(blobs.clone()).await.unwrap();
  people.add(NewPerson::new("Ana", None)).await.unwrap();

  let raw = blobs.get(USERS_KEY).await.unwrap().unwrap();
  assert!(raw.starts_with('['), "raw: {raw}");
  assert!(raw.contains("\"createdAt\""), "raw: {raw}");
  let id = people.all()[0].id;
  assert!(raw.contains(&id.to_string()));
}
