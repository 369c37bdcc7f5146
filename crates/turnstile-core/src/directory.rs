//! The directory store: every registered attendee, persisted wholesale.
//!
//! The collection is read once at load time from [`USERS_KEY`] and written
//! back in full after each mutation. Mutations are persist-then-commit: the
//! next collection is built, written to the blob store, and only then swapped
//! in, so a failed write leaves memory and storage agreeing.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  blob::{BlobStore, USERS_KEY, read_json, write_json},
  codec,
  person::{NewPerson, Person},
};

/// How many times a colliding code is regenerated before giving up.
const MAX_CODE_ATTEMPTS: i64 = 10_000;

// ─── Lookup seam ─────────────────────────────────────────────────────────────

/// Exact-match code lookup over **active** people only.
///
/// The decision engine depends on this rather than on a concrete store so it
/// can be exercised against a plain slice.
pub trait CodeLookup {
  fn find_by_code(&self, code: &str) -> Option<&Person>;
}

impl CodeLookup for [Person] {
  fn find_by_code(&self, code: &str) -> Option<&Person> {
    self.iter().find(|p| p.active && p.code == code)
  }
}

// ─── Bulk result ─────────────────────────────────────────────────────────────

/// Outcome of [`DirectoryStore::bulk_add`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkImport {
  pub imported: usize,
  /// Rows dropped because their name was blank.
  pub skipped:  usize,
  pub people:   Vec<Person>,
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// The attendee directory, backed by a [`BlobStore`].
pub struct DirectoryStore<B> {
  people: Vec<Person>,
  blobs:  Arc<B>,
  /// `true` until the first write when nothing was stored at load time.
  fresh:  bool,
}

impl<B: BlobStore> DirectoryStore<B> {
  /// Read the persisted directory, or start empty if nothing is stored.
  pub async fn load(blobs: Arc<B>) -> Result<Self> {
    let stored: Option<Vec<Person>> = read_json(&*blobs, USERS_KEY).await?;
    let fresh = stored.is_none();
    let people = stored.unwrap_or_default();
    tracing::debug!(count = people.len(), fresh, "directory loaded");
    Ok(Self { people, blobs, fresh })
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// Every person, in registration order.
  pub fn all(&self) -> &[Person] { &self.people }

  pub fn get(&self, id: Uuid) -> Option<&Person> {
    self.people.iter().find(|p| p.id == id)
  }

  pub fn len(&self) -> usize { self.people.len() }

  pub fn is_empty(&self) -> bool { self.people.is_empty() }

  pub fn active_count(&self) -> usize {
    self.people.iter().filter(|p| p.active).count()
  }

  /// Exact match among active people. Inactive people are never returned.
  pub fn find_by_code(&self, code: &str) -> Option<&Person> {
    self.people.find_by_code(code)
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  /// Register one person. Fails with [`Error::EmptyName`] (and changes
  /// nothing) if the trimmed name is empty.
  pub async fn add(&mut self, input: NewPerson) -> Result<Person> {
    let name = input.trimmed_name().ok_or(Error::EmptyName)?;
    let email = input.trimmed_email();

    let now = Utc::now();
    let code = unique_code(&self.people, name, email, now, None)?;
    let person = Person {
      id: Uuid::new_v4(),
      name: name.to_owned(),
      email: email.map(str::to_owned),
      code,
      created_at: now,
      active: true,
    };

    let mut next = self.people.clone();
    next.push(person.clone());
    self.commit(next).await?;

    tracing::info!(person_id = %person.id, code = %person.code, "person added");
    Ok(person)
  }

  /// Register every row with a non-empty name; blank rows are skipped and
  /// counted. A partially valid batch is still imported.
  pub async fn bulk_add(
    &mut self,
    rows: impl IntoIterator<Item = NewPerson>,
  ) -> Result<BulkImport> {
    let now = Utc::now();
    let mut next = self.people.clone();
    let mut result = BulkImport::default();

    for (row, input) in rows.into_iter().enumerate() {
      let Some(name) = input.trimmed_name() else {
        result.skipped += 1;
        continue;
      };
      let email = input.trimmed_email();
      let code = unique_code(&next, name, email, now, Some(row))?;
      let person = Person {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        email: email.map(str::to_owned),
        code,
        created_at: now,
        active: true,
      };
      next.push(person.clone());
      result.people.push(person);
    }
    result.imported = result.people.len();

    if result.imported > 0 {
      self.commit(next).await?;
    }

    tracing::info!(
      imported = result.imported,
      skipped = result.skipped,
      "bulk import finished"
    );
    Ok(result)
  }

  /// Flip a person's `active` flag and return the updated record.
  pub async fn toggle_active(&mut self, id: Uuid) -> Result<Person> {
    let mut next = self.people.clone();
    let person = next
      .iter_mut()
      .find(|p| p.id == id)
      .ok_or(Error::PersonNotFound(id))?;
    person.active = !person.active;
    let updated = person.clone();

    self.commit(next).await?;
    tracing::info!(person_id = %id, active = updated.active, "person toggled");
    Ok(updated)
  }

  /// Delete a person. Historical log entries are untouched.
  pub async fn remove(&mut self, id: Uuid) -> Result<Person> {
    let position = self
      .people
      .iter()
      .position(|p| p.id == id)
      .ok_or(Error::PersonNotFound(id))?;

    let mut next = self.people.clone();
    let removed = next.remove(position);
    self.commit(next).await?;

    tracing::info!(person_id = %id, "person removed");
    Ok(removed)
  }

  /// Install the two-person demo roster, but only on a store that had
  /// nothing persisted when it was loaded. Returns whether anything was
  /// written.
  pub async fn seed_demo(&mut self) -> Result<bool> {
    if !self.fresh || !self.people.is_empty() {
      return Ok(false);
    }

    let now = Utc::now();
    let roster = [("Juan Pérez", "juan@ejemplo.com"), ("María García", "maria@ejemplo.com")];
    let next = roster
      .iter()
      .zip(1..)
      .map(|(&(name, email), seq)| Person {
        id:         Uuid::new_v4(),
        name:       name.to_owned(),
        email:      Some(email.to_owned()),
        code:       codec::demo_code(seq, email),
        created_at: now,
        active:     true,
      })
      .collect();

    self.commit(next).await?;
    tracing::info!("demo roster seeded");
    Ok(true)
  }

  async fn commit(&mut self, next: Vec<Person>) -> Result<()> {
    if let Err(e) = write_json(&*self.blobs, USERS_KEY, &next).await {
      tracing::error!(error = %e, "failed to persist directory");
      return Err(e);
    }
    self.people = next;
    self.fresh = false;
    Ok(())
  }
}

impl<B: BlobStore> CodeLookup for DirectoryStore<B> {
  fn find_by_code(&self, code: &str) -> Option<&Person> {
    DirectoryStore::find_by_code(self, code)
  }
}

/// Generate a code not held by anyone in `existing`, active or not, advancing
/// the stamp one millisecond per collision.
fn unique_code(
  existing: &[Person],
  name: &str,
  email: Option<&str>,
  stamp: DateTime<Utc>,
  row: Option<usize>,
) -> Result<String> {
  for attempt in 0..MAX_CODE_ATTEMPTS {
    let candidate =
      codec::generate_code(name, email, stamp + Duration::milliseconds(attempt), row);
    if !existing.iter().any(|p| p.code == candidate) {
      return Ok(candidate);
    }
  }
  Err(Error::CodeSpaceExhausted(name.to_owned()))
}

#[cfg(test)]
mod tests {
  use std::collections::HashSet;

  use std::sync::atomic::Ordering;

  use chrono::TimeZone;

  use super::*;
  use crate::blob::{MemoryBlobStore, full_disk::FullDisk};

  async fn store() -> DirectoryStore<MemoryBlobStore> {
    DirectoryStore::load(Arc::new(MemoryBlobStore::new()))
      .await
      .expect("empty directory")
  }

  fn new(name: &str, email: Option<&str>) -> NewPerson {
    NewPerson::new(name, email.map(str::to_owned))
  }

  // ── add ─────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn add_creates_active_person_and_persists() {
    let blobs = Arc::new(MemoryBlobStore::new());
    let mut dir = DirectoryStore::load(blobs.clone()).await.unwrap();

    let p = dir.add(new("  Ana Ruiz ", Some(" ana@example.com "))).await.unwrap();
    assert_eq!(p.name, "Ana Ruiz");
    assert_eq!(p.email.as_deref(), Some("ana@example.com"));
    assert!(p.active);
    assert!(p.code.starts_with("ACC-"));

    let reloaded = DirectoryStore::load(blobs).await.unwrap();
    assert_eq!(reloaded.all(), &[p]);
  }

  #[tokio::test]
  async fn add_rejects_blank_name_without_change() {
    let blobs = Arc::new(MemoryBlobStore::new());
    let mut dir = DirectoryStore::load(blobs.clone()).await.unwrap();

    let err = dir.add(new("   ", Some("x@example.com"))).await.unwrap_err();
    assert!(matches!(err, Error::EmptyName));
    assert!(dir.is_empty());
    assert_eq!(blobs.peek(USERS_KEY), None);
  }

  #[tokio::test]
  async fn add_never_reuses_a_code() {
    let mut dir = store().await;
    // Same email in a tight loop lands in the same millisecond, so only the
    // collision check keeps these apart.
    for _ in 0..50 {
      dir.add(new("Ana", Some("ana@example.com"))).await.unwrap();
    }
    let codes: HashSet<_> = dir.all().iter().map(|p| p.code.as_str()).collect();
    assert_eq!(codes.len(), 50);
  }

  #[test]
  fn unique_code_skips_taken_codes_including_inactive() {
    let stamp = Utc.timestamp_millis_opt(1_000).unwrap();
    let taken = codec::generate_code("Ana", None, stamp, None);
    let existing = vec![Person {
      id:         Uuid::new_v4(),
      name:       "Ana".into(),
      email:      None,
      code:       taken.clone(),
      created_at: stamp,
      active:     false,
    }];

    let code = unique_code(&existing, "Ana", None, stamp, None).unwrap();
    assert_ne!(code, taken);
    assert_eq!(code, codec::generate_code("Ana", None, stamp + Duration::milliseconds(1), None));
  }

  // ── find_by_code ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn find_by_code_ignores_inactive_people() {
    let mut dir = store().await;
    let p = dir.add(new("Ana", None)).await.unwrap();
    assert_eq!(dir.find_by_code(&p.code).map(|x| x.id), Some(p.id));

    dir.toggle_active(p.id).await.unwrap();
    assert!(dir.find_by_code(&p.code).is_none());
  }

  #[tokio::test]
  async fn find_by_code_is_exact() {
    let mut dir = store().await;
    let p = dir.add(new("Ana", None)).await.unwrap();
    assert!(dir.find_by_code(&p.code.to_lowercase()).is_none());
    assert!(dir.find_by_code(&format!(" {}", p.code)).is_none());
  }

  // ── toggle / remove ─────────────────────────────────────────────────────────

  #[tokio::test]
  async fn toggling_twice_restores_the_person() {
    let mut dir = store().await;
    let original = dir.add(new("Ana", Some("ana@example.com"))).await.unwrap();

    let once = dir.toggle_active(original.id).await.unwrap();
    assert!(!once.active);
    let twice = dir.toggle_active(original.id).await.unwrap();
    assert_eq!(twice, original);
  }

  #[tokio::test]
  async fn toggle_and_remove_report_missing_ids() {
    let mut dir = store().await;
    dir.add(new("Ana", None)).await.unwrap();
    let missing = Uuid::new_v4();

    assert!(matches!(
      dir.toggle_active(missing).await,
      Err(Error::PersonNotFound(id)) if id == missing
    ));
    assert!(matches!(dir.remove(missing).await, Err(Error::PersonNotFound(_))));
    assert_eq!(dir.len(), 1);
  }

  #[tokio::test]
  async fn remove_deletes_person() {
    let mut dir = store().await;
    let a = dir.add(new("Ana", None)).await.unwrap();
    let b = dir.add(new("Beto", None)).await.unwrap();

    let removed = dir.remove(a.id).await.unwrap();
    assert_eq!(removed.id, a.id);
    assert!(dir.get(a.id).is_none());
    assert_eq!(dir.all(), &[b]);
  }

  // ── bulk_add ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn bulk_add_skips_blank_names() {
    let mut dir = store().await;
    let rows = vec![
      new("Ana", Some("ana@example.com")),
      new("", Some("ghost@example.com")),
      new("Beto", None),
      new("   ", None),
      new("Carla", Some("")),
    ];

    let result = dir.bulk_add(rows).await.unwrap();
    assert_eq!(result.imported, 3);
    assert_eq!(result.skipped, 2);
    assert_eq!(dir.len(), 3);
    assert_eq!(result.people[2].email, None);
  }

  #[tokio::test]
  async fn bulk_codes_are_pairwise_distinct() {
    let mut dir = store().await;
    let rows = (0..20).map(|_| new("Same Name", Some("same@example.com")));

    let result = dir.bulk_add(rows).await.unwrap();
    let codes: HashSet<_> = result.people.iter().map(|p| p.code.as_str()).collect();
    assert_eq!(codes.len(), 20);
    assert!(result.people[3].code.ends_with("-3"));
  }

  #[tokio::test]
  async fn bulk_add_with_only_blank_rows_writes_nothing() {
    let blobs = Arc::new(MemoryBlobStore::new());
    let mut dir = DirectoryStore::load(blobs.clone()).await.unwrap();

    let result = dir.bulk_add(vec![new("", None)]).await.unwrap();
    assert_eq!(result.imported, 0);
    assert_eq!(blobs.peek(USERS_KEY), None);
  }

  // ── demo roster ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn seed_demo_only_on_fresh_store() {
    let blobs = Arc::new(MemoryBlobStore::new());
    let mut dir = DirectoryStore::load(blobs.clone()).await.unwrap();
    assert!(dir.seed_demo().await.unwrap());
    assert_eq!(dir.len(), 2);
    assert_eq!(dir.find_by_code("ACC-001-anVhbkBl").map(|p| p.name.as_str()), Some("Juan Pérez"));

    let mut reloaded = DirectoryStore::load(blobs).await.unwrap();
    assert!(!reloaded.seed_demo().await.unwrap());
    assert_eq!(reloaded.len(), 2);
  }

  #[tokio::test]
  async fn seed_demo_respects_an_emptied_directory() {
    let blobs = Arc::new(MemoryBlobStore::new());
    blobs.set(USERS_KEY, "[]".into()).await.unwrap();

    let mut dir = DirectoryStore::load(blobs).await.unwrap();
    assert!(!dir.seed_demo().await.unwrap());
    assert!(dir.is_empty());
  }

  // ── persistence failures ────────────────────────────────────────────────────

  #[tokio::test]
  async fn failed_write_leaves_directory_unchanged() {
    let mut dir = DirectoryStore::load(Arc::new(FullDisk::full())).await.unwrap();

    let err = dir.add(new("Ana", None)).await.unwrap_err();
    assert!(matches!(err, Error::Persistence(_)));
    assert!(dir.is_empty());

    let err = dir.bulk_add(vec![new("Ana", None)]).await.unwrap_err();
    assert!(matches!(err, Error::Persistence(_)));
    assert!(dir.is_empty());
  }

  #[tokio::test]
  async fn failed_toggle_and_remove_leave_person_unchanged() {
    let blobs = Arc::new(FullDisk::default());
    let mut dir = DirectoryStore::load(blobs.clone()).await.unwrap();
    let ana = dir.add(new("Ana", None)).await.unwrap();
    blobs.full.store(true, Ordering::SeqCst);

    let err = dir.toggle_active(ana.id).await.unwrap_err();
    assert!(matches!(err, Error::Persistence(_)));
    assert_eq!(dir.get(ana.id), Some(&ana));

    let err = dir.remove(ana.id).await.unwrap_err();
    assert!(matches!(err, Error::Persistence(_)));
    assert_eq!(dir.get(ana.id), Some(&ana));
    assert_eq!(dir.find_by_code(&ana.code), Some(&ana));

    blobs.full.store(false, Ordering::SeqCst);
    let reloaded = DirectoryStore::load(blobs).await.unwrap();
    assert_eq!(reloaded.all(), dir.all());
  }
}
