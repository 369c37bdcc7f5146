//! The access log: a bounded, most-recent-first history of decisions.
//!
//! Entries are only ever inserted at the front. When the log grows past its
//! retention limit the oldest entries fall off the tail; no entry is ever
//! edited or removed on its own.

use std::sync::Arc;

use chrono::{Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::{
  Result,
  blob::{ACCESS_LOG_KEY, BlobStore, read_json, write_json},
  log::{Decision, LogEntry},
  person::Person,
};

/// Retention limit used when none is configured.
pub const DEFAULT_RETENTION: usize = 500;

// ─── Store ───────────────────────────────────────────────────────────────────

/// The decision history, backed by a [`BlobStore`].
pub struct AccessLog<B> {
  /// Most recent first.
  entries: Vec<LogEntry>,
  limit:   usize,
  blobs:   Arc<B>,
}

impl<B: BlobStore> AccessLog<B> {
  /// Read the persisted log, trimming it to `limit` if it was saved under a
  /// larger one. A limit of zero is treated as one.
  pub async fn load(blobs: Arc<B>, limit: usize) -> Result<Self> {
    let limit = limit.max(1);
    let mut entries: Vec<LogEntry> =
      read_json(&*blobs, ACCESS_LOG_KEY).await?.unwrap_or_default();
    entries.truncate(limit);
    tracing::debug!(count = entries.len(), limit, "access log loaded");
    Ok(Self { entries, limit, blobs })
  }

  /// Insert `entry` at the front, drop whatever no longer fits, and persist.
  pub async fn append(&mut self, entry: LogEntry) -> Result<()> {
    let mut next = Vec::with_capacity((self.entries.len() + 1).min(self.limit));
    next.push(entry);
    next.extend(self.entries.iter().take(self.limit - 1).cloned());

    if let Err(e) = write_json(&*self.blobs, ACCESS_LOG_KEY, &next).await {
      tracing::error!(error = %e, "failed to persist access log");
      return Err(e);
    }
    self.entries = next;
    Ok(())
  }

  /// Every retained entry, most recent first.
  pub fn all(&self) -> &[LogEntry] { &self.entries }

  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }

  pub fn limit(&self) -> usize { self.limit }

  pub fn count_by_decision(&self, decision: Decision) -> usize {
    self.entries.iter().filter(|e| e.decision == decision).count()
  }

  /// Entries whose timestamp falls on `day` as seen in `tz`.
  pub fn count_on_day<Tz: TimeZone>(&self, day: NaiveDate, tz: &Tz) -> usize {
    self
      .entries
      .iter()
      .filter(|e| e.timestamp.with_timezone(tz).date_naive() == day)
      .count()
  }

  /// Entries recorded today, by this machine's local calendar.
  pub fn count_today(&self) -> usize {
    self.count_on_day(Local::now().date_naive(), &Local)
  }
}

// ─── Summary ─────────────────────────────────────────────────────────────────

/// Headline numbers for the desk dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
  pub people:        usize,
  pub active_people: usize,
  pub granted:       usize,
  pub denied:        usize,
  /// Decisions recorded on the current local day.
  pub today:         usize,
}

impl Stats {
  /// Summarise with "today" taken as this machine's local calendar day.
  pub fn now<B: BlobStore>(people: &[Person], log: &AccessLog<B>) -> Self {
    Self::with_today(people, log, log.count_today())
  }

  pub fn compute<B: BlobStore, Tz: TimeZone>(
    people: &[Person],
    log: &AccessLog<B>,
    day: NaiveDate,
    tz: &Tz,
  ) -> Self {
    Self::with_today(people, log, log.count_on_day(day, tz))
  }

  fn with_today<B: BlobStore>(people: &[Person], log: &AccessLog<B>, today: usize) -> Self {
    Self {
      people: people.len(),
      active_people: people.iter().filter(|p| p.active).count(),
      granted: log.count_by_decision(Decision::Granted),
      denied: log.count_by_decision(Decision::Denied),
      today,
    }
  }
}
