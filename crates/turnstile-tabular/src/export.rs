//! Records → downloadable sheets and JSON snapshots.

use std::fmt::Display;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use turnstile_core::{log::LogEntry, person::Person};

use crate::Result;

// ─── CSV ─────────────────────────────────────────────────────────────────────

/// One row per person: Name, Email, Code, Status, Registered (date in `tz`).
pub fn people_csv<Tz>(people: &[Person], tz: &Tz) -> Result<String>
where
  Tz: TimeZone,
  Tz::Offset: Display,
{
  let mut writer = csv::Writer::from_writer(Vec::new());
  writer.write_record(["Name", "Email", "Code", "Status", "Registered"])?;
  for p in people {
    let registered = p.created_at.with_timezone(tz).format("%Y-%m-%d").to_string();
    writer.write_record([
      p.name.as_str(),
      p.email.as_deref().unwrap_or_default(),
      p.code.as_str(),
      if p.active { "Active" } else { "Inactive" },
      registered.as_str(),
    ])?;
  }
  finish(writer)
}

/// One row per decision, most recent first: Name, Code, Decision, Date, Time
/// (date and time in `tz`).
pub fn log_csv<Tz>(entries: &[LogEntry], tz: &Tz) -> Result<String>
where
  Tz: TimeZone,
  Tz::Offset: Display,
{
  let mut writer = csv::Writer::from_writer(Vec::new());
  writer.write_record(["Name", "Code", "Decision", "Date", "Time"])?;
  for e in entries {
    let local = e.timestamp.with_timezone(tz);
    let date = local.format("%Y-%m-%d").to_string();
    let time = local.format("%H:%M:%S").to_string();
    writer.write_record([
      e.person_name.as_str(),
      e.presented_code.as_str(),
      e.decision.label(),
      date.as_str(),
      time.as_str(),
    ])?;
  }
  finish(writer)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
  let bytes = writer.into_inner().map_err(|e| e.into_error())?;
  Ok(String::from_utf8(bytes)?)
}

// ─── JSON snapshot ───────────────────────────────────────────────────────────

/// Everything the desk knows, as one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
  pub users:       Vec<Person>,
  /// Most recent first.
  pub access_log:  Vec<LogEntry>,
  pub export_date: DateTime<Utc>,
}

/// Pretty-printed [`Snapshot`] of both collections.
pub fn snapshot_json(
  people: &[Person],
  log: &[LogEntry],
  exported_at: DateTime<Utc>,
) -> Result<String> {
  let snapshot = Snapshot {
    users:       people.to_vec(),
    access_log:  log.to_vec(),
    export_date: exported_at,
  };
  Ok(serde_json::to_string_pretty(&snapshot)?)
}

/// Download name for a snapshot taken on `day`.
pub fn snapshot_file_name(day: NaiveDate) -> String {
  format!("turnstile-{}.json", day.format("%Y-%m-%d"))
}
