//! The decision engine: presented code in, log entry out.
//!
//! A code is granted if and only if it exactly matches an active person.
//! There is no scoring, rate limiting, or time-window check. The engine never
//! appends to the access log itself; callers do that.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  directory::CodeLookup,
  log::{Decision, LogEntry, UNKNOWN_PERSON},
};

/// Evaluate `code` against `directory` at the current time.
pub fn evaluate<D>(code: &str, directory: &D) -> LogEntry
where
  D: CodeLookup + ?Sized,
{
  evaluate_at(code, directory, Utc::now())
}

/// Evaluate `code` against `directory`, stamping the entry with `at`.
pub fn evaluate_at<D>(code: &str, directory: &D, at: DateTime<Utc>) -> LogEntry
where
  D: CodeLookup + ?Sized,
{
  let matched = directory.find_by_code(code);
  let entry = LogEntry {
    id:             Uuid::new_v4(),
    person_id:      matched.map(|p| p.id),
    person_name:    matched
      .map(|p| p.name.clone())
      .unwrap_or_else(|| UNKNOWN_PERSON.to_owned()),
    presented_code: code.to_owned(),
    timestamp:      at,
    decision:       if matched.is_some() {
      Decision::Granted
    } else {
      Decision::Denied
    },
  };

  tracing::info!(
    code = %entry.presented_code,
    decision = %entry.decision,
    person = %entry.person_name,
    "code evaluated"
  );
  entry
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;
  use crate::person::Person;

  fn person(name: &str, code: &str, active: bool) -> Person {
    Person {
      id: Uuid::new_v4(),
      name: name.into(),
      email: None,
      code: code.into(),
      created_at: Utc.timestamp_opt(0, 0).unwrap(),
      active,
    }
  }

  fn roster() -> Vec<Person> {
    vec![
      person("Juan Pérez", "ACC-001-XXXX", true),
      person("María García", "ACC-002-YYYY", false),
    ]
  }

  #[test]
  fn active_match_is_granted() {
    let people = roster();
    let entry = evaluate("ACC-001-XXXX", people.as_slice());
    assert_eq!(entry.decision, Decision::Granted);
    assert_eq!(entry.person_name, "Juan Pérez");
    assert_eq!(entry.person_id, Some(people[0].id));
    assert_eq!(entry.presented_code, "ACC-001-XXXX");
  }

  #[test]
  fn inactive_match_is_denied() {
    let people = roster();
    let entry = evaluate("ACC-002-YYYY", people.as_slice());
    assert_eq!(entry.decision, Decision::Denied);
    assert_eq!(entry.person_id, None);
    assert_eq!(entry.person_name, UNKNOWN_PERSON);
  }

  #[test]
  fn unknown_code_is_denied() {
    let entry = evaluate("ACC-999-ZZZZ", roster().as_slice());
    assert_eq!(entry.decision, Decision::Denied);
    assert_eq!(entry.person_id, None);
    assert_eq!(entry.person_name, "unknown");
  }

  #[test]
  fn same_snapshot_same_decision() {
    let people = roster();
    let at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    for code in ["ACC-001-XXXX", "ACC-002-YYYY", "nope"] {
      let a = evaluate_at(code, people.as_slice(), at);
      let b = evaluate_at(code, people.as_slice(), at);
      assert_eq!(a.decision, b.decision);
      assert_eq!(a.person_id, b.person_id);
      assert_eq!(a.person_name, b.person_name);
      assert_ne!(a.id, b.id);
    }
  }

  #[test]
  fn empty_code_is_denied() {
    let entry = evaluate("", roster().as_slice());
    assert!(!entry.is_granted());
  }
}
