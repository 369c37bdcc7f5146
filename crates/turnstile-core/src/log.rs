//! Log entry types: the record of a single check-in decision.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Name recorded when a presented code matches no active person.
pub const UNKNOWN_PERSON: &str = "unknown";

/// The outcome of evaluating a presented code.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Decision {
  Granted,
  Denied,
}

impl Decision {
  pub fn is_granted(self) -> bool { matches!(self, Self::Granted) }

  /// Human-facing label used in exports.
  pub fn label(self) -> &'static str {
    match self {
      Self::Granted => "Granted",
      Self::Denied => "Denied",
    }
  }

  /// Vibration pattern in milliseconds (on, off, on, ...) for presentation
  /// layers that can buzz.
  pub fn alert_pattern(self) -> &'static [u32] {
    match self {
      Self::Granted => &[200],
      Self::Denied => &[100, 50, 100],
    }
  }
}

/// One decision, with the person's name copied in at decision time.
///
/// The access log never looks back into the directory, so renaming or
/// deleting a person leaves historical entries untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
  pub id:             Uuid,
  /// `None` when the code matched nobody.
  pub person_id:      Option<Uuid>,
  /// Snapshot of the matched name, or [`UNKNOWN_PERSON`].
  pub person_name:    String,
  /// The raw string that was evaluated.
  pub presented_code: String,
  pub timestamp:      DateTime<Utc>,
  pub decision:       Decision,
}

impl LogEntry {
  pub fn is_granted(&self) -> bool { self.decision.is_granted() }
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use super::*;

  #[test]
  fn decision_parses_case_insensitively() {
    assert_eq!(Decision::from_str("granted").unwrap(), Decision::Granted);
    assert_eq!(Decision::from_str("DENIED").unwrap(), Decision::Denied);
    assert!(Decision::from_str("maybe").is_err());
    assert_eq!(Decision::Granted.to_string(), "granted");
  }

  #[test]
  fn decision_serializes_lowercase() {
    let json = serde_json::to_string(&Decision::Denied).unwrap();
    assert_eq!(json, "\"denied\"");
  }
}
