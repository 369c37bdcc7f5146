//! Person: a registered attendee.
//!
//! A person carries the code they present at the door. The only mutation a
//! person ever sees after creation is the active/inactive toggle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered attendee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
  pub id:         Uuid,
  /// Trimmed display name; never empty.
  pub name:       String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email:      Option<String>,
  /// Identity token presented at check-in. Unique within a directory.
  pub code:       String,
  pub created_at: DateTime<Utc>,
  /// Inactive people are never matched by the decision engine.
  pub active:     bool,
}

/// Input to [`crate::directory::DirectoryStore::add`] and
/// [`crate::directory::DirectoryStore::bulk_add`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPerson {
  pub name:  String,
  #[serde(default)]
  pub email: Option<String>,
}

impl NewPerson {
  pub fn new(name: impl Into<String>, email: Option<String>) -> Self {
    Self { name: name.into(), email }
  }

  /// The trimmed name, or `None` if nothing is left after trimming.
  pub fn trimmed_name(&self) -> Option<&str> {
    let name = self.name.trim();
    (!name.is_empty()).then_some(name)
  }

  /// The trimmed email; blank input collapses to `None`.
  pub fn trimmed_email(&self) -> Option<&str> {
    self
      .email
      .as_deref()
      .map(str::trim)
      .filter(|e| !e.is_empty())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn blank_fields_collapse() {
    let p = NewPerson::new("   ", Some("  ".into()));
    assert_eq!(p.trimmed_name(), None);
    assert_eq!(p.trimmed_email(), None);

    let p = NewPerson::new(" Ana ", Some(" ana@example.com ".into()));
    assert_eq!(p.trimmed_name(), Some("Ana"));
    assert_eq!(p.trimmed_email(), Some("ana@example.com"));
  }

  #[test]
  fn serializes_camel_case_without_empty_email() {
    let person = Person {
      id:         Uuid::nil(),
      name:       "Ana".into(),
      email:      None,
      code:       "ACC-000001-QW5h".into(),
      created_at: DateTime::UNIX_EPOCH,
      active:     true,
    };
    let json = serde_json::to_value(&person).unwrap();
    assert!(json.get("createdAt").is_some());
    assert!(json.get("email").is_none());

    let back: Person = serde_json::from_value(json).unwrap();
    assert_eq!(back, person);
  }
}
