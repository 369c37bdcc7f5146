//! Identity codec: derives the textual code an attendee presents.
//!
//! A code looks like `ACC-482913-anVhbkBl`: a fixed prefix, the low six
//! digits of a millisecond timestamp, and the first eight characters of the
//! base64 encoding of the attendee's email (or name, when there is no email).
//! Bulk imports append the row index (`ACC-482913-anVhbkBl-7`).
//!
//! Codes are short and human-scannable, not secret. Uniqueness is enforced by
//! [`crate::directory::DirectoryStore`], which regenerates on collision.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};

pub const CODE_PREFIX: &str = "ACC";

const FRAGMENT_LEN: usize = 8;
const STAMP_MODULUS: i64 = 1_000_000;

/// Build a code for `name`/`email` at `stamp`.
///
/// Callers must reject a blank name before calling; the codec does not
/// validate.
pub fn generate_code(
  name: &str,
  email: Option<&str>,
  stamp: DateTime<Utc>,
  row: Option<usize>,
) -> String {
  let source = email
    .map(str::trim)
    .filter(|e| !e.is_empty())
    .unwrap_or_else(|| name.trim());
  let disambiguator = stamp.timestamp_millis().rem_euclid(STAMP_MODULUS);

  let mut code =
    format!("{CODE_PREFIX}-{disambiguator:06}-{}", fragment(source));
  if let Some(row) = row {
    code.push_str(&format!("-{row}"));
  }
  code
}

/// Code for the `seq`-th entry of the fixed demo roster.
pub fn demo_code(seq: u32, email: &str) -> String {
  format!("{CODE_PREFIX}-{seq:03}-{}", fragment(email))
}

fn fragment(source: &str) -> String {
  STANDARD.encode(source).chars().take(FRAGMENT_LEN).collect()
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn at(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis).unwrap()
  }

  #[test]
  fn email_takes_precedence_over_name() {
    let code = generate_code("Juan", Some("juan@ejemplo.com"), at(1_700_000_123_456), None);
    assert_eq!(code, "ACC-123456-anVhbkBl");
  }

  #[test]
  fn blank_email_falls_back_to_name() {
    let with_blank = generate_code("Juan Pérez", Some("  "), at(5), None);
    let without    = generate_code("Juan Pérez", None, at(5), None);
    assert_eq!(with_blank, without);
    assert_eq!(without, "ACC-000005-SnVhbiBQ");
  }

  #[test]
  fn row_index_is_appended() {
    let a = generate_code("Ana", None, at(42), Some(0));
    let b = generate_code("Ana", None, at(42), Some(1));
    assert_ne!(a, b);
    assert!(a.ends_with("-0"));
    assert!(b.ends_with("-1"));
  }

  #[test]
  fn short_sources_yield_short_fragments() {
    let code = generate_code("Al", None, at(0), None);
    assert_eq!(code, "ACC-000000-QWw=");
  }

  #[test]
  fn same_inputs_same_code() {
    let a = generate_code("Ana", Some("ana@example.com"), at(99), None);
    let b = generate_code("Ana", Some("ana@example.com"), at(99), None);
    assert_eq!(a, b);
  }

  #[test]
  fn demo_codes_match_roster_format() {
    assert_eq!(demo_code(1, "juan@ejemplo.com"), "ACC-001-anVhbkBl");
    assert_eq!(demo_code(2, "maria@ejemplo.com"), "ACC-002-bWFyaWFA");
  }
}
