//! Sheet → [`NewPerson`] rows.

use turnstile_core::person::NewPerson;

use crate::{Error, Result};

/// Accepted (lower-cased) headers for the name column.
const NAME_ALIASES: &[&str] = &["nombre", "name"];
/// Accepted (lower-cased) headers for the email column.
const EMAIL_ALIASES: &[&str] = &["email", "correo"];

/// Rows recovered from a sheet.
#[derive(Debug, Clone, Default)]
pub struct ImportedRows {
  /// Rows with a non-empty trimmed name, in sheet order.
  pub rows:    Vec<NewPerson>,
  /// Rows dropped because the name cell was blank or missing.
  pub skipped: usize,
}

/// Parse a sheet with a header row.
///
/// The name column is required; the email column is optional. Headers are
/// matched case-insensitively. Both comma- and semicolon-delimited files are
/// accepted, the latter being what spreadsheets write in many locales.
///
/// Any parse error aborts the whole import; nothing partial is returned.
pub fn import_people(input: &[u8]) -> Result<ImportedRows> {
  let mut reader = csv::ReaderBuilder::new()
    .delimiter(sniff_delimiter(input))
    .flexible(true)
    .trim(csv::Trim::All)
    .from_reader(input);

  let headers = reader.headers()?.clone();
  let name_col = find_column(&headers, NAME_ALIASES).ok_or(Error::MissingColumn("name"))?;
  let email_col = find_column(&headers, EMAIL_ALIASES);

  let mut imported = ImportedRows::default();
  for record in reader.records() {
    let record = record?;
    let name = record.get(name_col).unwrap_or_default().trim();
    if name.is_empty() {
      imported.skipped += 1;
      continue;
    }
    let email = email_col
      .and_then(|col| record.get(col))
      .map(str::trim)
      .filter(|e| !e.is_empty())
      .map(str::to_owned);
    imported.rows.push(NewPerson::new(name, email));
  }

  tracing::debug!(
    rows = imported.rows.len(),
    skipped = imported.skipped,
    "sheet parsed"
  );
  Ok(imported)
}

fn find_column(headers: &csv::StringRecord, aliases: &[&str]) -> Option<usize> {
  headers.iter().position(|h| {
    let h = h.trim_start_matches('\u{feff}').trim().to_lowercase();
    aliases.contains(&h.as_str())
  })
}

/// `;` if the header line uses semicolons and no commas, `,` otherwise.
fn sniff_delimiter(input: &[u8]) -> u8 {
  let header = input.split(|&b| b == b'\n').next().unwrap_or_default();
  let commas = header.iter().filter(|&&b| b == b',').count();
  let semis = header.iter().filter(|&&b| b == b';').count();
  if semis > 0 && commas == 0 { b';' } else { b',' }
}
