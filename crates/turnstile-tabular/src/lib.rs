//! Tabular import/export for Turnstile.
//!
//! Converts between delimited text (CSV, as saved by any spreadsheet) and
//! [`turnstile_core`] records. Pure synchronous; no HTTP or database
//! dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! use turnstile_tabular::import_people;
//!
//! let sheet = "Nombre,Correo\nAna Ruiz,ana@example.com\n,orphan@example.com\n";
//! let imported = import_people(sheet.as_bytes()).unwrap();
//! println!("{} rows, {} skipped", imported.rows.len(), imported.skipped);
//! ```

pub mod error;
mod export;
mod import;

pub use error::{Error, Result};
pub use export::{Snapshot, log_csv, people_csv, snapshot_file_name, snapshot_json};
pub use import::{ImportedRows, import_people};

/// Example sheet with the two recognised headers and sample rows.
pub const TEMPLATE_CSV: &str = "\
Nombre,Email
Juan Pérez,juan@ejemplo.com
María García,maria@ejemplo.com
Ana López,
";
