//! One-shot subcommands that run without the terminal UI.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use turnstile_core::scanner::ScanSession;

use crate::{client::ApiClient, source::LineSource};

/// Which document `export` downloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
  /// Everything, as one JSON snapshot.
  Json,
  /// The directory as CSV.
  PeopleCsv,
  /// The access log as CSV.
  LogCsv,
}

impl ExportFormat {
  fn path(self) -> &'static str {
    match self {
      ExportFormat::Json => "/export",
      ExportFormat::PeopleCsv => "/export/people.csv",
      ExportFormat::LogCsv => "/export/log.csv",
    }
  }
}

/// Submit every code read from `from` (stdin when `None` or `-`) and print
/// each decision. Returns how many were granted and denied.
pub async fn scan(client: &ApiClient, from: Option<PathBuf>) -> Result<(usize, usize)> {
  let session = ScanSession::start(LineSource::new(from)).context("opening code source")?;
  let (mut granted, mut denied) = (0, 0);
  for code in session {
    let code = code.context("reading code")?;
    let entry = client.scan(&code).await?;
    if entry.is_granted() {
      granted += 1;
    } else {
      denied += 1;
    }
    println!(
      "{:<8} {:<24} {}",
      entry.decision.label(),
      entry.person_name,
      entry.presented_code
    );
  }
  Ok((granted, denied))
}

/// Upload a sheet from `file` and print the counts.
pub async fn import(client: &ApiClient, file: &Path) -> Result<()> {
  let sheet = std::fs::read(file).with_context(|| format!("reading {}", file.display()))?;
  let result = client.import_people(sheet).await?;
  println!("Imported {} people, skipped {} rows", result.imported, result.skipped);
  for p in &result.people {
    println!("  {:<24} {}", p.name, p.code);
  }
  Ok(())
}

/// Download an export and write it to `output` (stdout when `None`).
pub async fn export(client: &ApiClient, format: ExportFormat, output: Option<&Path>) -> Result<()> {
  let body = client.download(format.path()).await?;
  write_output(&body, output)
}

/// Write the sample import sheet to `output` (stdout when `None`).
pub fn template(output: Option<&Path>) -> Result<()> {
  write_output(turnstile_tabular::TEMPLATE_CSV, output)
}

fn write_output(body: &str, output: Option<&Path>) -> Result<()> {
  match output {
    Some(path) => {
      std::fs::write(path, body).with_context(|| format!("writing {}", path.display()))?;
      eprintln!("Wrote {}", path.display());
    }
    None => print!("{body}"),
  }
  Ok(())
}
