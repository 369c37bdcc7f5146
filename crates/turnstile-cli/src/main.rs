//! `turnstile`: check-in desk client for the turnstile server.
//!
//! # Usage
//!
//! ```text
//! turnstile --url http://localhost:8080 --user desk --password secret
//! turnstile --config ~/.config/turnstile/config.toml
//! turnstile scan --from codes.txt
//! turnstile import attendees.csv
//! turnstile export --format log-csv -o log.csv
//! ```

mod app;
mod client;
mod commands;
mod source;
mod ui;

use std::{io, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use commands::ExportFormat;
use crossterm::{
  event::{self, Event, KeyEventKind},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "turnstile", about = "Check-in desk for the turnstile server")]
struct Args {
  /// Path to a TOML config file (url, username, password).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the turnstile server (default: http://localhost:8080).
  #[arg(long, env = "TURNSTILE_URL")]
  url: Option<String>,

  /// API username.
  #[arg(long, env = "TURNSTILE_USER")]
  user: Option<String>,

  /// API password (plaintext).
  #[arg(long, env = "TURNSTILE_PASSWORD")]
  password: Option<String>,

  /// Without a subcommand the terminal UI starts.
  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Read codes one per line and submit each.
  Scan {
    /// File to read; `-` or omitted reads stdin.
    #[arg(long, value_name = "FILE")]
    from: Option<PathBuf>,
  },
  /// Import people from a CSV sheet.
  Import {
    file: PathBuf,
  },
  /// Download people, the log, or both.
  Export {
    #[arg(long, value_enum, default_value = "json")]
    format: ExportFormat,
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
  },
  /// Write a sample import sheet.
  Template {
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:      String,
  #[serde(default)]
  username: String,
  #[serde(default)]
  password: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  init_logging()?;

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| "http://localhost:8080".to_string()),
    username: args
      .user
      .or_else(|| (!file_cfg.username.is_empty()).then(|| file_cfg.username.clone()))
      .unwrap_or_default(),
    password: args
      .password
      .or_else(|| (!file_cfg.password.is_empty()).then(|| file_cfg.password.clone()))
      .unwrap_or_default(),
  };

  let client = ApiClient::new(api_config)?;

  match args.command {
    None => run_tui(client).await,
    Some(Command::Scan { from }) => {
      let (granted, denied) = commands::scan(&client, from).await?;
      eprintln!("{granted} granted, {denied} denied");
      Ok(())
    }
    Some(Command::Import { file }) => commands::import(&client, &file).await,
    Some(Command::Export { format, output }) => {
      commands::export(&client, format, output.as_deref()).await
    }
    Some(Command::Template { output }) => commands::template(output.as_deref()),
  }
}

/// Log to the file named by `TURNSTILE_LOG`, if set. The terminal itself is
/// owned by the UI.
fn init_logging() -> Result<()> {
  let Some(path) = std::env::var_os("TURNSTILE_LOG") else {
    return Ok(());
  };
  let file = std::fs::OpenOptions::new()
    .create(true)
    .append(true)
    .open(&path)
    .with_context(|| format!("opening log file {}", PathBuf::from(&path).display()))?;
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_ansi(false)
    .with_writer(std::sync::Mutex::new(file))
    .init();
  Ok(())
}

// ─── Terminal UI ──────────────────────────────────────────────────────────────

async fn run_tui(client: ApiClient) -> Result<()> {
  let mut app = App::new(client);

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen).context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  // Load initial data.
  let load_result = app.refresh().await;

  // Run the event loop; restore terminal even on error.
  let run_result = if load_result.is_ok() {
    run_event_loop(&mut terminal, &mut app).await
  } else {
    load_result
  };

  // Release the scanner before handing the terminal back.
  drop(app);
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(100))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    if let Some(Event::Key(key)) = maybe_event
      && key.kind == KeyEventKind::Press
      && !app.handle_key(key).await?
    {
      break;
    }
  }

  Ok(())
}
