//! Application state machine and event dispatcher.

use std::{
  io::Write as _,
  sync::Arc,
  time::{Duration, Instant},
};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use turnstile_core::{
  access_log::Stats,
  log::LogEntry,
  person::{NewPerson, Person},
  scanner::ScanSession,
};
use uuid::Uuid;

use crate::{client::ApiClient, source::KeyboardWedge};

/// How long a decision stays on screen.
pub const BANNER_TTL: Duration = Duration::from_secs(3);

/// Log entries fetched for the Log tab.
const LOG_PAGE: usize = 100;

// ─── Tabs and modes ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
  Scan,
  People,
  Log,
}

impl Tab {
  pub const ALL: [Tab; 3] = [Tab::Scan, Tab::People, Tab::Log];

  pub fn title(self) -> &'static str {
    match self {
      Tab::Scan => "Scan",
      Tab::People => "People",
      Tab::Log => "Log",
    }
  }

  fn next(self) -> Self {
    match self {
      Tab::Scan => Tab::People,
      Tab::People => Tab::Log,
      Tab::Log => Tab::Scan,
    }
  }
}

/// What keystrokes on the People tab currently mean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
  Normal,
  Filter,
  AddName(String),
  AddEmail { name: String, email: String },
  ConfirmDelete(Uuid),
}

/// The last decision, shown for [`BANNER_TTL`].
pub struct Banner {
  pub entry:    LogEntry,
  pub shown_at: Instant,
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  pub tab:  Tab,
  pub mode: Mode,

  /// Everyone in the directory, as of the last refresh.
  pub people: Vec<Person>,
  /// Most recent decisions first.
  pub log:    Vec<LogEntry>,
  pub stats:  Stats,

  /// Open while the reader is running; only ever on the Scan tab.
  pub session: Option<ScanSession<KeyboardWedge>>,
  /// Cursor within the active people on the Scan tab.
  pub scan_cursor: usize,
  pub banner: Option<Banner>,

  /// Current fuzzy-filter string for the People tab.
  pub filter: String,
  /// Cursor position within the *filtered* people list.
  pub people_cursor: usize,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  /// Shared HTTP client.
  pub client: Arc<ApiClient>,
}

impl App {
  pub fn new(client: ApiClient) -> Self {
    let mut app = Self {
      tab: Tab::People,
      mode: Mode::Normal,
      people: Vec::new(),
      log: Vec::new(),
      stats: Stats::default(),
      session: None,
      scan_cursor: 0,
      banner: None,
      filter: String::new(),
      people_cursor: 0,
      status_msg: String::new(),
      client: Arc::new(client),
    };
    app.set_tab(Tab::Scan);
    app
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Re-fetch people, the recent log, and the stats.
  pub async fn refresh(&mut self) -> anyhow::Result<()> {
    self.status_msg = "Loading…".into();
    let people = self.client.list_people().await;
    let log = self.client.recent_log(LOG_PAGE).await;
    let stats = self.client.stats().await;
    match (people, log, stats) {
      (Ok(people), Ok(log), Ok(stats)) => {
        self.people = people;
        self.log = log;
        self.stats = stats;
        self.clamp_cursors();
        self.status_msg.clear();
        Ok(())
      }
      (Err(e), _, _) | (_, Err(e), _) | (_, _, Err(e)) => {
        self.status_msg = format!("Error: {e}");
        Err(e)
      }
    }
  }

  fn clamp_cursors(&mut self) {
    let active = self.active_people().len();
    self.scan_cursor = self.scan_cursor.min(active.saturating_sub(1));
    let filtered = self.filtered_people().len();
    self.people_cursor = self.people_cursor.min(filtered.saturating_sub(1));
  }

  // ── Views ─────────────────────────────────────────────────────────────────

  pub fn active_people(&self) -> Vec<&Person> {
    self.people.iter().filter(|p| p.active).collect()
  }

  /// People matching the current filter query by name, email, or code.
  pub fn filtered_people(&self) -> Vec<&Person> {
    if self.filter.is_empty() {
      return self.people.iter().collect();
    }
    let matcher = SkimMatcherV2::default();
    self
      .people
      .iter()
      .filter(|p| {
        matcher.fuzzy_match(&p.name, &self.filter).is_some()
          || matcher.fuzzy_match(&p.code, &self.filter).is_some()
          || p
            .email
            .as_deref()
            .is_some_and(|e| matcher.fuzzy_match(e, &self.filter).is_some())
      })
      .collect()
  }

  pub fn cursor_person(&self) -> Option<&Person> {
    self.filtered_people().get(self.people_cursor).copied()
  }

  /// The banner, if it has not expired yet.
  pub fn live_banner(&self) -> Option<&Banner> {
    self
      .banner
      .as_ref()
      .filter(|b| b.shown_at.elapsed() < BANNER_TTL)
  }

  /// Text typed into the keyboard wedge since the last Enter.
  pub fn wedge_buffer(&self) -> Option<&str> {
    self.session.as_ref().map(|s| s.source().buffer())
  }

  // ── Tabs ──────────────────────────────────────────────────────────────────

  /// Switch tabs. Entering Scan starts the reader; leaving it stops it.
  pub fn set_tab(&mut self, tab: Tab) {
    if self.tab == Tab::Scan && tab != Tab::Scan {
      self.stop_reader();
    }
    if tab == Tab::Scan {
      self.start_reader();
    }
    self.tab = tab;
    self.mode = Mode::Normal;
  }

  // ── Reader ────────────────────────────────────────────────────────────────

  /// Acquire the keyboard wedge, unless a session is already open.
  pub fn start_reader(&mut self) {
    if self.session.is_some() {
      return;
    }
    match ScanSession::start(KeyboardWedge::new()) {
      Ok(session) => self.session = Some(session),
      Err(e) => self.status_msg = format!("Error: {e}"),
    }
  }

  /// Release the wedge. Anything typed but not submitted is discarded.
  pub fn stop_reader(&mut self) { self.session = None; }

  fn toggle_reader(&mut self) {
    if self.session.is_some() {
      self.stop_reader();
      self.status_msg = "Reader stopped".into();
    } else {
      self.start_reader();
      self.status_msg = "Reader started".into();
    }
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q')) {
      return Ok(false);
    }
    if key.code == KeyCode::Tab && self.mode == Mode::Normal {
      self.set_tab(self.tab.next());
      return Ok(true);
    }
    if ctrl && key.code == KeyCode::Char('r') {
      self.refresh().await.ok();
      return Ok(true);
    }

    match self.tab {
      Tab::Scan => self.handle_scan_key(key).await,
      Tab::People => self.handle_people_key(key).await,
      Tab::Log => Ok(self.handle_log_key(key)),
    }
  }

  async fn handle_scan_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    for code in self.scan_key(key) {
      self.submit_code(&code).await;
    }
    Ok(true)
  }

  /// Apply a Scan tab keystroke and return the codes it produced, in order.
  ///
  /// Enter with nothing typed simulates a scan of the highlighted person,
  /// whether or not the reader is running.
  fn scan_key(&mut self, key: KeyEvent) -> Vec<String> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
      if key.code == KeyCode::Char('s') {
        self.toggle_reader();
      }
      return Vec::new();
    }
    match key.code {
      KeyCode::Down => {
        if self.scan_cursor + 1 < self.active_people().len() {
          self.scan_cursor += 1;
        }
      }
      KeyCode::Up => self.scan_cursor = self.scan_cursor.saturating_sub(1),
      KeyCode::Enter => {
        let typed = self
          .session
          .as_mut()
          .is_some_and(|s| s.source_mut().submit());
        if typed {
          return self.drain_wedge();
        }
        return self
          .active_people()
          .get(self.scan_cursor)
          .map(|p| vec![p.code.clone()])
          .unwrap_or_default();
      }
      code => {
        if let Some(wedge) = self.session.as_mut().map(ScanSession::source_mut) {
          match code {
            KeyCode::Char(c) => wedge.push(c),
            KeyCode::Backspace => wedge.backspace(),
            KeyCode::Esc => wedge.clear(),
            _ => {}
          }
        }
      }
    }
    Vec::new()
  }

  /// Every complete code the wedge has queued.
  fn drain_wedge(&mut self) -> Vec<String> {
    let mut codes = Vec::new();
    let Some(session) = self.session.as_mut() else {
      return codes;
    };
    loop {
      match session.next_code() {
        Ok(Some(code)) => codes.push(code),
        Ok(None) => return codes,
        Err(e) => {
          self.status_msg = format!("Error: {e}");
          return codes;
        }
      }
    }
  }

  async fn submit_code(&mut self, code: &str) {
    match self.client.scan(code).await {
      Ok(entry) => {
        alert(entry.decision.alert_pattern()).await;
        self.banner = Some(Banner { entry, shown_at: Instant::now() });
        self.refresh().await.ok();
      }
      Err(e) => self.status_msg = format!("Error: {e}"),
    }
  }

  async fn handle_people_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match std::mem::replace(&mut self.mode, Mode::Normal) {
      Mode::Normal => return self.handle_people_normal_key(key).await,
      Mode::Filter => match key.code {
        KeyCode::Esc => {
          self.filter.clear();
          self.people_cursor = 0;
        }
        KeyCode::Enter => self.people_cursor = 0,
        KeyCode::Backspace => {
          self.filter.pop();
          self.people_cursor = 0;
          self.mode = Mode::Filter;
        }
        KeyCode::Char(c) => {
          self.filter.push(c);
          self.people_cursor = 0;
          self.mode = Mode::Filter;
        }
        _ => self.mode = Mode::Filter,
      },
      Mode::AddName(mut name) => match key.code {
        KeyCode::Esc => {}
        KeyCode::Enter if !name.trim().is_empty() => {
          self.mode = Mode::AddEmail { name, email: String::new() };
        }
        KeyCode::Backspace => {
          name.pop();
          self.mode = Mode::AddName(name);
        }
        KeyCode::Char(c) => {
          name.push(c);
          self.mode = Mode::AddName(name);
        }
        _ => self.mode = Mode::AddName(name),
      },
      Mode::AddEmail { name, mut email } => match key.code {
        KeyCode::Esc => {}
        KeyCode::Enter => {
          let email = Some(email).filter(|e| !e.trim().is_empty());
          match self.client.add_person(&NewPerson::new(name, email)).await {
            Ok(p) => {
              self.status_msg = format!("Added {} ({})", p.name, p.code);
              self.refresh().await.ok();
            }
            Err(e) => self.status_msg = format!("Error: {e}"),
          }
        }
        KeyCode::Backspace => {
          email.pop();
          self.mode = Mode::AddEmail { name, email };
        }
        KeyCode::Char(c) => {
          email.push(c);
          self.mode = Mode::AddEmail { name, email };
        }
        _ => self.mode = Mode::AddEmail { name, email },
      },
      Mode::ConfirmDelete(id) => {
        if key.code == KeyCode::Char('y') {
          match self.client.remove_person(id).await {
            Ok(()) => {
              self.status_msg = "Removed".into();
              self.refresh().await.ok();
            }
            Err(e) => self.status_msg = format!("Error: {e}"),
          }
        } else {
          self.status_msg.clear();
        }
      }
    }
    Ok(true)
  }

  async fn handle_people_normal_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Char('q') => return Ok(false),

      KeyCode::Down | KeyCode::Char('j') => {
        if self.people_cursor + 1 < self.filtered_people().len() {
          self.people_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.people_cursor = self.people_cursor.saturating_sub(1);
      }

      KeyCode::Char('/') => {
        self.mode = Mode::Filter;
        self.filter.clear();
        self.people_cursor = 0;
      }
      KeyCode::Char('a') => self.mode = Mode::AddName(String::new()),
      KeyCode::Char('t') => {
        if let Some(id) = self.cursor_person().map(|p| p.id) {
          match self.client.toggle_person(id).await {
            Ok(p) => {
              let state = if p.active { "active" } else { "inactive" };
              self.status_msg = format!("{} is now {state}", p.name);
              self.refresh().await.ok();
            }
            Err(e) => self.status_msg = format!("Error: {e}"),
          }
        }
      }
      KeyCode::Char('d') => {
        if let Some((id, name)) = self.cursor_person().map(|p| (p.id, p.name.clone())) {
          self.status_msg = format!("Delete {name}? [y/N]");
          self.mode = Mode::ConfirmDelete(id);
        }
      }
      _ => {}
    }
    Ok(true)
  }

  fn handle_log_key(&mut self, key: KeyEvent) -> bool { key.code != KeyCode::Char('q') }
}

/// Ring the terminal bell once per pulse in `pattern` (pulse, pause, pulse…).
async fn alert(pattern: &[u32]) {
  let mut out = std::io::stdout();
  for (i, &ms) in pattern.iter().enumerate() {
    if i % 2 == 0 {
      out.write_all(b"\x07").ok();
      out.flush().ok();
    } else {
      tokio::time::sleep(Duration::from_millis(ms.into())).await;
    }
  }
}
