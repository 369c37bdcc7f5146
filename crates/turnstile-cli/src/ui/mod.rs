//! TUI rendering: orchestrates all panes.

pub mod log;
pub mod people;
pub mod scan;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph},
};

use crate::app::{App, Mode, Tab};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let area = f.area();

  // Vertical stack: header, body, status bar.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], app);
  match app.tab {
    Tab::Scan => scan::draw(f, rows[1], app),
    Tab::People => people::draw(f, rows[1], app),
    Tab::Log => log::draw(f, rows[1], app),
  }
  draw_status(f, rows[2], app);
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let date = Local::now().format("%Y-%m-%d %H:%M").to_string();

  let mut spans = vec![Span::styled(
    " turnstile ",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  )];
  for tab in Tab::ALL {
    let style = if tab == app.tab {
      Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
    } else {
      Style::default().fg(Color::Gray)
    };
    spans.push(Span::raw(" "));
    spans.push(Span::styled(format!(" {} ", tab.title()), style));
  }

  let right = Span::styled(format!("{date} "), Style::default().fg(Color::Gray));
  let used: usize = spans.iter().map(|s| s.content.chars().count()).sum();
  let pad = (area.width as usize)
    .saturating_sub(used)
    .saturating_sub(right.content.chars().count());
  spans.push(Span::raw(" ".repeat(pad)));
  spans.push(right);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(Line::from(spans)), inner);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = match (&app.tab, &app.mode) {
    (Tab::Scan, _) if app.session.is_some() => (
      "SCAN",
      "type/scan a code + Enter  ^S stop reader  ↑↓ pick  Enter on empty simulates  Tab next  ^Q quit",
    ),
    (Tab::Scan, _) => (
      "SCAN OFF",
      "^S start reader  ↑↓ pick  Enter simulates  Tab next  ^Q quit",
    ),
    (Tab::People, Mode::Filter) => ("SEARCH", "Type to filter  Esc clear  Enter keep"),
    (Tab::People, Mode::AddName(_)) => ("ADD", "Name, then Enter  Esc cancel"),
    (Tab::People, Mode::AddEmail { .. }) => ("ADD", "Email (optional), then Enter  Esc cancel"),
    (Tab::People, Mode::ConfirmDelete(_)) => ("DELETE", "y confirm  any other key cancels"),
    (Tab::People, Mode::Normal) => (
      "PEOPLE",
      "↑↓/jk move  / search  a add  t toggle  d delete  Tab next  q quit",
    ),
    (Tab::Log, _) => ("LOG", "^R refresh  Tab next  q quit"),
  };

  let status = if app.status_msg.is_empty() {
    hints.to_string()
  } else {
    app.status_msg.clone()
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(format!("  {status}"), Style::default().fg(Color::Gray));

  let line = Line::from(vec![mode_span, hint_span]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}

/// Colour for a decision: green when granted, red when denied.
fn decision_color(granted: bool) -> Color {
  if granted { Color::Green } else { Color::Red }
}
