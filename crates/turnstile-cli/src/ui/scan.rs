//! Scan tab: active people on the left, last decision on the right.

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use super::decision_color;
use crate::app::App;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
    .split(area);

  draw_roster(f, cols[0], app);
  draw_reader(f, cols[1], app);
}

fn draw_roster(f: &mut Frame, area: Rect, app: &App) {
  let active = app.active_people();
  let block = Block::default()
    .title(format!(" Active ({}) ", active.len()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let items: Vec<ListItem> = active
    .iter()
    .map(|p| {
      ListItem::new(Line::from(vec![
        Span::raw(p.name.clone()),
        Span::styled(format!("  {}", p.code), Style::default().fg(Color::DarkGray)),
      ]))
    })
    .collect();

  let mut state = ListState::default();
  state.select((!active.is_empty()).then_some(app.scan_cursor));

  f.render_stateful_widget(
    List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::Blue)
          .fg(Color::White)
          .add_modifier(Modifier::BOLD),
      ),
    area,
    &mut state,
  );
}

fn draw_reader(f: &mut Frame, area: Rect, app: &App) {
  let armed = app.session.is_some();
  let title = if armed { " Reader: on " } else { " Reader: off " };
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(if armed { Color::Cyan } else { Color::DarkGray }));
  let inner = block.inner(area);
  f.render_widget(block, area);

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Length(2), Constraint::Min(0)])
    .split(inner);

  let typed = app.wedge_buffer().unwrap_or_default();
  f.render_widget(
    Paragraph::new(format!("> {typed}_")).style(Style::default().fg(Color::Yellow)),
    rows[0],
  );

  let Some(banner) = app.live_banner() else {
    f.render_widget(
      Paragraph::new("Waiting for a code…")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray)),
      rows[1],
    );
    return;
  };

  let entry = &banner.entry;
  let color = decision_color(entry.is_granted());
  let time = entry.timestamp.with_timezone(&Local).format("%H:%M:%S");
  let lines = vec![
    Line::from(""),
    Line::from(Span::styled(
      format!(" {} ", entry.decision.label().to_uppercase()),
      Style::default()
        .fg(Color::Black)
        .bg(color)
        .add_modifier(Modifier::BOLD),
    )),
    Line::from(""),
    Line::from(Span::styled(
      entry.person_name.clone(),
      Style::default().add_modifier(Modifier::BOLD),
    )),
    Line::from(Span::styled(
      format!("{}  {time}", entry.presented_code),
      Style::default().fg(Color::DarkGray),
    )),
  ];
  f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), rows[1]);
}
