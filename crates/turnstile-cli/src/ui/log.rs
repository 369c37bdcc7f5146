//! Log tab: headline numbers and the most recent decisions.

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Row, Table},
};

use super::decision_color;
use crate::app::App;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Length(3), Constraint::Min(0)])
    .split(area);

  draw_stats(f, rows[0], app);
  draw_entries(f, rows[1], app);
}

fn draw_stats(f: &mut Frame, area: Rect, app: &App) {
  let s = &app.stats;
  let label = Style::default().fg(Color::DarkGray);
  let value = Style::default().add_modifier(Modifier::BOLD);
  let line = Line::from(vec![
    Span::styled(" People ", label),
    Span::styled(format!("{}/{}", s.active_people, s.people), value),
    Span::styled("   Granted ", label),
    Span::styled(s.granted.to_string(), value.fg(Color::Green)),
    Span::styled("   Denied ", label),
    Span::styled(s.denied.to_string(), value.fg(Color::Red)),
    Span::styled("   Today ", label),
    Span::styled(s.today.to_string(), value),
  ]);
  let block = Block::default()
    .title(" Stats ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  f.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_entries(f: &mut Frame, area: Rect, app: &App) {
  let rows: Vec<Row> = app
    .log
    .iter()
    .map(|e| {
      let local = e.timestamp.with_timezone(&Local);
      Row::new(vec![
        Line::from(local.format("%Y-%m-%d %H:%M:%S").to_string()),
        Line::from(Span::styled(
          e.decision.label(),
          Style::default().fg(decision_color(e.is_granted())),
        )),
        Line::from(e.person_name.clone()),
        Line::from(Span::styled(e.presented_code.clone(), Style::default().fg(Color::DarkGray))),
      ])
    })
    .collect();

  let widths = [
    Constraint::Length(20),
    Constraint::Length(8),
    Constraint::Percentage(40),
    Constraint::Percentage(40),
  ];
  let header = Row::new(vec!["When", "Decision", "Name", "Code"])
    .style(Style::default().add_modifier(Modifier::BOLD));
  let block = Block::default()
    .title(format!(" Recent ({}) ", app.log.len()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  f.render_widget(Table::new(rows, widths).header(header).block(block), area);
}
