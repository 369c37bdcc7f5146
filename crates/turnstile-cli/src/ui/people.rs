//! People tab: the directory with a fuzzy filter.

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Row, Table, TableState},
};

use crate::app::{App, Mode};

/// Render the people table into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let filtered = app.filtered_people();
  let total = app.people.len();

  let title = if app.mode == Mode::Filter || !app.filter.is_empty() {
    format!(" People ({}/{}) ", filtered.len(), total)
  } else {
    format!(" People ({total}) ")
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let mut inner_area = block.inner(area);
  f.render_widget(block, area);

  // Bottom line: filter or add prompt.
  let prompt = match &app.mode {
    Mode::Filter => Some(format!("/{}_", app.filter)),
    Mode::AddName(name) => Some(format!("Name: {name}_")),
    Mode::AddEmail { name, email } => Some(format!("{name}  Email: {email}_")),
    _ if !app.filter.is_empty() => Some(format!("/{}", app.filter)),
    _ => None,
  };
  if let Some(text) = prompt
    && inner_area.height > 2
  {
    let prompt_area = Rect {
      x:      inner_area.x,
      y:      inner_area.y + inner_area.height - 1,
      width:  inner_area.width,
      height: 1,
    };
    inner_area.height = inner_area.height.saturating_sub(1);
    f.render_widget(
      Paragraph::new(text).style(Style::default().fg(Color::Yellow)),
      prompt_area,
    );
  }

  let rows: Vec<Row> = filtered
    .iter()
    .map(|p| {
      let (status, color) = if p.active {
        ("Active", Color::Green)
      } else {
        ("Inactive", Color::DarkGray)
      };
      Row::new(vec![
        Line::from(p.name.clone()),
        Line::from(p.email.clone().unwrap_or_default()),
        Line::from(Span::styled(p.code.clone(), Style::default().fg(Color::Cyan))),
        Line::from(Span::styled(status, Style::default().fg(color))),
        Line::from(p.created_at.with_timezone(&Local).format("%Y-%m-%d").to_string()),
      ])
    })
    .collect();

  let widths = [
    Constraint::Percentage(28),
    Constraint::Percentage(28),
    Constraint::Percentage(22),
    Constraint::Length(9),
    Constraint::Length(11),
  ];

  let header = Row::new(vec!["Name", "Email", "Code", "Status", "Registered"])
    .style(Style::default().add_modifier(Modifier::BOLD));

  let mut state = TableState::default();
  state.select((!filtered.is_empty()).then_some(app.people_cursor));

  f.render_stateful_widget(
    Table::new(rows, widths).header(header).row_highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    inner_area,
    &mut state,
  );
}
