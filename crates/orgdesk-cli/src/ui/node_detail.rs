//! Node detail pane — right panel.

use orgdesk_core::tree::OrgNode;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use super::border_style;
use crate::app::{App, Screen};

// ─── Public entry ─────────────────────────────────────────────────────────────

/// Render `node` and, for departments, its staff into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App, node: &OrgNode) {
  let block = Block::default()
    .title(format!(" {} ", node.title))
    .borders(Borders::ALL)
    .border_style(border_style(app.screen == Screen::Detail));

  let inner = block.inner(area);
  f.render_widget(block, area);

  let mut lines = vec![
    field("kind", if node.is_corp() { "corporation" } else { "department" }),
    field("id", &node.id),
  ];
  if !node.is_corp() {
    lines.push(field("corporation", &corporation(node)));
  }
  if !node.path.is_empty() {
    lines.push(field("path", &node.path));
  }
  if node.has_children() {
    lines.push(field("units", &node.children.len().to_string()));
  }
  if node.disabled {
    lines.push(Line::from(Span::styled(
      "disabled",
      Style::default().fg(Color::Red),
    )));
  }

  if node.is_corp() {
    f.render_widget(Paragraph::new(lines), inner);
    return;
  }

  lines.push(Line::from(""));
  lines.push(Line::from(Span::styled(
    "Staff",
    Style::default()
      .fg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  )));

  if app.staff_loading {
    lines.push(dim("loading…"));
  } else if app.staff.is_empty() {
    lines.push(dim("No staff."));
  }
  for person in app.staff.iter().skip(app.detail_scroll) {
    let mut spans = vec![
      Span::styled(
        if person.is_primary { "* " } else { "  " },
        Style::default().fg(Color::Yellow),
      ),
      Span::raw(format!("{:<24}", person.name)),
    ];
    if let Some(title) = &person.job_title {
      spans.push(Span::styled(
        title.clone(),
        Style::default().fg(Color::DarkGray),
      ));
    }
    lines.push(Line::from(spans));
  }

  // Only the staff list scrolls; the fields above stay put.
  f.render_widget(Paragraph::new(lines), inner);
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn corporation(node: &OrgNode) -> String {
  match (node.corp_name.is_empty(), node.corp_id.is_empty()) {
    (false, false) => format!("{} ({})", node.corp_name, node.corp_id),
    (false, true) => node.corp_name.clone(),
    (true, false) => node.corp_id.clone(),
    (true, true) => "—".to_string(),
  }
}

fn field(label: &str, value: &str) -> Line<'static> {
  Line::from(vec![
    Span::styled(
      format!("{label:<14}"),
      Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    ),
    Span::raw(value.to_string()),
  ])
}

fn dim(text: &'static str) -> Line<'static> {
  Line::from(Span::styled(text, Style::default().fg(Color::DarkGray)))
}
