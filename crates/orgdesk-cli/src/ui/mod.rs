//! TUI rendering: header, tree pane, detail pane, status bar.

pub mod node_detail;
pub mod org_tree;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use crate::app::{App, Screen};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(f.area());

  draw_header(f, rows[0]);
  draw_body(f, rows[1], app);
  draw_status(f, rows[2], app);
}

/// Border colour of a pane, brighter when it has focus.
fn border_style(focused: bool) -> Style {
  if focused {
    Style::default().fg(Color::Cyan)
  } else {
    Style::default().fg(Color::DarkGray)
  }
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect) {
  let date = Local::now().format("%Y-%m-%d").to_string();

  let left = Span::styled(
    " orgdesk  [/] search  [r] reload  [q] quit",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let right = Span::styled(
    format!("{date} "),
    Style::default().fg(Color::DarkGray),
  );

  let pad = area
    .width
    .saturating_sub(left.width() as u16)
    .saturating_sub(right.width() as u16);

  let line = Line::from(vec![
    left,
    Span::raw(" ".repeat(pad as usize)),
    right,
  ]);

  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::DarkGray)),
    area,
  );
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body(f: &mut Frame, area: Rect, app: &App) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
    .split(area);

  org_tree::draw(f, cols[0], app);

  match app.selected_node() {
    Some(node) => node_detail::draw(f, cols[1], app, node),
    None => draw_empty_detail(f, cols[1]),
  }
}

fn draw_empty_detail(f: &mut Frame, area: Rect) {
  let block = Block::default()
    .title(" Detail ")
    .borders(Borders::ALL)
    .border_style(border_style(false));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(
    Paragraph::new("Move to a node to see its details.")
      .style(Style::default().fg(Color::DarkGray)),
    inner,
  );
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = match app.screen {
    Screen::Tree if app.filter_active => {
      ("SEARCH", "Type to filter  Esc clear  Enter done")
    }
    Screen::Tree => (
      "TREE",
      "↑↓/jk move  Enter/Space toggle  →← expand/collapse  Tab detail  q quit",
    ),
    Screen::Detail => ("DETAIL", "↑↓/jk scroll  Esc/Tab back  q quit"),
  };

  let status = if app.status_msg.is_empty() {
    hints
  } else {
    app.status_msg.as_str()
  };

  let line = Line::from(vec![
    Span::styled(
      format!(" {mode_label} "),
      Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    ),
    Span::styled(format!("  {status}"), Style::default().fg(Color::DarkGray)),
  ]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}

#[cfg(test)]
mod tests {
  use ratatui::{Terminal, backend::TestBackend};

  use super::*;

  #[test]
  fn draws_empty_app_without_panicking() {
    let client = orgdesk_client::ApiClient::new(orgdesk_client::ApiConfig {
      base_url: "http://127.0.0.1:9".into(),
      username: String::new(),
      password: String::new(),
    })
    .unwrap();
    let app = App::new(client);
    let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
    terminal.draw(|f| draw(f, &app)).unwrap();

    let text: String = terminal
      .backend()
      .buffer()
      .content
      .iter()
      .map(|c| c.symbol())
      .collect();
    assert!(text.contains("orgdesk"));
    assert!(text.contains("Move to a node"));
  }
}
