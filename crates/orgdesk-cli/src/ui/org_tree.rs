//! Organization tree pane — left panel.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use super::border_style;
use crate::app::{App, Screen};

/// Render the tree into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let rows = app.rows();
  let total: usize = app.tree.iter().map(|n| n.subtree_len()).sum();

  let title = if app.filter_active || !app.filter.is_empty() {
    let shown: usize = app.view.iter().map(|n| n.subtree_len()).sum();
    format!(" Organization ({shown}/{total}) ")
  } else {
    format!(" Organization ({total}) ")
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(border_style(app.screen == Screen::Tree));

  let selected = app.selected_key.as_deref();
  let items: Vec<ListItem> = rows
    .iter()
    .map(|row| {
      let node = row.node;
      let marker = match (node.has_children(), row.expanded) {
        (false, _) => "  ",
        (true, true) => "▾ ",
        (true, false) => "▸ ",
      };

      let mut style = if node.is_corp() {
        Style::default().add_modifier(Modifier::BOLD)
      } else {
        Style::default()
      };
      if node.disabled {
        style = style.fg(Color::DarkGray);
      }
      if selected == Some(node.key.as_str()) {
        style = style.fg(Color::Cyan);
      }

      ListItem::new(Line::from(vec![
        Span::raw("  ".repeat(node.level)),
        Span::styled(marker, Style::default().fg(Color::DarkGray)),
        Span::styled(node.title.clone(), style),
      ]))
    })
    .collect();

  let mut inner_area = block.inner(area);
  f.render_widget(block, area);

  // Filter bar on the last inner line.
  if (app.filter_active || !app.filter.is_empty()) && inner_area.height > 2 {
    let filter_area = Rect {
      y: inner_area.y + inner_area.height - 1,
      height: 1,
      ..inner_area
    };
    inner_area.height -= 1;

    let filter_text = if app.filter_active {
      format!("/{}_", app.filter)
    } else {
      format!("/{}", app.filter)
    };
    f.render_widget(
      Paragraph::new(filter_text).style(Style::default().fg(Color::Yellow)),
      filter_area,
    );
  }

  if rows.is_empty() {
    let msg = if app.tree.is_empty() {
      "No organization data."
    } else {
      "No matches."
    };
    f.render_widget(
      Paragraph::new(msg).style(Style::default().fg(Color::DarkGray)),
      inner_area,
    );
    return;
  }

  let mut state = ListState::default();
  state.select(Some(app.cursor));

  f.render_stateful_widget(
    List::new(items).highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    inner_area,
    &mut state,
  );
}
