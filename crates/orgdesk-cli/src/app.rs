//! Organization browser state machine and event dispatcher.
//!
//! Fetches run on spawned tasks and report back through a channel. Each one
//! carries a [`Ticket`]; a reply whose ticket is no longer current is dropped,
//! so moving quickly through the tree never shows a stale staff list.

use std::{collections::HashSet, sync::Arc};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use orgdesk_client::ApiClient;
use orgdesk_core::{
  directory::OrgDirectory,
  filter::filter_tree,
  model::EmployeeSummary,
  sequence::{RequestSequence, Ticket},
  tree::{
    OrgNode, VisibleRow, all_keys_with_children, default_expanded_keys,
    find_node, visible_rows,
  },
  workflow::load_tree,
};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::debug;

/// Levels expanded when a tree is first loaded.
const INITIAL_DEPTH: usize = 1;

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  /// Focus on the tree; the right pane follows the cursor.
  Tree,
  /// Focus on the detail pane.
  Detail,
}

// ─── Fetch results ────────────────────────────────────────────────────────────

/// A completed background fetch.
#[derive(Debug)]
pub enum Fetched {
  Tree {
    ticket: Ticket,
    result: Result<Vec<OrgNode>, String>,
  },
  Staff {
    ticket:        Ticket,
    department_id: String,
    result:        Result<Vec<EmployeeSummary>, String>,
  },
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  /// Current screen / keyboard focus.
  pub screen: Screen,

  /// The full tree as last fetched.
  pub tree: Vec<OrgNode>,

  /// `tree` pruned by `filter`; what the tree pane shows.
  pub view: Vec<OrgNode>,

  /// Keys of expanded nodes.
  pub expanded: HashSet<String>,

  /// Current search string.
  pub filter: String,

  /// Whether the user is typing a search.
  pub filter_active: bool,

  /// Cursor position within the visible rows.
  pub cursor: usize,

  /// Key of the node shown in the detail pane.
  pub selected_key: Option<String>,

  /// Staff of the selected department.
  pub staff: Vec<EmployeeSummary>,

  /// A staff fetch for the selected department is in flight.
  pub staff_loading: bool,

  /// Scroll offset within the detail pane.
  pub detail_scroll: usize,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  client:    Arc<ApiClient>,
  tree_seq:  RequestSequence,
  staff_seq: RequestSequence,
  tx:        UnboundedSender<Fetched>,
  rx:        UnboundedReceiver<Fetched>,
}

impl App {
  /// Create an [`App`] with an empty tree.
  pub fn new(client: ApiClient) -> Self {
    let (tx, rx) = unbounded_channel();
    Self {
      screen: Screen::Tree,
      tree: Vec::new(),
      view: Vec::new(),
      expanded: HashSet::new(),
      filter: String::new(),
      filter_active: false,
      cursor: 0,
      selected_key: None,
      staff: Vec::new(),
      staff_loading: false,
      detail_scroll: 0,
      status_msg: String::new(),
      client: Arc::new(client),
      tree_seq: RequestSequence::new(),
      staff_seq: RequestSequence::new(),
      tx,
      rx,
    }
  }

  // ── Fetching ──────────────────────────────────────────────────────────────

  /// Start fetching the organization tree in the background.
  pub fn request_tree(&mut self) {
    let ticket = self.tree_seq.issue();
    let client = self.client.clone();
    let tx = self.tx.clone();
    self.status_msg = "Loading organization…".into();
    tokio::spawn(async move {
      let result = load_tree(client.as_ref()).await.map_err(|e| e.to_string());
      let _ = tx.send(Fetched::Tree { ticket, result });
    });
  }

  /// Start fetching the staff of `node`, superseding any earlier request.
  fn request_staff(&mut self, node: &OrgNode) {
    self.staff.clear();
    self.detail_scroll = 0;
    if node.is_corp() {
      self.staff_seq.invalidate();
      self.staff_loading = false;
      return;
    }

    let ticket = self.staff_seq.issue();
    let client = self.client.clone();
    let tx = self.tx.clone();
    let department_id = node.id.clone();
    self.staff_loading = true;
    tokio::spawn(async move {
      let result = client
        .department_employees(&department_id)
        .await
        .map_err(|e| e.to_string());
      let _ = tx.send(Fetched::Staff {
        ticket,
        department_id,
        result,
      });
    });
  }

  /// Apply every fetch result that has arrived since the last call.
  pub fn drain_inbox(&mut self) {
    while let Ok(msg) = self.rx.try_recv() {
      self.receive(msg);
    }
  }

  fn receive(&mut self, msg: Fetched) {
    match msg {
      Fetched::Tree { ticket, result } => {
        if !self.tree_seq.is_current(ticket) {
          debug!(?ticket, "dropping stale tree response");
          return;
        }
        match result {
          Ok(tree) => {
            if self.expanded.is_empty() {
              self.expanded = default_expanded_keys(&tree, INITIAL_DEPTH);
            }
            self.tree = tree;
            self.status_msg.clear();
            self.refresh_view();
          }
          Err(e) => self.status_msg = format!("Error: {e}"),
        }
      }
      Fetched::Staff {
        ticket,
        department_id,
        result,
      } => {
        if !self.staff_seq.is_current(ticket) {
          debug!(?ticket, %department_id, "dropping stale staff response");
          return;
        }
        self.staff_loading = false;
        match result {
          Ok(staff) => self.staff = staff,
          Err(e) => self.status_msg = format!("Error: {e}"),
        }
      }
    }
  }

  // ── Derived view ──────────────────────────────────────────────────────────

  /// Recompute the filtered tree and keep the cursor in range.
  fn refresh_view(&mut self) {
    self.view = filter_tree(&self.tree, &self.filter);
    if !self.filter.is_empty() {
      self.expanded.extend(all_keys_with_children(&self.view));
    }
    let len = self.rows().len();
    self.cursor = self.cursor.min(len.saturating_sub(1));
  }

  /// Rows of the tree pane, top to bottom.
  pub fn rows(&self) -> Vec<VisibleRow<'_>> {
    visible_rows(&self.view, &self.expanded)
  }

  /// The node under the cursor, if any.
  pub fn cursor_node(&self) -> Option<&OrgNode> {
    self.rows().get(self.cursor).map(|r| r.node)
  }

  /// The node shown in the detail pane, if any.
  pub fn selected_node(&self) -> Option<&OrgNode> {
    self
      .selected_key
      .as_deref()
      .and_then(|key| find_node(&self.tree, key))
  }

  /// Show the node under the cursor in the detail pane.
  fn select_cursor(&mut self) {
    let Some(node) = self.cursor_node().cloned() else {
      return;
    };
    if self.selected_key.as_deref() == Some(node.key.as_str()) {
      return;
    }
    self.selected_key = Some(node.key.clone());
    self.request_staff(&node);
  }

  fn move_cursor(&mut self, down: bool) {
    let len = self.rows().len();
    if down && self.cursor + 1 < len {
      self.cursor += 1;
    } else if !down && self.cursor > 0 {
      self.cursor -= 1;
    } else {
      return;
    }
    self.select_cursor();
  }

  fn toggle_expanded(&mut self) {
    if let Some(node) = self.cursor_node().filter(|n| n.has_children()) {
      let key = node.key.clone();
      if !self.expanded.remove(&key) {
        self.expanded.insert(key);
      }
    }
  }

  /// Collapse the cursor node, or if it is already collapsed, move to its
  /// parent.
  fn collapse_or_parent(&mut self) {
    let Some(node) = self.cursor_node() else {
      return;
    };
    if self.expanded.contains(&node.key) {
      let key = node.key.clone();
      self.expanded.remove(&key);
      return;
    }
    let parent_level = node.level.checked_sub(1);
    let cursor = self.cursor;
    let parent_row = parent_level.and_then(|level| {
      self.rows()[..cursor]
        .iter()
        .rposition(|r| r.node.level == level)
    });
    if let Some(idx) = parent_row {
      self.cursor = idx;
      self.select_cursor();
    }
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub fn handle_key(&mut self, key: KeyEvent) -> bool {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL)
      && key.code == KeyCode::Char('c')
    {
      return false;
    }

    if self.filter_active {
      self.handle_filter_key(key);
      return true;
    }

    match self.screen {
      Screen::Tree => self.handle_tree_key(key),
      Screen::Detail => self.handle_detail_key(key),
    }
  }

  fn handle_filter_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.filter_active = false;
        self.filter.clear();
        self.refresh_view();
      }
      KeyCode::Enter => {
        self.filter_active = false;
        self.cursor = 0;
        self.select_cursor();
      }
      KeyCode::Backspace => {
        self.filter.pop();
        self.cursor = 0;
        self.refresh_view();
      }
      KeyCode::Char(c) => {
        self.filter.push(c);
        self.cursor = 0;
        self.refresh_view();
      }
      _ => {}
    }
  }

  fn handle_tree_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,

      KeyCode::Down | KeyCode::Char('j') => self.move_cursor(true),
      KeyCode::Up | KeyCode::Char('k') => self.move_cursor(false),

      KeyCode::Enter | KeyCode::Char(' ') => {
        self.toggle_expanded();
        self.select_cursor();
      }
      KeyCode::Right | KeyCode::Char('l') => {
        if let Some(key) = self
          .cursor_node()
          .filter(|n| n.has_children())
          .map(|n| n.key.clone())
        {
          self.expanded.insert(key);
        }
      }
      KeyCode::Left | KeyCode::Char('h') => self.collapse_or_parent(),

      KeyCode::Tab => {
        self.select_cursor();
        if self.selected_key.is_some() {
          self.screen = Screen::Detail;
        }
      }

      KeyCode::Char('/') => {
        self.filter_active = true;
        self.filter.clear();
        self.cursor = 0;
        self.refresh_view();
      }

      KeyCode::Char('r') => self.request_tree(),

      _ => {}
    }
    true
  }

  fn handle_detail_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,

      KeyCode::Esc | KeyCode::Tab | KeyCode::Left | KeyCode::Char('h') => {
        self.screen = Screen::Tree;
      }

      KeyCode::Down | KeyCode::Char('j') => {
        if self.detail_scroll + 1 < self.staff.len() {
          self.detail_scroll += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.detail_scroll = self.detail_scroll.saturating_sub(1);
      }

      _ => {}
    }
    true
  }
}
