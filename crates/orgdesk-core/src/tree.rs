//! Organization tree assembly.
//!
//! Converts the backend's nested [`RawOrgNode`] payload into [`OrgNode`]s
//! ready for display and department pickers: synthetic keys, resolved
//! corporation ownership, depth and breadcrumb. The tree is rebuilt from
//! scratch on every fetch and never mutated afterwards.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::model::{NodeKind, RawOrgNode};

const CORP_KEY_PREFIX: &str = "org_";
const DEPT_KEY_PREFIX: &str = "dept_";

// ─── OrgNode ─────────────────────────────────────────────────────────────────

/// A node of the display tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrgNode {
  /// `"org_<id>"` for corporations, `"dept_<id>"` for departments. Unique
  /// across both kinds even when the backend reuses numeric ids.
  pub key:       String,
  pub id:        String,
  pub parent_id: Option<String>,
  pub title:     String,
  pub kind:      NodeKind,
  /// The owning corporation; a corporation owns itself.
  pub corp_id:   String,
  pub corp_name: String,
  /// Depth from the root, roots are `0`.
  pub level:     usize,
  /// `/`-joined titles from the root down to and including this node.
  pub path:      String,
  /// Corporations cannot be picked as a department.
  pub disabled:  bool,
  pub children:  Vec<OrgNode>,
}

impl OrgNode {
  pub fn is_corp(&self) -> bool { self.kind == NodeKind::Corp }

  pub fn has_children(&self) -> bool { !self.children.is_empty() }

  /// Number of nodes in this subtree, including `self`.
  pub fn subtree_len(&self) -> usize {
    1 + self.children.iter().map(OrgNode::subtree_len).sum::<usize>()
  }
}

// ─── Build ───────────────────────────────────────────────────────────────────

/// The corporation a subtree belongs to, threaded down the recursion.
#[derive(Debug, Clone, Copy, Default)]
struct CorpContext<'a> {
  corp_id:   &'a str,
  corp_name: &'a str,
}

/// Where a node hangs in the tree.
#[derive(Debug, Clone, Copy, Default)]
struct Parent<'a> {
  id:    Option<&'a str>,
  path:  &'a str,
  level: usize,
}

/// Collect `corp id → corp name` for every corporation anywhere in `nodes`.
///
/// Runs before conversion so a department can resolve a corporation name even
/// when its `corp_id` points at a corporation outside its own ancestor chain.
pub fn corp_names(nodes: &[RawOrgNode]) -> HashMap<String, String> {
  fn walk(nodes: &[RawOrgNode], out: &mut HashMap<String, String>) {
    for node in nodes {
      if node.node_type == NodeKind::Corp {
        out.insert(node.id.clone(), node.name.clone());
      }
      walk(&node.children, out);
    }
  }

  let mut out = HashMap::new();
  walk(nodes, &mut out);
  out
}

/// Build the display tree from the raw backend payload.
///
/// The input is trusted to be acyclic.
pub fn build_tree(nodes: &[RawOrgNode]) -> Vec<OrgNode> {
  let names = corp_names(nodes);
  nodes
    .iter()
    .map(|n| convert(n, &names, CorpContext::default(), Parent::default()))
    .collect()
}

fn non_empty(s: &str) -> Option<&str> {
  let trimmed = s.trim();
  (!trimmed.is_empty()).then_some(s)
}

fn convert<'a>(
  node: &'a RawOrgNode,
  names: &'a HashMap<String, String>,
  inherited: CorpContext<'a>,
  parent: Parent<'_>,
) -> OrgNode {
  let (id, key_prefix, ctx) = match node.node_type {
    NodeKind::Corp => (
      node.id.as_str(),
      CORP_KEY_PREFIX,
      CorpContext {
        corp_id:   node.id.as_str(),
        corp_name: node.name.as_str(),
      },
    ),
    NodeKind::Dept => (
      node.dept_id.as_deref().and_then(non_empty).unwrap_or(node.id.as_str()),
      DEPT_KEY_PREFIX,
      resolve_dept_corp(node, names, inherited),
    ),
  };

  let path = if parent.path.is_empty() {
    node.name.clone()
  } else {
    format!("{}/{}", parent.path, node.name)
  };

  let here = Parent {
    id:    Some(id),
    path:  &path,
    level: parent.level + 1,
  };
  let children = node
    .children
    .iter()
    .map(|child| convert(child, names, ctx, here))
    .collect();

  OrgNode {
    key: format!("{key_prefix}{id}"),
    id: id.to_string(),
    parent_id: parent.id.map(str::to_string),
    title: node.name.clone(),
    kind: node.node_type,
    corp_id: ctx.corp_id.to_string(),
    corp_name: ctx.corp_name.to_string(),
    level: parent.level,
    disabled: node.node_type == NodeKind::Corp,
    path,
    children,
  }
}

/// Resolve a department's owning corporation.
///
/// Id: payload `corp_id`, else inherited, else empty.
/// Name: lookup of the resolved id, else inherited, else the first segment of
/// `business_path`, else empty.
fn resolve_dept_corp<'a>(
  node: &'a RawOrgNode,
  names: &'a HashMap<String, String>,
  inherited: CorpContext<'a>,
) -> CorpContext<'a> {
  let corp_id = node
    .corp_id
    .as_deref()
    .and_then(non_empty)
    .or_else(|| non_empty(inherited.corp_id))
    .unwrap_or("");

  let corp_name = names
    .get(corp_id)
    .map(String::as_str)
    .and_then(non_empty)
    .or_else(|| non_empty(inherited.corp_name))
    .or_else(|| {
      node
        .business_path
        .as_deref()
        .and_then(|p| p.split('/').map(str::trim).find(|s| !s.is_empty()))
    })
    .unwrap_or("");

  CorpContext { corp_id, corp_name }
}

// ─── Navigation ──────────────────────────────────────────────────────────────

/// Depth-first lookup by [`OrgNode::key`].
pub fn find_node<'a>(nodes: &'a [OrgNode], key: &str) -> Option<&'a OrgNode> {
  nodes.iter().find_map(|n| {
    if n.key == key {
      Some(n)
    } else {
      find_node(&n.children, key)
    }
  })
}

/// Depth-first lookup of a department by its id.
pub fn find_department<'a>(
  nodes: &'a [OrgNode],
  id: &str,
) -> Option<&'a OrgNode> {
  find_node(nodes, &format!("{DEPT_KEY_PREFIX}{id}"))
}

/// Keys of all nodes above `max_level` that have children. Used as the
/// initial expansion state of a freshly fetched tree.
pub fn default_expanded_keys(
  nodes: &[OrgNode],
  max_level: usize,
) -> HashSet<String> {
  fn walk(nodes: &[OrgNode], max_level: usize, out: &mut HashSet<String>) {
    for n in nodes {
      if n.level < max_level && n.has_children() {
        out.insert(n.key.clone());
        walk(&n.children, max_level, out);
      }
    }
  }

  let mut out = HashSet::new();
  walk(nodes, max_level, &mut out);
  out
}

/// Keys of every node that has children; expands a filtered tree fully so
/// all matches are visible.
pub fn all_keys_with_children(nodes: &[OrgNode]) -> HashSet<String> {
  default_expanded_keys(nodes, usize::MAX)
}

/// A node as it appears in a flattened, partially expanded tree listing.
#[derive(Debug, Clone, Copy)]
pub struct VisibleRow<'a> {
  pub node:     &'a OrgNode,
  pub expanded: bool,
}

/// Pre-order listing of the nodes reachable through expanded ancestors.
pub fn visible_rows<'a>(
  nodes: &'a [OrgNode],
  expanded: &HashSet<String>,
) -> Vec<VisibleRow<'a>> {
  fn walk<'a>(
    nodes: &'a [OrgNode],
    expanded: &HashSet<String>,
    out: &mut Vec<VisibleRow<'a>>,
  ) {
    for node in nodes {
      let is_open = expanded.contains(&node.key);
      out.push(VisibleRow {
        node,
        expanded: is_open,
      });
      if is_open {
        walk(&node.children, expanded, out);
      }
    }
  }

  let mut out = Vec::new();
  walk(nodes, expanded, &mut out);
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  fn acme() -> Vec<RawOrgNode> {
    vec![RawOrgNode::corp("c1", "Acme").with_children(vec![
      RawOrgNode::dept("d1", "Eng").with_children(vec![
        RawOrgNode::dept("d2", "Platform"),
      ]),
      RawOrgNode::dept("d3", "Sales"),
    ])]
  }

  #[test]
  fn dept_inherits_corp_from_ancestor() {
    let raw = vec![RawOrgNode::corp("c1", "Acme")
      .with_children(vec![RawOrgNode::dept("d1", "Eng")])];
    let tree = build_tree(&raw);

    let d1 = &tree[0].children[0];
    assert_eq!(d1.corp_id, "c1");
    assert_eq!(d1.corp_name, "Acme");
  }

  #[test]
  fn keys_levels_and_paths() {
    let tree = build_tree(&acme());

    let corp = &tree[0];
    assert_eq!(corp.key, "org_c1");
    assert_eq!(corp.level, 0);
    assert!(corp.disabled);
    assert!(corp.parent_id.is_none());

    let platform = &corp.children[0].children[0];
    assert_eq!(platform.key, "dept_d2");
    assert_eq!(platform.level, 2);
    assert_eq!(platform.path, "Acme/Eng/Platform");
    assert_eq!(platform.parent_id.as_deref(), Some("d1"));
    assert!(!platform.disabled);
    assert_eq!(platform.corp_name, "Acme");
  }

  #[test]
  fn explicit_corp_id_resolves_name_from_prepass() {
    // d9 sits under c1 but belongs to c2, which appears later in the input.
    let raw = vec![
      RawOrgNode::corp("c1", "Acme").with_children(vec![
        RawOrgNode::dept("d9", "Shared Services").with_corp_id("c2"),
      ]),
      RawOrgNode::corp("c2", "Globex"),
    ];
    let tree = build_tree(&raw);

    let d9 = &tree[0].children[0];
    assert_eq!(d9.corp_id, "c2");
    assert_eq!(d9.corp_name, "Globex");
  }

  #[test]
  fn orphan_dept_falls_back_to_business_path() {
    let raw = vec![
      RawOrgNode::dept("d1", "Eng").with_business_path("Initech/Eng"),
    ];
    let tree = build_tree(&raw);

    assert_eq!(tree[0].corp_id, "");
    assert_eq!(tree[0].corp_name, "Initech");
  }

  #[test]
  fn orphan_dept_without_any_source_has_empty_corp() {
    let tree = build_tree(&[RawOrgNode::dept("d1", "Eng")]);
    assert_eq!(tree[0].corp_id, "");
    assert_eq!(tree[0].corp_name, "");
  }

  #[test]
  fn unknown_corp_id_keeps_inherited_name() {
    let raw = vec![RawOrgNode::corp("c1", "Acme").with_children(vec![
      RawOrgNode::dept("d1", "Eng").with_corp_id("c404"),
    ])];
    let tree = build_tree(&raw);

    let d1 = &tree[0].children[0];
    assert_eq!(d1.corp_id, "c404");
    assert_eq!(d1.corp_name, "Acme");
  }

  #[test]
  fn dept_id_overrides_node_id() {
    let mut raw = RawOrgNode::dept("n1", "Eng");
    raw.dept_id = Some("42".into());
    let tree = build_tree(&[raw]);

    assert_eq!(tree[0].id, "42");
    assert_eq!(tree[0].key, "dept_42");
  }

  #[test]
  fn nested_corp_starts_a_new_context() {
    let raw = vec![RawOrgNode::corp("g", "Group").with_children(vec![
      RawOrgNode::corp("c1", "Acme")
        .with_children(vec![RawOrgNode::dept("d1", "Eng")]),
    ])];
    let tree = build_tree(&raw);

    let acme = &tree[0].children[0];
    assert_eq!(acme.corp_id, "c1");
    assert_eq!(acme.parent_id.as_deref(), Some("g"));
    assert_eq!(acme.children[0].corp_name, "Acme");
  }

  #[test]
  fn empty_input_yields_empty_tree() {
    assert!(build_tree(&[]).is_empty());
    assert!(corp_names(&[]).is_empty());
  }

  #[test]
  fn find_by_key_and_department_id() {
    let tree = build_tree(&acme());
    assert_eq!(find_node(&tree, "dept_d2").unwrap().title, "Platform");
    assert_eq!(find_department(&tree, "d3").unwrap().title, "Sales");
    assert!(find_node(&tree, "dept_c1").is_none());
  }

  #[test]
  fn expansion_and_visible_rows() {
    let tree = build_tree(&acme());

    let shallow = default_expanded_keys(&tree, 1);
    assert_eq!(shallow, HashSet::from(["org_c1".to_string()]));

    let rows = visible_rows(&tree, &shallow);
    let titles: Vec<_> = rows.iter().map(|r| r.node.title.as_str()).collect();
    assert_eq!(titles, ["Acme", "Eng", "Sales"]);

    let all = all_keys_with_children(&tree);
    let rows = visible_rows(&tree, &all);
    assert_eq!(rows.len(), tree[0].subtree_len());
    assert!(rows[0].expanded);
  }
}
