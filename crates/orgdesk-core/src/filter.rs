//! Search-as-you-type pruning of the organization tree.

use crate::tree::OrgNode;

/// Whether `node`'s title contains `search`, ignoring case.
pub fn matches(node: &OrgNode, search: &str) -> bool {
  node.title.to_lowercase().contains(&search.to_lowercase())
}

/// Prune `nodes` to the ones whose title contains `search` (ignoring case),
/// keeping every ancestor of a match so the match stays reachable.
///
/// A kept ancestor only retains the children that themselves survived. An
/// empty `search` returns the tree unchanged.
pub fn filter_tree(nodes: &[OrgNode], search: &str) -> Vec<OrgNode> {
  if search.is_empty() {
    return nodes.to_vec();
  }
  nodes.iter().filter_map(|n| prune(n, search)).collect()
}

fn prune(node: &OrgNode, search: &str) -> Option<OrgNode> {
  let children: Vec<OrgNode> = node
    .children
    .iter()
    .filter_map(|c| prune(c, search))
    .collect();

  if children.is_empty() && !matches(node, search) {
    return None;
  }

  Some(OrgNode {
    key: node.key.clone(),
    id: node.id.clone(),
    parent_id: node.parent_id.clone(),
    title: node.title.clone(),
    kind: node.kind,
    corp_id: node.corp_id.clone(),
    corp_name: node.corp_name.clone(),
    level: node.level,
    path: node.path.clone(),
    disabled: node.disabled,
    children,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{model::RawOrgNode, tree::build_tree};

  fn chain() -> Vec<OrgNode> {
    build_tree(&[RawOrgNode::corp("a", "Alpha").with_children(vec![
      RawOrgNode::dept("b", "Bravo")
        .with_children(vec![RawOrgNode::dept("c", "Charlie")]),
      RawOrgNode::dept("x", "X-ray"),
    ])])
  }

  fn titles(nodes: &[OrgNode]) -> Vec<String> {
    let mut out = Vec::new();
    for n in nodes {
      out.push(n.title.clone());
      out.extend(titles(&n.children));
    }
    out
  }

  #[test]
  fn deep_match_keeps_ancestors() {
    let filtered = filter_tree(&chain(), "charlie");

    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].title, "Alpha");
    assert_eq!(filtered[0].children.len(), 1);
    assert_eq!(filtered[0].children[0].title, "Bravo");
    assert_eq!(filtered[0].children[0].children[0].title, "Charlie");
  }

  #[test]
  fn non_matching_siblings_are_dropped() {
    let filtered = filter_tree(&chain(), "ray");
    assert_eq!(titles(&filtered), ["Alpha", "X-ray"]);
  }

  #[test]
  fn matching_parent_keeps_only_matching_children() {
    // "a" hits Alpha, Bravo, Charlie and X-ray.
    let filtered = filter_tree(&chain(), "A");
    assert_eq!(titles(&filtered), ["Alpha", "Bravo", "Charlie", "X-ray"]);

    // "br" hits only Bravo; its non-matching child goes.
    let filtered = filter_tree(&chain(), "br");
    assert_eq!(titles(&filtered), ["Alpha", "Bravo"]);
  }

  #[test]
  fn empty_search_is_identity() {
    let tree = chain();
    assert_eq!(filter_tree(&tree, ""), tree);
  }

  #[test]
  fn no_match_yields_empty_tree() {
    assert!(filter_tree(&chain(), "zulu").is_empty());
  }

  #[test]
  fn match_helper_ignores_case() {
    let tree = chain();
    assert!(matches(&tree[0], "ALP"));
    assert!(!matches(&tree[0], "bravo"));
  }
}
