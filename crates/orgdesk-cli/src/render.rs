//! Plain-text rendering for the non-interactive subcommands.

use std::fmt::Write as _;

use orgdesk_core::{
  model::DepartmentMembership,
  permission::{PermissionDiff, PermissionRow, resource_spans},
  tree::{OrgNode, all_keys_with_children, visible_rows},
};

/// The whole tree, fully expanded, two spaces of indent per level.
pub fn tree(nodes: &[OrgNode]) -> String {
  let expanded = all_keys_with_children(nodes);
  let mut out = String::new();
  for row in visible_rows(nodes, &expanded) {
    let n = row.node;
    let kind = if n.is_corp() { "corp" } else { "dept" };
    let _ = writeln!(
      out,
      "{}{}  ({kind} {})",
      "  ".repeat(n.level),
      n.title,
      n.id
    );
  }
  out
}

/// One line per membership; `*` marks the primary department.
pub fn memberships(list: &[DepartmentMembership]) -> String {
  if list.is_empty() {
    return "no department memberships\n".to_string();
  }
  let mut out = String::new();
  for m in list {
    let marker = if m.is_primary { '*' } else { ' ' };
    let name = if m.department_name.is_empty() {
      m.department_id.as_str()
    } else {
      m.department_name.as_str()
    };
    let _ = write!(out, "{marker} {name:<24} {:<10} {:<20}", m.department_id, m.corp_name);
    if let Some(title) = &m.job_title {
      let _ = write!(out, " {title}");
    }
    out.truncate(out.trim_end().len());
    out.push('\n');
  }
  out
}

/// The permission matrix grouped by domain, then by resource.
pub fn matrix(rows: &[PermissionRow]) -> String {
  let spans = resource_spans(rows);
  let width = rows
    .iter()
    .map(|r| r.resource_name.chars().count())
    .max()
    .unwrap_or(0);

  let mut out = String::new();
  let mut domain: Option<&str> = None;
  for (row, span) in rows.iter().zip(spans) {
    if domain != Some(row.domain.as_str()) {
      let _ = writeln!(out, "{} ({})", row.domain_name, row.domain);
      domain = Some(row.domain.as_str());
    }
    let resource = if span > 0 { row.resource_name.as_str() } else { "" };
    let check = if row.is_checked { 'x' } else { ' ' };
    let _ = writeln!(
      out,
      "  {resource:<width$}  [{check}] {:<32} {}",
      row.permission_id, row.action_name
    );
  }
  out
}

/// `+ id` for grants, `- id` for revocations.
pub fn diff(diff: &PermissionDiff) -> String {
  if diff.is_empty() {
    return "no changes\n".to_string();
  }
  let mut out = String::new();
  for id in &diff.granted {
    let _ = writeln!(out, "+ {id}");
  }
  for id in &diff.revoked {
    let _ = writeln!(out, "- {id}");
  }
  out
}

#[cfg(test)]
mod tests {
  use orgdesk_core::{
    model::RawOrgNode,
    permission::{PermissionSelection, flatten},
    tree::build_tree,
  };

  use super::*;

  #[test]
  fn tree_is_indented_by_level() {
    let nodes = build_tree(&[RawOrgNode::corp("c1", "Acme")
      .with_children(vec![RawOrgNode::dept("d1", "Eng")])]);
    assert_eq!(tree(&nodes), "Acme  (corp c1)\n  Eng  (dept d1)\n");
  }

  #[test]
  fn primary_membership_is_starred() {
    let mut eng = DepartmentMembership::new("d1").primary(true);
    eng.department_name = "Eng".into();
    eng.job_title = Some("Lead".into());
    let out = memberships(&[eng, DepartmentMembership::new("d2")]);

    let lines: Vec<_> = out.lines().collect();
    assert!(lines[0].starts_with("* Eng"), "{out}");
    assert!(lines[0].ends_with("Lead"), "{out}");
    assert!(lines[1].starts_with("  d2"), "{out}");
  }

  #[test]
  fn empty_memberships_say_so() {
    assert_eq!(memberships(&[]), "no department memberships\n");
  }

  #[test]
  fn matrix_prints_resource_once_per_group() {
    let groups: Vec<orgdesk_core::model::PermissionTemplateGroup> =
      serde_json::from_value(serde_json::json!([{
        "domain": "org",
        "domain_name": "Organization",
        "resources": [{
          "resource": "dept",
          "resource_name": "Departments",
          "actions": [
            { "action": "read", "action_name": "Read", "is_default": 1 },
            { "action": "write", "action_name": "Write" }
          ]
        }]
      }]))
      .unwrap();
    let mut selection = PermissionSelection::new();
    selection.set("org_dept_read", true);

    let out = matrix(&flatten(&groups, &selection));
    let lines: Vec<_> = out.lines().collect();
    assert_eq!(lines[0], "Organization (org)");
    assert!(lines[1].starts_with("  Departments  [x] org_dept_read"), "{out}");
    assert!(lines[2].starts_with("               [ ] org_dept_write"), "{out}");
    assert_eq!(out.matches("Departments").count(), 1);
  }

  #[test]
  fn diff_lists_grants_then_revocations() {
    let d = PermissionDiff {
      granted: vec!["a_b_c".into()],
      revoked: vec!["x_y_z".into()],
    };
    assert_eq!(diff(&d), "+ a_b_c\n- x_y_z\n");
    assert_eq!(diff(&PermissionDiff::default()), "no changes\n");
  }
}
