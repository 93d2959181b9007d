//! Role permission matrix.
//!
//! The backend describes a role's permissions as nested
//! domain → resource → action templates where `is_default == 1` marks a
//! granted action. The console edits them as a flat list of checkbox rows
//! keyed by a composite `domain_resource_action` id, then writes the
//! selection back into the original structure on save. Only `is_default`
//! ever changes on the way back; no action is added or dropped.
//!
//! Composite ids must be unique across the templates. Underscores inside
//! domain or resource names can make two actions collide (`a_b`/`c`/`d` and
//! `a`/`b_c`/`d`); such templates are rejected by [`check_unique`] before a
//! selection is ever built from them.

use std::collections::{BTreeMap, HashSet};

use crate::{
  Error, Result,
  model::{PermissionAction, PermissionTemplateGroup},
};

/// Composite key identifying one action of one resource in one domain.
pub fn permission_id(domain: &str, resource: &str, action: &str) -> String {
  format!("{domain}_{resource}_{action}")
}

// ─── Selection ───────────────────────────────────────────────────────────────

/// Checkbox state keyed by [`permission_id`]. Absent ids are unchecked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSelection(BTreeMap<String, bool>);

impl PermissionSelection {
  pub fn new() -> Self { Self::default() }

  pub fn set(&mut self, id: impl Into<String>, checked: bool) {
    self.0.insert(id.into(), checked);
  }

  /// Flip the checkbox for `id` and return its new state.
  pub fn toggle(&mut self, id: &str) -> bool {
    let checked = !self.is_checked(id);
    self.set(id, checked);
    checked
  }

  pub fn is_checked(&self, id: &str) -> bool {
    self.0.get(id).copied().unwrap_or(false)
  }

}

impl FromIterator<(String, bool)> for PermissionSelection {
  fn from_iter<I: IntoIterator<Item = (String, bool)>>(iter: I) -> Self {
    Self(iter.into_iter().collect())
  }
}

/// Walk every leaf action with its composite id, in template order.
fn leaves(
  groups: &[PermissionTemplateGroup],
) -> impl Iterator<Item = (String, &PermissionTemplateGroup, &str, &str, &PermissionAction)>
{
  groups.iter().flat_map(|g| {
    g.resources.iter().flat_map(move |r| {
      r.actions.iter().map(move |a| {
        (
          permission_id(&g.domain, &r.resource, &a.action),
          g,
          r.resource.as_str(),
          r.resource_name.as_str(),
          a,
        )
      })
    })
  })
}

/// The selection implied by the templates themselves: every action with
/// `is_default == 1` is checked.
pub fn seed_selection(
  groups: &[PermissionTemplateGroup],
) -> PermissionSelection {
  leaves(groups)
    .map(|(id, _, _, _, a)| (id, a.is_default == 1))
    .collect()
}

/// Fail on the first composite id shared by two actions in `groups`.
pub fn check_unique(groups: &[PermissionTemplateGroup]) -> Result<()> {
  let mut seen = HashSet::new();
  match leaves(groups).map(|(id, ..)| id).find(|id| !seen.insert(id.clone())) {
    Some(id) => Err(Error::DuplicatePermission(id)),
    None => Ok(()),
  }
}

/// Fail on the first id in `ids` that names no action in `groups`.
pub fn check_known<'a>(
  groups: &[PermissionTemplateGroup],
  ids: impl IntoIterator<Item = &'a str>,
) -> Result<()> {
  let known = seed_selection(groups);
  for id in ids {
    if !known.0.contains_key(id) {
      return Err(Error::UnknownPermission(id.to_string()));
    }
  }
  Ok(())
}

// ─── Rows ────────────────────────────────────────────────────────────────────

/// One editable checkbox row of the matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionRow {
  pub permission_id:      String,
  pub domain:             String,
  pub domain_name:        String,
  pub resource:           String,
  pub resource_name:      String,
  pub action:             String,
  pub action_name:        String,
  pub action_description: String,
  pub is_checked:         bool,
}

/// One row per leaf action, in template order, checked per `selection`.
pub fn flatten(
  groups: &[PermissionTemplateGroup],
  selection: &PermissionSelection,
) -> Vec<PermissionRow> {
  leaves(groups)
    .map(|(id, g, resource, resource_name, a)| PermissionRow {
      is_checked:         selection.is_checked(&id),
      permission_id:      id,
      domain:             g.domain.clone(),
      domain_name:        g.domain_name.clone(),
      resource:           resource.to_string(),
      resource_name:      resource_name.to_string(),
      action:             a.action.clone(),
      action_name:        a.action_name.clone(),
      action_description: a.description.clone(),
    })
    .collect()
}

/// Copy `groups`, rewriting every action's `is_default` from `selection`.
pub fn rebuild(
  groups: &[PermissionTemplateGroup],
  selection: &PermissionSelection,
) -> Vec<PermissionTemplateGroup> {
  let mut out = groups.to_vec();
  for g in &mut out {
    for r in &mut g.resources {
      for a in &mut r.actions {
        let id = permission_id(&g.domain, &r.resource, &a.action);
        a.is_default = u8::from(selection.is_checked(&id));
      }
    }
  }
  out
}

/// Row spans for rendering rows grouped by resource.
///
/// The first row of each consecutive run sharing a domain and resource name
/// carries the run length; the other rows of the run carry `0`.
pub fn resource_spans(rows: &[PermissionRow]) -> Vec<usize> {
  let mut spans = vec![0; rows.len()];
  let mut start = 0;
  while start < rows.len() {
    let head = &rows[start];
    let len = rows[start..]
      .iter()
      .take_while(|r| {
        r.domain == head.domain && r.resource_name == head.resource_name
      })
      .count();
    spans[start] = len;
    start += len;
  }
  spans
}

// ─── Diff ────────────────────────────────────────────────────────────────────

/// What saving `after` over `before` would change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionDiff {
  pub granted: Vec<String>,
  pub revoked: Vec<String>,
}

impl PermissionDiff {
  pub fn is_empty(&self) -> bool {
    self.granted.is_empty() && self.revoked.is_empty()
  }
}

/// Compare two selections over the actions in `groups`, in template order.
/// Ids that name no action are ignored.
pub fn diff_selection(
  groups: &[PermissionTemplateGroup],
  before: &PermissionSelection,
  after: &PermissionSelection,
) -> PermissionDiff {
  let mut diff = PermissionDiff::default();
  for (id, ..) in leaves(groups) {
    match (before.is_checked(&id), after.is_checked(&id)) {
      (false, true) => diff.granted.push(id),
      (true, false) => diff.revoked.push(id),
      _ => {}
    }
  }
  diff
}
