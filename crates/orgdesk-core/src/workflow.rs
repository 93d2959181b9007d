//! Fetch / edit / save round-trips against an [`OrgDirectory`].
//!
//! Every save follows the same shape: derive the payload with the pure
//! functions of this crate, persist it, re-fetch the backend's view and derive
//! UI state again from that. The backend remains the system of record.

use tracing::{debug, info};

use crate::{
  Error, Result,
  directory::OrgDirectory,
  membership::{MembershipEvent, apply, primary, reconcile_primary},
  model::{DepartmentMembership, PermissionTemplateGroup},
  permission::{
    PermissionDiff, PermissionRow, PermissionSelection, check_unique,
    diff_selection, flatten, rebuild, seed_selection,
  },
  tree::{OrgNode, build_tree},
};

// ─── Organization ────────────────────────────────────────────────────────────

/// Fetch and build the organization tree.
pub async fn load_tree<D: OrgDirectory>(dir: &D) -> Result<Vec<OrgNode>> {
  let raw = dir.org_tree().await.map_err(Error::directory)?;
  let tree = build_tree(&raw);
  debug!(
    roots = tree.len(),
    nodes = tree.iter().map(OrgNode::subtree_len).sum::<usize>(),
    "organization tree loaded"
  );
  Ok(tree)
}

// ─── Memberships ─────────────────────────────────────────────────────────────

/// Fetch an employee's memberships with the single-primary rule applied.
pub async fn load_memberships<D: OrgDirectory>(
  dir: &D,
  employee_id: &str,
) -> Result<Vec<DepartmentMembership>> {
  let list = dir
    .employee_departments(employee_id)
    .await
    .map_err(Error::directory)?;
  Ok(reconcile_primary(list))
}

/// Reconcile and persist `memberships`, then return the backend's view of
/// the result.
pub async fn save_memberships<D: OrgDirectory>(
  dir: &D,
  employee_id: &str,
  memberships: Vec<DepartmentMembership>,
) -> Result<Vec<DepartmentMembership>> {
  let memberships = reconcile_primary(memberships);
  dir
    .save_employee_departments(employee_id, &memberships)
    .await
    .map_err(Error::directory)?;
  info!(
    employee_id,
    count = memberships.len(),
    primary = primary(&memberships).map(|m| m.department_id.as_str()),
    "memberships saved"
  );
  load_memberships(dir, employee_id).await
}

/// Load an employee's memberships, apply `events` in order and save.
pub async fn edit_memberships<D: OrgDirectory>(
  dir: &D,
  employee_id: &str,
  events: impl IntoIterator<Item = MembershipEvent>,
) -> Result<Vec<DepartmentMembership>> {
  let current = load_memberships(dir, employee_id).await?;
  let edited = events.into_iter().fold(current.clone(), apply);
  if edited == current {
    debug!(employee_id, "membership edit changed nothing; not saving");
    return Ok(current);
  }
  save_memberships(dir, employee_id, edited).await
}

// ─── Permissions ─────────────────────────────────────────────────────────────

/// A role's permission templates together with the selection they imply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionMatrix {
  pub groups:    Vec<PermissionTemplateGroup>,
  pub selection: PermissionSelection,
}

impl PermissionMatrix {
  /// Fails with [`Error::DuplicatePermission`] when two actions share a
  /// composite id, since neither could be edited without touching the other.
  pub fn new(groups: Vec<PermissionTemplateGroup>) -> Result<Self> {
    check_unique(&groups)?;
    let selection = seed_selection(&groups);
    Ok(Self { groups, selection })
  }

  /// Rows checked according to `selection`.
  pub fn rows(&self, selection: &PermissionSelection) -> Vec<PermissionRow> {
    flatten(&self.groups, selection)
  }

  /// Changes `selection` would make to the role.
  pub fn diff(&self, selection: &PermissionSelection) -> PermissionDiff {
    diff_selection(&self.groups, &self.selection, selection)
  }
}

/// Fetch a role's permission matrix.
pub async fn load_permission_matrix<D: OrgDirectory>(
  dir: &D,
  role_id: &str,
) -> Result<PermissionMatrix> {
  let groups = dir.role_permissions(role_id).await.map_err(Error::directory)?;
  PermissionMatrix::new(groups)
}

/// Persist `selection` over `matrix` for `role_id`.
///
/// Returns what changed and the refreshed matrix. Nothing is sent when the
/// selection matches the matrix already.
pub async fn save_permission_matrix<D: OrgDirectory>(
  dir: &D,
  role_id: &str,
  matrix: &PermissionMatrix,
  selection: &PermissionSelection,
) -> Result<(PermissionDiff, PermissionMatrix)> {
  let diff = matrix.diff(selection);
  if diff.is_empty() {
    debug!(role_id, "permission selection unchanged; not saving");
    return Ok((diff, matrix.clone()));
  }

  let groups = rebuild(&matrix.groups, selection);
  dir
    .save_role_permissions(role_id, &groups)
    .await
    .map_err(Error::directory)?;
  info!(
    role_id,
    granted = diff.granted.len(),
    revoked = diff.revoked.len(),
    "role permissions saved"
  );

  let refreshed = load_permission_matrix(dir, role_id).await?;
  Ok((diff, refreshed))
}
