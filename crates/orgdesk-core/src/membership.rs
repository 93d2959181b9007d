//! Department membership editing.
//!
//! An employee may belong to several departments at once, but exactly one of
//! those memberships is their primary department. [`reconcile_primary`]
//! restores that invariant and runs at the end of every edit expressed as a
//! [`MembershipEvent`].
//!
//! When several memberships claim to be primary, the first one in list order
//! wins. The backend does not arbitrate; this is the console's policy.

use crate::{
  Error, Result,
  model::DepartmentMembership,
  tree::{OrgNode, find_department, find_node},
};

// ─── Reconciliation ──────────────────────────────────────────────────────────

/// Enforce a single primary membership.
///
/// - no primary: the first membership is promoted;
/// - one primary: the list is returned as is;
/// - several: the first primary is kept and every other one is demoted.
///
/// Length and order are preserved. An empty list stays empty.
pub fn reconcile_primary(
  mut memberships: Vec<DepartmentMembership>,
) -> Vec<DepartmentMembership> {
  let Some(keep) = memberships
    .iter()
    .position(|m| m.is_primary)
    .or((!memberships.is_empty()).then_some(0))
  else {
    return memberships;
  };

  for (i, m) in memberships.iter_mut().enumerate() {
    m.is_primary = i == keep;
  }
  memberships
}

/// The primary membership, if any.
pub fn primary(
  memberships: &[DepartmentMembership],
) -> Option<&DepartmentMembership> {
  memberships.iter().find(|m| m.is_primary)
}

// ─── Construction from the tree ──────────────────────────────────────────────

impl DepartmentMembership {
  /// A membership in the department represented by `node`.
  ///
  /// Fails for corporation nodes, which are not assignable.
  pub fn from_node(node: &OrgNode, job_title: Option<String>) -> Result<Self> {
    if node.is_corp() {
      return Err(Error::NotADepartment(node.id.clone()));
    }
    Ok(Self {
      department_id: node.id.clone(),
      department_name: node.title.clone(),
      corp_id: node.corp_id.clone(),
      corp_name: node.corp_name.clone(),
      job_title,
      is_primary: false,
      department_path: Some(node.path.clone()),
    })
  }
}

/// A membership in the department named by `department`, looked up in `tree`
/// first as a node key (`dept_42`) and then as a department id (`42`).
pub fn membership_in(
  tree: &[OrgNode],
  department: &str,
  job_title: Option<String>,
) -> Result<DepartmentMembership> {
  let node = find_node(tree, department)
    .or_else(|| find_department(tree, department))
    .ok_or_else(|| Error::NodeNotFound(department.to_string()))?;
  DepartmentMembership::from_node(node, job_title)
}

// ─── Edits ───────────────────────────────────────────────────────────────────

/// A single edit to an employee's membership list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipEvent {
  /// Replace the list wholesale, e.g. after a fetch.
  Load(Vec<DepartmentMembership>),
  /// Add a department. Ignored if the employee is already a member. A new
  /// membership flagged primary takes over as the primary.
  Add(DepartmentMembership),
  /// Remove a department by id. Removing the primary promotes the first
  /// remaining membership.
  Remove(String),
  /// Make the given department the primary one.
  SetPrimary(String),
  /// Change or clear the job title held in a department.
  SetJobTitle {
    department_id: String,
    job_title:     Option<String>,
  },
}

/// Apply `event` to `state`, returning the reconciled result.
pub fn apply(
  mut state: Vec<DepartmentMembership>,
  event: MembershipEvent,
) -> Vec<DepartmentMembership> {
  match event {
    MembershipEvent::Load(list) => state = list,
    MembershipEvent::Add(membership) => {
      if !contains(&state, &membership.department_id) {
        if membership.is_primary {
          state.iter_mut().for_each(|m| m.is_primary = false);
        }
        state.push(membership);
      }
    }
    MembershipEvent::Remove(department_id) => {
      state.retain(|m| m.department_id != department_id);
    }
    MembershipEvent::SetPrimary(department_id) => {
      if contains(&state, &department_id) {
        for m in &mut state {
          m.is_primary = m.department_id == department_id;
        }
      }
    }
    MembershipEvent::SetJobTitle {
      department_id,
      job_title,
    } => {
      if let Some(m) =
        state.iter_mut().find(|m| m.department_id == department_id)
      {
        m.job_title = job_title;
      }
    }
  }
  reconcile_primary(state)
}

fn contains(state: &[DepartmentMembership], department_id: &str) -> bool {
  state.iter().any(|m| m.department_id == department_id)
}
