//! The `OrgDirectory` trait: the organization backend as seen by the console.
//!
//! The backend owns persistence, identity and authorization. This crate only
//! reads from and writes to it through this abstraction; `orgdesk-client`
//! implements it over HTTP and tests implement it in memory.

use std::future::Future;

use crate::model::{
  DepartmentMembership, EmployeeSummary, PermissionTemplateGroup, RawOrgNode,
};

/// Abstraction over the organization backend.
///
/// All methods return `Send` futures so implementations can be driven from
/// spawned tokio tasks.
pub trait OrgDirectory: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Organization ──────────────────────────────────────────────────────

  /// The full corporation / department tree.
  fn org_tree(
    &self,
  ) -> impl Future<Output = Result<Vec<RawOrgNode>, Self::Error>> + Send + '_;

  /// Staff listing of one department.
  fn department_employees<'a>(
    &'a self,
    department_id: &'a str,
  ) -> impl Future<Output = Result<Vec<EmployeeSummary>, Self::Error>> + Send + 'a;

  // ── Employees ─────────────────────────────────────────────────────────

  /// Every department the employee belongs to.
  fn employee_departments<'a>(
    &'a self,
    employee_id: &'a str,
  ) -> impl Future<Output = Result<Vec<DepartmentMembership>, Self::Error>>
  + Send
  + 'a;

  /// Replace the employee's memberships wholesale.
  fn save_employee_departments<'a>(
    &'a self,
    employee_id: &'a str,
    memberships: &'a [DepartmentMembership],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Roles ─────────────────────────────────────────────────────────────

  /// The permission templates of a role, `is_default == 1` marking grants.
  fn role_permissions<'a>(
    &'a self,
    role_id: &'a str,
  ) -> impl Future<Output = Result<Vec<PermissionTemplateGroup>, Self::Error>>
  + Send
  + 'a;

  /// Replace the role's grants with the given templates.
  fn save_role_permissions<'a>(
    &'a self,
    role_id: &'a str,
    groups: &'a [PermissionTemplateGroup],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
