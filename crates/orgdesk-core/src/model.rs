//! Wire shapes exchanged with the organization backend.
//!
//! These mirror the JSON payloads of the REST API one-to-one. Derived UI
//! shapes (the organization tree, permission rows) live next to the code that
//! builds them.

use serde::{Deserialize, Deserializer, Serialize};

// ─── Identifiers ─────────────────────────────────────────────────────────────

/// Accept an identifier encoded either as a JSON string or a JSON number.
///
/// The backend's IDL declares ids as 64-bit integers, but some endpoints
/// stringify them to dodge JavaScript precision loss.
pub(crate) fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum RawId {
    Text(String),
    Int(i64),
    Uint(u64),
  }

  Ok(match RawId::deserialize(deserializer)? {
    RawId::Text(s) => s,
    RawId::Int(n) => n.to_string(),
    RawId::Uint(n) => n.to_string(),
  })
}

fn opt_id_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  struct Wrapped(#[serde(deserialize_with = "id_string")] String);

  Ok(Option::<Wrapped>::deserialize(deserializer)?.map(|w| w.0))
}

// ─── Organization tree ───────────────────────────────────────────────────────

/// Whether a tree node is a corporation or a department.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
  Corp,
  Dept,
}

/// One node of the organization tree as returned by `GET /org/tree`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawOrgNode {
  #[serde(deserialize_with = "id_string")]
  pub id:            String,
  pub name:          String,
  pub node_type:     NodeKind,
  /// Owning corporation, when the backend already knows it.
  #[serde(default, deserialize_with = "opt_id_string")]
  pub corp_id:       Option<String>,
  /// Department identifier when it differs from the node id.
  #[serde(default, deserialize_with = "opt_id_string")]
  pub dept_id:       Option<String>,
  /// Textual breadcrumb such as `"Acme/Engineering/Platform"`.
  #[serde(default)]
  pub business_path: Option<String>,
  #[serde(default)]
  pub children:      Vec<RawOrgNode>,
}

impl RawOrgNode {
  /// A corporation node with no children.
  pub fn corp(id: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      id:            id.into(),
      name:          name.into(),
      node_type:     NodeKind::Corp,
      corp_id:       None,
      dept_id:       None,
      business_path: None,
      children:      Vec::new(),
    }
  }

  /// A department node with no children.
  pub fn dept(id: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      node_type: NodeKind::Dept,
      ..Self::corp(id, name)
    }
  }

  pub fn with_children(mut self, children: Vec<RawOrgNode>) -> Self {
    self.children = children;
    self
  }

  pub fn with_corp_id(mut self, corp_id: impl Into<String>) -> Self {
    self.corp_id = Some(corp_id.into());
    self
  }

  pub fn with_business_path(mut self, path: impl Into<String>) -> Self {
    self.business_path = Some(path.into());
    self
  }
}

// ─── Employees ───────────────────────────────────────────────────────────────

/// One employee's membership in one department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentMembership {
  #[serde(deserialize_with = "id_string")]
  pub department_id:   String,
  #[serde(default)]
  pub department_name: String,
  #[serde(default, deserialize_with = "id_or_empty")]
  pub corp_id:         String,
  #[serde(default)]
  pub corp_name:       String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub job_title:       Option<String>,
  /// Absent on the wire means `false`.
  #[serde(default)]
  pub is_primary:      bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub department_path: Option<String>,
}

fn id_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(opt_id_string(deserializer)?.unwrap_or_default())
}

impl DepartmentMembership {
  /// A bare membership carrying only the department id.
  pub fn new(department_id: impl Into<String>) -> Self {
    Self {
      department_id:   department_id.into(),
      department_name: String::new(),
      corp_id:         String::new(),
      corp_name:       String::new(),
      job_title:       None,
      is_primary:      false,
      department_path: None,
    }
  }

  pub fn primary(mut self, is_primary: bool) -> Self {
    self.is_primary = is_primary;
    self
  }
}

/// A row of `GET /departments/{id}/employees`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeSummary {
  #[serde(deserialize_with = "id_string")]
  pub id:         String,
  pub name:       String,
  #[serde(default)]
  pub job_title:  Option<String>,
  /// Whether this department is the employee's primary one.
  #[serde(default)]
  pub is_primary: bool,
}

// ─── Permission templates ────────────────────────────────────────────────────

/// A single assignable action on a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionAction {
  pub action:      String,
  pub action_name: String,
  #[serde(default)]
  pub description: String,
  /// `1` when the action is currently granted to the role, else `0`.
  #[serde(default)]
  pub is_default:  u8,
  #[serde(default)]
  pub sort_order:  i32,
}

/// A resource and the actions that may be granted on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionResource {
  pub resource:      String,
  pub resource_name: String,
  #[serde(default)]
  pub actions:       Vec<PermissionAction>,
}

/// All resources of one permission domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionTemplateGroup {
  pub domain:      String,
  pub domain_name: String,
  #[serde(default)]
  pub resources:   Vec<PermissionResource>,
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn raw_node_accepts_numeric_ids_and_missing_children() {
    let node: RawOrgNode = serde_json::from_value(json!({
      "id": 42,
      "name": "Platform",
      "node_type": "dept",
      "corp_id": 7,
    }))
    .unwrap();

    assert_eq!(node.id, "42");
    assert_eq!(node.corp_id.as_deref(), Some("7"));
    assert_eq!(node.node_type, NodeKind::Dept);
    assert!(node.children.is_empty());
    assert!(node.business_path.is_none());
  }

  #[test]
  fn membership_defaults_is_primary_to_false() {
    let m: DepartmentMembership = serde_json::from_value(json!({
      "department_id": "1",
      "department_name": "Eng",
      "corp_id": "c1",
      "corp_name": "Acme",
    }))
    .unwrap();

    assert!(!m.is_primary);
    assert!(m.job_title.is_none());
  }

  #[test]
  fn membership_omits_absent_optionals_on_the_wire() {
    let value = serde_json::to_value(DepartmentMembership::new("9")).unwrap();
    assert!(value.get("job_title").is_none());
    assert!(value.get("department_path").is_none());
    assert_eq!(value["is_primary"], json!(false));
  }

  #[test]
  fn permission_action_defaults() {
    let a: PermissionAction = serde_json::from_value(json!({
      "action": "read",
      "action_name": "Read",
    }))
    .unwrap();
    assert_eq!(a.is_default, 0);
    assert_eq!(a.sort_order, 0);
    assert!(a.description.is_empty());
  }
}
