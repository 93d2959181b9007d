//! Integration tests for `ApiClient` against a wiremock backend.

use orgdesk_client::{ApiClient, ApiConfig, ClientError};
use orgdesk_core::{
  directory::OrgDirectory,
  membership::MembershipEvent,
  model::{DepartmentMembership, NodeKind},
  workflow::{
    edit_memberships, load_permission_matrix, load_tree,
    save_permission_matrix,
  },
};
use serde_json::json;
use wiremock::{
  Mock, MockServer, ResponseTemplate,
  matchers::{basic_auth, body_json, method, path},
};

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn client(server: &MockServer) -> ApiClient {
  ApiClient::new(ApiConfig {
    base_url: server.uri(),
    username: String::new(),
    password: String::new(),
  })
  .unwrap()
}

fn templates(write_granted: u8) -> serde_json::Value {
  json!([{
    "domain": "org",
    "domain_name": "Organization",
    "resources": [{
      "resource": "dept",
      "resource_name": "Departments",
      "actions": [
        { "action": "read", "action_name": "Read", "description": "View", "is_default": 1, "sort_order": 1 },
        { "action": "write", "action_name": "Write", "description": "Edit", "is_default": write_granted, "sort_order": 2 }
      ]
    }]
  }])
}

// ─── Organization tree ───────────────────────────────────────────────────────

#[tokio::test]
async fn org_tree_is_fetched_and_built() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/api/org/tree"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
      "id": 1,
      "name": "Acme",
      "node_type": "corp",
      "children": [{ "id": 10, "name": "Eng", "node_type": "dept" }]
    }])))
    .expect(2)
    .mount(&server)
    .await;

  let raw = client(&server).org_tree().await.unwrap();
  assert_eq!(raw[0].node_type, NodeKind::Corp);
  assert_eq!(raw[0].children[0].id, "10");

  let tree = load_tree(&client(&server)).await.unwrap();
  let eng = &tree[0].children[0];
  assert_eq!(eng.key, "dept_10");
  assert_eq!(eng.corp_id, "1");
  assert_eq!(eng.corp_name, "Acme");
}

#[tokio::test]
async fn department_staff_listing() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/api/departments/10/employees"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!([
      { "id": 7, "name": "Ada", "job_title": "Engineer", "is_primary": true },
      { "id": "8", "name": "Brian" }
    ])))
    .mount(&server)
    .await;

  let staff = client(&server).department_employees("10").await.unwrap();
  assert_eq!(staff.len(), 2);
  assert_eq!(staff[0].id, "7");
  assert!(staff[0].is_primary);
  assert!(staff[1].job_title.is_none());
}

// ─── Memberships ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn membership_edit_puts_reconciled_list() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/api/employees/e1/departments"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!([
      { "department_id": "1", "department_name": "Eng", "corp_id": "c1", "corp_name": "Acme", "is_primary": false },
      { "department_id": "2", "department_name": "Ops", "corp_id": "c1", "corp_name": "Acme", "is_primary": true }
    ])))
    .mount(&server)
    .await;
  Mock::given(method("PUT"))
    .and(path("/api/employees/e1/departments"))
    .and(body_json(json!([
      { "department_id": "1", "department_name": "Eng", "corp_id": "c1", "corp_name": "Acme", "is_primary": true }
    ])))
    .respond_with(ResponseTemplate::new(204))
    .expect(1)
    .mount(&server)
    .await;

  // Removing the primary department promotes the remaining one before save.
  edit_memberships(&client(&server), "e1", [MembershipEvent::Remove(
    "2".into(),
  )])
  .await
  .unwrap();
}

#[tokio::test]
async fn save_sends_every_field_it_knows() {
  let server = MockServer::start().await;
  let mut m = DepartmentMembership::new("5").primary(true);
  m.job_title = Some("Lead".into());
  m.department_path = Some("Acme/Eng".into());

  Mock::given(method("PUT"))
    .and(path("/api/employees/42/departments"))
    .and(body_json(json!([{
      "department_id": "5",
      "department_name": "",
      "corp_id": "",
      "corp_name": "",
      "job_title": "Lead",
      "is_primary": true,
      "department_path": "Acme/Eng"
    }])))
    .respond_with(ResponseTemplate::new(200))
    .expect(1)
    .mount(&server)
    .await;

  client(&server)
    .save_employee_departments("42", &[m])
    .await
    .unwrap();
}

// ─── Permissions ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn granting_a_permission_puts_rebuilt_templates() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/api/roles/admin/permissions"))
    .respond_with(ResponseTemplate::new(200).set_body_json(templates(0)))
    .mount(&server)
    .await;
  Mock::given(method("PUT"))
    .and(path("/api/roles/admin/permissions"))
    .and(body_json(templates(1)))
    .respond_with(ResponseTemplate::new(204))
    .expect(1)
    .mount(&server)
    .await;

  let api = client(&server);
  let matrix = load_permission_matrix(&api, "admin").await.unwrap();
  let mut selection = matrix.selection.clone();
  selection.set("org_dept_write", true);

  let (diff, _) = save_permission_matrix(&api, "admin", &matrix, &selection)
    .await
    .unwrap();
  assert_eq!(diff.granted, ["org_dept_write"]);
}

// ─── Errors and auth ─────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_role_maps_to_not_found() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/api/roles/ghost/permissions"))
    .respond_with(ResponseTemplate::new(404))
    .mount(&server)
    .await;

  let err = client(&server).role_permissions("ghost").await.unwrap_err();
  assert!(matches!(err, ClientError::NotFound(ref p) if p == "/api/roles/ghost/permissions"));
}

#[tokio::test]
async fn server_error_carries_status_and_body() {
  let server = MockServer::start().await;
  Mock::given(method("PUT"))
    .and(path("/api/roles/admin/permissions"))
    .respond_with(ResponseTemplate::new(422).set_body_string("action list mismatch"))
    .mount(&server)
    .await;

  let err = client(&server)
    .save_role_permissions("admin", &[])
    .await
    .unwrap_err();
  match err {
    ClientError::Api { status, message } => {
      assert_eq!(status, 422);
      assert_eq!(message, "action list mismatch");
    }
    other => panic!("unexpected error: {other}"),
  }
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/api/org/tree"))
    .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
    .mount(&server)
    .await;

  let err = client(&server).org_tree().await.unwrap_err();
  assert!(matches!(err, ClientError::Decode { .. }), "{err}");
}

#[tokio::test]
async fn credentials_are_sent_as_basic_auth() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/api/org/tree"))
    .and(basic_auth("admin", "s3cret"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
    .expect(1)
    .mount(&server)
    .await;

  let api = ApiClient::new(ApiConfig {
    base_url: server.uri(),
    username: "admin".into(),
    password: "s3cret".into(),
  })
  .unwrap();
  assert!(api.org_tree().await.unwrap().is_empty());
}
