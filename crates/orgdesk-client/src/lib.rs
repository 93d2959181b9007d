//! Async HTTP client for the organization backend's JSON REST API.
//!
//! [`ApiClient`] implements [`OrgDirectory`], so everything in
//! `orgdesk_core::workflow` runs against a live backend through it.
//!
//! | Method | Path | Body / result |
//! |--------|------|---------------|
//! | `GET`  | `/api/org/tree` | `Vec<RawOrgNode>` |
//! | `GET`  | `/api/departments/{id}/employees` | `Vec<EmployeeSummary>` |
//! | `GET`  | `/api/employees/{id}/departments` | `Vec<DepartmentMembership>` |
//! | `PUT`  | `/api/employees/{id}/departments` | `Vec<DepartmentMembership>` |
//! | `GET`  | `/api/roles/{id}/permissions` | `Vec<PermissionTemplateGroup>` |
//! | `PUT`  | `/api/roles/{id}/permissions` | `Vec<PermissionTemplateGroup>` |

pub mod error;

use std::time::Duration;

use orgdesk_core::{
  directory::OrgDirectory,
  model::{
    DepartmentMembership, EmployeeSummary, PermissionTemplateGroup,
    RawOrgNode,
  },
};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

pub use error::{ClientError, Result};

/// Connection settings for the backend API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub username: String,
  pub password: String,
}

/// Async HTTP client for the backend REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client:   Client,
  base:     Url,
  username: String,
  password: String,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let base = Url::parse(&config.base_url)
      .ok()
      .filter(|u| !u.cannot_be_a_base())
      .ok_or_else(|| ClientError::InvalidBaseUrl(config.base_url.clone()))?;
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .map_err(ClientError::Build)?;
    Ok(Self {
      client,
      base,
      username: config.username,
      password: config.password,
    })
  }

  /// `{base}/api/{segments...}`, each segment percent-encoded.
  fn url(&self, segments: &[&str]) -> Url {
    let mut url = self.base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
      path.pop_if_empty().push("api").extend(segments);
    }
    url
  }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    if self.username.is_empty() {
      req
    } else {
      req.basic_auth(&self.username, Some(&self.password))
    }
  }

  /// Map a non-success status to an error, keeping the body as the message.
  async fn check(resp: Response, path: &str) -> Result<Response> {
    let status = resp.status();
    debug!(path, status = status.as_u16(), "response");
    if status.is_success() {
      return Ok(resp);
    }
    if status == StatusCode::NOT_FOUND {
      return Err(ClientError::NotFound(path.to_string()));
    }
    let message = resp.text().await.unwrap_or_default();
    Err(ClientError::Api {
      status: status.as_u16(),
      message,
    })
  }

  async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
    let url = self.url(segments);
    let path = url.path().to_string();
    debug!(%path, "GET");
    let resp = self
      .auth(self.client.get(url))
      .send()
      .await
      .map_err(|source| ClientError::Transport {
        method: "GET",
        path: path.clone(),
        source,
      })?;
    Self::check(resp, &path)
      .await?
      .json()
      .await
      .map_err(|source| ClientError::Decode { path, source })
  }

  async fn put_json<B: Serialize + ?Sized>(
    &self,
    segments: &[&str],
    body: &B,
  ) -> Result<()> {
    let url = self.url(segments);
    let path = url.path().to_string();
    debug!(%path, "PUT");
    let resp = self
      .auth(self.client.put(url))
      .json(body)
      .send()
      .await
      .map_err(|source| ClientError::Transport {
        method: "PUT",
        path: path.clone(),
        source,
      })?;
    Self::check(resp, &path).await?;
    Ok(())
  }
}

impl OrgDirectory for ApiClient {
  type Error = ClientError;

  /// `GET /api/org/tree`
  async fn org_tree(&self) -> Result<Vec<RawOrgNode>> {
    self.get_json(&["org", "tree"]).await
  }

  /// `GET /api/departments/{id}/employees`
  async fn department_employees<'a>(
    &'a self,
    department_id: &'a str,
  ) -> Result<Vec<EmployeeSummary>> {
    self
      .get_json(&["departments", department_id, "employees"])
      .await
  }

  /// `GET /api/employees/{id}/departments`
  async fn employee_departments<'a>(
    &'a self,
    employee_id: &'a str,
  ) -> Result<Vec<DepartmentMembership>> {
    self
      .get_json(&["employees", employee_id, "departments"])
      .await
  }

  /// `PUT /api/employees/{id}/departments`
  async fn save_employee_departments<'a>(
    &'a self,
    employee_id: &'a str,
    memberships: &'a [DepartmentMembership],
  ) -> Result<()> {
    self
      .put_json(&["employees", employee_id, "departments"], memberships)
      .await
  }

  /// `GET /api/roles/{id}/permissions`
  async fn role_permissions<'a>(
    &'a self,
    role_id: &'a str,
  ) -> Result<Vec<PermissionTemplateGroup>> {
    self.get_json(&["roles", role_id, "permissions"]).await
  }

  /// `PUT /api/roles/{id}/permissions`
  async fn save_role_permissions<'a>(
    &'a self,
    role_id: &'a str,
    groups: &'a [PermissionTemplateGroup],
  ) -> Result<()> {
    self.put_json(&["roles", role_id, "permissions"], groups).await
  }
}
