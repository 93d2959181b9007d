//! Non-interactive subcommands.

use anyhow::{Context, Result};
use clap::Subcommand;
use orgdesk_client::ApiClient;
use orgdesk_core::{
  filter::filter_tree,
  membership::{MembershipEvent, membership_in},
  permission::check_known,
  workflow::{
    edit_memberships, load_memberships, load_permission_matrix, load_tree,
    save_permission_matrix,
  },
};

use crate::render;

// ─── Tree ─────────────────────────────────────────────────────────────────────

/// `orgdesk tree [--search S] [--json]`
pub async fn tree(
  client: &ApiClient,
  search: Option<&str>,
  json: bool,
) -> Result<()> {
  let tree = load_tree(client).await.context("loading organization tree")?;
  let tree = filter_tree(&tree, search.unwrap_or_default());
  if json {
    println!("{}", serde_json::to_string_pretty(&tree)?);
  } else {
    print!("{}", render::tree(&tree));
  }
  Ok(())
}

// ─── Memberships ──────────────────────────────────────────────────────────────

#[derive(Subcommand, Debug)]
pub enum MembershipCommand {
  /// List an employee's departments.
  Show { employee: String },

  /// Add the employee to a department (by department id or tree key).
  Add {
    employee:   String,
    department: String,
    /// Job title held in the department.
    #[arg(long)]
    title:      Option<String>,
    /// Make it the employee's primary department.
    #[arg(long)]
    primary:    bool,
  },

  /// Remove the employee from a department.
  Remove { employee: String, department: String },

  /// Make a department the employee's primary one.
  Primary { employee: String, department: String },

  /// Set (or with no title, clear) the job title held in a department.
  Title {
    employee:   String,
    department: String,
    title:      Option<String>,
  },
}

pub async fn memberships(
  client: &ApiClient,
  command: MembershipCommand,
) -> Result<()> {
  let (employee, event) = match command {
    MembershipCommand::Show { employee } => {
      let list = load_memberships(client, &employee)
        .await
        .with_context(|| format!("loading memberships of {employee}"))?;
      print!("{}", render::memberships(&list));
      return Ok(());
    }
    MembershipCommand::Add {
      employee,
      department,
      title,
      primary,
    } => {
      let tree =
        load_tree(client).await.context("loading organization tree")?;
      let membership =
        membership_in(&tree, &department, title)?.primary(primary);
      (employee, MembershipEvent::Add(membership))
    }
    MembershipCommand::Remove {
      employee,
      department,
    } => (employee, MembershipEvent::Remove(department)),
    MembershipCommand::Primary {
      employee,
      department,
    } => (employee, MembershipEvent::SetPrimary(department)),
    MembershipCommand::Title {
      employee,
      department,
      title,
    } => (employee, MembershipEvent::SetJobTitle {
      department_id: department,
      job_title:     title,
    }),
  };

  let list = edit_memberships(client, &employee, [event])
    .await
    .with_context(|| format!("saving memberships of {employee}"))?;
  print!("{}", render::memberships(&list));
  Ok(())
}

// ─── Permissions ──────────────────────────────────────────────────────────────

#[derive(Subcommand, Debug)]
pub enum PermissionCommand {
  /// Show a role's permission matrix.
  Show {
    role:   String,
    /// Only show this domain.
    #[arg(long)]
    domain: Option<String>,
  },

  /// Grant permissions (`domain_resource_action` ids) to a role.
  Grant {
    role: String,
    #[arg(required = true)]
    ids:  Vec<String>,
  },

  /// Revoke permissions from a role.
  Revoke {
    role: String,
    #[arg(required = true)]
    ids:  Vec<String>,
  },
}

pub async fn permissions(
  client: &ApiClient,
  command: PermissionCommand,
) -> Result<()> {
  let (role, ids, grant) = match command {
    PermissionCommand::Show { role, domain } => {
      let matrix = load_permission_matrix(client, &role)
        .await
        .with_context(|| format!("loading permissions of role {role}"))?;
      let mut rows = matrix.rows(&matrix.selection);
      if let Some(domain) = &domain {
        rows.retain(|r| &r.domain == domain);
      }
      print!("{}", render::matrix(&rows));
      return Ok(());
    }
    PermissionCommand::Grant { role, ids } => (role, ids, true),
    PermissionCommand::Revoke { role, ids } => (role, ids, false),
  };

  let matrix = load_permission_matrix(client, &role)
    .await
    .with_context(|| format!("loading permissions of role {role}"))?;
  check_known(&matrix.groups, ids.iter().map(String::as_str))?;

  let mut selection = matrix.selection.clone();
  for id in ids {
    selection.set(id, grant);
  }

  let (diff, _) = save_permission_matrix(client, &role, &matrix, &selection)
    .await
    .with_context(|| format!("saving permissions of role {role}"))?;
  print!("{}", render::diff(&diff));
  Ok(())
}
