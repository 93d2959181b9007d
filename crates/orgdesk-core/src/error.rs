//! Error types for `orgdesk-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("node {0} is a corporation and cannot hold members")]
  NotADepartment(String),

  #[error("no node with key {0:?} in the organization tree")]
  NodeNotFound(String),

  #[error("permission id {0:?} names more than one action")]
  DuplicatePermission(String),

  #[error("unknown permission id: {0:?}")]
  UnknownPermission(String),

  #[error("directory error: {0}")]
  Directory(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error.
  pub fn directory<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Directory(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
