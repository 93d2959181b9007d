//! Error type for `orgdesk-client`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
  #[error("invalid base URL {0:?}")]
  InvalidBaseUrl(String),

  #[error("failed to build HTTP client: {0}")]
  Build(#[source] reqwest::Error),

  #[error("{method} {path} failed: {source}")]
  Transport {
    method: &'static str,
    path:   String,
    #[source]
    source: reqwest::Error,
  },

  #[error("not found: {0}")]
  NotFound(String),

  #[error("API error (status {status}): {message}")]
  Api { status: u16, message: String },

  #[error("deserialising {path}: {source}")]
  Decode {
    path:   String,
    #[source]
    source: reqwest::Error,
  },
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;
