//! Error types for `board-core`.

use thiserror::Error;

/// Every failure a board operation can surface to its caller.
#[derive(Debug, Error)]
pub enum Error {
  /// A required field is missing or malformed.
  #[error("{0}")]
  Validation(String),

  /// The caller is known but not allowed to do this.
  #[error("{0}")]
  PermissionDenied(String),

  /// No valid credentials or session were presented.
  #[error("{0}")]
  Unauthenticated(String),

  #[error("{0}")]
  NotFound(String),

  /// A uniqueness constraint was violated (duplicate employee code, email…).
  #[error("{0}")]
  Conflict(String),

  /// Unexpected failure outside the store (e.g. password hashing).
  #[error("internal error: {0}")]
  Internal(String),

  /// The backing store could not complete the request.
  #[error("store unavailable: {0}")]
  StoreUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn validation(msg: impl Into<String>) -> Self { Self::Validation(msg.into()) }

  pub fn denied(msg: impl Into<String>) -> Self { Self::PermissionDenied(msg.into()) }

  pub fn not_found(msg: impl Into<String>) -> Self { Self::NotFound(msg.into()) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
