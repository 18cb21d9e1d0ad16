//! Error type and axum `IntoResponse` implementation.
//!
//! Every failure is answered as `{"error": message}`. Store and report
//! failures are logged here and reach the client only as a generic message.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Board(#[from] board_core::Error),

  #[error(transparent)]
  Report(#[from] board_report::Error),

  /// The request itself could not be decoded (body, query or path).
  #[error("bad request: {0}")]
  BadRequest(String),
}

impl ApiError {
  pub fn unauthenticated(msg: impl Into<String>) -> Self {
    Self::Board(board_core::Error::Unauthenticated(msg.into()))
  }

  fn status_and_message(&self) -> (StatusCode, String) {
    use board_core::Error as E;

    match self {
      ApiError::Board(e) => match e {
        E::Validation(m) => (StatusCode::BAD_REQUEST, m.clone()),
        E::Unauthenticated(m) => (StatusCode::UNAUTHORIZED, m.clone()),
        E::PermissionDenied(m) => (StatusCode::FORBIDDEN, m.clone()),
        E::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
        E::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
        E::Internal(_) | E::StoreUnavailable(_) => {
          tracing::error!(error = %e, "request failed");
          (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".into())
        }
      },
      ApiError::Report(e) if e.is_bad_input() => (StatusCode::BAD_REQUEST, e.to_string()),
      ApiError::Report(e) => {
        tracing::error!(error = %e, "spreadsheet generation failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "could not generate spreadsheet".into())
      }
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = self.status_and_message();
    let mut res = (status, Json(json!({ "error": message }))).into_response();
    if status == StatusCode::UNAUTHORIZED {
      res
        .headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    }
    res
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

pub type Result<T, E = ApiError> = std::result::Result<T, E>;
