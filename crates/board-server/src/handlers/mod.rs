//! Route handlers, one module per resource under `/api`.

pub mod auth;
pub mod calendar;
pub mod departments;
pub mod employees;
pub mod notifications;
pub mod posts;

use axum::{
  extract::{FromRequest, FromRequestParts, Path, Query},
  http::header,
  response::{IntoResponse, Response},
};
use board_report::XLSX_CONTENT_TYPE;

use crate::error::ApiError;

/// `axum::Json` whose rejection is an [`ApiError`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// `Query` whose rejection is an [`ApiError`].
#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(ApiError))]
pub struct QueryParams<T>(pub T);

/// `Path` whose rejection is an [`ApiError`].
#[derive(FromRequestParts)]
#[from_request(via(Path), rejection(ApiError))]
pub struct PathParam<T>(pub T);

/// An xlsx attachment named `filename`.
pub(crate) fn xlsx_download(filename: &str, bytes: Vec<u8>) -> Response {
  let disposition = format!("attachment; filename=\"{filename}\"");
  (
    [
      (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_owned()),
      (header::CONTENT_DISPOSITION, disposition),
    ],
    bytes,
  )
    .into_response()
}
