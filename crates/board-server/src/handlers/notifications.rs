//! `/notifications` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/notifications` | Own list; `?employee_id=` for employee managers |
//! | `POST`   | `/notifications` | Bulk create, moderators and above |
//! | `GET`    | `/notifications/unread-count` | `{"count": n}` |
//! | `POST`   | `/notifications/read-all` | `{"updated": n}` |
//! | `PATCH`  | `/notifications/{id}` | Optional body `{"is_read": bool}`, default `true` |
//! | `DELETE` | `/notifications/{id}` | Owner only |

use axum::{Json, body::Bytes, extract::State, http::StatusCode};
use board_core::{
  notification::{self, Notification, NotificationDraft},
  store::BoardStore,
};
use serde::{Deserialize, Serialize};

use super::{JsonBody, PathParam, QueryParams};
use crate::{
  AppState,
  auth::Actor,
  error::{ApiError, Result},
};

#[derive(Debug, Default, Deserialize)]
pub struct RecipientParams {
  pub employee_id: Option<i64>,
}

/// `GET /notifications`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Actor(actor): Actor,
  QueryParams(params): QueryParams<RecipientParams>,
) -> Result<Json<Vec<Notification>>>
where
  S: BoardStore + 'static,
{
  let recipient = notification::resolve_recipient(&actor, params.employee_id)?;
  Ok(Json(notification::list_for(&*state.store, recipient).await?))
}

#[derive(Debug, Deserialize)]
pub struct SendBody {
  #[serde(flatten)]
  pub draft:               NotificationDraft,
  #[serde(default)]
  pub target_employee_ids: Vec<i64>,
}

/// `POST /notifications`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Actor(actor): Actor,
  JsonBody(body): JsonBody<SendBody>,
) -> Result<(StatusCode, Json<Vec<Notification>>)>
where
  S: BoardStore + 'static,
{
  let created =
    notification::send(&*state.store, &actor, body.draft, body.target_employee_ids).await?;
  Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Serialize)]
pub struct UnreadCount {
  pub count: u64,
}

/// `GET /notifications/unread-count`
pub async fn unread_count<S>(
  State(state): State<AppState<S>>,
  Actor(actor): Actor,
  QueryParams(params): QueryParams<RecipientParams>,
) -> Result<Json<UnreadCount>>
where
  S: BoardStore + 'static,
{
  let recipient = notification::resolve_recipient(&actor, params.employee_id)?;
  let count = notification::unread_count(&*state.store, recipient).await?;
  Ok(Json(UnreadCount { count }))
}

#[derive(Debug, Serialize)]
pub struct Updated {
  pub updated: u64,
}

/// `POST /notifications/read-all`
pub async fn read_all<S>(
  State(state): State<AppState<S>>,
  Actor(actor): Actor,
) -> Result<Json<Updated>>
where
  S: BoardStore + 'static,
{
  let updated = notification::mark_all_read(&*state.store, actor.id).await?;
  Ok(Json(Updated { updated }))
}

#[derive(Debug, Default, Deserialize)]
pub struct ReadBody {
  pub is_read: Option<bool>,
}

impl ReadBody {
  /// An empty body means "mark read".
  fn parse(bytes: &[u8]) -> Result<Self> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
      return Ok(Self::default());
    }
    serde_json::from_slice(bytes).map_err(|e| ApiError::BadRequest(e.to_string()))
  }
}

/// `PATCH /notifications/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  Actor(actor): Actor,
  PathParam(id): PathParam<i64>,
  body: Bytes,
) -> Result<Json<Notification>>
where
  S: BoardStore + 'static,
{
  let is_read = ReadBody::parse(&body)?.is_read.unwrap_or(true);
  Ok(Json(notification::set_read(&*state.store, &actor, id, is_read).await?))
}

/// `DELETE /notifications/{id}`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  Actor(actor): Actor,
  PathParam(id): PathParam<i64>,
) -> Result<StatusCode>
where
  S: BoardStore + 'static,
{
  notification::delete(&*state.store, &actor, id).await?;
  Ok(StatusCode::NO_CONTENT)
}
