//! `/posts` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/posts` | Optional `?type=announcement\|department&department_id=` |
//! | `POST`   | `/posts` | Notifies the audience |
//! | `GET`    | `/posts/{id}` | 404 if not found |
//! | `PATCH`  | `/posts/{id}` | Author or system administrator |
//! | `DELETE` | `/posts/{id}` | Removes confirmations too |
//! | `POST`   | `/posts/{id}/view` | Best-effort view count |
//! | `GET`    | `/posts/{id}/confirmations` | |
//! | `POST`   | `/posts/{id}/confirmations` | Idempotent |

use axum::{Json, extract::State, http::StatusCode};
use board_core::{
  bulletin::{self, PostInput, Published},
  post::{ConfirmationView, Post, PostConfirmation, PostFilter, PostPatch, PostType, PostView},
  store::BoardStore,
};
use serde::Deserialize;

use super::{JsonBody, PathParam, QueryParams};
use crate::{AppState, auth::Actor, error::Result};

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  #[serde(rename = "type")]
  pub post_type:     Option<PostType>,
  pub department_id: Option<i64>,
}

impl ListParams {
  /// A department id wins over `type`; `type=department` alone means the
  /// caller's own department.
  fn filter(&self, own_department: Option<i64>) -> PostFilter {
    match (self.department_id, self.post_type) {
      (Some(id), _) => PostFilter::Department(id),
      (None, Some(PostType::Announcement)) => PostFilter::Global,
      (None, Some(PostType::Department)) => {
        own_department.map_or(PostFilter::All, PostFilter::Department)
      }
      (None, None) => PostFilter::All,
    }
  }
}

/// `GET /posts`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Actor(actor): Actor,
  QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<Vec<PostView>>>
where
  S: BoardStore + 'static,
{
  let filter = params.filter(actor.department_id);
  Ok(Json(bulletin::list_posts(&*state.store, filter).await?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /posts`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Actor(actor): Actor,
  JsonBody(input): JsonBody<PostInput>,
) -> Result<(StatusCode, Json<Published>)>
where
  S: BoardStore + 'static,
{
  let published = bulletin::create_post(&*state.store, &actor, input).await?;
  Ok((StatusCode::CREATED, Json(published)))
}

// ─── Single post ──────────────────────────────────────────────────────────────

/// `GET /posts/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  _actor: Actor,
  PathParam(id): PathParam<i64>,
) -> Result<Json<PostView>>
where
  S: BoardStore + 'static,
{
  Ok(Json(bulletin::get_post(&*state.store, id).await?))
}

/// `PATCH /posts/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  Actor(actor): Actor,
  PathParam(id): PathParam<i64>,
  JsonBody(patch): JsonBody<PostPatch>,
) -> Result<Json<Post>>
where
  S: BoardStore + 'static,
{
  Ok(Json(bulletin::update_post(&*state.store, &actor, id, patch).await?))
}

/// `DELETE /posts/{id}`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  Actor(actor): Actor,
  PathParam(id): PathParam<i64>,
) -> Result<StatusCode>
where
  S: BoardStore + 'static,
{
  bulletin::delete_post(&*state.store, &actor, id).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /posts/{id}/view` — always succeeds.
pub async fn view<S>(
  State(state): State<AppState<S>>,
  _actor: Actor,
  PathParam(id): PathParam<i64>,
) -> StatusCode
where
  S: BoardStore + 'static,
{
  bulletin::record_view(&*state.store, id).await;
  StatusCode::NO_CONTENT
}

// ─── Confirmations ────────────────────────────────────────────────────────────

/// `GET /posts/{id}/confirmations`
pub async fn confirmations<S>(
  State(state): State<AppState<S>>,
  _actor: Actor,
  PathParam(id): PathParam<i64>,
) -> Result<Json<Vec<ConfirmationView>>>
where
  S: BoardStore + 'static,
{
  Ok(Json(bulletin::list_confirmations(&*state.store, id).await?))
}

/// `POST /posts/{id}/confirmations`
pub async fn confirm<S>(
  State(state): State<AppState<S>>,
  Actor(actor): Actor,
  PathParam(id): PathParam<i64>,
) -> Result<Json<PostConfirmation>>
where
  S: BoardStore + 'static,
{
  Ok(Json(bulletin::confirm_post(&*state.store, id, actor.id).await?))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn params(post_type: Option<PostType>, department_id: Option<i64>) -> ListParams {
    ListParams { post_type, department_id }
  }

  #[test]
  fn list_filter_resolution() {
    assert_eq!(params(None, None).filter(Some(3)), PostFilter::All);
    assert_eq!(params(None, Some(2)).filter(Some(3)), PostFilter::Department(2));
    assert_eq!(
      params(Some(PostType::Announcement), None).filter(Some(3)),
      PostFilter::Global
    );
    assert_eq!(
      params(Some(PostType::Department), None).filter(Some(3)),
      PostFilter::Department(3)
    );
    assert_eq!(params(Some(PostType::Department), None).filter(None), PostFilter::All);
  }
}
