//! `GET /departments`

use axum::{Json, extract::State};
use board_core::{
  directory::{self, Department},
  store::BoardStore,
};

use crate::{AppState, auth::Actor, error::Result};

pub async fn list<S>(
  State(state): State<AppState<S>>,
  _actor: Actor,
) -> Result<Json<Vec<Department>>>
where
  S: BoardStore + 'static,
{
  Ok(Json(directory::list_departments(&*state.store).await?))
}
