//! `/employees` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/employees` | Optional `?department_id=&is_active=` |
//! | `POST`   | `/employees` | Admins only |
//! | `PATCH`  | `/employees/{id}` | Scoped to the admin's department |
//! | `DELETE` | `/employees/{id}` | Scoped to the admin's department |
//! | `PATCH`  | `/employees/{id}/password` | Self only |
//! | `POST`   | `/employees/import` | Body: roster xlsx |
//! | `GET`    | `/employees/import/template` | Roster xlsx template |

use axum::{
  Json,
  body::Bytes,
  extract::State,
  http::StatusCode,
  response::Response,
};
use board_core::{
  Error,
  directory::{
    self, Employee, EmployeeFilter, EmployeeInput, EmployeePatch, EmployeeView,
    ImportSummary,
  },
  store::BoardStore,
};
use board_report::roster::{self, TEMPLATE_FILENAME};
use serde::Deserialize;

use super::{JsonBody, PathParam, QueryParams, xlsx_download};
use crate::{AppState, auth::Actor, error::Result};

/// `GET /employees`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  _actor: Actor,
  QueryParams(filter): QueryParams<EmployeeFilter>,
) -> Result<Json<Vec<EmployeeView>>>
where
  S: BoardStore + 'static,
{
  Ok(Json(directory::list_employees(&*state.store, filter).await?))
}

/// `POST /employees`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Actor(actor): Actor,
  JsonBody(input): JsonBody<EmployeeInput>,
) -> Result<(StatusCode, Json<Employee>)>
where
  S: BoardStore + 'static,
{
  let employee = directory::create_employee(&*state.store, &actor, input).await?;
  Ok((StatusCode::CREATED, Json(employee)))
}

/// `PATCH /employees/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  Actor(actor): Actor,
  PathParam(id): PathParam<i64>,
  JsonBody(patch): JsonBody<EmployeePatch>,
) -> Result<Json<Employee>>
where
  S: BoardStore + 'static,
{
  Ok(Json(directory::update_employee(&*state.store, &actor, id, patch).await?))
}

/// `DELETE /employees/{id}`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  Actor(actor): Actor,
  PathParam(id): PathParam<i64>,
) -> Result<StatusCode>
where
  S: BoardStore + 'static,
{
  directory::delete_employee(&*state.store, &actor, id).await?;
  Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct PasswordBody {
  #[serde(default)]
  pub current_password: String,
  #[serde(default)]
  pub new_password:     String,
}

/// `PATCH /employees/{id}/password`
pub async fn change_password<S>(
  State(state): State<AppState<S>>,
  Actor(actor): Actor,
  PathParam(id): PathParam<i64>,
  JsonBody(body): JsonBody<PasswordBody>,
) -> Result<StatusCode>
where
  S: BoardStore + 'static,
{
  directory::change_password(
    &*state.store,
    &actor,
    id,
    &body.current_password,
    &body.new_password,
  )
  .await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /employees/import`
pub async fn import<S>(
  State(state): State<AppState<S>>,
  Actor(actor): Actor,
  body: Bytes,
) -> Result<Json<ImportSummary>>
where
  S: BoardStore + 'static,
{
  if !actor.role.can_manage_employees() {
    return Err(Error::denied("insufficient permissions to import employees").into());
  }
  if body.is_empty() {
    return Err(Error::validation("upload a roster workbook").into());
  }

  let entries = roster::parse_roster(&body)?;
  if entries.is_empty() {
    return Err(Error::validation("no employee rows found in the workbook").into());
  }
  let summary = directory::import_roster(
    &*state.store,
    &actor,
    entries,
    &state.config.import_default_password,
  )
  .await?;
  Ok(Json(summary))
}

/// `GET /employees/import/template`
pub async fn template<S>(State(state): State<AppState<S>>, _actor: Actor) -> Result<Response>
where
  S: BoardStore + 'static,
{
  let names: Vec<String> = directory::list_departments(&*state.store)
    .await?
    .into_iter()
    .map(|d| d.name)
    .collect();
  let bytes = roster::roster_template(&names)?;
  Ok(xlsx_download(TEMPLATE_FILENAME, bytes))
}
