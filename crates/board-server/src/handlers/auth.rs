//! `/auth` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/login` | Body: `{"employee_id","password"}`; returns a bearer token |
//! | `POST` | `/auth/logout` | Revokes the presented token |
//! | `GET`  | `/auth/me` | The logged-in employee |

use axum::{
  Json,
  extract::State,
  http::{HeaderMap, StatusCode},
};
use board_core::{
  directory::{self, Employee, EmployeeView},
  store::{BoardStore, StoreResultExt as _},
};
use serde::{Deserialize, Serialize};

use super::JsonBody;
use crate::{
  AppState,
  auth::{Actor, bearer_token},
  error::Result,
};

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  #[serde(default)]
  pub employee_id: String,
  #[serde(default)]
  pub password:    String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
  pub success:  bool,
  pub employee: EmployeeView,
  pub token:    String,
}

async fn view<S: BoardStore>(store: &S, employee: Employee) -> Result<EmployeeView> {
  let department_name = match employee.department_id {
    Some(id) => store.get_department(id).await.lift()?.map(|d| d.name),
    None => None,
  };
  Ok(EmployeeView { employee, department_name })
}

/// `POST /auth/login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  JsonBody(body): JsonBody<LoginBody>,
) -> Result<Json<LoginResponse>>
where
  S: BoardStore + 'static,
{
  let store = &*state.store;
  let employee = directory::authenticate(store, &body.employee_id, &body.password).await?;
  let token = state.sessions.issue(employee.id);
  let employee = view(store, employee).await?;
  Ok(Json(LoginResponse { success: true, employee, token }))
}

/// `POST /auth/logout`
pub async fn logout<S>(State(state): State<AppState<S>>, headers: HeaderMap) -> StatusCode
where
  S: BoardStore + 'static,
{
  if let Some(token) = bearer_token(&headers) {
    state.sessions.revoke(token);
  }
  StatusCode::NO_CONTENT
}

/// `GET /auth/me`
pub async fn me<S>(
  State(state): State<AppState<S>>,
  Actor(actor): Actor,
) -> Result<Json<EmployeeView>>
where
  S: BoardStore + 'static,
{
  Ok(Json(view(&*state.store, actor).await?))
}
