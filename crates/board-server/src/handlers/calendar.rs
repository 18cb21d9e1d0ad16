//! `/calendar` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/calendar` | `?department_id=&employee_id=&year=&month=&type=` |
//! | `POST`   | `/calendar` | Owner or department admin |
//! | `PUT`    | `/calendar?id=` | Partial update |
//! | `DELETE` | `/calendar?id=` | |
//! | `GET`    | `/calendar/stats` | `?year=&month=[&department_id=]` |
//! | `GET`    | `/calendar/export` | Same query; xlsx download |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::Response,
};
use board_core::{
  Error,
  calendar::{CalendarEvent, EventPatch, EventQuery, EventType, YearMonth},
  schedule::{self, EmployeeStats, EventInput},
  store::BoardStore,
};
use board_report::VacationReport;
use serde::Deserialize;

use super::{JsonBody, QueryParams, xlsx_download};
use crate::{AppState, auth::Actor, error::Result};

/// `year` and `month` must come together.
fn month_of(year: Option<i32>, month: Option<u32>) -> Result<Option<YearMonth>, Error> {
  match (year, month) {
    (Some(year), Some(month)) => YearMonth::new(year, month).map(Some),
    (None, None) => Ok(None),
    _ => Err(Error::validation("year and month must be given together")),
  }
}

// ─── CRUD ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub department_id: Option<i64>,
  pub employee_id:   Option<i64>,
  pub year:          Option<i32>,
  pub month:         Option<u32>,
  #[serde(rename = "type")]
  pub kind:          Option<EventType>,
}

/// `GET /calendar`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  _actor: Actor,
  QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<Vec<CalendarEvent>>>
where
  S: BoardStore + 'static,
{
  let query = EventQuery {
    employee_id:   params.employee_id,
    department_id: params.department_id,
    month:         month_of(params.year, params.month)?,
    kinds:         params.kind.into_iter().collect(),
  };
  Ok(Json(schedule::list_events(&*state.store, query).await?))
}

/// `POST /calendar`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Actor(actor): Actor,
  JsonBody(input): JsonBody<EventInput>,
) -> Result<(StatusCode, Json<CalendarEvent>)>
where
  S: BoardStore + 'static,
{
  let event = schedule::create_event(&*state.store, &actor, input).await?;
  Ok((StatusCode::CREATED, Json(event)))
}

#[derive(Debug, Default, Deserialize)]
pub struct IdParam {
  pub id: Option<i64>,
}

impl IdParam {
  fn required(&self) -> Result<i64, Error> {
    self.id.ok_or_else(|| Error::validation("id is required"))
  }
}

/// `PUT /calendar?id=`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  Actor(actor): Actor,
  QueryParams(params): QueryParams<IdParam>,
  JsonBody(patch): JsonBody<EventPatch>,
) -> Result<Json<CalendarEvent>>
where
  S: BoardStore + 'static,
{
  let id = params.required()?;
  Ok(Json(schedule::update_event(&*state.store, &actor, id, patch).await?))
}

/// `DELETE /calendar?id=`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  Actor(actor): Actor,
  QueryParams(params): QueryParams<IdParam>,
) -> Result<StatusCode>
where
  S: BoardStore + 'static,
{
  let id = params.required()?;
  schedule::delete_event(&*state.store, &actor, id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Monthly views ────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct MonthParams {
  pub year:          Option<i32>,
  pub month:         Option<u32>,
  pub department_id: Option<i64>,
}

impl MonthParams {
  fn month(&self) -> Result<YearMonth, Error> {
    month_of(self.year, self.month)?
      .ok_or_else(|| Error::validation("year and month are required"))
  }
}

/// `GET /calendar/stats`
pub async fn stats<S>(
  State(state): State<AppState<S>>,
  Actor(actor): Actor,
  QueryParams(params): QueryParams<MonthParams>,
) -> Result<Json<Vec<EmployeeStats>>>
where
  S: BoardStore + 'static,
{
  let month = params.month()?;
  let schedule =
    schedule::monthly_schedule(&*state.store, &actor, params.department_id, month).await?;
  Ok(Json(schedule.stats()))
}

/// `GET /calendar/export`
pub async fn export<S>(
  State(state): State<AppState<S>>,
  Actor(actor): Actor,
  QueryParams(params): QueryParams<MonthParams>,
) -> Result<Response>
where
  S: BoardStore + 'static,
{
  let month = params.month()?;
  let schedule =
    schedule::monthly_schedule(&*state.store, &actor, params.department_id, month).await?;

  let report = VacationReport::from_schedule(&schedule);
  let bytes = report.to_xlsx()?;
  tracing::info!(
    actor = actor.id,
    %month,
    employees = schedule.employees.len(),
    "vacation report exported"
  );
  Ok(xlsx_download(&report.filename(), bytes))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn year_and_month_travel_together() {
    assert_eq!(month_of(None, None).unwrap(), None);
    assert_eq!(month_of(Some(2025), Some(3)).unwrap(), YearMonth::new(2025, 3).ok());
    assert!(matches!(month_of(Some(2025), None), Err(Error::Validation(_))));
    assert!(matches!(month_of(Some(2025), Some(13)), Err(Error::Validation(_))));
  }
}
