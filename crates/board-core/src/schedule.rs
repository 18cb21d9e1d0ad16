//! Schedule — calendar event CRUD and per-month aggregation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  calendar::{
    CalendarEvent, EventPatch, EventQuery, EventStatus, EventType, NewEvent, YearMonth,
  },
  directory::{Department, Employee, EmployeeFilter},
  store::{BoardStore, StoreResultExt as _},
};

/// Body of an event-creation request. Every field except `description` is
/// required; they are optional here so a missing one is a validation error
/// rather than a parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventInput {
  pub title:         Option<String>,
  #[serde(rename = "type")]
  pub kind:          Option<EventType>,
  pub date:          Option<NaiveDate>,
  pub description:   Option<String>,
  pub employee_id:   Option<i64>,
  pub department_id: Option<i64>,
}

/// Per-employee event counts for one month.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EmployeeStats {
  pub employee_id:  i64,
  pub name:         String,
  pub annual_leave: u32,
  pub half_day:     u32,
  pub quarter_day:  u32,
  pub training:     u32,
  pub other:        u32,
  pub total:        u32,
}

impl EmployeeStats {
  fn count(&mut self, kind: EventType) {
    match kind {
      EventType::AnnualLeave => self.annual_leave += 1,
      EventType::HalfDay => self.half_day += 1,
      EventType::QuarterDay => self.quarter_day += 1,
      EventType::Training => self.training += 1,
      EventType::Other => self.other += 1,
    }
    self.total += 1;
  }
}

/// Count approved events in `month` by type, one row per employee in
/// `employees` order. Employees without events get a zero row; events of
/// employees not in the list are ignored.
pub fn compute_monthly_stats(
  events: &[CalendarEvent],
  employees: &[Employee],
  month: YearMonth,
) -> Vec<EmployeeStats> {
  let mut stats: Vec<EmployeeStats> = employees
    .iter()
    .map(|e| EmployeeStats {
      employee_id: e.id,
      name: e.name.clone(),
      ..EmployeeStats::default()
    })
    .collect();

  for event in events {
    if event.status != EventStatus::Approved || !month.contains(event.date) {
      continue;
    }
    if let Some(row) = stats.iter_mut().find(|s| s.employee_id == event.employee_id) {
      row.count(event.kind);
    }
  }
  stats
}

/// Rights are judged against the employee's own department, never a
/// department the caller names.
fn can_edit_event(actor: &Employee, employee_id: i64, department_id: Option<i64>) -> bool {
  actor.id == employee_id || actor.can_manage_department(department_id)
}

/// The department that governs `event`: its employee's current department, or
/// the recorded one if the employee no longer exists.
async fn governing_department<S: BoardStore>(
  store: &S,
  event: &CalendarEvent,
) -> Result<Option<i64>> {
  Ok(match store.get_employee(event.employee_id).await.lift()? {
    Some(employee) => employee.department_id,
    None => Some(event.department_id),
  })
}

async fn find_event<S: BoardStore>(store: &S, id: i64) -> Result<CalendarEvent> {
  store
    .get_event(id)
    .await
    .lift()?
    .ok_or_else(|| Error::not_found(format!("calendar event {id} not found")))
}

pub async fn list_events<S: BoardStore>(
  store: &S,
  query: EventQuery,
) -> Result<Vec<CalendarEvent>> {
  store.list_events(query).await.lift()
}

pub async fn create_event<S: BoardStore>(
  store: &S,
  actor: &Employee,
  input: EventInput,
) -> Result<CalendarEvent> {
  let title = input
    .title
    .map(|t| t.trim().to_owned())
    .filter(|t| !t.is_empty());
  let (Some(title), Some(kind), Some(date), Some(employee_id), Some(department_id)) = (
    title,
    input.kind,
    input.date,
    input.employee_id,
    input.department_id,
  ) else {
    return Err(Error::validation(
      "title, type, date, employee_id and department_id are required",
    ));
  };

  let Some(employee) = store.get_employee(employee_id).await.lift()? else {
    return Err(Error::validation(format!("employee {employee_id} does not exist")));
  };
  if !can_edit_event(actor, employee_id, employee.department_id) {
    return Err(Error::denied("cannot create events for this employee"));
  }
  if employee.department_id != Some(department_id) {
    return Err(Error::validation(format!(
      "employee {employee_id} does not belong to department {department_id}"
    )));
  }

  let event = store
    .insert_event(NewEvent {
      title,
      kind,
      date,
      description: input.description,
      employee_id,
      department_id,
      status: EventStatus::Approved,
    })
    .await
    .lift()?;
  tracing::info!(event = event.id, employee = employee_id, %date, kind = %kind, "calendar event created");
  Ok(event)
}

pub async fn update_event<S: BoardStore>(
  store: &S,
  actor: &Employee,
  id: i64,
  patch: EventPatch,
) -> Result<CalendarEvent> {
  let event = find_event(store, id).await?;
  let department_id = governing_department(store, &event).await?;
  if !can_edit_event(actor, event.employee_id, department_id) {
    return Err(Error::denied("cannot edit this event"));
  }
  if patch.status.is_some_and(|s| s != event.status) && !actor.role.can_manage_employees()
  {
    return Err(Error::denied("only administrators can change event status"));
  }
  if patch.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
    return Err(Error::validation("title cannot be empty"));
  }

  let updated = store
    .update_event(id, patch)
    .await
    .lift()?
    .ok_or_else(|| Error::not_found(format!("calendar event {id} not found")))?;
  tracing::info!(event = id, actor = actor.id, "calendar event updated");
  Ok(updated)
}

pub async fn delete_event<S: BoardStore>(
  store: &S,
  actor: &Employee,
  id: i64,
) -> Result<()> {
  let event = find_event(store, id).await?;
  let department_id = governing_department(store, &event).await?;
  if !can_edit_event(actor, event.employee_id, department_id) {
    return Err(Error::denied("cannot delete this event"));
  }
  store.delete_event(id).await.lift()?;
  tracing::info!(event = id, actor = actor.id, "calendar event deleted");
  Ok(())
}

// ─── Monthly views ───────────────────────────────────────────────────────────

/// The department a monthly view covers. Super-admins may pick any
/// department or none (everyone); others are held to their own.
pub fn resolve_department(actor: &Employee, requested: Option<i64>) -> Result<Option<i64>> {
  if actor.role.is_super_admin() {
    return Ok(requested);
  }
  match requested.or(actor.department_id) {
    None => Err(Error::validation("department_id is required")),
    Some(id) if Some(id) == actor.department_id => Ok(Some(id)),
    Some(_) => Err(Error::denied("cannot view another department's schedule")),
  }
}

/// Everything a monthly report is built from. Gathered up front so a failed
/// lookup aborts before any output is produced.
#[derive(Debug, Clone)]
pub struct MonthlySchedule {
  pub month:      YearMonth,
  pub department: Option<Department>,
  pub employees:  Vec<Employee>,
  pub events:     Vec<CalendarEvent>,
}

impl MonthlySchedule {
  pub fn stats(&self) -> Vec<EmployeeStats> {
    compute_monthly_stats(&self.events, &self.employees, self.month)
  }
}

pub async fn monthly_schedule<S: BoardStore>(
  store: &S,
  actor: &Employee,
  department_id: Option<i64>,
  month: YearMonth,
) -> Result<MonthlySchedule> {
  let department_id = resolve_department(actor, department_id)?;

  let department = match department_id {
    Some(id) => Some(
      store
        .get_department(id)
        .await
        .lift()?
        .ok_or_else(|| Error::not_found(format!("department {id} not found")))?,
    ),
    None => None,
  };

  let employees = store
    .list_employees(EmployeeFilter { department_id, is_active: None })
    .await
    .lift()?;
  let events = store
    .list_events(EventQuery {
      department_id,
      month: Some(month),
      ..EventQuery::default()
    })
    .await
    .lift()?;

  Ok(MonthlySchedule { month, department, employees, events })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{directory::tests::employee, role::Role};

  fn event(id: i64, employee_id: i64, kind: EventType, date: (i32, u32, u32)) -> CalendarEvent {
    CalendarEvent {
      id,
      title: "leave".into(),
      kind,
      date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
      description: None,
      employee_id,
      department_id: 1,
      status: EventStatus::Approved,
    }
  }

  #[test]
  fn every_employee_gets_a_row() {
    let employees = vec![
      employee(1, Role::User, Some(1)),
      employee(2, Role::User, Some(1)),
      employee(3, Role::User, Some(1)),
    ];
    let events = vec![event(1, 2, EventType::AnnualLeave, (2025, 3, 4))];
    let month = YearMonth::new(2025, 3).unwrap();

    let stats = compute_monthly_stats(&events, &employees, month);
    assert_eq!(stats.len(), employees.len());
    assert_eq!(stats[0].total, 0);
    assert_eq!(stats[1].annual_leave, 1);
    assert_eq!(stats[2], EmployeeStats {
      employee_id: 3,
      name: "Employee 3".into(),
      ..EmployeeStats::default()
    });
  }

  #[test]
  fn counts_by_type_within_month_and_approved_only() {
    let employees = vec![employee(1, Role::User, Some(1))];
    let mut pending = event(5, 1, EventType::AnnualLeave, (2025, 3, 20));
    pending.status = EventStatus::Pending;
    let events = vec![
      event(1, 1, EventType::AnnualLeave, (2025, 3, 3)),
      event(2, 1, EventType::HalfDay, (2025, 3, 4)),
      event(3, 1, EventType::QuarterDay, (2025, 3, 5)),
      event(4, 1, EventType::Training, (2025, 3, 6)),
      event(6, 1, EventType::Other, (2025, 3, 31)),
      event(7, 1, EventType::AnnualLeave, (2025, 4, 1)),
      event(8, 99, EventType::AnnualLeave, (2025, 3, 3)),
      pending,
    ];
    let stats = compute_monthly_stats(&events, &employees, YearMonth::new(2025, 3).unwrap());

    let s = &stats[0];
    assert_eq!(
      (s.annual_leave, s.half_day, s.quarter_day, s.training, s.other),
      (1, 1, 1, 1, 1)
    );
    assert_eq!(s.total, 5);
  }

  #[test]
  fn department_scope() {
    let admin = employee(1, Role::SuperAdmin, Some(1));
    assert_eq!(resolve_department(&admin, None).unwrap(), None);
    assert_eq!(resolve_department(&admin, Some(4)).unwrap(), Some(4));

    let user = employee(2, Role::User, Some(2));
    assert_eq!(resolve_department(&user, None).unwrap(), Some(2));
    assert!(matches!(
      resolve_department(&user, Some(3)),
      Err(Error::PermissionDenied(_))
    ));

    let nobody = employee(3, Role::User, None);
    assert!(matches!(resolve_department(&nobody, None), Err(Error::Validation(_))));
  }

  #[test]
  fn event_editing_rights() {
    let owner = employee(1, Role::User, Some(1));
    assert!(can_edit_event(&owner, 1, Some(1)));
    assert!(!can_edit_event(&owner, 2, Some(1)));

    let head = employee(3, Role::DepartmentAdmin, Some(1));
    assert!(can_edit_event(&head, 2, Some(1)));
    assert!(!can_edit_event(&head, 2, Some(2)));
  }
}
