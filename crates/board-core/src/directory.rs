//! Directory — employees and departments, plus the employee-management rules.
//!
//! Reads are plain retrievals. Mutations are gated by the role policy: a
//! super-admin manages everyone, a department-admin manages the members of
//! their own department, nobody else manages anyone.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
  Error, Result,
  password::{check_new_password, hash_password, verify_password},
  role::Role,
  store::{BoardStore, StoreResultExt as _},
};

// ─── Records ─────────────────────────────────────────────────────────────────

/// Immutable reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
  pub id:          i64,
  pub name:        String,
  pub description: Option<String>,
  pub created_at:  DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Employee {
  /// Internal row id; every other table references this.
  pub id:              i64,
  /// External employee code, e.g. `EMP001`. Used to log in.
  #[serde(rename = "employee_id")]
  pub employee_code:   String,
  pub name:            String,
  pub email:           Option<String>,
  #[serde(skip_serializing)]
  pub password_hash:   String,
  pub department_id:   Option<i64>,
  pub position:        Option<String>,
  pub role:            Role,
  pub phone:           Option<String>,
  pub hire_date:       Option<NaiveDate>,
  pub is_active:       bool,
  /// Bypasses authorship checks on posts. Replaces the old magic employee code.
  pub is_system_admin: bool,
  pub last_login:      Option<DateTime<Utc>>,
  pub created_at:      DateTime<Utc>,
}

impl Employee {
  /// Whether `self` may edit, deactivate or delete `target`.
  ///
  /// Outside of super-admins, nobody manages someone ranked above them or a
  /// system administrator.
  pub fn can_manage(&self, target: &Employee) -> bool {
    if self.role.is_super_admin() {
      return true;
    }
    if target.role.rank() < self.role.rank() || target.is_system_admin {
      return false;
    }
    self.can_manage_department(target.department_id)
  }

  /// Whether `self` may manage employees that belong to `department_id`.
  pub fn can_manage_department(&self, department_id: Option<i64>) -> bool {
    match self.role {
      Role::SuperAdmin => true,
      Role::DepartmentAdmin => {
        self.department_id.is_some() && self.department_id == department_id
      }
      _ => false,
    }
  }
}

/// An employee with the department name joined in, as listed to clients.
#[derive(Debug, Clone, Serialize)]
pub struct EmployeeView {
  #[serde(flatten)]
  pub employee:        Employee,
  pub department_name: Option<String>,
}

// ─── Store inputs ────────────────────────────────────────────────────────────

/// Input to [`BoardStore::insert_employee`]; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewEmployee {
  pub employee_code:   String,
  pub name:            String,
  pub email:           Option<String>,
  pub password_hash:   String,
  pub department_id:   Option<i64>,
  pub position:        Option<String>,
  pub role:            Role,
  pub phone:           Option<String>,
  pub hire_date:       Option<NaiveDate>,
  pub is_active:       bool,
  pub is_system_admin: bool,
}

/// Partial update; `None` leaves a column untouched. The nullable columns
/// take `Some(None)` (JSON `null`) to clear them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployeePatch {
  pub name:            Option<String>,
  pub email:           Option<String>,
  #[serde(default, deserialize_with = "nullable")]
  pub department_id:   Option<Option<i64>>,
  #[serde(default, deserialize_with = "nullable")]
  pub position:        Option<Option<String>>,
  pub role:            Option<Role>,
  #[serde(default, deserialize_with = "nullable")]
  pub phone:           Option<Option<String>>,
  pub hire_date:       Option<NaiveDate>,
  pub is_active:       Option<bool>,
  pub is_system_admin: Option<bool>,
}

impl EmployeePatch {
  fn is_empty(&self) -> bool {
    self.name.is_none()
      && self.email.is_none()
      && self.department_id.is_none()
      && self.position.is_none()
      && self.role.is_none()
      && self.phone.is_none()
      && self.hire_date.is_none()
      && self.is_active.is_none()
      && self.is_system_admin.is_none()
  }
}

/// A present field, `null` included, becomes `Some`; an absent one stays
/// `None` through `#[serde(default)]`.
fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de>,
{
  Option::<T>::deserialize(deserializer).map(Some)
}

/// Equality filters for [`BoardStore::list_employees`].
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct EmployeeFilter {
  pub department_id: Option<i64>,
  pub is_active:     Option<bool>,
}

// ─── Service inputs ──────────────────────────────────────────────────────────

/// Body of an employee-creation request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployeeInput {
  #[serde(default, rename = "employee_id")]
  pub employee_code:   String,
  #[serde(default)]
  pub name:            String,
  #[serde(default)]
  pub email:           String,
  #[serde(default)]
  pub password:        String,
  pub department_id:   Option<i64>,
  pub position:        Option<String>,
  pub phone:           Option<String>,
  pub hire_date:       Option<NaiveDate>,
  pub role:            Option<Role>,
  #[serde(default)]
  pub is_system_admin: bool,
}

// ─── Reads ───────────────────────────────────────────────────────────────────

pub async fn list_departments<S: BoardStore>(store: &S) -> Result<Vec<Department>> {
  store.list_departments().await.lift()
}

pub async fn find_employee<S: BoardStore>(store: &S, id: i64) -> Result<Employee> {
  store
    .get_employee(id)
    .await
    .lift()?
    .ok_or_else(|| Error::not_found(format!("employee {id} not found")))
}

/// Employees matching `filter`, each with its department name.
pub async fn list_employees<S: BoardStore>(
  store: &S,
  filter: EmployeeFilter,
) -> Result<Vec<EmployeeView>> {
  let employees = store.list_employees(filter).await.lift()?;
  let departments = store.list_departments().await.lift()?;

  Ok(
    employees
      .into_iter()
      .map(|employee| {
        let department_name = employee.department_id.and_then(|id| {
          departments.iter().find(|d| d.id == id).map(|d| d.name.clone())
        });
        EmployeeView { employee, department_name }
      })
      .collect(),
  )
}

// ─── Authentication ──────────────────────────────────────────────────────────

/// Verify a login. Unknown code, inactive account and wrong password are
/// indistinguishable to the caller.
pub async fn authenticate<S: BoardStore>(
  store: &S,
  employee_code: &str,
  password: &str,
) -> Result<Employee> {
  if employee_code.trim().is_empty() || password.is_empty() {
    return Err(Error::validation("employee_id and password are required"));
  }

  let rejected = || Error::Unauthenticated("invalid employee id or password".into());

  let Some(mut employee) = store
    .find_employee_by_code(employee_code.trim().to_owned())
    .await
    .lift()?
  else {
    tracing::info!(employee_code, "login rejected: unknown employee");
    return Err(rejected());
  };

  if !employee.is_active || !verify_password(password, &employee.password_hash) {
    tracing::info!(employee_code, "login rejected");
    return Err(rejected());
  }

  let now = Utc::now();
  store.record_login(employee.id, now).await.lift()?;
  employee.last_login = Some(now);

  tracing::info!(employee_code, "login succeeded");
  Ok(employee)
}

// ─── Mutations ───────────────────────────────────────────────────────────────

/// Reject grants a non-super-admin is not entitled to make.
fn check_grants(
  actor: &Employee,
  role: Option<Role>,
  is_system_admin: Option<bool>,
  department_id: Option<Option<i64>>,
) -> Result<()> {
  if actor.role.is_super_admin() {
    return Ok(());
  }
  if let Some(role) = role
    && role.rank() < actor.role.rank()
  {
    return Err(Error::denied("cannot grant a role above your own"));
  }
  if is_system_admin.is_some() {
    return Err(Error::denied("only a super admin can change system administration"));
  }
  if department_id.is_some_and(|d| d != actor.department_id) {
    return Err(Error::denied("cannot assign employees to another department"));
  }
  Ok(())
}

fn required(value: &str, field: &str) -> Result<String> {
  let value = value.trim();
  if value.is_empty() {
    return Err(Error::validation(format!("{field} is required")));
  }
  Ok(value.to_owned())
}

fn non_blank(value: Option<String>) -> Option<String> {
  value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

/// Create an employee on behalf of `actor`.
pub async fn create_employee<S: BoardStore>(
  store: &S,
  actor: &Employee,
  input: EmployeeInput,
) -> Result<Employee> {
  if !actor.role.can_manage_employees() {
    return Err(Error::denied("insufficient permissions to create employees"));
  }

  let employee_code = required(&input.employee_code, "employee_id")?;
  let name = required(&input.name, "name")?;
  let email = required(&input.email, "email")?;
  check_new_password(&input.password)?;

  // A department admin creating without a department files into their own.
  let department_id = if actor.role.is_super_admin() {
    input.department_id
  } else {
    input.department_id.or(actor.department_id)
  };
  let role = input.role.unwrap_or_default();
  check_grants(
    actor,
    Some(role),
    input.is_system_admin.then_some(true),
    Some(department_id),
  )?;

  if let Some(id) = department_id
    && store.get_department(id).await.lift()?.is_none()
  {
    return Err(Error::validation(format!("department {id} does not exist")));
  }

  let created = store
    .insert_employee(NewEmployee {
      employee_code,
      name,
      email: Some(email),
      password_hash: hash_password(&input.password)?,
      department_id,
      position: non_blank(input.position),
      role,
      phone: non_blank(input.phone),
      hire_date: input.hire_date,
      is_active: true,
      is_system_admin: input.is_system_admin,
    })
    .await
    .lift()?;

  tracing::info!(
    actor = actor.id,
    employee = created.id,
    code = %created.employee_code,
    "employee created"
  );
  Ok(created)
}

/// Update `id` on behalf of `actor`.
pub async fn update_employee<S: BoardStore>(
  store: &S,
  actor: &Employee,
  id: i64,
  patch: EmployeePatch,
) -> Result<Employee> {
  let target = find_employee(store, id).await?;
  if !actor.can_manage(&target) {
    return Err(Error::denied("insufficient permissions"));
  }
  check_grants(actor, patch.role, patch.is_system_admin, patch.department_id)?;

  if patch.is_empty() {
    return Ok(target);
  }
  if let Some(name) = &patch.name
    && name.trim().is_empty()
  {
    return Err(Error::validation("name cannot be empty"));
  }
  if let Some(Some(department_id)) = patch.department_id
    && store.get_department(department_id).await.lift()?.is_none()
  {
    return Err(Error::validation(format!(
      "department {department_id} does not exist"
    )));
  }

  let updated = store
    .update_employee(id, patch)
    .await
    .lift()?
    .ok_or_else(|| Error::not_found(format!("employee {id} not found")))?;

  tracing::info!(actor = actor.id, employee = id, "employee updated");
  Ok(updated)
}

/// Delete `id` on behalf of `actor`.
pub async fn delete_employee<S: BoardStore>(
  store: &S,
  actor: &Employee,
  id: i64,
) -> Result<()> {
  let target = find_employee(store, id).await?;
  if !actor.can_manage(&target) {
    return Err(Error::denied("insufficient permissions"));
  }
  if target.id == actor.id {
    return Err(Error::validation("cannot delete your own account"));
  }

  if !store.delete_employee(id).await.lift()? {
    return Err(Error::not_found(format!("employee {id} not found")));
  }
  tracing::info!(actor = actor.id, employee = id, "employee deleted");
  Ok(())
}

/// Self-service password change; the current password must match.
pub async fn change_password<S: BoardStore>(
  store: &S,
  actor: &Employee,
  id: i64,
  current: &str,
  new: &str,
) -> Result<()> {
  if current.is_empty() || new.is_empty() {
    return Err(Error::validation("current and new password are both required"));
  }
  if actor.id != id {
    return Err(Error::denied("employees can only change their own password"));
  }
  check_new_password(new)?;

  let employee = find_employee(store, id).await?;
  if !verify_password(current, &employee.password_hash) {
    return Err(Error::validation("current password is incorrect"));
  }

  if !store.set_password_hash(id, hash_password(new)?).await.lift()? {
    return Err(Error::not_found(format!("employee {id} not found")));
  }
  tracing::info!(employee = id, "password changed");
  Ok(())
}

// ─── Roster import ───────────────────────────────────────────────────────────

/// One employee row read from a roster spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
  /// 1-based spreadsheet row, for error reporting.
  pub row:             u32,
  pub employee_code:   String,
  pub name:            String,
  pub department_name: String,
  pub role:            Role,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportFailure {
  pub row:         u32,
  pub employee_id: String,
  pub error:       String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportSummary {
  pub created: Vec<Employee>,
  pub failed:  Vec<ImportFailure>,
}

pub const IMPORT_POSITION: &str = "직원";
pub const IMPORT_EMAIL_DOMAIN: &str = "hospital.com";

/// Create one employee per roster entry, all with `default_password`.
///
/// Departments are matched by exact name; an unknown name leaves the employee
/// without a department (or, for a department admin, files them into the
/// admin's own). A failing row is recorded and the rest continue.
pub async fn import_roster<S: BoardStore>(
  store: &S,
  actor: &Employee,
  entries: Vec<RosterEntry>,
  default_password: &str,
) -> Result<ImportSummary> {
  if !actor.role.can_manage_employees() {
    return Err(Error::denied("insufficient permissions to import employees"));
  }
  check_new_password(default_password)?;

  let departments = store.list_departments().await.lift()?;
  let password_hash = hash_password(default_password)?;
  let hire_date = Utc::now().date_naive();

  let mut summary = ImportSummary::default();
  for entry in entries {
    let mut department_id = departments
      .iter()
      .find(|d| d.name == entry.department_name.trim())
      .map(|d| d.id);
    if department_id.is_none() {
      tracing::warn!(row = entry.row, department = %entry.department_name, "unknown department in roster");
      if !actor.role.is_super_admin() {
        department_id = actor.department_id;
      }
    }

    let input = NewEmployee {
      email: Some(format!("{}@{IMPORT_EMAIL_DOMAIN}", entry.employee_code)),
      employee_code: entry.employee_code.clone(),
      name: entry.name,
      password_hash: password_hash.clone(),
      department_id,
      position: Some(IMPORT_POSITION.to_owned()),
      role: entry.role,
      phone: None,
      hire_date: Some(hire_date),
      is_active: true,
      is_system_admin: false,
    };

    let result = match check_grants(actor, Some(input.role), None, Some(department_id)) {
      Ok(()) => store.insert_employee(input).await.lift(),
      Err(e) => Err(e),
    };
    match result {
      Ok(employee) => summary.created.push(employee),
      Err(e) => {
        let error = match e {
          Error::StoreUnavailable(_) => {
            tracing::error!(row = entry.row, error = %e, "roster row not saved");
            "could not save employee".to_owned()
          }
          other => other.to_string(),
        };
        summary.failed.push(ImportFailure {
          row: entry.row,
          employee_id: entry.employee_code,
          error,
        });
      }
    }
  }

  tracing::info!(
    actor = actor.id,
    created = summary.created.len(),
    failed = summary.failed.len(),
    "roster imported"
  );
  Ok(summary)
}
