//! [`SqliteStore`] — the SQLite implementation of [`BoardStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension as _, types::Value};

use board_core::{
  calendar::{CalendarEvent, EventPatch, EventQuery, NewEvent},
  directory::{Department, Employee, EmployeeFilter, EmployeePatch, NewEmployee},
  notification::{NewNotification, Notification},
  post::{NewPost, Post, PostConfirmation, PostFilter, PostPatch},
  store::BoardStore,
};

use crate::{
  Result,
  encode::{
    CONFIRMATION_COLUMNS, DEPARTMENT_COLUMNS, EMPLOYEE_COLUMNS, EVENT_COLUMNS,
    NOTIFICATION_COLUMNS, POST_COLUMNS, RawConfirmation, RawDepartment, RawEmployee,
    RawEvent, RawNotification, RawPost, encode_date, encode_dt, encode_urls,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A bulletin-board store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    tracing::debug!(path = %path.display(), "sqlite store opened");
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Row fetchers (run inside `Connection::call`) ────────────────────────────

fn fetch_department(
  conn: &rusqlite::Connection,
  id: i64,
) -> rusqlite::Result<Option<RawDepartment>> {
  conn
    .query_row(
      &format!("SELECT {DEPARTMENT_COLUMNS} FROM departments WHERE id = ?1"),
      [id],
      RawDepartment::from_row,
    )
    .optional()
}

fn fetch_employee(
  conn: &rusqlite::Connection,
  id: i64,
) -> rusqlite::Result<Option<RawEmployee>> {
  conn
    .query_row(
      &format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ?1"),
      [id],
      RawEmployee::from_row,
    )
    .optional()
}

fn fetch_post(conn: &rusqlite::Connection, id: i64) -> rusqlite::Result<Option<RawPost>> {
  conn
    .query_row(
      &format!("SELECT {POST_COLUMNS} FROM posts WHERE id = ?1"),
      [id],
      RawPost::from_row,
    )
    .optional()
}

fn fetch_notification(
  conn: &rusqlite::Connection,
  id: i64,
) -> rusqlite::Result<Option<RawNotification>> {
  conn
    .query_row(
      &format!("SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE id = ?1"),
      [id],
      RawNotification::from_row,
    )
    .optional()
}

fn fetch_event(conn: &rusqlite::Connection, id: i64) -> rusqlite::Result<Option<RawEvent>> {
  conn
    .query_row(
      &format!("SELECT {EVENT_COLUMNS} FROM calendar_events WHERE id = ?1"),
      [id],
      RawEvent::from_row,
    )
    .optional()
}

/// Run `sql` with positional `params` and collect every row.
fn query_all<T>(
  conn: &rusqlite::Connection,
  sql: &str,
  params: Vec<Value>,
  map: fn(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
) -> rusqlite::Result<Vec<T>> {
  let mut stmt = conn.prepare(sql)?;
  stmt
    .query_map(rusqlite::params_from_iter(params), map)?
    .collect::<rusqlite::Result<Vec<_>>>()
}

fn where_clause(conds: &[String]) -> String {
  if conds.is_empty() {
    String::new()
  } else {
    format!("WHERE {}", conds.join(" AND "))
  }
}

/// Fetch a row that was just written; its absence is a store failure.
fn must_exist<T>(row: Option<T>) -> rusqlite::Result<T> {
  row.ok_or(rusqlite::Error::QueryReturnedNoRows)
}

// ─── BoardStore impl ─────────────────────────────────────────────────────────

impl BoardStore for SqliteStore {
  type Error = crate::Error;

  // ── Departments ───────────────────────────────────────────────────────────

  async fn list_departments(&self) -> Result<Vec<Department>> {
    let raws = self
      .conn
      .call(|conn| {
        Ok(query_all(
          conn,
          &format!("SELECT {DEPARTMENT_COLUMNS} FROM departments ORDER BY id"),
          Vec::new(),
          RawDepartment::from_row,
        )?)
      })
      .await?;

    raws.into_iter().map(RawDepartment::into_department).collect()
  }

  async fn get_department(&self, id: i64) -> Result<Option<Department>> {
    let raw = self
      .conn
      .call(move |conn| Ok(fetch_department(conn, id)?))
      .await?;

    raw.map(RawDepartment::into_department).transpose()
  }

  async fn ensure_department(
    &self,
    name: String,
    description: Option<String>,
  ) -> Result<Department> {
    let at_str = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO departments (name, description, created_at) VALUES (?1, ?2, ?3)
           ON CONFLICT(name) DO NOTHING",
          rusqlite::params![name, description, at_str],
        )?;
        Ok(conn.query_row(
          &format!("SELECT {DEPARTMENT_COLUMNS} FROM departments WHERE name = ?1"),
          [&name],
          RawDepartment::from_row,
        )?)
      })
      .await?;

    raw.into_department()
  }

  // ── Employees ─────────────────────────────────────────────────────────────

  async fn list_employees(&self, filter: EmployeeFilter) -> Result<Vec<Employee>> {
    let mut conds = Vec::new();
    let mut params = Vec::new();
    if let Some(department_id) = filter.department_id {
      conds.push("department_id = ?".to_owned());
      params.push(Value::Integer(department_id));
    }
    if let Some(is_active) = filter.is_active {
      conds.push("is_active = ?".to_owned());
      params.push(Value::Integer(i64::from(is_active)));
    }
    let sql = format!(
      "SELECT {EMPLOYEE_COLUMNS} FROM employees {} ORDER BY id",
      where_clause(&conds)
    );

    let raws = self
      .conn
      .call(move |conn| Ok(query_all(conn, &sql, params, RawEmployee::from_row)?))
      .await?;

    raws.into_iter().map(RawEmployee::into_employee).collect()
  }

  async fn get_employee(&self, id: i64) -> Result<Option<Employee>> {
    let raw = self
      .conn
      .call(move |conn| Ok(fetch_employee(conn, id)?))
      .await?;

    raw.map(RawEmployee::into_employee).transpose()
  }

  async fn find_employee_by_code(&self, code: String) -> Result<Option<Employee>> {
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE employee_code = ?1"),
              [&code],
              RawEmployee::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawEmployee::into_employee).transpose()
  }

  async fn count_employees(&self) -> Result<u64> {
    let n: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM employees", [], |r| r.get(0))?)
      })
      .await?;
    Ok(n.max(0) as u64)
  }

  async fn insert_employee(&self, input: NewEmployee) -> Result<Employee> {
    let role_str = input.role.as_str();
    let hire_date_str = input.hire_date.map(encode_date);
    let at_str = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO employees (
             employee_code, name, email, password_hash, department_id, position,
             role, phone, hire_date, is_active, is_system_admin, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
          rusqlite::params![
            input.employee_code,
            input.name,
            input.email,
            input.password_hash,
            input.department_id,
            input.position,
            role_str,
            input.phone,
            hire_date_str,
            input.is_active,
            input.is_system_admin,
            at_str,
          ],
        )?;
        let id = conn.last_insert_rowid();
        Ok(must_exist(fetch_employee(conn, id)?)?)
      })
      .await?;

    raw.into_employee()
  }

  async fn update_employee(
    &self,
    id: i64,
    patch: EmployeePatch,
  ) -> Result<Option<Employee>> {
    let role_str = patch.role.map(|r| r.as_str());
    let hire_date_str = patch.hire_date.map(encode_date);

    let raw = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE employees SET
             name            = COALESCE(?2, name),
             email           = COALESCE(?3, email),
             department_id   = CASE WHEN ?11 THEN ?4 ELSE department_id END,
             position        = CASE WHEN ?12 THEN ?5 ELSE position END,
             role            = COALESCE(?6, role),
             phone           = CASE WHEN ?13 THEN ?7 ELSE phone END,
             hire_date       = COALESCE(?8, hire_date),
             is_active       = COALESCE(?9, is_active),
             is_system_admin = COALESCE(?10, is_system_admin)
           WHERE id = ?1",
          rusqlite::params![
            id,
            patch.name,
            patch.email,
            patch.department_id.flatten(),
            patch.position.clone().flatten(),
            role_str,
            patch.phone.clone().flatten(),
            hire_date_str,
            patch.is_active,
            patch.is_system_admin,
            patch.department_id.is_some(),
            patch.position.is_some(),
            patch.phone.is_some(),
          ],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(fetch_employee(conn, id)?)
      })
      .await?;

    raw.map(RawEmployee::into_employee).transpose()
  }

  async fn set_password_hash(&self, id: i64, password_hash: String) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE employees SET password_hash = ?2 WHERE id = ?1",
          rusqlite::params![id, password_hash],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }

  async fn record_login(&self, id: i64, at: DateTime<Utc>) -> Result<()> {
    let at_str = encode_dt(at);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE employees SET last_login = ?2 WHERE id = ?1",
          rusqlite::params![id, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn delete_employee(&self, id: i64) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| Ok(conn.execute("DELETE FROM employees WHERE id = ?1", [id])?))
      .await?;
    Ok(changed > 0)
  }

  // ── Posts ─────────────────────────────────────────────────────────────────

  async fn insert_post(&self, input: NewPost) -> Result<Post> {
    let post_type_str: &'static str = input.post_type.into();
    let urls_str = encode_urls(&input.attachment_urls)?;
    let at_str = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO posts (
             title, content, author_id, department_id, post_type,
             is_urgent, is_pinned, attachment_urls, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
          rusqlite::params![
            input.title,
            input.content,
            input.author_id,
            input.department_id,
            post_type_str,
            input.is_urgent,
            input.is_pinned,
            urls_str,
            at_str,
          ],
        )?;
        let id = conn.last_insert_rowid();
        Ok(must_exist(fetch_post(conn, id)?)?)
      })
      .await?;

    raw.into_post()
  }

  async fn get_post(&self, id: i64) -> Result<Option<Post>> {
    let raw = self.conn.call(move |conn| Ok(fetch_post(conn, id)?)).await?;
    raw.map(RawPost::into_post).transpose()
  }

  async fn list_posts(&self, filter: PostFilter) -> Result<Vec<Post>> {
    let (cond, params) = match filter {
      PostFilter::All => (None, Vec::new()),
      PostFilter::Global => (Some("department_id IS NULL".to_owned()), Vec::new()),
      PostFilter::Department(id) => {
        (Some("department_id = ?".to_owned()), vec![Value::Integer(id)])
      }
    };
    let sql = format!(
      "SELECT {POST_COLUMNS} FROM posts {}",
      where_clause(cond.as_slice())
    );

    let raws = self
      .conn
      .call(move |conn| Ok(query_all(conn, &sql, params, RawPost::from_row)?))
      .await?;

    raws.into_iter().map(RawPost::into_post).collect()
  }

  async fn update_post(&self, id: i64, patch: PostPatch) -> Result<Option<Post>> {
    let urls_str = patch.attachment_urls.as_deref().map(encode_urls).transpose()?;
    let at_str = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE posts SET
             title           = COALESCE(?2, title),
             content         = COALESCE(?3, content),
             is_urgent       = COALESCE(?4, is_urgent),
             is_pinned       = COALESCE(?5, is_pinned),
             attachment_urls = COALESCE(?6, attachment_urls),
             updated_at      = ?7
           WHERE id = ?1",
          rusqlite::params![
            id,
            patch.title,
            patch.content,
            patch.is_urgent,
            patch.is_pinned,
            urls_str,
            at_str,
          ],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(fetch_post(conn, id)?)
      })
      .await?;

    raw.map(RawPost::into_post).transpose()
  }

  async fn delete_post(&self, id: i64) -> Result<bool> {
    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM post_confirmations WHERE post_id = ?1", [id])?;
        let n = tx.execute("DELETE FROM posts WHERE id = ?1", [id])?;
        tx.commit()?;
        Ok(n > 0)
      })
      .await?;
    Ok(deleted)
  }

  async fn increment_view_count(&self, id: i64) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE posts SET view_count = view_count + 1 WHERE id = ?1",
          [id],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }

  // ── Confirmations ─────────────────────────────────────────────────────────

  async fn confirm_post(&self, post_id: i64, employee_id: i64) -> Result<PostConfirmation> {
    let at_str = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO post_confirmations (post_id, employee_id, confirmed_at)
           VALUES (?1, ?2, ?3)
           ON CONFLICT(post_id, employee_id) DO NOTHING",
          rusqlite::params![post_id, employee_id, at_str],
        )?;
        Ok(conn.query_row(
          &format!(
            "SELECT {CONFIRMATION_COLUMNS} FROM post_confirmations
             WHERE post_id = ?1 AND employee_id = ?2"
          ),
          [post_id, employee_id],
          RawConfirmation::from_row,
        )?)
      })
      .await?;

    raw.into_confirmation()
  }

  async fn list_confirmations(&self, post_id: i64) -> Result<Vec<PostConfirmation>> {
    let raws = self
      .conn
      .call(move |conn| {
        Ok(query_all(
          conn,
          &format!(
            "SELECT {CONFIRMATION_COLUMNS} FROM post_confirmations
             WHERE post_id = ? ORDER BY id"
          ),
          vec![Value::Integer(post_id)],
          RawConfirmation::from_row,
        )?)
      })
      .await?;

    raws.into_iter().map(RawConfirmation::into_confirmation).collect()
  }

  // ── Notifications ─────────────────────────────────────────────────────────

  async fn insert_notification(&self, input: NewNotification) -> Result<Notification> {
    let kind_str: &'static str = input.kind.into();
    let at_str = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO notifications (title, message, type, employee_id, post_id, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            input.title,
            input.message,
            kind_str,
            input.employee_id,
            input.post_id,
            at_str,
          ],
        )?;
        let id = conn.last_insert_rowid();
        Ok(must_exist(fetch_notification(conn, id)?)?)
      })
      .await?;

    raw.into_notification()
  }

  async fn get_notification(&self, id: i64) -> Result<Option<Notification>> {
    let raw = self
      .conn
      .call(move |conn| Ok(fetch_notification(conn, id)?))
      .await?;
    raw.map(RawNotification::into_notification).transpose()
  }

  async fn list_notifications(&self, employee_id: i64) -> Result<Vec<Notification>> {
    // Ids are assigned in insertion order, so they break created_at ties.
    let raws = self
      .conn
      .call(move |conn| {
        Ok(query_all(
          conn,
          &format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications
             WHERE employee_id = ? ORDER BY id DESC"
          ),
          vec![Value::Integer(employee_id)],
          RawNotification::from_row,
        )?)
      })
      .await?;

    raws.into_iter().map(RawNotification::into_notification).collect()
  }

  async fn set_notification_read(
    &self,
    id: i64,
    is_read: bool,
  ) -> Result<Option<Notification>> {
    let raw = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE notifications SET is_read = ?2 WHERE id = ?1",
          rusqlite::params![id, is_read],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(fetch_notification(conn, id)?)
      })
      .await?;
    raw.map(RawNotification::into_notification).transpose()
  }

  async fn mark_all_notifications_read(&self, employee_id: i64) -> Result<u64> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE notifications SET is_read = 1 WHERE employee_id = ?1 AND is_read = 0",
          [employee_id],
        )?)
      })
      .await?;
    Ok(changed as u64)
  }

  async fn count_unread_notifications(&self, employee_id: i64) -> Result<u64> {
    let n: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM notifications WHERE employee_id = ?1 AND is_read = 0",
          [employee_id],
          |r| r.get(0),
        )?)
      })
      .await?;
    Ok(n.max(0) as u64)
  }

  async fn delete_notification(&self, id: i64) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| Ok(conn.execute("DELETE FROM notifications WHERE id = ?1", [id])?))
      .await?;
    Ok(changed > 0)
  }

  // ── Calendar ──────────────────────────────────────────────────────────────

  async fn list_events(&self, query: EventQuery) -> Result<Vec<CalendarEvent>> {
    let mut conds = Vec::new();
    let mut params = Vec::new();
    if let Some(employee_id) = query.employee_id {
      conds.push("employee_id = ?".to_owned());
      params.push(Value::Integer(employee_id));
    }
    if let Some(department_id) = query.department_id {
      conds.push("department_id = ?".to_owned());
      params.push(Value::Integer(department_id));
    }
    if let Some(month) = query.month {
      conds.push("date BETWEEN ? AND ?".to_owned());
      params.push(Value::Text(encode_date(month.first_day())));
      params.push(Value::Text(encode_date(month.last_day())));
    }
    if !query.kinds.is_empty() {
      let marks = vec!["?"; query.kinds.len()].join(", ");
      conds.push(format!("type IN ({marks})"));
      for kind in &query.kinds {
        let name: &'static str = (*kind).into();
        params.push(Value::Text(name.to_owned()));
      }
    }
    let sql = format!(
      "SELECT {EVENT_COLUMNS} FROM calendar_events {} ORDER BY date, id",
      where_clause(&conds)
    );

    let raws = self
      .conn
      .call(move |conn| Ok(query_all(conn, &sql, params, RawEvent::from_row)?))
      .await?;

    raws.into_iter().map(RawEvent::into_event).collect()
  }

  async fn get_event(&self, id: i64) -> Result<Option<CalendarEvent>> {
    let raw = self.conn.call(move |conn| Ok(fetch_event(conn, id)?)).await?;
    raw.map(RawEvent::into_event).transpose()
  }

  async fn insert_event(&self, input: NewEvent) -> Result<CalendarEvent> {
    let kind_str: &'static str = input.kind.into();
    let status_str: &'static str = input.status.into();
    let date_str = encode_date(input.date);

    let raw = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO calendar_events (
             title, type, date, description, employee_id, department_id, status
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            input.title,
            kind_str,
            date_str,
            input.description,
            input.employee_id,
            input.department_id,
            status_str,
          ],
        )?;
        let id = conn.last_insert_rowid();
        Ok(must_exist(fetch_event(conn, id)?)?)
      })
      .await?;

    raw.into_event()
  }

  async fn update_event(
    &self,
    id: i64,
    patch: EventPatch,
  ) -> Result<Option<CalendarEvent>> {
    let kind_str = patch.kind.map(<&'static str>::from);
    let status_str = patch.status.map(<&'static str>::from);
    let date_str = patch.date.map(encode_date);

    let raw = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE calendar_events SET
             title       = COALESCE(?2, title),
             type        = COALESCE(?3, type),
             date        = COALESCE(?4, date),
             description = COALESCE(?5, description),
             status      = COALESCE(?6, status)
           WHERE id = ?1",
          rusqlite::params![
            id,
            patch.title,
            kind_str,
            date_str,
            patch.description,
            status_str,
          ],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(fetch_event(conn, id)?)
      })
      .await?;

    raw.map(RawEvent::into_event).transpose()
  }

  async fn delete_event(&self, id: i64) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM calendar_events WHERE id = ?1", [id])?)
      })
      .await?;
    Ok(changed > 0)
  }
}
