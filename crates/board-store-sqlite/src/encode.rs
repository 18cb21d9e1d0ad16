//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings and calendar dates as
//! `YYYY-MM-DD`. Enums are stored under their wire names. Attachment lists are
//! compact JSON.

use std::str::FromStr;

use board_core::{
  calendar::{CalendarEvent, EventStatus, EventType},
  directory::{Department, Employee},
  notification::{Notification, NotificationKind},
  post::{Post, PostConfirmation, PostType},
  role::Role,
};
use chrono::{DateTime, NaiveDate, Utc};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

/// Parse a column stored via the enum's `Display`/`IntoStaticStr` name.
fn decode_enum<T: FromStr>(column: &'static str, s: String) -> Result<T> {
  s.parse().map_err(|_| Error::Decode { column, value: s })
}

// ─── Attachments ─────────────────────────────────────────────────────────────

pub fn encode_urls(urls: &[String]) -> Result<String> { Ok(serde_json::to_string(urls)?) }

pub fn decode_urls(s: &str) -> Result<Vec<String>> { Ok(serde_json::from_str(s)?) }

// ─── Row types ───────────────────────────────────────────────────────────────

pub const DEPARTMENT_COLUMNS: &str = "id, name, description, created_at";

pub struct RawDepartment {
  pub id:          i64,
  pub name:        String,
  pub description: Option<String>,
  pub created_at:  String,
}

impl RawDepartment {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      name:        row.get(1)?,
      description: row.get(2)?,
      created_at:  row.get(3)?,
    })
  }

  pub fn into_department(self) -> Result<Department> {
    Ok(Department {
      id:          self.id,
      name:        self.name,
      description: self.description,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

pub const EMPLOYEE_COLUMNS: &str = "id, employee_code, name, email, password_hash, \
  department_id, position, role, phone, hire_date, is_active, is_system_admin, \
  last_login, created_at";

pub struct RawEmployee {
  pub id:              i64,
  pub employee_code:   String,
  pub name:            String,
  pub email:           Option<String>,
  pub password_hash:   String,
  pub department_id:   Option<i64>,
  pub position:        Option<String>,
  pub role:            String,
  pub phone:           Option<String>,
  pub hire_date:       Option<String>,
  pub is_active:       bool,
  pub is_system_admin: bool,
  pub last_login:      Option<String>,
  pub created_at:      String,
}

impl RawEmployee {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:              row.get(0)?,
      employee_code:   row.get(1)?,
      name:            row.get(2)?,
      email:           row.get(3)?,
      password_hash:   row.get(4)?,
      department_id:   row.get(5)?,
      position:        row.get(6)?,
      role:            row.get(7)?,
      phone:           row.get(8)?,
      hire_date:       row.get(9)?,
      is_active:       row.get(10)?,
      is_system_admin: row.get(11)?,
      last_login:      row.get(12)?,
      created_at:      row.get(13)?,
    })
  }

  pub fn into_employee(self) -> Result<Employee> {
    Ok(Employee {
      id:              self.id,
      employee_code:   self.employee_code,
      name:            self.name,
      email:           self.email,
      password_hash:   self.password_hash,
      department_id:   self.department_id,
      position:        self.position,
      role:            Role::parse_lossy(&self.role),
      phone:           self.phone,
      hire_date:       self.hire_date.as_deref().map(decode_date).transpose()?,
      is_active:       self.is_active,
      is_system_admin: self.is_system_admin,
      last_login:      self.last_login.as_deref().map(decode_dt).transpose()?,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}

pub const POST_COLUMNS: &str = "id, title, content, author_id, department_id, \
  post_type, is_urgent, is_pinned, view_count, attachment_urls, created_at, updated_at";

pub struct RawPost {
  pub id:              i64,
  pub title:           String,
  pub content:         String,
  pub author_id:       Option<i64>,
  pub department_id:   Option<i64>,
  pub post_type:       String,
  pub is_urgent:       bool,
  pub is_pinned:       bool,
  pub view_count:      i64,
  pub attachment_urls: String,
  pub created_at:      String,
  pub updated_at:      String,
}

impl RawPost {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:              row.get(0)?,
      title:           row.get(1)?,
      content:         row.get(2)?,
      author_id:       row.get(3)?,
      department_id:   row.get(4)?,
      post_type:       row.get(5)?,
      is_urgent:       row.get(6)?,
      is_pinned:       row.get(7)?,
      view_count:      row.get(8)?,
      attachment_urls: row.get(9)?,
      created_at:      row.get(10)?,
      updated_at:      row.get(11)?,
    })
  }

  pub fn into_post(self) -> Result<Post> {
    Ok(Post {
      id:              self.id,
      title:           self.title,
      content:         self.content,
      author_id:       self.author_id,
      department_id:   self.department_id,
      post_type:       decode_enum::<PostType>("post_type", self.post_type)?,
      is_urgent:       self.is_urgent,
      is_pinned:       self.is_pinned,
      view_count:      self.view_count.max(0) as u64,
      attachment_urls: decode_urls(&self.attachment_urls)?,
      created_at:      decode_dt(&self.created_at)?,
      updated_at:      decode_dt(&self.updated_at)?,
    })
  }
}

pub const CONFIRMATION_COLUMNS: &str = "id, post_id, employee_id, confirmed_at";

pub struct RawConfirmation {
  pub id:           i64,
  pub post_id:      i64,
  pub employee_id:  i64,
  pub confirmed_at: String,
}

impl RawConfirmation {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      post_id:      row.get(1)?,
      employee_id:  row.get(2)?,
      confirmed_at: row.get(3)?,
    })
  }

  pub fn into_confirmation(self) -> Result<PostConfirmation> {
    Ok(PostConfirmation {
      id:           self.id,
      post_id:      self.post_id,
      employee_id:  self.employee_id,
      confirmed_at: decode_dt(&self.confirmed_at)?,
    })
  }
}

pub const NOTIFICATION_COLUMNS: &str =
  "id, title, message, type, employee_id, post_id, is_read, created_at";

pub struct RawNotification {
  pub id:          i64,
  pub title:       String,
  pub message:     String,
  pub kind:        String,
  pub employee_id: i64,
  pub post_id:     Option<i64>,
  pub is_read:     bool,
  pub created_at:  String,
}

impl RawNotification {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      title:       row.get(1)?,
      message:     row.get(2)?,
      kind:        row.get(3)?,
      employee_id: row.get(4)?,
      post_id:     row.get(5)?,
      is_read:     row.get(6)?,
      created_at:  row.get(7)?,
    })
  }

  pub fn into_notification(self) -> Result<Notification> {
    Ok(Notification {
      id:          self.id,
      title:       self.title,
      message:     self.message,
      kind:        decode_enum::<NotificationKind>("notification type", self.kind)?,
      employee_id: self.employee_id,
      post_id:     self.post_id,
      is_read:     self.is_read,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

pub const EVENT_COLUMNS: &str =
  "id, title, type, date, description, employee_id, department_id, status";

pub struct RawEvent {
  pub id:            i64,
  pub title:         String,
  pub kind:          String,
  pub date:          String,
  pub description:   Option<String>,
  pub employee_id:   i64,
  pub department_id: i64,
  pub status:        String,
}

impl RawEvent {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      title:         row.get(1)?,
      kind:          row.get(2)?,
      date:          row.get(3)?,
      description:   row.get(4)?,
      employee_id:   row.get(5)?,
      department_id: row.get(6)?,
      status:        row.get(7)?,
    })
  }

  pub fn into_event(self) -> Result<CalendarEvent> {
    Ok(CalendarEvent {
      id:            self.id,
      title:         self.title,
      kind:          decode_enum::<EventType>("event type", self.kind)?,
      date:          decode_date(&self.date)?,
      description:   self.description,
      employee_id:   self.employee_id,
      department_id: self.department_id,
      status:        decode_enum::<EventStatus>("event status", self.status)?,
    })
  }
}
