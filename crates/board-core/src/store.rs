//! The `BoardStore` trait — the single repository abstraction over the
//! relational tables (`employees`, `departments`, `posts`,
//! `post_confirmations`, `notifications`, `calendar_events`).
//!
//! The trait is implemented by storage backends (e.g. `board-store-sqlite`).
//! The services in this crate and the HTTP layer depend on this abstraction,
//! not on any concrete backend. Backends hold no business rules beyond the
//! table constraints; permission checks live in the services.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::{
  calendar::{CalendarEvent, EventPatch, EventQuery, NewEvent},
  directory::{Department, Employee, EmployeeFilter, EmployeePatch, NewEmployee},
  notification::{NewNotification, Notification},
  post::{NewPost, Post, PostConfirmation, PostFilter, PostPatch},
};

/// Abstraction over a bulletin-board store backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`). Lookups of a single row return
/// `Ok(None)` when the row is absent; `Err` is reserved for the store itself
/// failing, which keeps "not found" distinct from "unreachable".
pub trait BoardStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + Into<crate::Error> + 'static;

  // ── Departments ───────────────────────────────────────────────────────

  fn list_departments(
    &self,
  ) -> impl Future<Output = Result<Vec<Department>, Self::Error>> + Send + '_;

  fn get_department(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Department>, Self::Error>> + Send + '_;

  /// Insert a department, or return the existing one with the same name.
  fn ensure_department(
    &self,
    name: String,
    description: Option<String>,
  ) -> impl Future<Output = Result<Department, Self::Error>> + Send + '_;

  // ── Employees ─────────────────────────────────────────────────────────

  /// Employees ordered by id (department membership order).
  fn list_employees(
    &self,
    filter: EmployeeFilter,
  ) -> impl Future<Output = Result<Vec<Employee>, Self::Error>> + Send + '_;

  fn get_employee(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Employee>, Self::Error>> + Send + '_;

  /// Look up by the external employee code (e.g. `EMP001`).
  fn find_employee_by_code(
    &self,
    code: String,
  ) -> impl Future<Output = Result<Option<Employee>, Self::Error>> + Send + '_;

  fn count_employees(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Persist a new employee. Duplicate code or email must surface as
  /// [`crate::Error::Conflict`] once converted.
  fn insert_employee(
    &self,
    input: NewEmployee,
  ) -> impl Future<Output = Result<Employee, Self::Error>> + Send + '_;

  /// Apply the `Some` fields of `patch`. Returns `None` if the row is absent.
  fn update_employee(
    &self,
    id: i64,
    patch: EmployeePatch,
  ) -> impl Future<Output = Result<Option<Employee>, Self::Error>> + Send + '_;

  fn set_password_hash(
    &self,
    id: i64,
    password_hash: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn record_login(
    &self,
    id: i64,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Returns `false` if no row was deleted.
  fn delete_employee(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Posts ─────────────────────────────────────────────────────────────

  fn insert_post(
    &self,
    input: NewPost,
  ) -> impl Future<Output = Result<Post, Self::Error>> + Send + '_;

  fn get_post(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send + '_;

  /// Posts matching `filter`, in no particular order.
  fn list_posts(
    &self,
    filter: PostFilter,
  ) -> impl Future<Output = Result<Vec<Post>, Self::Error>> + Send + '_;

  /// Apply the `Some` fields of `patch` and bump `updated_at`.
  fn update_post(
    &self,
    id: i64,
    patch: PostPatch,
  ) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send + '_;

  /// Delete every confirmation of the post, then the post itself, as one
  /// sequential unit: if the confirmations cannot be removed the post stays.
  /// Returns `false` if the post did not exist.
  fn delete_post(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Returns `false` if the post did not exist.
  fn increment_view_count(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Confirmations ─────────────────────────────────────────────────────

  /// Idempotent: returns the existing record for `(post_id, employee_id)` if
  /// there is one, else inserts a new record stamped now.
  fn confirm_post(
    &self,
    post_id: i64,
    employee_id: i64,
  ) -> impl Future<Output = Result<PostConfirmation, Self::Error>> + Send + '_;

  fn list_confirmations(
    &self,
    post_id: i64,
  ) -> impl Future<Output = Result<Vec<PostConfirmation>, Self::Error>> + Send + '_;

  // ── Notifications ─────────────────────────────────────────────────────

  fn insert_notification(
    &self,
    input: NewNotification,
  ) -> impl Future<Output = Result<Notification, Self::Error>> + Send + '_;

  fn get_notification(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Notification>, Self::Error>> + Send + '_;

  /// Newest first.
  fn list_notifications(
    &self,
    employee_id: i64,
  ) -> impl Future<Output = Result<Vec<Notification>, Self::Error>> + Send + '_;

  fn set_notification_read(
    &self,
    id: i64,
    is_read: bool,
  ) -> impl Future<Output = Result<Option<Notification>, Self::Error>> + Send + '_;

  /// Returns the number of notifications that changed.
  fn mark_all_notifications_read(
    &self,
    employee_id: i64,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  fn count_unread_notifications(
    &self,
    employee_id: i64,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  fn delete_notification(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Calendar ──────────────────────────────────────────────────────────

  /// Events matching `query`, ordered by date then id.
  fn list_events(
    &self,
    query: EventQuery,
  ) -> impl Future<Output = Result<Vec<CalendarEvent>, Self::Error>> + Send + '_;

  fn get_event(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<CalendarEvent>, Self::Error>> + Send + '_;

  fn insert_event(
    &self,
    input: NewEvent,
  ) -> impl Future<Output = Result<CalendarEvent, Self::Error>> + Send + '_;

  fn update_event(
    &self,
    id: i64,
    patch: EventPatch,
  ) -> impl Future<Output = Result<Option<CalendarEvent>, Self::Error>> + Send + '_;

  fn delete_event(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

/// Lift a backend result into a core [`crate::Result`].
pub trait StoreResultExt<T> {
  fn lift(self) -> crate::Result<T>;
}

impl<T, E: Into<crate::Error>> StoreResultExt<T> for Result<T, E> {
  fn lift(self) -> crate::Result<T> { self.map_err(Into::into) }
}
