//! Notification records and the fan-out dispatcher.
//!
//! Fan-out creates one record per recipient, sequentially. A failed insert is
//! logged and skipped; records already written stay. Unread counts are always
//! derived from the table, never stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::{
  Error, Result,
  directory::Employee,
  store::{BoardStore, StoreResultExt as _},
};

/// Severity tag shown by the client.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NotificationKind {
  #[default]
  Info,
  Urgent,
  Warning,
  Success,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
  pub id:          i64,
  pub title:       String,
  pub message:     String,
  #[serde(rename = "type")]
  pub kind:        NotificationKind,
  pub employee_id: i64,
  pub post_id:     Option<i64>,
  pub is_read:     bool,
  pub created_at:  DateTime<Utc>,
}

/// Input to [`BoardStore::insert_notification`].
#[derive(Debug, Clone)]
pub struct NewNotification {
  pub title:       String,
  pub message:     String,
  pub kind:        NotificationKind,
  pub employee_id: i64,
  pub post_id:     Option<i64>,
}

/// The shared part of a fan-out: everything but the recipient.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationDraft {
  #[serde(default)]
  pub title:   String,
  #[serde(default)]
  pub message: String,
  #[serde(rename = "type", default)]
  pub kind:    NotificationKind,
  pub post_id: Option<i64>,
}

/// Create one notification per id in `targets`, in order.
///
/// Best-effort: individual failures are logged and skipped, and the
/// notifications that were created are returned.
pub async fn notify_many<S: BoardStore>(
  store: &S,
  draft: &NotificationDraft,
  targets: &[i64],
) -> Vec<Notification> {
  let mut created = Vec::with_capacity(targets.len());
  for &employee_id in targets {
    let input = NewNotification {
      title: draft.title.clone(),
      message: draft.message.clone(),
      kind: draft.kind,
      employee_id,
      post_id: draft.post_id,
    };
    match store.insert_notification(input).await.lift() {
      Ok(n) => created.push(n),
      Err(e) => {
        tracing::warn!(employee_id, error = %e, "failed to create notification");
      }
    }
  }

  if created.len() < targets.len() {
    tracing::warn!(
      requested = targets.len(),
      created = created.len(),
      "notification fan-out partially failed"
    );
  } else {
    tracing::debug!(created = created.len(), "notification fan-out complete");
  }
  created
}

/// Bulk-create on behalf of `actor` (the `POST /notifications` route).
pub async fn send<S: BoardStore>(
  store: &S,
  actor: &Employee,
  draft: NotificationDraft,
  targets: Vec<i64>,
) -> Result<Vec<Notification>> {
  if !actor.role.can_manage_posts() {
    return Err(Error::denied("insufficient permissions to send notifications"));
  }
  if draft.title.trim().is_empty() || draft.message.trim().is_empty() {
    return Err(Error::validation("title and message are required"));
  }
  if targets.is_empty() {
    return Err(Error::validation("target_employee_ids must not be empty"));
  }
  Ok(notify_many(store, &draft, &targets).await)
}

/// Which employee's notifications `actor` is asking about.
pub fn resolve_recipient(actor: &Employee, requested: Option<i64>) -> Result<i64> {
  match requested {
    None => Ok(actor.id),
    Some(id) if id == actor.id => Ok(id),
    Some(id) if actor.role.can_manage_employees() => Ok(id),
    Some(_) => Err(Error::denied("cannot read another employee's notifications")),
  }
}

pub async fn list_for<S: BoardStore>(
  store: &S,
  employee_id: i64,
) -> Result<Vec<Notification>> {
  store.list_notifications(employee_id).await.lift()
}

pub async fn unread_count<S: BoardStore>(store: &S, employee_id: i64) -> Result<u64> {
  store.count_unread_notifications(employee_id).await.lift()
}

async fn owned<S: BoardStore>(
  store: &S,
  actor: &Employee,
  id: i64,
) -> Result<Notification> {
  let notification = store
    .get_notification(id)
    .await
    .lift()?
    .ok_or_else(|| Error::not_found(format!("notification {id} not found")))?;
  if notification.employee_id != actor.id {
    return Err(Error::denied("not your notification"));
  }
  Ok(notification)
}

/// Flip the read flag of one of `actor`'s notifications.
pub async fn set_read<S: BoardStore>(
  store: &S,
  actor: &Employee,
  id: i64,
  is_read: bool,
) -> Result<Notification> {
  owned(store, actor, id).await?;
  store
    .set_notification_read(id, is_read)
    .await
    .lift()?
    .ok_or_else(|| Error::not_found(format!("notification {id} not found")))
}

pub async fn mark_read<S: BoardStore>(
  store: &S,
  actor: &Employee,
  id: i64,
) -> Result<Notification> {
  set_read(store, actor, id, true).await
}

pub async fn mark_all_read<S: BoardStore>(store: &S, employee_id: i64) -> Result<u64> {
  store.mark_all_notifications_read(employee_id).await.lift()
}

pub async fn delete<S: BoardStore>(store: &S, actor: &Employee, id: i64) -> Result<()> {
  owned(store, actor, id).await?;
  store.delete_notification(id).await.lift()?;
  Ok(())
}
