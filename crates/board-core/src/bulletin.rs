//! Bulletin — posts, read confirmations, and the publish fan-out.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  directory::{Employee, EmployeeFilter},
  notification::{Notification, NotificationDraft, NotificationKind, notify_many},
  post::{
    ConfirmationView, NewPost, Post, PostConfirmation, PostFilter, PostPatch, PostType,
    PostView, sort_for_listing,
  },
  store::{BoardStore, StoreResultExt as _},
};

pub const URGENT_TITLE: &str = "긴급 공지사항";
pub const INFO_TITLE: &str = "새 공지사항";

/// Body of a post-creation request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostInput {
  #[serde(default)]
  pub title:           String,
  #[serde(default)]
  pub content:         String,
  pub department_id:   Option<i64>,
  /// Inferred from `department_id` when absent.
  pub post_type:       Option<PostType>,
  #[serde(default)]
  pub is_urgent:       bool,
  #[serde(default)]
  pub is_pinned:       bool,
  #[serde(default)]
  pub attachment_urls: Vec<String>,
}

/// A freshly created post and how many recipients were notified.
#[derive(Debug, Clone, Serialize)]
pub struct Published {
  pub post:     Post,
  pub notified: usize,
}

fn may_pin(actor: &Employee) -> bool {
  actor.is_system_admin || actor.role.can_manage_posts()
}

async fn find_post<S: BoardStore>(store: &S, id: i64) -> Result<Post> {
  store
    .get_post(id)
    .await
    .lift()?
    .ok_or_else(|| Error::not_found(format!("post {id} not found")))
}

async fn names_by_id<S: BoardStore>(store: &S) -> Result<HashMap<i64, String>> {
  Ok(
    store
      .list_employees(EmployeeFilter::default())
      .await
      .lift()?
      .into_iter()
      .map(|e| (e.id, e.name))
      .collect(),
  )
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// Publish a post and notify its audience.
///
/// Global posts need Moderator or above. Department posts go to the actor's
/// department unless one is named; only a super-admin may post into another
/// department.
pub async fn create_post<S: BoardStore>(
  store: &S,
  actor: &Employee,
  input: PostInput,
) -> Result<Published> {
  let title = input.title.trim().to_owned();
  let content = input.content.trim().to_owned();
  if title.is_empty() || content.is_empty() {
    return Err(Error::validation("title and content are required"));
  }

  let post_type = input.post_type.unwrap_or(match input.department_id {
    Some(_) => PostType::Department,
    None => PostType::Announcement,
  });

  let department_id = match post_type {
    PostType::Announcement => {
      if input.department_id.is_some() {
        return Err(Error::validation(
          "announcements are global and cannot name a department",
        ));
      }
      if !actor.role.can_manage_posts() {
        return Err(Error::denied(
          "only moderators and above can publish global announcements",
        ));
      }
      None
    }
    PostType::Department => {
      let Some(id) = input.department_id.or(actor.department_id) else {
        return Err(Error::validation("department posts need a department"));
      };
      if store.get_department(id).await.lift()?.is_none() {
        return Err(Error::validation(format!("department {id} does not exist")));
      }
      if !actor.role.is_super_admin() && actor.department_id != Some(id) {
        return Err(Error::denied("cannot post to another department"));
      }
      Some(id)
    }
  };

  if input.is_pinned && !may_pin(actor) {
    return Err(Error::denied("only moderators and above can pin posts"));
  }

  let post = store
    .insert_post(NewPost {
      title,
      content,
      author_id: actor.id,
      department_id,
      post_type,
      is_urgent: input.is_urgent,
      is_pinned: input.is_pinned,
      attachment_urls: input.attachment_urls,
    })
    .await
    .lift()?;

  tracing::info!(
    post = post.id,
    author = actor.id,
    department = ?post.department_id,
    urgent = post.is_urgent,
    "post created"
  );

  let notified = fan_out(store, &post).await.len();
  Ok(Published { post, notified })
}

/// Notify every active employee in the post's audience. A failure here never
/// fails the post.
async fn fan_out<S: BoardStore>(store: &S, post: &Post) -> Vec<Notification> {
  let filter = EmployeeFilter {
    department_id: post.department_id,
    is_active:     Some(true),
  };
  let recipients = match store.list_employees(filter).await.lift() {
    Ok(employees) => employees.into_iter().map(|e| e.id).collect::<Vec<_>>(),
    Err(e) => {
      tracing::warn!(post = post.id, error = %e, "cannot resolve notification recipients");
      return Vec::new();
    }
  };

  let (title, kind) = if post.is_urgent {
    (URGENT_TITLE, NotificationKind::Urgent)
  } else {
    (INFO_TITLE, NotificationKind::Info)
  };
  let message = match post.department_id {
    Some(_) => format!("새로운 부서 공지사항이 등록되었습니다: {}", post.title),
    None => format!("새로운 전체 공지사항이 등록되었습니다: {}", post.title),
  };

  let draft = NotificationDraft {
    title: title.to_owned(),
    message,
    kind,
    post_id: Some(post.id),
  };
  notify_many(store, &draft, &recipients).await
}

// ─── Read ────────────────────────────────────────────────────────────────────

/// Posts in listing order (pinned, urgent, newest) with author names.
pub async fn list_posts<S: BoardStore>(
  store: &S,
  filter: PostFilter,
) -> Result<Vec<PostView>> {
  let mut posts = store.list_posts(filter).await.lift()?;
  sort_for_listing(&mut posts);
  let names = names_by_id(store).await?;

  Ok(
    posts
      .into_iter()
      .map(|post| {
        let author_name = post.author_id.and_then(|id| names.get(&id).cloned());
        PostView { post, author_name }
      })
      .collect(),
  )
}

pub async fn get_post<S: BoardStore>(store: &S, id: i64) -> Result<PostView> {
  let post = find_post(store, id).await?;
  let author_name = match post.author_id {
    Some(author) => store.get_employee(author).await.lift()?.map(|e| e.name),
    None => None,
  };
  Ok(PostView { post, author_name })
}

/// Best-effort view counter; failures are logged, never returned.
pub async fn record_view<S: BoardStore>(store: &S, id: i64) {
  match store.increment_view_count(id).await.lift() {
    Ok(true) => {}
    Ok(false) => tracing::debug!(post = id, "view on missing post ignored"),
    Err(e) => tracing::warn!(post = id, error = %e, "failed to increment view count"),
  }
}

// ─── Update / delete ─────────────────────────────────────────────────────────

/// Only the author or a system administrator may edit a post.
pub async fn update_post<S: BoardStore>(
  store: &S,
  actor: &Employee,
  id: i64,
  patch: PostPatch,
) -> Result<Post> {
  let post = find_post(store, id).await?;
  if post.author_id != Some(actor.id) && !actor.is_system_admin {
    return Err(Error::denied("only the author can edit this post"));
  }
  if patch.is_pinned.is_some_and(|p| p != post.is_pinned) && !may_pin(actor) {
    return Err(Error::denied("only moderators and above can pin posts"));
  }
  for (field, value) in [("title", &patch.title), ("content", &patch.content)] {
    if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
      return Err(Error::validation(format!("{field} cannot be empty")));
    }
  }

  let updated = store
    .update_post(id, patch)
    .await
    .lift()?
    .ok_or_else(|| Error::not_found(format!("post {id} not found")))?;
  tracing::info!(post = id, actor = actor.id, "post updated");
  Ok(updated)
}

/// The author, a super- or department-admin, or a system administrator may
/// delete a post. Its confirmations go with it.
pub async fn delete_post<S: BoardStore>(
  store: &S,
  actor: &Employee,
  id: i64,
) -> Result<()> {
  let post = find_post(store, id).await?;
  let allowed = post.author_id == Some(actor.id)
    || actor.role.is_admin()
    || actor.is_system_admin;
  if !allowed {
    return Err(Error::denied("insufficient permissions to delete this post"));
  }

  if !store.delete_post(id).await.lift()? {
    return Err(Error::not_found(format!("post {id} not found")));
  }
  tracing::info!(post = id, actor = actor.id, "post deleted");
  Ok(())
}

// ─── Confirmations ───────────────────────────────────────────────────────────

/// Idempotent read confirmation.
pub async fn confirm_post<S: BoardStore>(
  store: &S,
  post_id: i64,
  employee_id: i64,
) -> Result<PostConfirmation> {
  find_post(store, post_id).await?;
  store.confirm_post(post_id, employee_id).await.lift()
}

pub async fn list_confirmations<S: BoardStore>(
  store: &S,
  post_id: i64,
) -> Result<Vec<ConfirmationView>> {
  find_post(store, post_id).await?;
  let confirmations = store.list_confirmations(post_id).await.lift()?;
  let names = names_by_id(store).await?;

  Ok(
    confirmations
      .into_iter()
      .map(|confirmation| {
        let employee_name = names.get(&confirmation.employee_id).cloned();
        ConfirmationView { confirmation, employee_name }
      })
      .collect(),
  )
}
