//! Post and confirmation records.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// Whether a post is a hospital-wide announcement or a department notice.
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
pub enum PostType {
  #[default]
  Announcement,
  Department,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
  pub id:              i64,
  pub title:           String,
  pub content:         String,
  /// `None` once the author's account has been deleted.
  pub author_id:       Option<i64>,
  /// `None` means the post is global.
  pub department_id:   Option<i64>,
  pub post_type:       PostType,
  pub is_urgent:       bool,
  pub is_pinned:       bool,
  pub view_count:      u64,
  pub attachment_urls: Vec<String>,
  pub created_at:      DateTime<Utc>,
  pub updated_at:      DateTime<Utc>,
}

impl Post {
  pub fn is_global(&self) -> bool { self.department_id.is_none() }
}

/// A post with its author's display name joined in.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
  #[serde(flatten)]
  pub post:        Post,
  pub author_name: Option<String>,
}

/// An employee's acknowledgement that they have read a post. At most one per
/// `(post_id, employee_id)`; never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostConfirmation {
  pub id:           i64,
  pub post_id:      i64,
  pub employee_id:  i64,
  pub confirmed_at: DateTime<Utc>,
}

/// A confirmation with the confirming employee's name.
#[derive(Debug, Clone, Serialize)]
pub struct ConfirmationView {
  #[serde(flatten)]
  pub confirmation:  PostConfirmation,
  pub employee_name: Option<String>,
}

// ─── Store inputs ────────────────────────────────────────────────────────────

/// Input to [`crate::store::BoardStore::insert_post`]. Timestamps are set by
/// the store.
#[derive(Debug, Clone)]
pub struct NewPost {
  pub title:           String,
  pub content:         String,
  pub author_id:       i64,
  pub department_id:   Option<i64>,
  pub post_type:       PostType,
  pub is_urgent:       bool,
  pub is_pinned:       bool,
  pub attachment_urls: Vec<String>,
}

/// Partial update of a post's editable fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostPatch {
  pub title:           Option<String>,
  pub content:         Option<String>,
  pub is_urgent:       Option<bool>,
  pub is_pinned:       Option<bool>,
  pub attachment_urls: Option<Vec<String>>,
}

/// Which posts to list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PostFilter {
  #[default]
  All,
  /// Posts with no department.
  Global,
  Department(i64),
}

// ─── Ordering ────────────────────────────────────────────────────────────────

/// Listing order: pinned first, then urgent, then newest-created.
pub fn listing_order(a: &Post, b: &Post) -> Ordering {
  b.is_pinned
    .cmp(&a.is_pinned)
    .then_with(|| b.is_urgent.cmp(&a.is_urgent))
    .then_with(|| b.created_at.cmp(&a.created_at))
    .then_with(|| b.id.cmp(&a.id))
}

pub fn sort_for_listing(posts: &mut [Post]) { posts.sort_by(listing_order); }

#[cfg(test)]
pub(crate) mod tests {
  use chrono::{Duration, TimeZone};

  use super::*;

  pub(crate) fn post(id: i64, pinned: bool, urgent: bool, age_minutes: i64) -> Post {
    let at = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
      - Duration::minutes(age_minutes);
    Post {
      id,
      title: format!("post {id}"),
      content: "body".into(),
      author_id: Some(1),
      department_id: None,
      post_type: PostType::Announcement,
      is_urgent: urgent,
      is_pinned: pinned,
      view_count: 0,
      attachment_urls: Vec::new(),
      created_at: at,
      updated_at: at,
    }
  }

  #[test]
  fn pinned_then_urgent_then_newest() {
    let mut posts = vec![
      post(1, false, false, 0),
      post(2, false, true, 50),
      post(3, true, false, 100),
      post(4, true, true, 200),
      post(5, false, false, 10),
      post(6, true, false, 5),
    ];
    sort_for_listing(&mut posts);
    let ids: Vec<i64> = posts.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![4, 6, 3, 2, 1, 5]);
  }

  #[test]
  fn order_holds_pairwise() {
    let mut posts: Vec<Post> = (0..16)
      .map(|i| post(i, i % 2 == 0, i % 3 == 0, (i * 7) % 11))
      .collect();
    sort_for_listing(&mut posts);
    for pair in posts.windows(2) {
      let (a, b) = (&pair[0], &pair[1]);
      assert!(a.is_pinned >= b.is_pinned);
      if a.is_pinned == b.is_pinned {
        assert!(a.is_urgent >= b.is_urgent);
        if a.is_urgent == b.is_urgent {
          assert!(a.created_at >= b.created_at);
        }
      }
    }
  }

  #[test]
  fn post_type_wire_names() {
    assert_eq!(PostType::Announcement.to_string(), "announcement");
    assert_eq!(
      serde_json::to_string(&PostType::Department).unwrap(),
      "\"department\""
    );
  }
}
