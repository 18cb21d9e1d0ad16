//! Bearer-token sessions and the [`Actor`] extractor.
//!
//! Tokens are random and held only in memory; a restart logs everyone out.
//! The acting employee is re-read from the store on every request, so role
//! and active-flag changes apply immediately.

use std::{
  collections::HashMap,
  sync::{Mutex, PoisonError},
  time::{Duration, Instant},
};

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use board_core::{
  directory::Employee,
  store::{BoardStore, StoreResultExt as _},
};
use rand_core::{OsRng, RngCore as _};

use crate::{AppState, error::ApiError};

const TOKEN_BYTES: usize = 32;

struct Session {
  employee_id: i64,
  expires_at:  Instant,
}

/// Live login sessions, keyed by token.
pub struct SessionStore {
  ttl:      Duration,
  sessions: Mutex<HashMap<String, Session>>,
}

impl SessionStore {
  pub fn new(ttl: Duration) -> Self {
    Self { ttl, sessions: Mutex::new(HashMap::new()) }
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Session>> {
    self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Start a session for `employee_id` and return its token.
  pub fn issue(&self, employee_id: i64) -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    let token = hex::encode(bytes);

    let now = Instant::now();
    let mut sessions = self.lock();
    sessions.retain(|_, s| s.expires_at > now);
    sessions.insert(token.clone(), Session { employee_id, expires_at: now + self.ttl });
    token
  }

  /// The employee behind `token`, if the session exists and has not expired.
  pub fn resolve(&self, token: &str) -> Option<i64> {
    let mut sessions = self.lock();
    match sessions.get(token) {
      Some(s) if s.expires_at > Instant::now() => Some(s.employee_id),
      Some(_) => {
        sessions.remove(token);
        None
      }
      None => None,
    }
  }

  pub fn revoke(&self, token: &str) -> bool { self.lock().remove(token).is_some() }
}

/// The token of an `Authorization: Bearer …` header.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
  headers
    .get(header::AUTHORIZATION)?
    .to_str()
    .ok()?
    .strip_prefix("Bearer ")
    .map(str::trim)
    .filter(|t| !t.is_empty())
}

/// The authenticated, active employee making the request.
pub struct Actor(pub Employee);

impl<S> FromRequestParts<AppState<S>> for Actor
where
  S: BoardStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer_token(&parts.headers)
      .ok_or_else(|| ApiError::unauthenticated("login required"))?;
    let employee_id = state
      .sessions
      .resolve(token)
      .ok_or_else(|| ApiError::unauthenticated("session expired or invalid"))?;

    match state.store.get_employee(employee_id).await.lift()? {
      Some(employee) if employee.is_active => Ok(Actor(employee)),
      _ => {
        state.sessions.revoke(token);
        tracing::info!(employee = employee_id, "session closed for inactive or deleted employee");
        Err(ApiError::unauthenticated("account is not active"))
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn issued_tokens_resolve_until_revoked() {
    let sessions = SessionStore::new(Duration::from_secs(60));
    let token = sessions.issue(7);
    assert_eq!(token.len(), TOKEN_BYTES * 2);
    assert_eq!(sessions.resolve(&token), Some(7));

    assert!(sessions.revoke(&token));
    assert_eq!(sessions.resolve(&token), None);
    assert!(!sessions.revoke(&token));
  }

  #[test]
  fn tokens_are_distinct() {
    let sessions = SessionStore::new(Duration::from_secs(60));
    assert_ne!(sessions.issue(1), sessions.issue(1));
  }

  #[test]
  fn expired_sessions_do_not_resolve() {
    let sessions = SessionStore::new(Duration::ZERO);
    let token = sessions.issue(1);
    assert_eq!(sessions.resolve(&token), None);
  }

  #[test]
  fn bearer_header_parsing() {
    let mut headers = HeaderMap::new();
    assert_eq!(bearer_token(&headers), None);

    headers.insert(header::AUTHORIZATION, "Basic dXNlcjpwdw==".parse().unwrap());
    assert_eq!(bearer_token(&headers), None);

    headers.insert(header::AUTHORIZATION, "Bearer ".parse().unwrap());
    assert_eq!(bearer_token(&headers), None);

    headers.insert(header::AUTHORIZATION, "Bearer abc123".parse().unwrap());
    assert_eq!(bearer_token(&headers), Some("abc123"));
  }
}
