//! HTTP JSON API for the hospital bulletin board.
//!
//! Exposes an axum [`Router`] under `/api` backed by any [`BoardStore`].
//! Every route except `POST /api/auth/login` requires a bearer token issued
//! by that route.

pub mod auth;
pub mod error;
pub mod handlers;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{
  Router,
  routing::{get, patch, post},
};
use board_core::{
  Error,
  directory::NewEmployee,
  role::Role,
  store::{BoardStore, StoreResultExt as _},
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::SessionStore;
use handlers::{auth as login, calendar, departments, employees, notifications, posts};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Created as a super admin when the employee table is empty.
#[derive(Debug, Deserialize, Clone)]
pub struct BootstrapAdmin {
  pub employee_id:   String,
  pub name:          String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                    String,
  pub port:                    u16,
  /// `:memory:` selects the in-memory store.
  pub store_path:              PathBuf,
  pub session_ttl_minutes:     u64,
  /// Password given to every employee created by a roster import.
  pub import_default_password: String,
  pub seed_departments:        Vec<String>,
  pub bootstrap_admin:         Option<BootstrapAdmin>,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                    "127.0.0.1".into(),
      port:                    3000,
      store_path:              PathBuf::from("board.db"),
      session_ttl_minutes:     720,
      import_default_password: "1234".into(),
      seed_departments:        Vec::new(),
      bootstrap_admin:         None,
    }
  }
}

impl ServerConfig {
  pub fn session_ttl(&self) -> Duration { Duration::from_secs(self.session_ttl_minutes * 60) }

  pub fn in_memory(&self) -> bool { self.store_path.as_os_str() == ":memory:" }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub store:    Arc<S>,
  pub config:   Arc<ServerConfig>,
  pub sessions: Arc<SessionStore>,
}

impl<S> AppState<S> {
  pub fn new(store: S, config: ServerConfig) -> Self {
    Self {
      store:    Arc::new(store),
      sessions: Arc::new(SessionStore::new(config.session_ttl())),
      config:   Arc::new(config),
    }
  }
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:    self.store.clone(),
      config:   self.config.clone(),
      sessions: self.sessions.clone(),
    }
  }
}

// ─── Startup ──────────────────────────────────────────────────────────────────

/// Ensure the configured departments exist and, on an empty directory,
/// create the bootstrap administrator.
pub async fn bootstrap<S: BoardStore>(store: &S, config: &ServerConfig) -> board_core::Result<()> {
  for name in &config.seed_departments {
    let name = name.trim();
    if !name.is_empty() {
      store.ensure_department(name.to_owned(), None).await.lift()?;
    }
  }

  let Some(admin) = &config.bootstrap_admin else {
    return Ok(());
  };
  if store.count_employees().await.lift()? > 0 {
    tracing::debug!("directory not empty; bootstrap admin skipped");
    return Ok(());
  }
  argon2::PasswordHash::new(&admin.password_hash).map_err(|e| {
    Error::validation(format!("bootstrap_admin.password_hash is not a PHC string: {e}"))
  })?;

  let created = store
    .insert_employee(NewEmployee {
      employee_code:   admin.employee_id.clone(),
      name:            admin.name.clone(),
      email:           None,
      password_hash:   admin.password_hash.clone(),
      department_id:   None,
      position:        None,
      role:            Role::SuperAdmin,
      phone:           None,
      hire_date:       None,
      is_active:       true,
      is_system_admin: true,
    })
    .await
    .lift()?;
  tracing::info!(employee = created.id, code = %created.employee_code, "bootstrap admin created");
  Ok(())
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the `/api` router.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: BoardStore + 'static,
{
  Router::new()
    // Auth
    .route("/api/auth/login",                 post(login::login::<S>))
    .route("/api/auth/logout",                post(login::logout::<S>))
    .route("/api/auth/me",                    get(login::me::<S>))
    // Directory
    .route("/api/departments",                get(departments::list::<S>))
    .route("/api/employees",                  get(employees::list::<S>).post(employees::create::<S>))
    .route("/api/employees/import",           post(employees::import::<S>))
    .route("/api/employees/import/template",  get(employees::template::<S>))
    .route("/api/employees/{id}",             patch(employees::update::<S>).delete(employees::delete::<S>))
    .route("/api/employees/{id}/password",    patch(employees::change_password::<S>))
    // Bulletin
    .route("/api/posts",                      get(posts::list::<S>).post(posts::create::<S>))
    .route(
      "/api/posts/{id}",
      get(posts::get_one::<S>).patch(posts::update::<S>).delete(posts::delete::<S>),
    )
    .route("/api/posts/{id}/view",            post(posts::view::<S>))
    .route(
      "/api/posts/{id}/confirmations",
      get(posts::confirmations::<S>).post(posts::confirm::<S>),
    )
    // Notifications
    .route("/api/notifications",              get(notifications::list::<S>).post(notifications::create::<S>))
    .route("/api/notifications/unread-count", get(notifications::unread_count::<S>))
    .route("/api/notifications/read-all",     post(notifications::read_all::<S>))
    .route(
      "/api/notifications/{id}",
      patch(notifications::update::<S>).delete(notifications::delete::<S>),
    )
    // Calendar
    .route(
      "/api/calendar",
      get(calendar::list::<S>)
        .post(calendar::create::<S>)
        .put(calendar::update::<S>)
        .delete(calendar::delete::<S>),
    )
    .route("/api/calendar/stats",             get(calendar::stats::<S>))
    .route("/api/calendar/export",            get(calendar::export::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
  };
  use board_core::{directory::Employee, password::hash_password};
  use board_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  const ADMIN_PASSWORD: &str = "admin-pass";

  /// A server with departments `내과` (1) and `외과` (2) and a bootstrap admin
  /// `ADMIN`.
  async fn make_state() -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let config = ServerConfig {
      store_path: PathBuf::from(":memory:"),
      seed_departments: vec!["내과".into(), "외과".into()],
      bootstrap_admin: Some(BootstrapAdmin {
        employee_id:   "ADMIN".into(),
        name:          "관리자".into(),
        password_hash: hash_password(ADMIN_PASSWORD).unwrap(),
      }),
      ..ServerConfig::default()
    };
    bootstrap(&store, &config).await.unwrap();
    AppState::new(store, config)
  }

  async fn add_employee(
    state: &AppState<SqliteStore>,
    code: &str,
    role: Role,
    department_id: Option<i64>,
  ) -> Employee {
    state
      .store
      .insert_employee(NewEmployee {
        employee_code: code.into(),
        name: format!("Name {code}"),
        email: Some(format!("{code}@hospital.com")),
        password_hash: hash_password("pw1234").unwrap(),
        department_id,
        position: None,
        role,
        phone: None,
        hire_date: None,
        is_active: true,
        is_system_admin: false,
      })
      .await
      .unwrap()
  }

  async fn send(
    state: &AppState<SqliteStore>,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
  ) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
      builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
      Some(json) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(json.to_string())
      }
      None => Body::empty(),
    };
    router(state.clone()).oneshot(builder.body(body).unwrap()).await.unwrap()
  }

  async fn json_body(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  async fn login(state: &AppState<SqliteStore>, code: &str, password: &str) -> String {
    let resp = send(
      state,
      "POST",
      "/api/auth/login",
      None,
      Some(json!({ "employee_id": code, "password": password })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    json_body(resp).await["token"].as_str().unwrap().to_owned()
  }

  // ── Auth ─────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn login_returns_employee_and_token() {
    let state = make_state().await;
    let resp = send(
      &state,
      "POST",
      "/api/auth/login",
      None,
      Some(json!({ "employee_id": "ADMIN", "password": ADMIN_PASSWORD })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["employee"]["employee_id"], "ADMIN");
    assert_eq!(body["employee"]["role"], "SUPER_ADMIN");
    assert!(body["employee"].get("password_hash").is_none());
    assert_eq!(body["token"].as_str().unwrap().len(), 64);
  }

  #[tokio::test]
  async fn bad_credentials_return_401() {
    let state = make_state().await;
    for (code, password) in [("ADMIN", "wrong"), ("NOBODY", ADMIN_PASSWORD)] {
      let resp = send(
        &state,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "employee_id": code, "password": password })),
      )
      .await;
      assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
      assert_eq!(json_body(resp).await["error"], "invalid employee id or password");
    }
  }

  #[tokio::test]
  async fn routes_require_a_session() {
    let state = make_state().await;
    let resp = send(&state, "GET", "/api/employees", None, None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));

    let resp = send(&state, "GET", "/api/employees", Some("forged"), None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn logout_revokes_the_token() {
    let state = make_state().await;
    let token = login(&state, "ADMIN", ADMIN_PASSWORD).await;

    let resp = send(&state, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = send(&state, "POST", "/api/auth/logout", Some(&token), None).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = send(&state, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn deactivation_takes_effect_immediately() {
    let state = make_state().await;
    let admin = login(&state, "ADMIN", ADMIN_PASSWORD).await;
    let nurse = add_employee(&state, "EMP001", Role::User, Some(1)).await;
    let token = login(&state, "EMP001", "pw1234").await;

    let resp = send(
      &state,
      "PATCH",
      &format!("/api/employees/{}", nurse.id),
      Some(&admin),
      Some(json!({ "is_active": false })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["is_active"], false);

    let resp = send(&state, "GET", "/api/posts", Some(&token), None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  // ── Directory ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn employees_listed_with_department_names() {
    let state = make_state().await;
    add_employee(&state, "EMP001", Role::User, Some(1)).await;
    let token = login(&state, "ADMIN", ADMIN_PASSWORD).await;

    let resp = send(&state, "GET", "/api/employees?department_id=1", Some(&token), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["employee_id"], "EMP001");
    assert_eq!(list[0]["department_name"], "내과");
  }

  #[tokio::test]
  async fn duplicate_employee_is_409_and_bad_role_is_400() {
    let state = make_state().await;
    let token = login(&state, "ADMIN", ADMIN_PASSWORD).await;
    let body = |code: &str, role: &str| {
      json!({
        "employee_id": code,
        "name": "김간호",
        "email": format!("{code}@hospital.com"),
        "password": "1234",
        "department_id": 1,
        "role": role,
      })
    };

    let resp = send(&state, "POST", "/api/employees", Some(&token), Some(body("EMP010", "USER"))).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let mut duplicate = body("EMP010", "USER");
    duplicate["email"] = json!("someone-else@hospital.com");
    let resp = send(&state, "POST", "/api/employees", Some(&token), Some(duplicate)).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(json_body(resp).await["error"], "employee id already exists");

    let resp =
      send(&state, "POST", "/api/employees", Some(&token), Some(body("EMP011", "board_admin"))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(resp).await["error"].is_string());
  }

  #[tokio::test]
  async fn department_admin_cannot_delete_across_departments() {
    let state = make_state().await;
    add_employee(&state, "HEAD", Role::DepartmentAdmin, Some(1)).await;
    let inside = add_employee(&state, "EMP001", Role::User, Some(1)).await;
    let outside = add_employee(&state, "EMP002", Role::User, Some(2)).await;
    let token = login(&state, "HEAD", "pw1234").await;

    let uri = format!("/api/employees/{}", outside.id);
    let resp = send(&state, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let uri = format!("/api/employees/{}", inside.id);
    let resp = send(&state, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
  }

  #[tokio::test]
  async fn password_change_is_self_service() {
    let state = make_state().await;
    let nurse = add_employee(&state, "EMP001", Role::User, Some(1)).await;
    let token = login(&state, "EMP001", "pw1234").await;
    let uri = format!("/api/employees/{}/password", nurse.id);

    let resp = send(
      &state,
      "PATCH",
      &uri,
      Some(&token),
      Some(json!({ "current_password": "nope", "new_password": "fresh-pass" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = send(
      &state,
      "PATCH",
      &uri,
      Some(&token),
      Some(json!({ "current_password": "pw1234", "new_password": "fresh-pass" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    login(&state, "EMP001", "fresh-pass").await;
  }

  #[tokio::test]
  async fn roster_template_round_trips_through_import() {
    let state = make_state().await;
    let token = login(&state, "ADMIN", ADMIN_PASSWORD).await;

    let resp = send(&state, "GET", "/api/employees/import/template", Some(&token), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], board_report::XLSX_CONTENT_TYPE);
    let template = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();

    let req = Request::builder()
      .method("POST")
      .uri("/api/employees/import")
      .header(header::AUTHORIZATION, format!("Bearer {token}"))
      .body(Body::from(template))
      .unwrap();
    let resp = router(state.clone()).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let summary = json_body(resp).await;
    assert_eq!(summary["created"].as_array().unwrap().len(), 3);
    assert_eq!(summary["failed"].as_array().unwrap().len(), 0);

    // Imported employees log in with the configured default password.
    login(&state, "EMP001", "1234").await;
  }

  #[tokio::test]
  async fn import_rejects_garbage_as_bad_request() {
    let state = make_state().await;
    let token = login(&state, "ADMIN", ADMIN_PASSWORD).await;
    let req = Request::builder()
      .method("POST")
      .uri("/api/employees/import")
      .header(header::AUTHORIZATION, format!("Bearer {token}"))
      .body(Body::from("definitely not xlsx"))
      .unwrap();
    let resp = router(state.clone()).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  // ── Bulletin ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn user_posts_to_own_department_only() {
    let state = make_state().await;
    add_employee(&state, "EMP001", Role::User, Some(1)).await;
    add_employee(&state, "EMP002", Role::User, Some(1)).await;
    add_employee(&state, "EMP003", Role::User, Some(2)).await;
    let token = login(&state, "EMP001", "pw1234").await;

    let resp = send(
      &state,
      "POST",
      "/api/posts",
      Some(&token),
      Some(json!({ "title": "공지", "content": "전체 공지", "post_type": "announcement" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = send(
      &state,
      "POST",
      "/api/posts",
      Some(&token),
      Some(json!({ "title": "회의", "content": "내과 회의", "department_id": 1 })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let published = json_body(resp).await;
    assert_eq!(published["post"]["department_id"], 1);
    assert_eq!(published["notified"], 2);

    let other = login(&state, "EMP002", "pw1234").await;
    let resp = send(&state, "GET", "/api/notifications/unread-count", Some(&other), None).await;
    assert_eq!(json_body(resp).await["count"], 1);
  }

  #[tokio::test]
  async fn post_detail_view_and_confirmations() {
    let state = make_state().await;
    let token = login(&state, "ADMIN", ADMIN_PASSWORD).await;
    let resp = send(
      &state,
      "POST",
      "/api/posts",
      Some(&token),
      Some(json!({ "title": "긴급", "content": "소방 훈련", "is_urgent": true })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let id = json_body(resp).await["post"]["id"].as_i64().unwrap();

    let resp = send(&state, "POST", &format!("/api/posts/{id}/view"), Some(&token), None).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = send(&state, "POST", "/api/posts/999/view", Some(&token), None).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    for _ in 0..2 {
      let uri = format!("/api/posts/{id}/confirmations");
      let resp = send(&state, "POST", &uri, Some(&token), None).await;
      assert_eq!(resp.status(), StatusCode::OK);
    }
    let resp =
      send(&state, "GET", &format!("/api/posts/{id}/confirmations"), Some(&token), None).await;
    let confirmations = json_body(resp).await;
    assert_eq!(confirmations.as_array().unwrap().len(), 1);
    assert_eq!(confirmations[0]["employee_name"], "관리자");

    let resp = send(&state, "GET", &format!("/api/posts/{id}"), Some(&token), None).await;
    let post = json_body(resp).await;
    assert_eq!(post["view_count"], 1);
    assert_eq!(post["author_name"], "관리자");

    let resp = send(&state, "DELETE", &format!("/api/posts/{id}"), Some(&token), None).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = send(&state, "GET", &format!("/api/posts/{id}"), Some(&token), None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn malformed_json_is_a_json_400() {
    let state = make_state().await;
    let token = login(&state, "ADMIN", ADMIN_PASSWORD).await;
    let req = Request::builder()
      .method("POST")
      .uri("/api/posts")
      .header(header::AUTHORIZATION, format!("Bearer {token}"))
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from("{not json"))
      .unwrap();
    let resp = router(state.clone()).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(resp).await["error"].is_string());
  }

  // ── Notifications ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn notifications_bulk_send_and_read_all() {
    let state = make_state().await;
    let a = add_employee(&state, "EMP001", Role::User, Some(1)).await;
    let b = add_employee(&state, "EMP002", Role::User, Some(1)).await;
    let admin = login(&state, "ADMIN", ADMIN_PASSWORD).await;
    let user = login(&state, "EMP001", "pw1234").await;
    let draft = json!({
      "title": "점검",
      "message": "전산 점검 예정",
      "type": "warning",
      "target_employee_ids": [a.id, b.id],
    });

    let resp = send(&state, "POST", "/api/notifications", Some(&user), Some(draft.clone())).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let resp = send(&state, "POST", "/api/notifications", Some(&admin), Some(draft)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(json_body(resp).await.as_array().unwrap().len(), 2);

    let resp = send(&state, "GET", "/api/notifications", Some(&user), None).await;
    let list = json_body(resp).await;
    assert_eq!(list[0]["type"], "warning");
    let theirs = format!("/api/notifications?employee_id={}", b.id);
    let resp = send(&state, "GET", &theirs, Some(&user), None).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = send(&state, "POST", "/api/notifications/read-all", Some(&user), None).await;
    assert_eq!(json_body(resp).await["updated"], 1);
    let resp = send(&state, "GET", "/api/notifications/unread-count", Some(&user), None).await;
    assert_eq!(json_body(resp).await["count"], 0);
  }

  #[tokio::test]
  async fn notification_patch_body_is_optional() {
    let state = make_state().await;
    let a = add_employee(&state, "EMP001", Role::User, Some(1)).await;
    let admin = login(&state, "ADMIN", ADMIN_PASSWORD).await;
    let user = login(&state, "EMP001", "pw1234").await;
    let draft = json!({
      "title": "점검",
      "message": "전산 점검 예정",
      "type": "info",
      "target_employee_ids": [a.id],
    });
    let resp = send(&state, "POST", "/api/notifications", Some(&admin), Some(draft)).await;
    let id = json_body(resp).await[0]["id"].as_i64().unwrap();
    let uri = format!("/api/notifications/{id}");

    let resp = send(&state, "PATCH", &uri, Some(&user), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["is_read"], true);

    let resp =
      send(&state, "PATCH", &uri, Some(&user), Some(json!({ "is_read": false }))).await;
    assert_eq!(json_body(resp).await["is_read"], false);

    let resp =
      send(&state, "PATCH", &uri, Some(&user), Some(json!({ "is_read": "yes" }))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(resp).await["error"].is_string());
  }

  // ── Calendar ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn calendar_crud_stats_and_export() {
    let state = make_state().await;
    let nurse = add_employee(&state, "EMP001", Role::User, Some(1)).await;
    let token = login(&state, "EMP001", "pw1234").await;

    let resp = send(
      &state,
      "POST",
      "/api/calendar",
      Some(&token),
      Some(json!({
        "title": "연차",
        "type": "annual_leave",
        "date": "2025-04-07",
        "employee_id": nurse.id,
        "department_id": 1,
      })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let id = json_body(resp).await["id"].as_i64().unwrap();

    let resp = send(
      &state,
      "PUT",
      &format!("/api/calendar?id={id}"),
      Some(&token),
      Some(json!({ "type": "half_day" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["type"], "half_day");

    let resp = send(&state, "GET", "/api/calendar?year=2025&month=4", Some(&token), None).await;
    assert_eq!(json_body(resp).await.as_array().unwrap().len(), 1);
    let resp = send(&state, "GET", "/api/calendar?year=2025", Some(&token), None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp =
      send(&state, "GET", "/api/calendar/stats?year=2025&month=4", Some(&token), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let stats = json_body(resp).await;
    assert_eq!(stats.as_array().unwrap().len(), 1);
    assert_eq!(stats[0]["half_day"], 1);

    let resp = send(
      &state,
      "GET",
      "/api/calendar/export?year=2025&month=4&department_id=2",
      Some(&token),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp =
      send(&state, "GET", "/api/calendar/export?year=2025&month=4", Some(&token), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
      resp.headers()[header::CONTENT_DISPOSITION],
      "attachment; filename=\"vacation_report_2025_04.xlsx\""
    );
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..2], b"PK");

    let resp = send(&state, "DELETE", "/api/calendar", Some(&token), None).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let resp = send(&state, "DELETE", &format!("/api/calendar?id={id}"), Some(&token), None).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
  }

  // ── Startup ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn bootstrap_is_idempotent_and_checks_the_hash() {
    let state = make_state().await;
    bootstrap(&*state.store, &state.config).await.unwrap();
    assert_eq!(state.store.count_employees().await.unwrap(), 1);
    assert_eq!(state.store.list_departments().await.unwrap().len(), 2);

    let fresh = SqliteStore::open_in_memory().await.unwrap();
    let config = ServerConfig {
      bootstrap_admin: Some(BootstrapAdmin {
        employee_id:   "ADMIN".into(),
        name:          "관리자".into(),
        password_hash: "plain-text".into(),
      }),
      ..ServerConfig::default()
    };
    assert!(matches!(bootstrap(&fresh, &config).await, Err(Error::Validation(_))));
  }
}
