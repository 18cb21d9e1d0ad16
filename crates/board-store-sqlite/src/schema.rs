//! SQL schema for the bulletin-board SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS departments (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE,
    description TEXT,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS employees (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    employee_code   TEXT NOT NULL UNIQUE,     -- external id, e.g. EMP001
    name            TEXT NOT NULL,
    email           TEXT UNIQUE,
    password_hash   TEXT NOT NULL,            -- argon2 PHC string
    department_id   INTEGER REFERENCES departments(id),
    position        TEXT,
    role            TEXT NOT NULL DEFAULT 'USER',
    phone           TEXT,
    hire_date       TEXT,                     -- YYYY-MM-DD
    is_active       INTEGER NOT NULL DEFAULT 1,
    is_system_admin INTEGER NOT NULL DEFAULT 0,
    last_login      TEXT,
    created_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS posts (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    title           TEXT NOT NULL,
    content         TEXT NOT NULL,
    author_id       INTEGER REFERENCES employees(id) ON DELETE SET NULL,
    department_id   INTEGER REFERENCES departments(id),   -- NULL = global
    post_type       TEXT NOT NULL,                        -- 'announcement' | 'department'
    is_urgent       INTEGER NOT NULL DEFAULT 0,
    is_pinned       INTEGER NOT NULL DEFAULT 0,
    view_count      INTEGER NOT NULL DEFAULT 0,
    attachment_urls TEXT NOT NULL DEFAULT '[]',           -- JSON array
    created_at      TEXT NOT NULL,
    updated_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS post_confirmations (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    post_id      INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
    employee_id  INTEGER NOT NULL REFERENCES employees(id) ON DELETE CASCADE,
    confirmed_at TEXT NOT NULL,
    UNIQUE (post_id, employee_id)
);

CREATE TABLE IF NOT EXISTS notifications (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    title       TEXT NOT NULL,
    message     TEXT NOT NULL,
    type        TEXT NOT NULL DEFAULT 'info',
    employee_id INTEGER NOT NULL REFERENCES employees(id) ON DELETE CASCADE,
    post_id     INTEGER REFERENCES posts(id) ON DELETE SET NULL,
    is_read     INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS calendar_events (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    title         TEXT NOT NULL,
    type          TEXT NOT NULL,
    date          TEXT NOT NULL,                -- YYYY-MM-DD
    description   TEXT,
    employee_id   INTEGER NOT NULL REFERENCES employees(id) ON DELETE CASCADE,
    department_id INTEGER NOT NULL REFERENCES departments(id),
    status        TEXT NOT NULL DEFAULT 'approved'
);

CREATE INDEX IF NOT EXISTS employees_department_idx    ON employees(department_id);
CREATE INDEX IF NOT EXISTS posts_department_idx        ON posts(department_id);
CREATE INDEX IF NOT EXISTS confirmations_post_idx      ON post_confirmations(post_id);
CREATE INDEX IF NOT EXISTS notifications_recipient_idx ON notifications(employee_id, is_read);
CREATE INDEX IF NOT EXISTS events_department_date_idx  ON calendar_events(department_id, date);
CREATE INDEX IF NOT EXISTS events_employee_date_idx    ON calendar_events(employee_id, date);

PRAGMA user_version = 1;
";
