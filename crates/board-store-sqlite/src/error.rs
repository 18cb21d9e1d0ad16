//! Error type for `board-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(tokio_rusqlite::Error),

  /// A UNIQUE constraint rejected the write.
  #[error("{0}")]
  Conflict(String),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unexpected {column} value in database: {value:?}")]
  Decode { column: &'static str, value: String },
}

impl From<tokio_rusqlite::Error> for Error {
  fn from(err: tokio_rusqlite::Error) -> Self {
    if let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, msg)) = &err
      && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    {
      return Self::Conflict(conflict_message(msg.as_deref()));
    }
    Self::Database(err)
  }
}

/// Turn `UNIQUE constraint failed: employees.email` into something a client
/// can show.
fn conflict_message(detail: Option<&str>) -> String {
  let column = detail
    .and_then(|d| d.rsplit(": ").next())
    .unwrap_or_default();
  match column {
    "employees.employee_code" => "employee id already exists".to_owned(),
    "employees.email" => "email is already in use".to_owned(),
    "departments.name" => "department already exists".to_owned(),
    "" => "duplicate value".to_owned(),
    other => format!("duplicate value for {other}"),
  }
}

impl From<Error> for board_core::Error {
  fn from(err: Error) -> Self {
    match err {
      Error::Conflict(msg) => board_core::Error::Conflict(msg),
      other => board_core::Error::StoreUnavailable(Box::new(other)),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn conflict_messages_name_the_column() {
    assert_eq!(
      conflict_message(Some("UNIQUE constraint failed: employees.employee_code")),
      "employee id already exists"
    );
    assert_eq!(
      conflict_message(Some("UNIQUE constraint failed: employees.email")),
      "email is already in use"
    );
    assert_eq!(conflict_message(None), "duplicate value");
  }

  #[test]
  fn only_conflicts_stay_conflicts() {
    let core: board_core::Error = Error::Conflict("dup".into()).into();
    assert!(matches!(core, board_core::Error::Conflict(_)));

    let core: board_core::Error = Error::DateParse("bad".into()).into();
    assert!(matches!(core, board_core::Error::StoreUnavailable(_)));
  }
}
