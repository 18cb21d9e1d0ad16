//! Spreadsheet output and input for the bulletin board: the monthly vacation
//! report and the employee roster import/template.
//!
//! Layouts are first built as a [`sheet::Sheet`] (plain data, easy to test),
//! then rendered to xlsx bytes with [`rust_xlsxwriter`].

pub mod error;
pub mod roster;
pub mod sheet;
pub mod vacation;

pub use error::{Error, Result};
pub use roster::{parse_roster, roster_template};
pub use vacation::{VacationReport, generate_vacation_report};

/// MIME type of every workbook this crate produces.
pub const XLSX_CONTENT_TYPE: &str =
  "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
