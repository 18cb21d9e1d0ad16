//! Error type for `board-report`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Writing the workbook failed.
  #[error("cannot write workbook: {0}")]
  Write(#[from] rust_xlsxwriter::XlsxError),

  /// The uploaded bytes are not a readable xlsx workbook.
  #[error("cannot read workbook: {0}")]
  Read(#[from] calamine::XlsxError),

  /// The workbook was readable but its contents do not fit the expected layout.
  #[error("{0}")]
  Layout(String),
}

impl Error {
  /// Whether the fault lies with the uploaded input rather than with us.
  pub fn is_bad_input(&self) -> bool { matches!(self, Self::Read(_) | Self::Layout(_)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
