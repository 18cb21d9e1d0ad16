//! Employee roster spreadsheets: parsing uploads and producing the template.
//!
//! The first sheet is read and its first row is the header. Columns are found
//! by header name, so their order and any extra columns do not matter.

use std::io::Cursor;

use board_core::{directory::RosterEntry, role::Role};
use calamine::{Data, Reader as _, Xlsx, open_workbook_from_rs};

use crate::{
  Error, Result,
  sheet::{CellStyle, Sheet, workbook_bytes},
};

pub const TEMPLATE_SHEET: &str = "직원명단";
pub const TEMPLATE_FILENAME: &str = "employee_roster_template.xlsx";
const GUIDE_SHEET: &str = "안내";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
  Code,
  Name,
  Department,
  Role,
}

fn field_for(header: &str) -> Option<Field> {
  match header.trim().to_lowercase().as_str() {
    "사번" | "직원번호" | "employee_id" => Some(Field::Code),
    "이름" | "성명" | "name" => Some(Field::Name),
    "소속" | "부서" | "부서명" | "department" | "department_name" => Some(Field::Department),
    "권한레벨" | "권한" | "role" | "level" => Some(Field::Role),
    _ => None,
  }
}

/// Map a permission cell to a role: a level `1`–`4`, an enum name, or one of
/// the Korean labels. Anything else is [`Role::User`].
pub fn parse_role_cell(value: &str) -> Role {
  match value.trim().to_uppercase().as_str() {
    "4" | "SUPER_ADMIN" | "최고관리자" | "시스템관리자" => Role::SuperAdmin,
    "3" | "DEPARTMENT_ADMIN" | "부서관리자" | "부서장" => Role::DepartmentAdmin,
    "2" | "MODERATOR" | "조정자" | "중간관리자" => Role::Moderator,
    _ => Role::User,
  }
}

fn cell_text(cell: &Data) -> String {
  match cell {
    Data::Empty => String::new(),
    Data::String(s) => s.trim().to_owned(),
    Data::Int(i) => i.to_string(),
    Data::Float(f) if f.fract() == 0.0 => format!("{f:.0}"),
    other => other.to_string().trim().to_owned(),
  }
}

/// Read roster rows from xlsx bytes. Rows without a code, name or department
/// are skipped.
pub fn parse_roster(bytes: &[u8]) -> Result<Vec<RosterEntry>> {
  let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))?;
  let range = workbook
    .worksheet_range_at(0)
    .ok_or_else(|| Error::Layout("workbook has no sheets".into()))??;

  let mut rows = range.rows();
  let header = rows
    .next()
    .ok_or_else(|| Error::Layout("roster sheet is empty".into()))?;
  let columns: Vec<Option<Field>> =
    header.iter().map(|cell| field_for(&cell_text(cell))).collect();

  for (field, label) in [
    (Field::Code, "사번"),
    (Field::Name, "이름"),
    (Field::Department, "소속"),
  ] {
    if !columns.contains(&Some(field)) {
      return Err(Error::Layout(format!("roster is missing the {label} column")));
    }
  }

  // 1-based sheet row of the first data row.
  let first_row = range.start().map_or(0, |(row, _)| row) + 2;

  let mut entries = Vec::new();
  for (offset, row) in (0u32..).zip(rows) {
    let (mut code, mut name, mut department) = (String::new(), String::new(), String::new());
    let mut role = Role::User;
    for (cell, field) in row.iter().zip(&columns) {
      match field {
        Some(Field::Code) => code = cell_text(cell),
        Some(Field::Name) => name = cell_text(cell),
        Some(Field::Department) => department = cell_text(cell),
        Some(Field::Role) => role = parse_role_cell(&cell_text(cell)),
        None => {}
      }
    }

    let row_number = first_row + offset;
    if code.is_empty() || name.is_empty() || department.is_empty() {
      if row.iter().any(|c| !matches!(c, Data::Empty)) {
        tracing::debug!(row = row_number, "incomplete roster row skipped");
      }
      continue;
    }
    entries.push(RosterEntry {
      row: row_number,
      employee_code: code,
      name,
      department_name: department,
      role,
    });
  }
  Ok(entries)
}

/// A fill-in template: sample rows on the first sheet, and the permission
/// levels and known department names on a guide sheet.
pub fn roster_template(departments: &[String]) -> Result<Vec<u8>> {
  let mut roster = Sheet::new(TEMPLATE_SHEET);
  for (col, label) in (0..).zip(["사번", "이름", "소속", "권한레벨"]) {
    roster.text(0, col, label, CellStyle::Header);
    roster.set_width(col, 14.0);
  }
  let sample_department = departments.first().map_or("내과", String::as_str);
  for (row, (code, name, level)) in (1..).zip([
    ("EMP001", "홍길동", "1"),
    ("EMP002", "김간호사", "2"),
    ("EMP003", "박부서장", "3"),
  ]) {
    roster.text(row, 0, code, CellStyle::Plain);
    roster.text(row, 1, name, CellStyle::Plain);
    roster.text(row, 2, sample_department, CellStyle::Plain);
    roster.text(row, 3, level, CellStyle::Plain);
  }

  let mut guide = Sheet::new(GUIDE_SHEET);
  guide.text(0, 0, "권한레벨 설명", CellStyle::Header);
  for (row, line) in (1..).zip([
    "1 = 일반 사용자 (USER)",
    "2 = 조정자 (MODERATOR)",
    "3 = 부서 관리자 (DEPARTMENT_ADMIN)",
    "4 = 최고 관리자 (SUPER_ADMIN)",
  ]) {
    guide.text(row, 0, line, CellStyle::Plain);
  }
  guide.text(6, 0, "소속 부서 목록 (정확히 입력하세요)", CellStyle::Header);
  for (row, name) in (7..).zip(departments) {
    guide.text(row, 0, name.as_str(), CellStyle::Plain);
  }
  guide.set_width(0, 36.0);

  workbook_bytes(&[roster, guide])
}
