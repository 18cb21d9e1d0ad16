//! The monthly vacation report ("확정 근무표").
//!
//! Layout, zero-based rows:
//!
//! | row | content |
//! |-----|---------|
//! | 0   | title, merged across the full width |
//! | 4   | department name, legend |
//! | 5   | header: `사번`, `이름`, `사용`, one `{day}({요일})` per day, `비고` |
//! | 7…  | one row per employee |
//!
//! A day cell holds the comma-joined leave codes of that day, or `off` on a
//! Sunday and `D` otherwise when there is no leave.

use std::collections::HashMap;

use board_core::{
  calendar::{CalendarEvent, EventStatus, YearMonth, weekday_short_ko},
  directory::Employee,
  schedule::MonthlySchedule,
};
use chrono::{Datelike, NaiveDate, Weekday};

use crate::{
  Result,
  sheet::{CellStyle, Col, Row, Sheet},
};

pub const SHEET_NAME: &str = "vacation_report";
pub const LEGEND: &str = "연차:Y, 반차:Y/2, 반반차:1/4, 오프:off, 근무:D";
pub const OFF: &str = "off";
pub const WORKDAY: &str = "D";
const ALL_DEPARTMENTS: &str = "전체";

pub const TITLE_ROW: Row = 0;
pub const DEPARTMENT_ROW: Row = 4;
pub const HEADER_ROW: Row = 5;
pub const FIRST_DATA_ROW: Row = 7;

pub const CODE_COL: Col = 0;
pub const NAME_COL: Col = 1;
pub const USED_COL: Col = 2;
pub const FIRST_DAY_COL: Col = 3;
const LEGEND_COL: Col = 2;

/// `vacation_report_2025_03.xlsx`
pub fn report_filename(month: YearMonth) -> String {
  format!("vacation_report_{}_{:02}.xlsx", month.year(), month.month())
}

pub fn report_title(month: YearMonth) -> String {
  format!("{}년 {}월 확정 근무표", month.year(), month.month())
}

/// Inputs to one monthly report. Employees appear in slice order.
#[derive(Debug, Clone, Copy)]
pub struct VacationReport<'a> {
  pub month:      YearMonth,
  pub department: Option<&'a str>,
  pub employees:  &'a [Employee],
  pub events:     &'a [CalendarEvent],
}

impl<'a> VacationReport<'a> {
  pub fn from_schedule(schedule: &'a MonthlySchedule) -> Self {
    Self {
      month:      schedule.month,
      department: schedule.department.as_ref().map(|d| d.name.as_str()),
      employees:  &schedule.employees,
      events:     &schedule.events,
    }
  }

  pub fn filename(&self) -> String { report_filename(self.month) }

  /// Approved leave in the report month, in input order.
  fn leave(&self) -> impl Iterator<Item = &'a CalendarEvent> + 'a {
    let (month, events) = (self.month, self.events);
    events.iter().filter(move |e| {
      e.status == EventStatus::Approved && e.kind.is_leave() && month.contains(e.date)
    })
  }

  fn note_col(&self) -> Col { FIRST_DAY_COL + self.month.day_count() as Col }

  pub fn sheet(&self) -> Sheet {
    let mut sheet = Sheet::new(SHEET_NAME);
    let note_col = self.note_col();

    sheet.merge(TITLE_ROW, 0, note_col, report_title(self.month), CellStyle::Title);
    sheet.text(
      DEPARTMENT_ROW,
      CODE_COL,
      self.department.unwrap_or(ALL_DEPARTMENTS),
      CellStyle::Plain,
    );
    sheet.text(DEPARTMENT_ROW, LEGEND_COL, LEGEND, CellStyle::Plain);

    sheet.text(HEADER_ROW, CODE_COL, "사번", CellStyle::Header);
    sheet.text(HEADER_ROW, NAME_COL, "이름", CellStyle::Header);
    sheet.text(HEADER_ROW, USED_COL, "사용", CellStyle::Header);
    for (col, date) in self.day_columns() {
      let label = format!("{}({})", date.day(), weekday_short_ko(date.weekday()));
      sheet.text(HEADER_ROW, col, label, header_style(date));
    }
    sheet.text(HEADER_ROW, note_col, "비고", CellStyle::Header);

    // (employee, day) → codes, in event order; employee → leave days used.
    let mut codes: HashMap<(i64, u32), Vec<&'static str>> = HashMap::new();
    let mut used: HashMap<i64, f64> = HashMap::new();
    for event in self.leave() {
      if let Some(code) = event.kind.leave_code() {
        codes.entry((event.employee_id, event.date.day())).or_default().push(code);
      }
      *used.entry(event.employee_id).or_default() += event.kind.leave_days();
    }

    for (row, employee) in (FIRST_DATA_ROW..).zip(self.employees) {
      sheet.text(row, CODE_COL, employee.employee_code.as_str(), CellStyle::Centered);
      sheet.text(row, NAME_COL, employee.name.as_str(), CellStyle::Centered);
      sheet.number(
        row,
        USED_COL,
        used.get(&employee.id).copied().unwrap_or_default(),
        CellStyle::Centered,
      );
      for (col, date) in self.day_columns() {
        let value = match codes.get(&(employee.id, date.day())) {
          Some(day_codes) => day_codes.join(","),
          None if date.weekday() == Weekday::Sun => OFF.to_owned(),
          None => WORKDAY.to_owned(),
        };
        sheet.text(row, col, value, day_style(date));
      }
    }

    sheet.set_width(CODE_COL, 10.0);
    sheet.set_width(NAME_COL, 10.0);
    sheet.set_width(USED_COL, 6.0);
    for (col, _) in self.day_columns() {
      sheet.set_width(col, 6.5);
    }
    sheet.set_width(note_col, 14.0);
    sheet
  }

  pub fn to_xlsx(&self) -> Result<Vec<u8>> {
    let bytes = self.sheet().to_xlsx()?;
    tracing::debug!(
      month = %self.month,
      employees = self.employees.len(),
      bytes = bytes.len(),
      "vacation report rendered"
    );
    Ok(bytes)
  }

  fn day_columns(&self) -> impl Iterator<Item = (Col, NaiveDate)> {
    (FIRST_DAY_COL..).zip(self.month.days())
  }
}

/// Render a department-less report straight from events and employees.
pub fn generate_vacation_report(
  events: &[CalendarEvent],
  employees: &[Employee],
  month: YearMonth,
) -> Result<Vec<u8>> {
  VacationReport { month, department: None, employees, events }.to_xlsx()
}

fn header_style(date: NaiveDate) -> CellStyle {
  match date.weekday() {
    Weekday::Sat => CellStyle::SaturdayHeader,
    Weekday::Sun => CellStyle::SundayHeader,
    _ => CellStyle::Header,
  }
}

fn day_style(date: NaiveDate) -> CellStyle {
  match date.weekday() {
    Weekday::Sat => CellStyle::Saturday,
    Weekday::Sun => CellStyle::Sunday,
    _ => CellStyle::Centered,
  }
}

#[cfg(test)]
mod tests {
  use std::io::Cursor;

  use board_core::{calendar::EventType, role::Role};
  use calamine::{Data, Reader as _, Xlsx, open_workbook_from_rs};
  use chrono::Utc;

  use super::*;
  use crate::sheet::CellValue;

  fn employee(id: i64, code: &str, name: &str) -> Employee {
    Employee {
      id,
      employee_code: code.into(),
      name: name.into(),
      email: None,
      password_hash: String::new(),
      department_id: Some(1),
      position: None,
      role: Role::User,
      phone: None,
      hire_date: None,
      is_active: true,
      is_system_admin: false,
      last_login: None,
      created_at: Utc::now(),
    }
  }

  fn event(id: i64, employee_id: i64, kind: EventType, day: u32) -> CalendarEvent {
    CalendarEvent {
      id,
      title: "leave".into(),
      kind,
      date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
      description: None,
      employee_id,
      department_id: 1,
      status: EventStatus::Approved,
    }
  }

  fn march() -> YearMonth { YearMonth::new(2025, 3).unwrap() }

  fn day_col(day: u32) -> Col { FIRST_DAY_COL + day as Col - 1 }

  #[test]
  fn title_and_filename_embed_the_month() {
    assert_eq!(report_title(march()), "2025년 3월 확정 근무표");
    assert_eq!(report_filename(march()), "vacation_report_2025_03.xlsx");
  }

  #[test]
  fn one_column_per_day_of_month() {
    for (year, month, days) in [(2025, 2, 28), (2024, 2, 29), (2025, 4, 30), (2025, 3, 31)] {
      let report = VacationReport {
        month:      YearMonth::new(year, month).unwrap(),
        department: None,
        employees:  &[],
        events:     &[],
      };
      let sheet = report.sheet();
      let last = FIRST_DAY_COL + days - 1;
      assert_eq!(sheet.text_at(HEADER_ROW, last).map(|s| s.starts_with(&days.to_string())), Some(true));
      assert_eq!(sheet.text_at(HEADER_ROW, last + 1), Some("비고"));
      assert_eq!(sheet.merges()[0].last_col, last + 1);
    }
  }

  #[test]
  fn weekend_headers_are_styled_apart() {
    // 2025-03-01 is a Saturday, the 2nd a Sunday, the 3rd a Monday.
    let report = VacationReport { month: march(), department: None, employees: &[], events: &[] };
    let sheet = report.sheet();
    assert_eq!(sheet.text_at(HEADER_ROW, day_col(1)), Some("1(토)"));
    assert_eq!(sheet.text_at(HEADER_ROW, day_col(2)), Some("2(일)"));
    assert_eq!(sheet.text_at(HEADER_ROW, day_col(3)), Some("3(월)"));

    let style = |day| sheet.cell(HEADER_ROW, day_col(day)).unwrap().style;
    assert_eq!(style(1), CellStyle::SaturdayHeader);
    assert_eq!(style(2), CellStyle::SundayHeader);
    assert_eq!(style(3), CellStyle::Header);
    assert_ne!(style(1), style(2));
  }

  #[test]
  fn day_cells_follow_precedence() {
    let employees = [employee(1, "EMP001", "김간호"), employee(2, "EMP002", "이간호")];
    let mut pending = event(9, 1, EventType::AnnualLeave, 12);
    pending.status = EventStatus::Pending;
    let events = [
      event(1, 1, EventType::AnnualLeave, 4),
      event(2, 1, EventType::HalfDay, 4),
      event(3, 1, EventType::QuarterDay, 5),
      event(4, 1, EventType::Training, 6),
      event(5, 1, EventType::AnnualLeave, 2),
      pending,
    ];
    let report = VacationReport { month: march(), department: Some("내과"), employees: &employees, events: &events };
    let sheet = report.sheet();
    let first = FIRST_DATA_ROW;

    assert_eq!(sheet.text_at(DEPARTMENT_ROW, CODE_COL), Some("내과"));
    assert_eq!(sheet.text_at(first, CODE_COL), Some("EMP001"));
    assert_eq!(sheet.text_at(first, day_col(4)), Some("Y,Y/2"));
    assert_eq!(sheet.text_at(first, day_col(5)), Some("1/4"));
    assert_eq!(sheet.text_at(first, day_col(6)), Some(WORKDAY));
    assert_eq!(sheet.text_at(first, day_col(2)), Some("Y"));
    assert_eq!(sheet.text_at(first, day_col(12)), Some(WORKDAY));
    assert_eq!(sheet.text_at(first, day_col(1)), Some(WORKDAY));
    assert_eq!(sheet.text_at(first + 1, day_col(9)), Some(OFF));
    assert_eq!(sheet.text_at(first + 1, day_col(10)), Some(WORKDAY));

    let used = |row| sheet.cell(row, USED_COL).map(|c| c.value.clone());
    assert_eq!(used(first), Some(CellValue::Number(2.75)));
    assert_eq!(used(first + 1), Some(CellValue::Number(0.0)));
  }

  #[test]
  fn workbook_reads_back() {
    let employees = [employee(1, "EMP001", "김간호")];
    let events = [event(1, 1, EventType::HalfDay, 3)];
    let bytes = generate_vacation_report(&events, &employees, march()).unwrap();
    assert_eq!(&bytes[..2], b"PK");

    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).unwrap();
    let range = workbook.worksheet_range(SHEET_NAME).unwrap();
    let text = |row: Row, col: Col| match range.get_value((row, col as u32)) {
      Some(Data::String(s)) => s.clone(),
      other => panic!("expected text at ({row}, {col}), got {other:?}"),
    };

    assert_eq!(text(TITLE_ROW, 0), "2025년 3월 확정 근무표");
    assert_eq!(text(DEPARTMENT_ROW, CODE_COL), "전체");
    assert_eq!(text(HEADER_ROW, CODE_COL), "사번");
    assert_eq!(text(HEADER_ROW, day_col(1)), "1(토)");
    assert_eq!(text(FIRST_DATA_ROW, NAME_COL), "김간호");
    assert_eq!(text(FIRST_DATA_ROW, day_col(3)), "Y/2");
    assert_eq!(text(FIRST_DATA_ROW, day_col(2)), OFF);
    assert_eq!(
      range.get_value((FIRST_DATA_ROW, USED_COL as u32)),
      Some(&Data::Float(0.5))
    );
  }
}
