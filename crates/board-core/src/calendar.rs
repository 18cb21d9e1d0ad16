//! Calendar events (leave, training…) and the [`YearMonth`] window they are
//! queried and reported by.

use chrono::{Datelike, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::{Error, Result};

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventType {
  AnnualLeave,
  HalfDay,
  QuarterDay,
  Training,
  Other,
}

impl EventType {
  /// Cell code used in the vacation report; `None` for non-leave types.
  pub fn leave_code(self) -> Option<&'static str> {
    match self {
      Self::AnnualLeave => Some("Y"),
      Self::HalfDay => Some("Y/2"),
      Self::QuarterDay => Some("1/4"),
      Self::Training | Self::Other => None,
    }
  }

  /// Fraction of a leave day consumed.
  pub fn leave_days(self) -> f64 {
    match self {
      Self::AnnualLeave => 1.0,
      Self::HalfDay => 0.5,
      Self::QuarterDay => 0.25,
      Self::Training | Self::Other => 0.0,
    }
  }

  pub fn is_leave(self) -> bool { self.leave_code().is_some() }
}

/// No approval workflow exists yet; events are created approved.
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
pub enum EventStatus {
  Pending,
  #[default]
  Approved,
  Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
  pub id:            i64,
  pub title:         String,
  #[serde(rename = "type")]
  pub kind:          EventType,
  pub date:          NaiveDate,
  pub description:   Option<String>,
  pub employee_id:   i64,
  pub department_id: i64,
  pub status:        EventStatus,
}

/// Input to [`crate::store::BoardStore::insert_event`].
#[derive(Debug, Clone)]
pub struct NewEvent {
  pub title:         String,
  pub kind:          EventType,
  pub date:          NaiveDate,
  pub description:   Option<String>,
  pub employee_id:   i64,
  pub department_id: i64,
  pub status:        EventStatus,
}

/// Partial update; `None` leaves a column untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPatch {
  pub title:       Option<String>,
  #[serde(rename = "type")]
  pub kind:        Option<EventType>,
  pub date:        Option<NaiveDate>,
  pub description: Option<String>,
  pub status:      Option<EventStatus>,
}

/// Filters for [`crate::store::BoardStore::list_events`].
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
  pub employee_id:   Option<i64>,
  pub department_id: Option<i64>,
  pub month:         Option<YearMonth>,
  /// Empty means every type.
  pub kinds:         Vec<EventType>,
}

// ─── YearMonth ───────────────────────────────────────────────────────────────

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
  year:  i32,
  month: u32,
}

impl YearMonth {
  pub fn new(year: i32, month: u32) -> Result<Self> {
    if !(1..=12).contains(&month) {
      return Err(Error::validation(format!("month must be 1-12, got {month}")));
    }
    if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
      return Err(Error::validation(format!("year {year} is out of range")));
    }
    Ok(Self { year, month })
  }

  pub fn of(date: NaiveDate) -> Self {
    Self { year: date.year(), month: date.month() }
  }

  pub fn year(self) -> i32 { self.year }

  pub fn month(self) -> u32 { self.month }

  pub fn first_day(self) -> NaiveDate {
    NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
  }

  pub fn last_day(self) -> NaiveDate {
    self
      .first_day()
      .checked_add_months(Months::new(1))
      .and_then(|d| d.pred_opt())
      .unwrap_or(NaiveDate::MAX)
  }

  /// 28 to 31.
  pub fn day_count(self) -> u32 { self.last_day().day() }

  /// Every date in the month, in order.
  pub fn days(self) -> impl Iterator<Item = NaiveDate> {
    let last = self.last_day();
    self.first_day().iter_days().take_while(move |d| *d <= last)
  }

  pub fn contains(self, date: NaiveDate) -> bool {
    date.year() == self.year && date.month() == self.month
  }
}

impl std::fmt::Display for YearMonth {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}-{:02}", self.year, self.month)
  }
}

/// One-character Korean weekday name, as used in report headers.
pub fn weekday_short_ko(day: Weekday) -> &'static str {
  match day {
    Weekday::Sun => "일",
    Weekday::Mon => "월",
    Weekday::Tue => "화",
    Weekday::Wed => "수",
    Weekday::Thu => "목",
    Weekday::Fri => "금",
    Weekday::Sat => "토",
  }
}
