//! ISO-8601 week arithmetic.
//!
//! Week 1 of an ISO year is the week containing that year's first Thursday,
//! so December 28 always falls into the last week of its ISO year.

use std::num::IntErrorKind;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Smallest calendar year accepted by the planner.
pub const MIN_YEAR: i32 = 1;
/// Largest calendar year accepted by the planner.
pub const MAX_YEAR: i32 = 9999;

/// German weekday names, Monday first.
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Montag",
    "Dienstag",
    "Mittwoch",
    "Donnerstag",
    "Freitag",
    "Samstag",
    "Sonntag",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    #[error("Year {0} is outside the supported range")]
    YearOutOfRange(i32),
}

/// A normalized ISO year/week pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IsoWeek {
    pub year: i32,
    pub week: u32,
}

impl IsoWeek {
    /// The week before this one, rolling over into the previous ISO year.
    pub fn previous(&self) -> Option<IsoWeek> {
        if self.week > 1 {
            return Some(IsoWeek { year: self.year, week: self.week - 1 });
        }
        let year = self.year - 1;
        let week = iso_last_week(year).ok()?;
        Some(IsoWeek { year, week })
    }

    /// The week after this one, rolling over into the next ISO year.
    pub fn next(&self) -> Option<IsoWeek> {
        let last = iso_last_week(self.year).ok()?;
        if self.week < last {
            return Some(IsoWeek { year: self.year, week: self.week + 1 });
        }
        let year = self.year + 1;
        check_year(year).ok()?;
        Some(IsoWeek { year, week: 1 })
    }
}

/// The seven dates of one ISO week, Monday through Sunday.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekDates {
    pub year: i32,
    /// Week number after clamping into the valid range of `year`.
    pub week: u32,
    pub days: [NaiveDate; 7],
}

impl WeekDates {
    pub fn iso_week(&self) -> IsoWeek {
        IsoWeek { year: self.year, week: self.week }
    }

    pub fn monday(&self) -> NaiveDate {
        self.days[0]
    }

    pub fn sunday(&self) -> NaiveDate {
        self.days[6]
    }

    /// Days paired with their German weekday names.
    pub fn named_days(&self) -> impl Iterator<Item = (NaiveDate, &'static str)> + '_ {
        self.days.iter().copied().zip(WEEKDAY_NAMES)
    }
}

fn check_year(year: i32) -> Result<(), CalendarError> {
    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
        Ok(())
    } else {
        Err(CalendarError::YearOutOfRange(year))
    }
}

/// Number of the last ISO week of `year` (52 or 53).
pub fn iso_last_week(year: i32) -> Result<u32, CalendarError> {
    check_year(year)?;
    let dec_28 = NaiveDate::from_ymd_opt(year, 12, 28).ok_or(CalendarError::YearOutOfRange(year))?;
    Ok(dec_28.iso_week().week())
}

/// Return the dates of ISO week `week` of `year`.
///
/// Out-of-range weeks are clamped into `[1, iso_last_week(year)]` instead of
/// being rejected; the normalized week is reported back in the result.
pub fn get_week_dates(year: i32, week: i64) -> Result<WeekDates, CalendarError> {
    let last = iso_last_week(year)?;
    let week = week.clamp(1, i64::from(last)) as u32;

    let monday = NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)
        .ok_or(CalendarError::YearOutOfRange(year))?;

    let mut days = [monday; 7];
    for (offset, day) in days.iter_mut().enumerate().skip(1) {
        *day = monday
            .checked_add_days(Days::new(offset as u64))
            .ok_or(CalendarError::YearOutOfRange(year))?;
    }

    Ok(WeekDates { year, week, days })
}

/// Parse a submitted week number.
///
/// Any integer is accepted; values beyond `i64` saturate so that
/// `get_week_dates` clamps them like every other out-of-range week.
/// Returns `None` for text that is not an integer.
pub fn parse_week_number(value: &str) -> Option<i64> {
    match value.trim().parse::<i64>() {
        Ok(week) => Some(week),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Some(i64::MAX),
            IntErrorKind::NegOverflow => Some(i64::MIN),
            _ => None,
        },
    }
}

/// The ISO week containing `today`.
pub fn current_iso_week(today: NaiveDate) -> IsoWeek {
    let iso = today.iso_week();
    IsoWeek { year: iso.year(), week: iso.week() }
}

/// German weekday name for a Monday-based index, if in range.
pub fn weekday_name(index: usize) -> Option<&'static str> {
    WEEKDAY_NAMES.get(index).copied()
}
