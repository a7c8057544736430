//! Work location planner common types
//!
//! ISO week arithmetic and the work location vocabulary shared by the backend
//! and its tests.

pub mod calendar;
pub mod location;

pub use calendar::{
    current_iso_week, get_week_dates, iso_last_week, parse_week_number, weekday_name, CalendarError, IsoWeek,
    WeekDates, MAX_YEAR, MIN_YEAR, WEEKDAY_NAMES,
};
pub use location::Location;
