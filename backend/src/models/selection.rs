use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use worklocation_common::Location;

/// One stored day of a user's week. Unique per `(user_id, date)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkSelection {
    pub user_id: i64,
    pub date: NaiveDate,
    pub iso_year: i32,
    pub iso_week: u32,
    pub location: Location,
    pub updated_at: DateTime<Utc>,
}

/// Per-day selections of one week, Monday first. `None` means no location.
pub type WeekSelections = [Option<Location>; 7];

/// Pick the selection for each day from submitted form fields named
/// `loc_<ISO date>`. Missing or unknown values become `None`.
pub fn selections_from_form<F>(days: &[NaiveDate; 7], mut field: F) -> WeekSelections
where
    F: FnMut(&str) -> Option<String>,
{
    let mut selections: WeekSelections = [None; 7];
    for (slot, day) in selections.iter_mut().zip(days) {
        *slot = field(&location_field_name(*day))
            .as_deref()
            .and_then(Location::parse);
    }
    selections
}

/// Form field name carrying the location of `day`.
pub fn location_field_name(day: NaiveDate) -> String {
    format!("loc_{}", day.format("%Y-%m-%d"))
}
