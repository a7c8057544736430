//! Work location vocabulary.

use serde::{Deserialize, Serialize};

/// Where a user works on a given day.
///
/// The variant names double as the form values, the stored values and the
/// spreadsheet cell text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    Homeoffice,
    Office,
    Customer,
}

impl Location {
    /// All locations in display order.
    pub const ALL: [Location; 3] = [Location::Homeoffice, Location::Office, Location::Customer];

    /// Parse a submitted or stored value. Anything unrecognized, including the
    /// empty string, means "no location".
    pub fn parse(value: &str) -> Option<Location> {
        match value {
            "Homeoffice" => Some(Location::Homeoffice),
            "Office" => Some(Location::Office),
            "Customer" => Some(Location::Customer),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Homeoffice => "Homeoffice",
            Location::Office => "Office",
            Location::Customer => "Customer",
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
