use chrono::{DateTime, Utc};
use serde::Serialize;

/// Local account allowed to record work locations.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    /// Login name, unique across users. Also used as the export's `Name` column.
    pub username: String,
    /// Argon2id PHC string
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}
