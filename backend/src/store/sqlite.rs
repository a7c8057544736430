use std::path::Path;
use std::sync::Mutex;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use worklocation_common::{Location, WeekDates};

use crate::models::selection::{WeekSelections, WorkSelection};
use crate::models::user::User;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// SQLite-backed store for users and work selections.
pub struct Store {
    conn: Mutex<Connection>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Username already taken: {0}")]
    UsernameTaken(String),
    #[error("User not found: {0}")]
    UserNotFound(String),
}

impl Store {
    pub fn open(database_url: &str) -> Result<Self, StoreError> {
        // Parse sqlite: prefix if present
        let path = database_url.strip_prefix("sqlite:").unwrap_or(database_url);

        if path != ":memory:" {
            if let Some(parent) = Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .map_err(|e| StoreError::IoError(e.to_string()))?;
                }
            }
        }

        let conn = Connection::open(path)
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;

        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        ).map_err(|e| StoreError::DatabaseError(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS work_selections (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                date TEXT NOT NULL,
                iso_year INTEGER NOT NULL,
                iso_week INTEGER NOT NULL,
                location TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE (user_id, date),
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            )",
            [],
        ).map_err(|e| StoreError::DatabaseError(e.to_string()))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_work_selections_week
             ON work_selections(user_id, iso_year, iso_week)",
            [],
        ).map_err(|e| StoreError::DatabaseError(e.to_string()))?;

        tracing::info!("Store initialized with database: {}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a user. Fails with `UsernameTaken` if the name exists.
    pub fn create_user(&self, username: &str, password_hash: &str) -> Result<User, StoreError> {
        let conn = self.conn.lock()
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;

        let now = Utc::now();
        let result = conn.execute(
            "INSERT INTO users (username, password_hash, created_at) VALUES (?1, ?2, ?3)",
            params![username, password_hash, now.to_rfc3339()],
        );

        match result {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(err, _)) if err.code == ErrorCode::ConstraintViolation => {
                return Err(StoreError::UsernameTaken(username.to_string()));
            }
            Err(e) => return Err(StoreError::DatabaseError(e.to_string())),
        }

        tracing::info!("Created new user: {}", username);

        Ok(User {
            id: conn.last_insert_rowid(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
        })
    }

    pub fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let conn = self.conn.lock()
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;

        conn.query_row(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = ?1",
            params![username],
            user_from_row,
        )
        .optional()
        .map_err(|e| StoreError::DatabaseError(e.to_string()))
    }

    pub fn find_user_by_id(&self, user_id: i64) -> Result<Option<User>, StoreError> {
        let conn = self.conn.lock()
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;

        conn.query_row(
            "SELECT id, username, password_hash, created_at FROM users WHERE id = ?1",
            params![user_id],
            user_from_row,
        )
        .optional()
        .map_err(|e| StoreError::DatabaseError(e.to_string()))
    }

    /// Replace the password hash of an existing user.
    pub fn set_password(&self, username: &str, password_hash: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock()
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;

        let updated = conn.execute(
            "UPDATE users SET password_hash = ?1 WHERE username = ?2",
            params![password_hash, username],
        ).map_err(|e| StoreError::DatabaseError(e.to_string()))?;

        if updated == 0 {
            return Err(StoreError::UserNotFound(username.to_string()));
        }

        tracing::info!("Updated password for user: {}", username);
        Ok(())
    }

    /// Delete a user together with all stored selections.
    pub fn delete_user(&self, username: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock()
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;

        let deleted = conn.execute(
            "DELETE FROM users WHERE username = ?1",
            params![username],
        ).map_err(|e| StoreError::DatabaseError(e.to_string()))?;

        if deleted == 0 {
            return Err(StoreError::UserNotFound(username.to_string()));
        }

        tracing::info!("Deleted user: {}", username);
        Ok(())
    }

    /// Persist a week of selections for a user in one transaction.
    ///
    /// Days with a location are upserted on `(user_id, date)`; days without
    /// one have any stored row removed.
    pub fn save_week(
        &self,
        user_id: i64,
        week: &WeekDates,
        selections: &WeekSelections,
    ) -> Result<(), StoreError> {
        let mut conn = self.conn.lock()
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;

        let tx = conn.transaction()
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;

        let now = Utc::now().to_rfc3339();
        for (day, selection) in week.days.iter().zip(selections) {
            let date = day.format(DATE_FORMAT).to_string();
            match selection {
                Some(location) => {
                    tx.execute(
                        "INSERT INTO work_selections (user_id, date, iso_year, iso_week, location, updated_at)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                         ON CONFLICT(user_id, date) DO UPDATE SET
                            iso_year = excluded.iso_year,
                            iso_week = excluded.iso_week,
                            location = excluded.location,
                            updated_at = excluded.updated_at",
                        params![user_id, date, week.year, week.week, location.as_str(), now],
                    ).map_err(|e| StoreError::DatabaseError(e.to_string()))?;
                }
                None => {
                    tx.execute(
                        "DELETE FROM work_selections WHERE user_id = ?1 AND date = ?2",
                        params![user_id, date],
                    ).map_err(|e| StoreError::DatabaseError(e.to_string()))?;
                }
            }
        }

        tx.commit()
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;

        tracing::debug!("Saved week {}-W{:02} for user {}", week.year, week.week, user_id);
        Ok(())
    }

    /// Stored rows for the days of `week`, ordered by date.
    pub fn selection_rows_for_week(
        &self,
        user_id: i64,
        week: &WeekDates,
    ) -> Result<Vec<WorkSelection>, StoreError> {
        let conn = self.conn.lock()
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;

        let mut stmt = conn.prepare(
            "SELECT user_id, date, iso_year, iso_week, location, updated_at
             FROM work_selections
             WHERE user_id = ?1 AND iso_year = ?2 AND iso_week = ?3",
        ).map_err(|e| StoreError::DatabaseError(e.to_string()))?;

        let rows = stmt.query_map(
            params![user_id, week.year, week.week],
            |row| Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i32>(2)?,
                row.get::<_, u32>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            )),
        ).map_err(|e| StoreError::DatabaseError(e.to_string()))?;

        // Stored dates are matched against the week's own days. Dates past
        // year 9999 carry a sign and do not sort or parse like plain ISO dates.
        let day_keys: Vec<(String, NaiveDate)> = week.days
            .iter()
            .map(|day| (day.format(DATE_FORMAT).to_string(), *day))
            .collect();

        let mut selections = Vec::new();
        for row in rows {
            let (user_id, date, iso_year, iso_week, location, updated_at) = row
                .map_err(|e| StoreError::DatabaseError(e.to_string()))?;

            let Some(date) = day_keys.iter().find(|(key, _)| *key == date).map(|(_, day)| *day) else {
                tracing::warn!("Skipping selection with date {} outside {}-W{:02}", date, iso_year, iso_week);
                continue;
            };
            // Unknown stored values count as "no location"
            let Some(location) = Location::parse(&location) else {
                continue;
            };

            selections.push(WorkSelection {
                user_id,
                date,
                iso_year,
                iso_week,
                location,
                updated_at: parse_timestamp(&updated_at),
            });
        }

        selections.sort_by_key(|s| s.date);
        Ok(selections)
    }

    /// Selections for each day of `week`, Monday first.
    pub fn selections_for_week(
        &self,
        user_id: i64,
        week: &WeekDates,
    ) -> Result<WeekSelections, StoreError> {
        let mut selections: WeekSelections = [None; 7];
        for row in self.selection_rows_for_week(user_id, week)? {
            if let Some(index) = week.days.iter().position(|d| *d == row.date) {
                selections[index] = Some(row.location);
            }
        }
        Ok(selections)
    }
}

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let created_at: String = row.get(3)?;
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        created_at: parse_timestamp(&created_at),
    })
}

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
