//! Local store operations using rusqlite.

use crate::auth::{StoredSession, User};
use crate::glucose::types::{
    GlucoseReading, GlucoseType, NewReading, ReadingUpdate, RemindersConfig,
};
use crate::storage::schema::{CURRENT_VERSION, SCHEMA, SCHEMA_VERSION_TABLE};
use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Session lifetime before a stored session is treated as absent.
const SESSION_TTL_DAYS: i64 = 7;

/// Fixed key for the single reminder-config row.
const REMINDERS_KEY: &str = "main";

/// Fixed key for the single session row.
const SESSION_KEY: &str = "current";

/// Local store wrapper for SQLite operations.
///
/// Faults propagate as [`DatabaseError`]; there is no retry at this layer.
pub struct Database {
    conn: Connection,
}

/// Local store errors.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("IO error: {0}")]
    IoError(String),
}

impl Database {
    /// Open or create a database at the given path.
    pub fn open(path: &PathBuf) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DatabaseError::IoError(e.to_string()))?;
        }

        let conn =
            Connection::open(path).map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        let db = Self { conn };
        db.initialize()?;

        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        let db = Self { conn };
        db.initialize()?;

        Ok(db)
    }

    /// Initialize the database schema.
    fn initialize(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(SCHEMA_VERSION_TABLE)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

        let current_version = self.get_schema_version()?;

        if current_version < CURRENT_VERSION {
            self.migrate(current_version)?;
        }

        Ok(())
    }

    /// Get the current schema version.
    fn get_schema_version(&self) -> Result<i32, DatabaseError> {
        let result: SqliteResult<i32> = self.conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        );

        match result {
            Ok(version) => Ok(version),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
            Err(e) => Err(DatabaseError::QueryFailed(e.to_string())),
        }
    }

    /// Run database migrations.
    fn migrate(&self, from_version: i32) -> Result<(), DatabaseError> {
        if from_version < 1 {
            self.conn
                .execute_batch(SCHEMA)
                .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

            self.conn
                .execute(
                    "INSERT INTO schema_version (version, applied_at) VALUES (?, datetime('now'))",
                    [CURRENT_VERSION],
                )
                .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;

            tracing::info!("Database migrated to version {}", CURRENT_VERSION);
        }

        Ok(())
    }

    // ========== Glucose Reading CRUD ==========

    /// Insert a new reading and return its assigned id.
    pub fn add_reading(&self, reading: &NewReading) -> Result<i64, DatabaseError> {
        self.conn
            .execute(
                "INSERT INTO readings (value, type, date, is_normal, notes)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    reading.value,
                    reading.reading_type.as_str(),
                    reading.date.to_rfc3339(),
                    reading.is_normal,
                    reading.notes,
                ],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(self.conn.last_insert_rowid())
    }

    /// Get all readings, most recent first.
    pub fn get_all_readings(&self) -> Result<Vec<GlucoseReading>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, value, type, date, is_normal, notes
                 FROM readings ORDER BY date DESC",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map([], map_reading_row)
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut readings = Vec::new();
        for row in rows {
            let row = row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            readings.push(row.into_reading()?);
        }

        Ok(readings)
    }

    /// Get a single reading by id.
    pub fn get_reading(&self, id: i64) -> Result<Option<GlucoseReading>, DatabaseError> {
        let result = self
            .conn
            .query_row(
                "SELECT id, value, type, date, is_normal, notes
                 FROM readings WHERE id = ?1",
                params![id],
                map_reading_row,
            )
            .optional()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        match result {
            Some(row) => Ok(Some(row.into_reading()?)),
            None => Ok(None),
        }
    }

    /// Get readings within an inclusive date range, ascending.
    pub fn get_readings_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<GlucoseReading>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, value, type, date, is_normal, notes
                 FROM readings WHERE date >= ?1 AND date <= ?2 ORDER BY date ASC",
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let rows = stmt
            .query_map(
                params![start.to_rfc3339(), end.to_rfc3339()],
                map_reading_row,
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let mut readings = Vec::new();
        for row in rows {
            let row = row.map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            readings.push(row.into_reading()?);
        }

        Ok(readings)
    }

    /// Merge the supplied fields into a stored reading.
    ///
    /// Does not recompute `is_normal`; the caller re-derives it before calling
    /// when `value` or `type` changed. Absent ids are a no-op.
    pub fn update_reading(&self, id: i64, updates: &ReadingUpdate) -> Result<(), DatabaseError> {
        let Some(existing) = self.get_reading(id)? else {
            return Ok(());
        };

        let value = updates.value.unwrap_or(existing.value);
        let reading_type = updates.reading_type.unwrap_or(existing.reading_type);
        let date = updates.date.unwrap_or(existing.date);
        let is_normal = updates.is_normal.unwrap_or(existing.is_normal);
        let notes = match &updates.notes {
            Some(notes) => notes.clone(),
            None => existing.notes,
        };

        self.conn
            .execute(
                "UPDATE readings SET value = ?1, type = ?2, date = ?3, is_normal = ?4, notes = ?5
                 WHERE id = ?6",
                params![
                    value,
                    reading_type.as_str(),
                    date.to_rfc3339(),
                    is_normal,
                    notes,
                    id,
                ],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    /// Delete a reading by id. No-op if absent.
    pub fn delete_reading(&self, id: i64) -> Result<(), DatabaseError> {
        self.conn
            .execute("DELETE FROM readings WHERE id = ?1", params![id])
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    // ========== Reminder Configuration ==========

    /// Upsert the single reminder configuration row.
    pub fn save_reminders_config(&self, config: &RemindersConfig) -> Result<(), DatabaseError> {
        let config_json = serde_json::to_string(config)
            .map_err(|e| DatabaseError::SerializationError(e.to_string()))?;

        self.conn
            .execute(
                "INSERT INTO reminders (id, config_json) VALUES (?1, ?2)
                 ON CONFLICT(id) DO UPDATE SET config_json = excluded.config_json",
                params![REMINDERS_KEY, config_json],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    /// Get the saved reminder configuration, if any.
    pub fn get_reminders_config(&self) -> Result<Option<RemindersConfig>, DatabaseError> {
        let config_json: Option<String> = self
            .conn
            .query_row(
                "SELECT config_json FROM reminders WHERE id = ?1",
                params![REMINDERS_KEY],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        match config_json {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| DatabaseError::SerializationError(e.to_string())),
            None => Ok(None),
        }
    }

    // ========== User Accounts ==========

    /// Create a local user and return the generated id.
    ///
    /// Trims the name and lowercases the email before storing.
    pub fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<String, DatabaseError> {
        let user_id = Uuid::new_v4().to_string();

        self.conn
            .execute(
                "INSERT INTO users (id, name, email, password_hash, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    user_id,
                    name.trim(),
                    email.trim().to_lowercase(),
                    password_hash,
                    Utc::now().to_rfc3339(),
                ],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(user_id)
    }

    /// Look up a user by display name.
    pub fn get_user_by_name(&self, name: &str) -> Result<Option<User>, DatabaseError> {
        self.query_user("SELECT id, name, email, password_hash, created_at FROM users WHERE name = ?1", name.trim())
    }

    /// Look up a user by email.
    pub fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        self.query_user(
            "SELECT id, name, email, password_hash, created_at FROM users WHERE email = ?1",
            &email.trim().to_lowercase(),
        )
    }

    /// Look up a user by id.
    pub fn get_user_by_id(&self, id: &str) -> Result<Option<User>, DatabaseError> {
        self.query_user(
            "SELECT id, name, email, password_hash, created_at FROM users WHERE id = ?1",
            id,
        )
    }

    fn query_user(&self, sql: &str, param: &str) -> Result<Option<User>, DatabaseError> {
        let result = self
            .conn
            .query_row(sql, params![param], |row| {
                Ok(UserRow {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    email: row.get(2)?,
                    password_hash: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })
            .optional()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        match result {
            Some(row) => Ok(Some(row.into_user()?)),
            None => Ok(None),
        }
    }

    // ========== Device Session ==========

    /// Save the current session for a user, expiring 7 days out.
    pub fn save_session(&self, user_id: &str) -> Result<(), DatabaseError> {
        let expires_at = (Utc::now() + Duration::days(SESSION_TTL_DAYS)).timestamp_millis();

        self.conn
            .execute(
                "INSERT INTO session (id, user_id, expires_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET
                     user_id = excluded.user_id,
                     expires_at = excluded.expires_at",
                params![SESSION_KEY, user_id, expires_at],
            )
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    /// Get the current session, deleting it transparently if expired.
    pub fn get_session(&self) -> Result<Option<StoredSession>, DatabaseError> {
        let session = self
            .conn
            .query_row(
                "SELECT user_id, expires_at FROM session WHERE id = ?1",
                params![SESSION_KEY],
                |row| {
                    Ok(StoredSession {
                        user_id: row.get(0)?,
                        expires_at: row.get(1)?,
                    })
                },
            )
            .optional()
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        let Some(session) = session else {
            return Ok(None);
        };

        if session.is_expired(Utc::now().timestamp_millis()) {
            self.clear_session()?;
            return Ok(None);
        }

        Ok(Some(session))
    }

    /// Delete the current session, if any.
    pub fn clear_session(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute("DELETE FROM session WHERE id = ?1", params![SESSION_KEY])
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    /// Sabotage hook for failure-path tests: every subsequent reading query
    /// fails with [`DatabaseError::QueryFailed`].
    #[cfg(test)]
    pub(crate) fn drop_readings_table(&self) {
        self.conn.execute_batch("DROP TABLE readings").unwrap();
    }
}

/// Raw reading row, converted after the statement borrow ends.
struct ReadingRow {
    id: i64,
    value: f64,
    reading_type: String,
    date: String,
    is_normal: bool,
    notes: Option<String>,
}

fn map_reading_row(row: &rusqlite::Row) -> rusqlite::Result<ReadingRow> {
    Ok(ReadingRow {
        id: row.get(0)?,
        value: row.get(1)?,
        reading_type: row.get(2)?,
        date: row.get(3)?,
        is_normal: row.get(4)?,
        notes: row.get(5)?,
    })
}

impl ReadingRow {
    fn into_reading(self) -> Result<GlucoseReading, DatabaseError> {
        let reading_type = GlucoseType::from_str(&self.reading_type)
            .map_err(|e| DatabaseError::SerializationError(e.to_string()))?;
        let date = DateTime::parse_from_rfc3339(&self.date)
            .map_err(|e| DatabaseError::SerializationError(e.to_string()))?
            .with_timezone(&Utc);

        Ok(GlucoseReading {
            id: Some(self.id),
            value: self.value,
            reading_type,
            date,
            is_normal: self.is_normal,
            notes: self.notes,
        })
    }
}

struct UserRow {
    id: String,
    name: String,
    email: String,
    password_hash: String,
    created_at: String,
}

impl UserRow {
    fn into_user(self) -> Result<User, DatabaseError> {
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| DatabaseError::SerializationError(e.to_string()))?
            .with_timezone(&Utc);

        Ok(User {
            id: self.id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            created_at,
        })
    }
}
