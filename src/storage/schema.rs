//! SQLite schema for the local store.

/// SQL schema for creating all local tables.
///
/// `date` columns store RFC-3339 UTC strings, which sort lexicographically in
/// chronological order. Single-row tables (`reminders`, `session`) are keyed
/// by a fixed constant so saves are plain upserts.
pub const SCHEMA: &str = r#"
-- Glucose readings table
CREATE TABLE IF NOT EXISTS readings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    value REAL NOT NULL,
    type TEXT NOT NULL,
    date TEXT NOT NULL,
    is_normal INTEGER NOT NULL,
    notes TEXT
);

CREATE INDEX IF NOT EXISTS idx_readings_date ON readings(date);
CREATE INDEX IF NOT EXISTS idx_readings_type ON readings(type);
CREATE INDEX IF NOT EXISTS idx_readings_value ON readings(value);

-- Reminder configuration (single row, fixed key)
CREATE TABLE IF NOT EXISTS reminders (
    id TEXT PRIMARY KEY CHECK (id = 'main'),
    config_json TEXT NOT NULL
);

-- Local user accounts table
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_users_name ON users(name);
CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);

-- Device session (single row, fixed key)
CREATE TABLE IF NOT EXISTS session (
    id TEXT PRIMARY KEY CHECK (id = 'current'),
    user_id TEXT NOT NULL,
    expires_at INTEGER NOT NULL
);
"#;

/// SQL for schema version tracking (migrations)
pub const SCHEMA_VERSION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);
"#;

/// Current schema version
pub const CURRENT_VERSION: i32 = 1;
