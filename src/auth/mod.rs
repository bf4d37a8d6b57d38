//! Local account records and password hashing.
//!
//! Login/registration orchestration and session context live in the
//! application shell; this module only defines the persisted shapes and the
//! hashing used by the local store.

pub mod password;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use password::{hash_password, verify_password};

/// A locally registered user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    /// SHA-256 hex digest, never the plain password.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// The single persisted device session.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSession {
    pub user_id: String,
    /// Unix milliseconds; sessions past this instant are treated as absent.
    pub expires_at: i64,
}

impl StoredSession {
    /// Whether this session has expired as of `now` (unix milliseconds).
    pub fn is_expired(&self, now_millis: i64) -> bool {
        self.expires_at < now_millis
    }
}
