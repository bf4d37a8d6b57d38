//! Remote store CRUD against the Supabase REST (PostgREST) API.
//!
//! Every operation resolves the current authenticated user first and scopes
//! its rows by `user_id`; the server enforces the same scoping through
//! row-level policies. Absence of a session is signaled as
//! [`RemoteError::NotAuthenticated`] so callers can fall back to the local
//! store instead of surfacing it.

use crate::glucose::types::{GlucoseReading, GlucoseType, NewReading, ReadingUpdate, RemindersConfig};
use crate::remote::config::RemoteConfig;
use crate::remote::session::{AuthSession, SessionProvider};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;

/// Request timeout for data operations.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Bound on the authoritative session check; past this the operation fails
/// rather than hangs, so fallback can proceed.
const SESSION_RESOLVE_TIMEOUT: Duration = Duration::from_secs(5);

/// PostgREST code for "no rows found" on a single-object request.
const NO_ROWS_CODE: &str = "PGRST116";

/// Remote store errors.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// No authenticated user could be resolved. Expected and non-fatal;
    /// callers fall back to the local store.
    #[error("Not authenticated")]
    NotAuthenticated,
    /// The backend rejected the operation for a non-auth reason.
    #[error("Backend error {code}: {message}")]
    Backend { code: String, message: String },
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// The authoritative session check exceeded its bounded wait.
    #[error("Timed out resolving session")]
    SessionTimeout,
}

/// Client for the hosted backend, scoped to the authenticated user.
pub struct RemoteStore {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    session: Arc<dyn SessionProvider>,
}

impl RemoteStore {
    /// Create a store for the given backend and session provider.
    pub fn new(config: RemoteConfig, session: Arc<dyn SessionProvider>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key,
            session,
        }
    }

    /// Resolve the current session: cached lookup first, then the
    /// authoritative check under a bounded wait.
    async fn current_session(&self) -> Result<AuthSession, RemoteError> {
        if let Some(session) = self.session.cached_session().await {
            return Ok(session);
        }

        match timeout(SESSION_RESOLVE_TIMEOUT, self.session.resolve_session()).await {
            Err(_) => Err(RemoteError::SessionTimeout),
            Ok(Err(e)) => Err(e),
            Ok(Ok(None)) => Err(RemoteError::NotAuthenticated),
            Ok(Ok(Some(session))) => Ok(session),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authed(&self, request: reqwest::RequestBuilder, session: &AuthSession) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
    }

    /// Map a non-success response to a backend error.
    async fn backend_error(response: reqwest::Response) -> RemoteError {
        let status = response.status();
        match response.json::<PostgrestError>().await {
            Ok(err) => RemoteError::Backend {
                code: err.code.unwrap_or_else(|| status.as_u16().to_string()),
                message: err.message.unwrap_or_else(|| "unknown backend error".to_string()),
            },
            Err(_) => RemoteError::Backend {
                code: status.as_u16().to_string(),
                message: format!("backend returned status {status}"),
            },
        }
    }

    // ========== Glucose Readings ==========

    /// Insert a reading for the current user and return the generated id.
    pub async fn add_reading(&self, reading: &NewReading) -> Result<i64, RemoteError> {
        let session = self.current_session().await?;

        let row = InsertReadingRow {
            user_id: &session.user_id,
            value: reading.value,
            reading_type: reading.reading_type,
            date: reading.date.to_rfc3339(),
            is_normal: reading.is_normal,
            notes: reading.notes.as_deref(),
        };

        let response = self
            .authed(self.http.post(self.table_url("glucose_readings")), &session)
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await
            .map_err(|e| RemoteError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::backend_error(response).await);
        }

        let inserted: Vec<InsertedId> = response
            .json()
            .await
            .map_err(|e| RemoteError::Serialization(e.to_string()))?;

        inserted
            .first()
            .map(|r| r.id)
            .ok_or_else(|| RemoteError::Serialization("insert returned no row".to_string()))
    }

    /// Get all readings for the current user, most recent first.
    ///
    /// Rows that fail to convert are skipped with a warning rather than
    /// aborting the read; the backend may contain rows in an unexpected shape.
    pub async fn get_all_readings(&self) -> Result<Vec<GlucoseReading>, RemoteError> {
        let session = self.current_session().await?;

        let user_filter = format!("eq.{}", session.user_id);
        let response = self
            .authed(self.http.get(self.table_url("glucose_readings")), &session)
            .query(&[
                ("select", "*"),
                ("user_id", user_filter.as_str()),
                ("order", "date.desc"),
            ])
            .send()
            .await
            .map_err(|e| RemoteError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::backend_error(response).await);
        }

        let rows: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| RemoteError::Serialization(e.to_string()))?;

        Ok(Self::convert_rows(rows))
    }

    /// Get readings within an inclusive date range, most recent first.
    pub async fn get_readings_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<GlucoseReading>, RemoteError> {
        let session = self.current_session().await?;

        let user_filter = format!("eq.{}", session.user_id);
        let start_filter = format!("gte.{}", start.to_rfc3339());
        let end_filter = format!("lte.{}", end.to_rfc3339());
        let response = self
            .authed(self.http.get(self.table_url("glucose_readings")), &session)
            .query(&[
                ("select", "*"),
                ("user_id", user_filter.as_str()),
                ("date", start_filter.as_str()),
                ("date", end_filter.as_str()),
                ("order", "date.desc"),
            ])
            .send()
            .await
            .map_err(|e| RemoteError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::backend_error(response).await);
        }

        let rows: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| RemoteError::Serialization(e.to_string()))?;

        Ok(Self::convert_rows(rows))
    }

    fn convert_rows(rows: Vec<serde_json::Value>) -> Vec<GlucoseReading> {
        let mut readings = Vec::with_capacity(rows.len());
        for row in rows {
            match serde_json::from_value::<ReadingRow>(row.clone())
                .map_err(|e| e.to_string())
                .and_then(|r| r.into_reading())
            {
                Ok(reading) => readings.push(reading),
                Err(e) => {
                    tracing::warn!("Skipping malformed backend row: {e} ({row})");
                }
            }
        }
        readings
    }

    /// Delete a reading owned by the current user.
    pub async fn delete_reading(&self, id: i64) -> Result<(), RemoteError> {
        let session = self.current_session().await?;

        let response = self
            .authed(self.http.delete(self.table_url("glucose_readings")), &session)
            .query(&[
                ("id", &format!("eq.{id}")),
                ("user_id", &format!("eq.{}", session.user_id)),
            ])
            .send()
            .await
            .map_err(|e| RemoteError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::backend_error(response).await);
        }

        Ok(())
    }

    /// Patch the supplied fields on a reading owned by the current user.
    pub async fn update_reading(&self, id: i64, updates: &ReadingUpdate) -> Result<(), RemoteError> {
        let session = self.current_session().await?;

        let mut payload = serde_json::Map::new();
        if let Some(value) = updates.value {
            payload.insert("value".to_string(), value.into());
        }
        if let Some(reading_type) = updates.reading_type {
            payload.insert("type".to_string(), reading_type.as_str().into());
        }
        if let Some(date) = updates.date {
            payload.insert("date".to_string(), date.to_rfc3339().into());
        }
        if let Some(is_normal) = updates.is_normal {
            payload.insert("is_normal".to_string(), is_normal.into());
        }
        if let Some(notes) = &updates.notes {
            payload.insert(
                "notes".to_string(),
                notes.clone().map_or(serde_json::Value::Null, Into::into),
            );
        }

        if payload.is_empty() {
            return Ok(());
        }

        let response = self
            .authed(self.http.patch(self.table_url("glucose_readings")), &session)
            .query(&[
                ("id", &format!("eq.{id}")),
                ("user_id", &format!("eq.{}", session.user_id)),
            ])
            .json(&payload)
            .send()
            .await
            .map_err(|e| RemoteError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::backend_error(response).await);
        }

        Ok(())
    }

    // ========== Reminder Configuration ==========

    /// Upsert the full reminder configuration for the current user.
    pub async fn save_reminders_config(&self, config: &RemindersConfig) -> Result<(), RemoteError> {
        let session = self.current_session().await?;

        let row = ReminderConfigRow {
            user_id: &session.user_id,
            config,
        };

        let response = self
            .authed(self.http.post(self.table_url("reminders_config")), &session)
            .query(&[("on_conflict", "user_id")])
            .header("Prefer", "resolution=merge-duplicates")
            .json(&row)
            .send()
            .await
            .map_err(|e| RemoteError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::backend_error(response).await);
        }

        Ok(())
    }

    /// Get the stored reminder configuration, if any.
    ///
    /// The backend's "no rows found" signal is a normal "no configuration
    /// yet" result, not an error.
    pub async fn get_reminders_config(&self) -> Result<Option<RemindersConfig>, RemoteError> {
        let session = self.current_session().await?;

        let user_filter = format!("eq.{}", session.user_id);
        let response = self
            .authed(self.http.get(self.table_url("reminders_config")), &session)
            .query(&[
                ("select", "config"),
                ("user_id", user_filter.as_str()),
            ])
            .header("Accept", "application/vnd.pgrst.object+json")
            .send()
            .await
            .map_err(|e| RemoteError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let error = Self::backend_error(response).await;
            if let RemoteError::Backend { code, .. } = &error {
                if code == NO_ROWS_CODE {
                    return Ok(None);
                }
            }
            return Err(error);
        }

        let row: ReminderConfigReadRow = response
            .json()
            .await
            .map_err(|e| RemoteError::Serialization(e.to_string()))?;

        Ok(Some(row.config))
    }
}

/// Wire row for inserting a reading.
#[derive(Debug, Serialize)]
struct InsertReadingRow<'a> {
    user_id: &'a str,
    value: f64,
    #[serde(rename = "type")]
    reading_type: GlucoseType,
    date: String,
    is_normal: bool,
    notes: Option<&'a str>,
}

/// Wire row returned by the backend for a reading.
#[derive(Debug, Deserialize)]
struct ReadingRow {
    id: i64,
    value: f64,
    #[serde(rename = "type")]
    reading_type: String,
    date: String,
    is_normal: bool,
    notes: Option<String>,
}

impl ReadingRow {
    fn into_reading(self) -> Result<GlucoseReading, String> {
        let reading_type =
            GlucoseType::from_str(&self.reading_type).map_err(|e| e.to_string())?;
        let date = DateTime::parse_from_rfc3339(&self.date)
            .map_err(|e| e.to_string())?
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

#[derive(Debug, Deserialize)]
struct InsertedId {
    id: i64,
}

#[derive(Debug, Serialize)]
struct ReminderConfigRow<'a> {
    user_id: &'a str,
    config: &'a RemindersConfig,
}

#[derive(Debug, Deserialize)]
struct ReminderConfigReadRow {
    config: RemindersConfig,
}

/// PostgREST error body.
#[derive(Debug, Deserialize)]
struct PostgrestError {
    code: Option<String>,
    message: Option<String>,
}
