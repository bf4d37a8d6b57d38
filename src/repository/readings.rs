//! Reading repository: dual-store orchestration for glucose readings.
//!
//! Decides on every load which store is authoritative, absorbs remote
//! failures into local fallbacks, and enforces the `is_normal` invariant on
//! every create and edit before anything is persisted.

use crate::glucose::classification::is_glucose_normal;
use crate::glucose::stats::calculate_stats;
use crate::glucose::types::{GlucoseReading, GlucoseStats, GlucoseType, NewReading, ReadingUpdate};
use crate::remote::store::RemoteStore;
use crate::repository::fallback::{with_fallback, StorePath};
use crate::storage::database::{Database, DatabaseError};
use crate::validation::{validate_reading_value, ValidationError};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio::time::sleep;

/// Pause after a successful remote insert before reloading, to tolerate the
/// backend's read-after-write lag. A mitigation, not a consistency protocol.
const READ_AFTER_WRITE_DELAY: std::time::Duration = std::time::Duration::from_millis(500);

/// Errors surfaced to callers of the reading repository.
///
/// Remote failures never appear here; they are absorbed into local fallbacks.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Local store error: {0}")]
    Local(#[from] DatabaseError),
}

#[derive(Default)]
struct ReadingsState {
    /// Most recent first. Owned exclusively by this repository.
    readings: Vec<GlucoseReading>,
    loading: bool,
    last_error: Option<String>,
}

/// Facade over the remote and local reading stores.
///
/// Whether the remote store is used is fixed at construction by injecting
/// (or omitting) the remote client; it is never re-derived per call.
pub struct ReadingRepository {
    remote: Option<RemoteStore>,
    local: Arc<Mutex<Database>>,
    state: Arc<RwLock<ReadingsState>>,
    /// Load sequence counter: a completing load only commits if it is still
    /// the latest issued, so stale completions are discarded instead of
    /// racing last-write-wins.
    load_seq: AtomicU64,
}

impl ReadingRepository {
    pub fn new(remote: Option<RemoteStore>, local: Arc<Mutex<Database>>) -> Self {
        Self {
            remote,
            local,
            state: Arc::new(RwLock::new(ReadingsState::default())),
            load_seq: AtomicU64::new(0),
        }
    }

    /// Whether a remote store was configured at construction.
    pub fn remote_enabled(&self) -> bool {
        self.remote.is_some()
    }

    /// Load readings, reconciling the two stores.
    ///
    /// Remote-preferred when configured: a successful remote read is adopted
    /// wholesale, except that an empty remote result does not displace
    /// non-empty local data (an empty remote read may reflect a session not
    /// yet propagated). The two sets are never merged. Any remote failure
    /// falls back entirely to the local store without surfacing an error;
    /// only a local (last-resort) failure is surfaced, and it resets the
    /// collection to empty rather than leaving it stale.
    pub async fn load_readings(&self) -> Result<(), RepositoryError> {
        let seq = self.load_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.write().await.loading = true;

        let loaded = match &self.remote {
            Some(remote) => match remote.get_all_readings().await {
                Ok(remote_readings) => {
                    if remote_readings.is_empty() {
                        match self.local.lock().await.get_all_readings() {
                            Ok(local_readings) if !local_readings.is_empty() => {
                                tracing::info!(
                                    "load_readings: remote empty, keeping {} local readings",
                                    local_readings.len()
                                );
                                Ok(local_readings)
                            }
                            Ok(_) => Ok(remote_readings),
                            Err(e) => {
                                // Secondary consistency aid only; not critical
                                tracing::warn!(
                                    "load_readings: local read failed after remote success: {e}"
                                );
                                Ok(remote_readings)
                            }
                        }
                    } else {
                        Ok(remote_readings)
                    }
                }
                Err(remote_err) => {
                    tracing::warn!(
                        "load_readings: remote store failed, using local store: {remote_err}"
                    );
                    self.local.lock().await.get_all_readings()
                }
            },
            None => self.local.lock().await.get_all_readings(),
        };

        match loaded {
            Ok(readings) => {
                self.commit(seq, readings, None).await;
                Ok(())
            }
            Err(e) => {
                self.commit(seq, Vec::new(), Some(e.to_string())).await;
                Err(RepositoryError::Local(e))
            }
        }
    }

    /// Commit a load result unless a newer load has been issued since.
    ///
    /// The sequence check happens under the state write lock, so a newer
    /// load cannot be issued and committed between the check and the write.
    async fn commit(&self, seq: u64, readings: Vec<GlucoseReading>, error: Option<String>) -> bool {
        let mut state = self.state.write().await;
        if self.load_seq.load(Ordering::SeqCst) != seq {
            tracing::debug!("load_readings: discarding stale completion (seq {seq})");
            return false;
        }

        state.readings = readings;
        state.last_error = error;
        state.loading = false;
        true
    }

    /// Validate, classify and persist a new reading, then reload.
    ///
    /// `is_normal` is derived here, unconditionally, before persistence.
    /// A remote failure redirects the write to the local store; the write is
    /// never lost. Returns the id assigned by whichever store took it.
    pub async fn create_reading(
        &self,
        value: f64,
        reading_type: GlucoseType,
        date: DateTime<Utc>,
        notes: Option<String>,
    ) -> Result<i64, RepositoryError> {
        validate_reading_value(value)?;

        let reading = NewReading {
            value,
            reading_type,
            date,
            is_normal: is_glucose_normal(reading_type, value),
            notes,
        };

        let id = match &self.remote {
            Some(remote) => {
                let result = with_fallback(
                    "create_reading",
                    || remote.add_reading(&reading),
                    || async { self.local.lock().await.add_reading(&reading) },
                )
                .await;
                let (id, path) = match result {
                    Ok(outcome) => outcome,
                    Err(e) => return Err(self.fail(e).await),
                };
                if path == StorePath::Remote {
                    sleep(READ_AFTER_WRITE_DELAY).await;
                }
                id
            }
            None => match self.local.lock().await.add_reading(&reading) {
                Ok(id) => id,
                Err(e) => return Err(self.fail(e).await),
            },
        };

        self.load_readings().await?;
        Ok(id)
    }

    /// Delete a reading, then reload. Deleting an absent id is a no-op.
    pub async fn remove_reading(&self, id: i64) -> Result<(), RepositoryError> {
        match &self.remote {
            Some(remote) => {
                let result = with_fallback(
                    "remove_reading",
                    || remote.delete_reading(id),
                    || async { self.local.lock().await.delete_reading(id) },
                )
                .await;
                if let Err(e) = result {
                    return Err(self.fail(e).await);
                }
            }
            None => {
                if let Err(e) = self.local.lock().await.delete_reading(id) {
                    return Err(self.fail(e).await);
                }
            }
        }

        self.load_readings().await
    }

    /// Apply a partial update, re-deriving `is_normal` from the effective
    /// merged value and type, then reload.
    pub async fn edit_reading(
        &self,
        id: i64,
        mut updates: ReadingUpdate,
    ) -> Result<(), RepositoryError> {
        if let Some(value) = updates.value {
            validate_reading_value(value)?;
        }

        if updates.touches_classification() {
            let current = {
                let state = self.state.read().await;
                state.readings.iter().find(|r| r.id == Some(id)).cloned()
            };
            if let Some(current) = current {
                let value = updates.value.unwrap_or(current.value);
                let reading_type = updates.reading_type.unwrap_or(current.reading_type);
                updates.is_normal = Some(is_glucose_normal(reading_type, value));
            }
        }

        match &self.remote {
            Some(remote) => {
                let result = with_fallback(
                    "edit_reading",
                    || remote.update_reading(id, &updates),
                    || async { self.local.lock().await.update_reading(id, &updates) },
                )
                .await;
                if let Err(e) = result {
                    return Err(self.fail(e).await);
                }
            }
            None => {
                if let Err(e) = self.local.lock().await.update_reading(id, &updates) {
                    return Err(self.fail(e).await);
                }
            }
        }

        self.load_readings().await
    }

    /// Record a last-resort write failure and convert it for the caller.
    async fn fail(&self, err: DatabaseError) -> RepositoryError {
        self.state.write().await.last_error = Some(err.to_string());
        RepositoryError::Local(err)
    }

    /// Snapshot of the current in-memory collection, most recent first.
    pub async fn readings(&self) -> Vec<GlucoseReading> {
        self.state.read().await.readings.clone()
    }

    /// Whether a load is in flight.
    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    /// The last surfaced error, cleared by the next successful load.
    pub async fn last_error(&self) -> Option<String> {
        self.state.read().await.last_error.clone()
    }

    /// Statistics over the current in-memory collection. Never touches I/O.
    pub async fn stats(&self) -> GlucoseStats {
        calculate_stats(&self.state.read().await.readings)
    }
}
