//! Reminder repository: dual-store configuration persistence.
//!
//! Same remote-first shape as the reading repository, without any
//! classification step. The configuration is always written wholesale; no
//! partial-slot merge happens at the store level.

use crate::glucose::types::RemindersConfig;
use crate::remote::store::RemoteStore;
use crate::repository::fallback::with_fallback;
use crate::repository::readings::RepositoryError;
use crate::storage::database::Database;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Facade over the remote and local reminder-configuration stores.
pub struct ReminderRepository {
    remote: Option<RemoteStore>,
    local: Arc<Mutex<Database>>,
    config: Arc<RwLock<Option<RemindersConfig>>>,
}

impl ReminderRepository {
    pub fn new(remote: Option<RemoteStore>, local: Arc<Mutex<Database>>) -> Self {
        Self {
            remote,
            local,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Load the reminder configuration.
    ///
    /// Remote-with-local-fallback; when neither store has one (or the local
    /// last-resort read itself fails) the fixed baseline defaults are used,
    /// so callers always get a usable configuration.
    pub async fn load_config(&self) -> RemindersConfig {
        let stored = match &self.remote {
            Some(remote) => {
                with_fallback(
                    "load_reminders_config",
                    || remote.get_reminders_config(),
                    || async { self.local.lock().await.get_reminders_config() },
                )
                .await
                .map(|(config, _)| config)
            }
            None => self.local.lock().await.get_reminders_config(),
        };

        let config = match stored {
            Ok(Some(config)) => config,
            Ok(None) => RemindersConfig::default(),
            Err(e) => {
                tracing::warn!("load_reminders_config: local store failed, using defaults: {e}");
                RemindersConfig::default()
            }
        };

        *self.config.write().await = Some(config.clone());
        config
    }

    /// Persist the full four-slot configuration.
    ///
    /// Remote-first with local fallback; only a failure of the local
    /// fallback escalates.
    pub async fn save_config(&self, config: RemindersConfig) -> Result<(), RepositoryError> {
        match &self.remote {
            Some(remote) => {
                with_fallback(
                    "save_reminders_config",
                    || remote.save_reminders_config(&config),
                    || async { self.local.lock().await.save_reminders_config(&config) },
                )
                .await?;
            }
            None => {
                self.local.lock().await.save_reminders_config(&config)?;
            }
        }

        *self.config.write().await = Some(config);
        Ok(())
    }

    /// The most recently loaded or saved configuration.
    pub async fn config(&self) -> Option<RemindersConfig> {
        self.config.read().await.clone()
    }
}
