//! Integration tests for reminder configuration persistence.

use glucolog::{Database, ReminderRepository, RemindersConfig};
use std::sync::Arc;
use tokio::sync::Mutex;

fn local_repo() -> (ReminderRepository, Arc<Mutex<Database>>) {
    let local = Arc::new(Mutex::new(Database::open_in_memory().unwrap()));
    (ReminderRepository::new(None, local.clone()), local)
}

#[tokio::test]
async fn test_baseline_defaults_exact_shape() {
    crate::init_tracing();
    let (repo, _local) = local_repo();

    let config = repo.load_config().await;
    assert!(config.fasting.enabled);
    assert_eq!(config.fasting.time, "07:00");
    assert!(config.post_breakfast.enabled);
    assert_eq!(config.post_breakfast.time, "09:00");
    assert!(config.post_lunch.enabled);
    assert_eq!(config.post_lunch.time, "13:00");
    assert!(config.post_dinner.enabled);
    assert_eq!(config.post_dinner.time, "20:00");
}

#[tokio::test]
async fn test_saved_config_replaces_defaults() {
    crate::init_tracing();
    let (repo, local) = local_repo();

    let mut config = RemindersConfig::default();
    config.fasting.enabled = false;
    config.post_dinner.time = "20:45".to_string();
    repo.save_config(config.clone()).await.unwrap();

    // A fresh repository over the same store sees the saved config, not the
    // defaults
    let fresh = ReminderRepository::new(None, local);
    assert_eq!(fresh.load_config().await, config);
}

#[tokio::test]
async fn test_config_json_round_trips_through_store() {
    crate::init_tracing();
    let (repo, local) = local_repo();

    let config = RemindersConfig::default();
    repo.save_config(config.clone()).await.unwrap();

    // The store holds the camelCase JSON shape the backend also uses
    let stored = local.lock().await.get_reminders_config().unwrap().unwrap();
    let json = serde_json::to_value(&stored).unwrap();
    assert_eq!(json["postBreakfast"]["time"], "09:00");
    assert_eq!(stored, config);
}
