//! Integration tests for the dual-store fallback policy.
//!
//! The "failing remote" is a real RemoteStore pointed at an unreachable
//! address, so every remote attempt fails at the transport layer and the
//! repositories must redirect to the local store.

use chrono::Utc;
use glucolog::glucose::types::ReadingUpdate;
use glucolog::remote::{RemoteConfig, RemoteStore, StaticSession};
use glucolog::{Database, GlucoseType, ReadingRepository, ReminderRepository, RemindersConfig};
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::thread;
use tokio::sync::Mutex;

/// Remote store whose every request fails with connection refused.
fn unreachable_remote() -> RemoteStore {
    RemoteStore::new(
        RemoteConfig::new("http://127.0.0.1:1", "anon-key"),
        Arc::new(StaticSession::signed_in("user-1", "token")),
    )
}

/// Remote store with no authenticated session at all.
fn signed_out_remote() -> RemoteStore {
    RemoteStore::new(
        RemoteConfig::new("http://127.0.0.1:1", "anon-key"),
        Arc::new(StaticSession::signed_out()),
    )
}

/// Remote store backed by a local listener that answers every request with
/// the same canned JSON body. Enough of HTTP for a reqwest GET; stays
/// entirely on the loopback interface.
fn canned_remote(body: &'static str) -> RemoteStore {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind listener");
    let addr = listener.local_addr().unwrap();

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { break };
            // Canned responses ignore the request contents
            let mut head = [0u8; 4096];
            let _ = stream.read(&mut head);
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });

    RemoteStore::new(
        RemoteConfig::new(format!("http://{addr}"), "anon-key"),
        Arc::new(StaticSession::signed_in("user-1", "token")),
    )
}

fn shared_local() -> Arc<Mutex<Database>> {
    Arc::new(Mutex::new(
        Database::open_in_memory().expect("Failed to create database"),
    ))
}

#[tokio::test]
async fn test_load_falls_back_to_local_without_surfacing_error() {
    crate::init_tracing();
    let local = shared_local();

    // Seed the local store directly
    let repo_local = ReadingRepository::new(None, local.clone());
    repo_local
        .create_reading(85.0, GlucoseType::Fasting, Utc::now(), None)
        .await
        .unwrap();

    // Remote configured but failing: load must populate from local storage
    let repo = ReadingRepository::new(Some(unreachable_remote()), local);
    repo.load_readings().await.unwrap();

    let readings = repo.readings().await;
    assert_eq!(readings.len(), 1);
    assert_eq!(readings[0].value, 85.0);
    // The remote failure is expected/transient and must NOT be surfaced
    assert!(repo.last_error().await.is_none());
}

#[tokio::test]
async fn test_load_with_signed_out_remote_uses_local() {
    crate::init_tracing();
    let local = shared_local();

    let seed = ReadingRepository::new(None, local.clone());
    seed.create_reading(120.0, GlucoseType::PostLunch, Utc::now(), None)
        .await
        .unwrap();

    // NotAuthenticated is a fallback trigger, not an application error
    let repo = ReadingRepository::new(Some(signed_out_remote()), local);
    repo.load_readings().await.unwrap();

    assert_eq!(repo.readings().await.len(), 1);
    assert!(repo.last_error().await.is_none());
}

#[tokio::test]
async fn test_empty_remote_read_keeps_nonempty_local() {
    crate::init_tracing();
    let local = shared_local();

    let seed = ReadingRepository::new(None, local.clone());
    seed.create_reading(85.0, GlucoseType::Fasting, Utc::now(), None)
        .await
        .unwrap();

    // The remote read succeeds but returns no rows: the non-empty local
    // collection must not be displaced
    let repo = ReadingRepository::new(Some(canned_remote("[]")), local);
    repo.load_readings().await.unwrap();

    let readings = repo.readings().await;
    assert_eq!(readings.len(), 1);
    assert_eq!(readings[0].value, 85.0);
    assert!(repo.last_error().await.is_none());
}

#[tokio::test]
async fn test_empty_remote_read_adopted_when_local_empty() {
    crate::init_tracing();
    let repo = ReadingRepository::new(Some(canned_remote("[]")), shared_local());

    repo.load_readings().await.unwrap();
    assert!(repo.readings().await.is_empty());
    assert!(repo.last_error().await.is_none());
}

#[tokio::test]
async fn test_nonempty_remote_read_displaces_local_wholesale() {
    crate::init_tracing();
    let local = shared_local();

    let seed = ReadingRepository::new(None, local.clone());
    seed.create_reading(100.0, GlucoseType::PostLunch, Utc::now(), None)
        .await
        .unwrap();

    let body = r#"[{
        "id": 7,
        "user_id": "user-1",
        "value": 88.0,
        "type": "FASTING",
        "date": "2024-03-01T07:00:00+00:00",
        "is_normal": true,
        "notes": null,
        "created_at": "2024-03-01T07:00:05+00:00"
    }]"#;

    // A successful non-empty remote read is adopted as-is; the local row is
    // not merged in
    let repo = ReadingRepository::new(Some(canned_remote(body)), local);
    repo.load_readings().await.unwrap();

    let readings = repo.readings().await;
    assert_eq!(readings.len(), 1);
    assert_eq!(readings[0].id, Some(7));
    assert_eq!(readings[0].value, 88.0);
    assert_eq!(readings[0].reading_type, GlucoseType::Fasting);
    assert!(repo.last_error().await.is_none());
}

#[tokio::test]
async fn test_create_redirects_write_to_local_when_remote_fails() {
    crate::init_tracing();
    let repo = ReadingRepository::new(Some(unreachable_remote()), shared_local());

    // The write must not be lost: it lands in the local store
    let id = repo
        .create_reading(95.0, GlucoseType::Fasting, Utc::now(), Some("felt fine".to_string()))
        .await
        .unwrap();
    assert!(id > 0);

    let readings = repo.readings().await;
    assert_eq!(readings.len(), 1);
    assert_eq!(readings[0].id, Some(id));
    assert!(!readings[0].is_normal); // 95 >= 92
    assert_eq!(readings[0].notes.as_deref(), Some("felt fine"));
}

#[tokio::test]
async fn test_edit_and_remove_fall_back_to_local() {
    crate::init_tracing();
    let repo = ReadingRepository::new(Some(unreachable_remote()), shared_local());

    let id = repo
        .create_reading(100.0, GlucoseType::PostLunch, Utc::now(), None)
        .await
        .unwrap();

    repo.edit_reading(
        id,
        ReadingUpdate {
            value: Some(200.0),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let readings = repo.readings().await;
    assert_eq!(readings[0].value, 200.0);
    assert!(!readings[0].is_normal);

    repo.remove_reading(id).await.unwrap();
    assert!(repo.readings().await.is_empty());
    assert!(repo.last_error().await.is_none());
}

#[tokio::test]
async fn test_reminders_fall_back_to_local() {
    crate::init_tracing();
    let local = shared_local();
    let repo = ReminderRepository::new(Some(unreachable_remote()), local.clone());

    // Nothing stored anywhere: baseline defaults
    assert_eq!(repo.load_config().await, RemindersConfig::default());

    let mut config = RemindersConfig::default();
    config.post_breakfast.time = "09:30".to_string();
    repo.save_config(config.clone()).await.unwrap();

    // The save landed locally and survives a reload through the fallback
    assert_eq!(repo.load_config().await, config);
    assert_eq!(
        local.lock().await.get_reminders_config().unwrap(),
        Some(config)
    );
}
