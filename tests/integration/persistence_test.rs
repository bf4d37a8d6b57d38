//! Integration tests for on-disk local persistence.

use chrono::{TimeZone, Utc};
use glucolog::auth::{hash_password, verify_password};
use glucolog::glucose::types::NewReading;
use glucolog::{Database, GlucoseType};

#[test]
fn test_readings_survive_reopen() {
    crate::init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("glucolog").join("glucolog.db");
    let date = Utc.with_ymd_and_hms(2024, 6, 1, 7, 15, 0).unwrap();

    let id = {
        let db = Database::open(&path).unwrap();
        db.add_reading(&NewReading {
            value: 88.0,
            reading_type: GlucoseType::Fasting,
            date,
            is_normal: true,
            notes: Some("before breakfast".to_string()),
        })
        .unwrap()
    };

    // Reopen from the same file
    let db = Database::open(&path).unwrap();
    let readings = db.get_all_readings().unwrap();
    assert_eq!(readings.len(), 1);
    assert_eq!(readings[0].id, Some(id));
    assert_eq!(readings[0].date, date);
    assert_eq!(readings[0].notes.as_deref(), Some("before breakfast"));
}

#[test]
fn test_account_and_session_survive_reopen() {
    crate::init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("glucolog.db");

    let hash = hash_password("senha123");
    let user_id = {
        let db = Database::open(&path).unwrap();
        let user_id = db.create_user("Ana", "ana@example.com", &hash).unwrap();
        db.save_session(&user_id).unwrap();
        user_id
    };

    let db = Database::open(&path).unwrap();
    let user = db.get_user_by_email("ana@example.com").unwrap().unwrap();
    assert_eq!(user.id, user_id);
    assert!(verify_password("senha123", &user.password_hash));

    let session = db.get_session().unwrap().unwrap();
    assert_eq!(session.user_id, user_id);

    db.clear_session().unwrap();
    assert!(db.get_session().unwrap().is_none());
}

#[test]
fn test_date_range_query_on_disk() {
    crate::init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("glucolog.db");
    let db = Database::open(&path).unwrap();

    for day in 10..=14 {
        db.add_reading(&NewReading {
            value: 100.0,
            reading_type: GlucoseType::PostBreakfast,
            date: Utc.with_ymd_and_hms(2024, 6, day, 9, 0, 0).unwrap(),
            is_normal: true,
            notes: None,
        })
        .unwrap();
    }

    let range = db
        .get_readings_by_date_range(
            Utc.with_ymd_and_hms(2024, 6, 11, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 13, 23, 59, 59).unwrap(),
        )
        .unwrap();

    assert_eq!(range.len(), 3);
    // Ascending order within the range
    assert!(range.windows(2).all(|w| w[0].date <= w[1].date));
}
