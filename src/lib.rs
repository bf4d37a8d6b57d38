//! GlucoLog - Glucose Self-Monitoring for Gestational Diabetes
//!
//! An offline-first data layer for logging blood-glucose readings tagged by
//! meal-relative timing, with dual persistence: a local SQLite store that works
//! with no network or account, and an optional Supabase-backed remote store
//! that becomes the source of truth when configured. Repositories reconcile
//! the two and derive clinical normal/abnormal status on every write.

pub mod auth;
pub mod glucose;
pub mod remote;
pub mod repository;
pub mod storage;
pub mod validation;

// Re-export commonly used types
pub use glucose::classification::is_glucose_normal;
pub use glucose::stats::calculate_stats;
pub use glucose::types::{GlucoseReading, GlucoseStats, GlucoseType, RemindersConfig};
pub use repository::readings::ReadingRepository;
pub use repository::reminders::ReminderRepository;
pub use storage::database::{Database, DatabaseError};
