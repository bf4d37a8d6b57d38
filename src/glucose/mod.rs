//! Glucose domain model: reading types, clinical classification, statistics.

pub mod classification;
pub mod stats;
pub mod types;

pub use classification::{is_glucose_normal, threshold};
pub use stats::calculate_stats;
pub use types::{
    GlucoseReading, GlucoseStats, GlucoseType, NewReading, ReadingUpdate, ReminderConfig,
    RemindersConfig, TypeStats,
};
