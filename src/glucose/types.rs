//! Core data types for glucose readings and reminder configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Meal-relative timing of a glucose measurement.
///
/// The wire names (`FASTING`, `POST_BREAKFAST`, ...) match the backend text
/// enum exactly and must not change without a backend migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GlucoseType {
    Fasting,
    PostBreakfast,
    PostLunch,
    PostDinner,
}

impl GlucoseType {
    /// All four fixed type slots, in daily order.
    pub const ALL: [GlucoseType; 4] = [
        GlucoseType::Fasting,
        GlucoseType::PostBreakfast,
        GlucoseType::PostLunch,
        GlucoseType::PostDinner,
    ];

    /// Stable string form used in SQLite columns and backend rows.
    pub fn as_str(&self) -> &'static str {
        match self {
            GlucoseType::Fasting => "FASTING",
            GlucoseType::PostBreakfast => "POST_BREAKFAST",
            GlucoseType::PostLunch => "POST_LUNCH",
            GlucoseType::PostDinner => "POST_DINNER",
        }
    }

    /// Human-readable label for reports and reminder text.
    pub fn label(&self) -> &'static str {
        match self {
            GlucoseType::Fasting => "Fasting",
            GlucoseType::PostBreakfast => "Post-breakfast",
            GlucoseType::PostLunch => "Post-lunch",
            GlucoseType::PostDinner => "Post-dinner",
        }
    }
}

impl fmt::Display for GlucoseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized glucose type string.
#[derive(Debug, Clone, Error)]
#[error("unknown glucose type: {0}")]
pub struct UnknownGlucoseType(pub String);

impl FromStr for GlucoseType {
    type Err = UnknownGlucoseType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FASTING" => Ok(GlucoseType::Fasting),
            "POST_BREAKFAST" => Ok(GlucoseType::PostBreakfast),
            "POST_LUNCH" => Ok(GlucoseType::PostLunch),
            "POST_DINNER" => Ok(GlucoseType::PostDinner),
            other => Err(UnknownGlucoseType(other.to_string())),
        }
    }
}

/// One glucose measurement event.
///
/// `is_normal` is derived from `(reading_type, value)` by the classification
/// rule; repositories re-derive it on every create and on every edit that
/// touches `value` or `reading_type`. Stores persist it verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlucoseReading {
    /// Assigned by whichever store created the row; absent before first save.
    pub id: Option<i64>,
    /// Blood glucose in mg/dL.
    pub value: f64,
    #[serde(rename = "type")]
    pub reading_type: GlucoseType,
    /// User-supplied measurement time, not necessarily "now".
    pub date: DateTime<Utc>,
    pub is_normal: bool,
    pub notes: Option<String>,
}

/// A reading before first persistence (no id yet).
#[derive(Debug, Clone, PartialEq)]
pub struct NewReading {
    pub value: f64,
    pub reading_type: GlucoseType,
    pub date: DateTime<Utc>,
    pub is_normal: bool,
    pub notes: Option<String>,
}

/// Partial update of a stored reading.
///
/// `None` fields are left untouched. `notes` is doubly optional so that
/// clearing the note (`Some(None)`) is distinct from not touching it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadingUpdate {
    pub value: Option<f64>,
    pub reading_type: Option<GlucoseType>,
    pub date: Option<DateTime<Utc>>,
    pub is_normal: Option<bool>,
    pub notes: Option<Option<String>>,
}

impl ReadingUpdate {
    /// Whether the update touches a field `is_normal` is derived from.
    pub fn touches_classification(&self) -> bool {
        self.value.is_some() || self.reading_type.is_some()
    }
}

/// Reminder settings for one measurement slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderConfig {
    pub enabled: bool,
    /// Wall-clock time of day, `HH:mm`.
    pub time: String,
}

/// Reminder configuration for all four measurement slots.
///
/// Always saved wholesale; stores never merge individual slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemindersConfig {
    pub fasting: ReminderConfig,
    pub post_breakfast: ReminderConfig,
    pub post_lunch: ReminderConfig,
    pub post_dinner: ReminderConfig,
}

impl Default for RemindersConfig {
    fn default() -> Self {
        Self {
            fasting: ReminderConfig {
                enabled: true,
                time: "07:00".to_string(),
            },
            post_breakfast: ReminderConfig {
                enabled: true,
                time: "09:00".to_string(),
            },
            post_lunch: ReminderConfig {
                enabled: true,
                time: "13:00".to_string(),
            },
            post_dinner: ReminderConfig {
                enabled: true,
                time: "20:00".to_string(),
            },
        }
    }
}

impl RemindersConfig {
    /// Slot configuration for a given reading type.
    pub fn slot(&self, reading_type: GlucoseType) -> &ReminderConfig {
        match reading_type {
            GlucoseType::Fasting => &self.fasting,
            GlucoseType::PostBreakfast => &self.post_breakfast,
            GlucoseType::PostLunch => &self.post_lunch,
            GlucoseType::PostDinner => &self.post_dinner,
        }
    }
}

/// Per-type breakdown within [`GlucoseStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TypeStats {
    pub total: u32,
    pub normal: u32,
    pub abnormal: u32,
    pub percentage_normal: f64,
}

/// Aggregate statistics over a reading collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GlucoseStats {
    pub total_readings: u32,
    pub normal_readings: u32,
    pub abnormal_readings: u32,
    pub percentage_in_target: f64,
    pub average_value: f64,
    pub min_value: f64,
    pub max_value: f64,
    pub fasting: TypeStats,
    pub post_breakfast: TypeStats,
    pub post_lunch: TypeStats,
    pub post_dinner: TypeStats,
}

impl GlucoseStats {
    /// Breakdown for a given reading type.
    pub fn by_type(&self, reading_type: GlucoseType) -> &TypeStats {
        match reading_type {
            GlucoseType::Fasting => &self.fasting,
            GlucoseType::PostBreakfast => &self.post_breakfast,
            GlucoseType::PostLunch => &self.post_lunch,
            GlucoseType::PostDinner => &self.post_dinner,
        }
    }

    pub(crate) fn by_type_mut(&mut self, reading_type: GlucoseType) -> &mut TypeStats {
        match reading_type {
            GlucoseType::Fasting => &mut self.fasting,
            GlucoseType::PostBreakfast => &mut self.post_breakfast,
            GlucoseType::PostLunch => &mut self.post_lunch,
            GlucoseType::PostDinner => &mut self.post_dinner,
        }
    }
}
