//! Clinical classification of glucose values for gestational diabetes.

use crate::glucose::types::GlucoseType;

/// Fasting target in mg/dL. Normal is strictly below this value.
pub const FASTING_THRESHOLD: f64 = 92.0;

/// Post-meal target in mg/dL (one hour after). Normal is at or below.
pub const POST_MEAL_THRESHOLD: f64 = 140.0;

/// Reference threshold for a reading type, in mg/dL.
pub fn threshold(reading_type: GlucoseType) -> f64 {
    match reading_type {
        GlucoseType::Fasting => FASTING_THRESHOLD,
        GlucoseType::PostBreakfast | GlucoseType::PostLunch | GlucoseType::PostDinner => {
            POST_MEAL_THRESHOLD
        }
    }
}

/// Whether a glucose value is within target for its type.
///
/// Fasting is compared strictly (`< 92`), post-meal inclusively (`<= 140`).
/// The asymmetry is the clinical convention for gestational diabetes and is
/// intentional.
pub fn is_glucose_normal(reading_type: GlucoseType, value: f64) -> bool {
    match reading_type {
        GlucoseType::Fasting => value < FASTING_THRESHOLD,
        GlucoseType::PostBreakfast | GlucoseType::PostLunch | GlucoseType::PostDinner => {
            value <= POST_MEAL_THRESHOLD
        }
    }
}
