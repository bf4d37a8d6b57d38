//! Unit tests for the clinical classification rule.

use glucolog::glucose::classification::{is_glucose_normal, threshold};
use glucolog::GlucoseType;

#[test]
fn test_fasting_matches_strict_threshold_over_whole_range() {
    // For every plausible integer value, fasting normality is exactly v < 92
    for v in 20..=600 {
        let value = f64::from(v);
        assert_eq!(
            is_glucose_normal(GlucoseType::Fasting, value),
            value < 92.0,
            "fasting classification disagrees at {value}"
        );
    }
}

#[test]
fn test_post_meal_matches_inclusive_threshold_over_whole_range() {
    for t in [
        GlucoseType::PostBreakfast,
        GlucoseType::PostLunch,
        GlucoseType::PostDinner,
    ] {
        for v in 20..=600 {
            let value = f64::from(v);
            assert_eq!(
                is_glucose_normal(t, value),
                value <= 140.0,
                "{t} classification disagrees at {value}"
            );
        }
    }
}

#[test]
fn test_asymmetry_at_the_thresholds() {
    // 92 fasting is abnormal (strict), 140 post-meal is normal (inclusive)
    assert!(!is_glucose_normal(GlucoseType::Fasting, 92.0));
    assert!(is_glucose_normal(GlucoseType::PostBreakfast, 140.0));
}

#[test]
fn test_thresholds_are_the_fixed_clinical_constants() {
    assert_eq!(threshold(GlucoseType::Fasting), 92.0);
    for t in [
        GlucoseType::PostBreakfast,
        GlucoseType::PostLunch,
        GlucoseType::PostDinner,
    ] {
        assert_eq!(threshold(t), 140.0);
    }
}
