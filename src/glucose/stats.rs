//! Aggregate statistics over a glucose reading collection.

use crate::glucose::types::{GlucoseReading, GlucoseStats, GlucoseType};

/// Compute view-ready statistics for a reading collection.
///
/// Pure over its input; all counts and percentages are 0 for an empty
/// collection (no division by zero).
pub fn calculate_stats(readings: &[GlucoseReading]) -> GlucoseStats {
    let total_readings = readings.len() as u32;
    let normal_readings = readings.iter().filter(|r| r.is_normal).count() as u32;
    let abnormal_readings = total_readings - normal_readings;
    let percentage_in_target = if total_readings > 0 {
        f64::from(normal_readings) / f64::from(total_readings) * 100.0
    } else {
        0.0
    };

    let (average_value, min_value, max_value) = if readings.is_empty() {
        (0.0, 0.0, 0.0)
    } else {
        let sum: f64 = readings.iter().map(|r| r.value).sum();
        let min = readings.iter().map(|r| r.value).fold(f64::INFINITY, f64::min);
        let max = readings
            .iter()
            .map(|r| r.value)
            .fold(f64::NEG_INFINITY, f64::max);
        (sum / readings.len() as f64, min, max)
    };

    let mut stats = GlucoseStats {
        total_readings,
        normal_readings,
        abnormal_readings,
        percentage_in_target,
        average_value,
        min_value,
        max_value,
        ..Default::default()
    };

    for reading in readings {
        let slot = stats.by_type_mut(reading.reading_type);
        slot.total += 1;
        if reading.is_normal {
            slot.normal += 1;
        } else {
            slot.abnormal += 1;
        }
    }

    for t in GlucoseType::ALL {
        let slot = stats.by_type_mut(t);
        slot.percentage_normal = if slot.total > 0 {
            f64::from(slot.normal) / f64::from(slot.total) * 100.0
        } else {
            0.0
        };
    }

    stats
}
