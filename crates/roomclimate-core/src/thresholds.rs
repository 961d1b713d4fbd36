//! Threshold evaluation of readings into alert tags.
//!
//! Evaluation is a pure function of a reading and a [`ThresholdConfig`]:
//! same inputs, same [`AlertState`], with no stored state.
//!
//! # Example
//!
//! ```
//! use roomclimate_core::{ThresholdConfig, evaluate};
//! use roomclimate_types::{AlertTag, Reading};
//! use time::OffsetDateTime;
//!
//! let thresholds = ThresholdConfig::new(30.0, 30.0, 1000.0);
//! let reading = Reading::new(OffsetDateTime::now_utc(), 31.0, 40, 1100);
//!
//! let alerts = evaluate(&reading, &thresholds);
//! assert!(alerts.has(AlertTag::HighTemp));
//! assert!(alerts.has(AlertTag::HighCO2));
//! assert!(alerts.critical);
//! ```

use std::collections::BTreeSet;

use roomclimate_types::{AlertState, AlertTag, Reading, ThresholdConfig};

/// Evaluate a reading against a threshold configuration.
///
/// - [`AlertTag::HighTemp`] iff `temperature > temp_high`
/// - [`AlertTag::LowHumidity`] iff `humidity < hum_low`
/// - [`AlertTag::HighCO2`] iff `co2 > co2_high`
/// - `critical` iff both high temperature and high CO2; humidity never
///   contributes to it.
pub fn evaluate(reading: &Reading, config: &ThresholdConfig) -> AlertState {
    let mut tags = BTreeSet::new();
    if reading.temperature > config.temp_high {
        tags.insert(AlertTag::HighTemp);
    }
    if f32::from(reading.humidity) < config.hum_low {
        tags.insert(AlertTag::LowHumidity);
    }
    if f32::from(reading.co2) > config.co2_high {
        tags.insert(AlertTag::HighCO2);
    }
    AlertState::from_tags(tags)
}
