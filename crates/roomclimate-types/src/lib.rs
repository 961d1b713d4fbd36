//! Platform-agnostic types for simulated room climate telemetry.
//!
//! This crate provides the data shared by the engine (roomclimate-core) and
//! any consumer that renders room state.
//!
//! # Features
//!
//! - Readings with temperature, humidity and CO₂ and their physical bounds
//! - Room identifiers restricted to the fixed set of monitored rooms
//! - Alert tags, alert state and threshold configuration
//! - The engine error taxonomy
//!
//! # Example
//!
//! ```
//! use roomclimate_types::{AlertTag, AlertState, RoomId};
//!
//! let room = RoomId::new(1).unwrap();
//! let alerts = AlertState::from_tags([AlertTag::HighTemp, AlertTag::HighCO2].into());
//! assert!(alerts.critical);
//! println!("room {room}: {alerts}");
//! ```

pub mod alert;
pub mod error;
pub mod types;

pub use alert::{AlertState, AlertTag, ThresholdConfig};
pub use error::{Error, Result};
pub use types::{
    CO2_MAX, CO2_MIN, DEFAULT_INTERVAL_MINUTES, DEFAULT_WINDOW, HUMIDITY_MAX, HUMIDITY_MIN,
    MAX_HISTORY_SPAN_MINUTES, MAX_WINDOW, ROOM_COUNT, Reading, RoomId, TEMPERATURE_MAX,
    TEMPERATURE_MIN, round_tenths,
};

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    // --- RoomId tests ---

    #[test]
    fn test_room_id_bounds() {
        assert!(RoomId::new(1).is_ok());
        assert!(RoomId::new(ROOM_COUNT).is_ok());
        assert_eq!(RoomId::new(0), Err(Error::UnknownRoom(0)));
        assert_eq!(RoomId::new(11), Err(Error::UnknownRoom(11)));
    }

    #[test]
    fn test_room_id_all_is_ordered() {
        let ids: Vec<u8> = RoomId::all().map(RoomId::get).collect();
        assert_eq!(ids, (1..=10).collect::<Vec<u8>>());
    }

    #[test]
    fn test_room_id_index() {
        assert_eq!(RoomId::new(1).unwrap().index(), 0);
        assert_eq!(RoomId::new(10).unwrap().index(), 9);
    }

    #[test]
    fn test_unknown_room_message() {
        let err = RoomId::new(42).unwrap_err();
        assert_eq!(err.to_string(), "Unknown room: 42 (valid ids are 1..=10)");
        assert!(err.is_programmer_error());
    }

    // --- Reading tests ---

    #[test]
    fn test_reading_rounds_temperature() {
        let r = Reading::new(datetime!(2025-01-01 12:00 UTC), 24.46, 40, 800);
        assert_eq!(r.temperature, 24.5);
    }

    #[test]
    fn test_reading_bounds() {
        let ts = datetime!(2025-01-01 12:00 UTC);
        assert!(Reading::new(ts, 20.0, 15, 450).is_within_bounds());
        assert!(Reading::new(ts, 36.0, 70, 1600).is_within_bounds());
        assert!(!Reading::new(ts, 19.9, 40, 800).is_within_bounds());
        assert!(!Reading::new(ts, 25.0, 71, 800).is_within_bounds());
        assert!(!Reading::new(ts, 25.0, 40, 449).is_within_bounds());
    }

    #[test]
    fn test_reading_display() {
        let r = Reading::new(datetime!(2025-01-01 12:00 UTC), 31.0, 40, 1100);
        assert_eq!(r.to_string(), "31.0°C 40% 1100 ppm");
    }

    #[test]
    fn test_invariant_violation_message() {
        let err = Error::InvariantViolation {
            last: datetime!(2025-01-01 12:30 UTC),
            attempted: datetime!(2025-01-01 12:00 UTC),
        };
        assert!(err.to_string().contains("not after the newest entry"));
    }

    // --- Serialization tests ---

    #[cfg(feature = "serde")]
    #[test]
    fn test_reading_json_roundtrip() {
        let r = Reading::new(datetime!(2025-03-04 05:30 UTC), 27.3, 33, 912);
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains("\"timestamp\":\"2025-03-04T05:30:00Z\""));
        let back: Reading = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_room_id_deserialize_rejects_out_of_range() {
        assert!(serde_json::from_str::<RoomId>("5").is_ok());
        assert!(serde_json::from_str::<RoomId>("0").is_err());
        assert!(serde_json::from_str::<RoomId>("11").is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_threshold_config_partial_toml_style_json() {
        let t: ThresholdConfig = serde_json::from_str(r#"{"co2_high": 1200.0}"#).unwrap();
        assert_eq!(t.co2_high, 1200.0);
        assert_eq!(t.temp_high, 30.0);
    }
}

/// Property-based tests for reading and room id invariants.
#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Only ids in 1..=10 are accepted.
        #[test]
        fn room_id_accepts_exactly_valid_range(id: u8) {
            prop_assert_eq!(RoomId::new(id).is_ok(), (1..=ROOM_COUNT).contains(&id));
        }

        /// Rounding keeps at most one decimal digit.
        #[test]
        fn round_tenths_has_one_decimal(value in 20.0f32..36.0) {
            let rounded = round_tenths(value);
            prop_assert!((rounded - value).abs() <= 0.05 + f32::EPSILON * 64.0);
            let scaled = rounded * 10.0;
            prop_assert!((scaled - scaled.round()).abs() < 1e-3);
        }
    }
}
