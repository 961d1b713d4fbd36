//! Core types for room climate telemetry.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::{Error, Result};

/// Number of monitored rooms. Room ids run from 1 to this value.
pub const ROOM_COUNT: u8 = 10;

/// Default history window: 24 hours at 30-minute spacing.
pub const DEFAULT_WINDOW: usize = 48;

/// Default spacing between history points, in minutes.
pub const DEFAULT_INTERVAL_MINUTES: i64 = 30;

/// Largest history window a room may keep.
pub const MAX_WINDOW: usize = 10_000;

/// Longest time a back-filled history may span, in minutes (about a century).
///
/// Keeps `window × interval` well inside the representable date range.
pub const MAX_HISTORY_SPAN_MINUTES: i64 = 100 * 366 * 24 * 60;

/// Lowest temperature a reading may carry, in °C.
pub const TEMPERATURE_MIN: f32 = 20.0;
/// Highest temperature a reading may carry, in °C.
pub const TEMPERATURE_MAX: f32 = 36.0;
/// Lowest relative humidity a reading may carry, in percent.
pub const HUMIDITY_MIN: u8 = 15;
/// Highest relative humidity a reading may carry, in percent.
pub const HUMIDITY_MAX: u8 = 70;
/// Lowest CO2 concentration a reading may carry, in ppm.
pub const CO2_MIN: u16 = 450;
/// Highest CO2 concentration a reading may carry, in ppm.
pub const CO2_MAX: u16 = 1600;

/// Identifier of a monitored room.
///
/// Always within `1..=ROOM_COUNT`; construct through [`RoomId::new`] or
/// [`RoomId::all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub struct RoomId(u8);

impl RoomId {
    /// Validate a raw room id.
    ///
    /// # Examples
    ///
    /// ```
    /// use roomclimate_types::RoomId;
    ///
    /// assert_eq!(RoomId::new(3).unwrap().get(), 3);
    /// assert!(RoomId::new(0).is_err());
    /// assert!(RoomId::new(11).is_err());
    /// ```
    pub fn new(id: u8) -> Result<Self> {
        if (1..=ROOM_COUNT).contains(&id) {
            Ok(Self(id))
        } else {
            Err(Error::UnknownRoom(id))
        }
    }

    /// All room ids in ascending order.
    pub fn all() -> impl Iterator<Item = RoomId> {
        (1..=ROOM_COUNT).map(RoomId)
    }

    /// The raw numeric id.
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }

    /// Zero-based position of this room in id order.
    #[must_use]
    pub fn index(self) -> usize {
        usize::from(self.0 - 1)
    }
}

impl TryFrom<u8> for RoomId {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        RoomId::new(value)
    }
}

impl From<RoomId> for u8 {
    fn from(id: RoomId) -> Self {
        id.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One timestamped climate sample for a room.
///
/// Readings are immutable values. Temperature carries one decimal digit;
/// humidity and CO2 are whole numbers.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Reading {
    /// When the sample was taken.
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub timestamp: OffsetDateTime,
    /// Temperature in degrees Celsius.
    pub temperature: f32,
    /// Relative humidity percentage.
    pub humidity: u8,
    /// CO2 concentration in ppm.
    pub co2: u16,
}

impl Reading {
    /// Create a reading, rounding the temperature to one decimal.
    pub fn new(timestamp: OffsetDateTime, temperature: f32, humidity: u8, co2: u16) -> Self {
        Self {
            timestamp,
            temperature: round_tenths(temperature),
            humidity,
            co2,
        }
    }

    /// Whether every metric lies inside the physical bounds of the domain.
    #[must_use]
    pub fn is_within_bounds(&self) -> bool {
        (TEMPERATURE_MIN..=TEMPERATURE_MAX).contains(&self.temperature)
            && (HUMIDITY_MIN..=HUMIDITY_MAX).contains(&self.humidity)
            && (CO2_MIN..=CO2_MAX).contains(&self.co2)
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.1}°C {}% {} ppm",
            self.temperature, self.humidity, self.co2
        )
    }
}

/// Round a value to one decimal digit.
#[must_use]
pub fn round_tenths(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}
