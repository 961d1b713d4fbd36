//! Alert tags, alert state and the threshold configuration they derive from.

use core::fmt;
use std::collections::BTreeSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A named alert classification for a reading.
///
/// Ordered as they are displayed: temperature, humidity, CO2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AlertTag {
    /// Temperature above `temp_high`.
    HighTemp,
    /// Humidity below `hum_low`.
    LowHumidity,
    /// CO2 above `co2_high`.
    HighCO2,
}

impl AlertTag {
    /// Human-readable label for the tag.
    pub fn label(&self) -> &'static str {
        match self {
            AlertTag::HighTemp => "High temperature",
            AlertTag::LowHumidity => "Low humidity",
            AlertTag::HighCO2 => "High CO₂",
        }
    }
}

impl fmt::Display for AlertTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Alerts derived from one reading against one threshold configuration.
///
/// An empty tag set means "no alerts"; there is no sentinel tag for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AlertState {
    /// Active tags.
    pub tags: BTreeSet<AlertTag>,
    /// High temperature and high CO2 at the same time.
    pub critical: bool,
}

impl AlertState {
    /// Build an alert state from a set of tags, deriving the critical flag.
    pub fn from_tags(tags: BTreeSet<AlertTag>) -> Self {
        let critical = tags.contains(&AlertTag::HighTemp) && tags.contains(&AlertTag::HighCO2);
        Self { tags, critical }
    }

    /// Whether the given tag is active.
    #[must_use]
    pub fn has(&self, tag: AlertTag) -> bool {
        self.tags.contains(&tag)
    }

    /// Whether no tag is active.
    #[must_use]
    pub fn is_clear(&self) -> bool {
        self.tags.is_empty()
    }
}

impl fmt::Display for AlertState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clear() {
            return f.write_str("No alerts");
        }
        let labels: Vec<&str> = self.tags.iter().map(AlertTag::label).collect();
        write!(f, "{}", labels.join(", "))?;
        if self.critical {
            f.write_str(" [CRITICAL]")?;
        }
        Ok(())
    }
}

/// Threshold configuration shared by every room in an evaluation pass.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ThresholdConfig {
    /// Temperatures strictly above this raise [`AlertTag::HighTemp`].
    pub temp_high: f32,
    /// Humidities strictly below this raise [`AlertTag::LowHumidity`].
    pub hum_low: f32,
    /// CO2 levels strictly above this raise [`AlertTag::HighCO2`].
    pub co2_high: f32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            temp_high: 30.0,
            hum_low: 30.0,
            co2_high: 1000.0,
        }
    }
}

impl ThresholdConfig {
    /// Create a threshold configuration.
    pub fn new(temp_high: f32, hum_low: f32, co2_high: f32) -> Self {
        Self {
            temp_high,
            hum_low,
            co2_high,
        }
    }

    /// Reject configurations with NaN or infinite values.
    ///
    /// A NaN threshold would make every comparison false and silently hide
    /// alerts.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("temp_high", self.temp_high),
            ("hum_low", self.hum_low),
            ("co2_high", self.co2_high),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(Error::InvalidThresholds(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }
        Ok(())
    }
}
