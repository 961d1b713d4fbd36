//! Configuration file management.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use time::Duration;

use roomclimate_core::RegistryConfig;
use roomclimate_types::{MAX_HISTORY_SPAN_MINUTES, MAX_WINDOW, ROOM_COUNT, ThresholdConfig};

/// Configuration file structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Alert thresholds shared by every room.
    pub thresholds: ThresholdConfig,
    /// Simulation settings.
    pub simulation: SimulationConfig,
    /// Room settings.
    pub rooms: RoomsConfig,
}

impl Config {
    /// Load configuration from the default path, or defaults if it does not
    /// exist.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = default_config_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Save configuration to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = self.to_toml()?;

        // Create parent directories if needed
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        std::fs::write(path.as_ref(), content).map_err(|e| ConfigError::Write {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Serialize to pretty TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Validate the configuration and return every error found.
    ///
    /// This checks:
    /// - Thresholds are finite numbers
    /// - History window is between 1 and `MAX_WINDOW` points
    /// - Sampling interval is at least one minute, and the whole history
    ///   spans at most `MAX_HISTORY_SPAN_MINUTES`
    /// - Time scale is positive and finite
    /// - Refresh cadence is between 1 second and 1 hour
    /// - Room names, if given, number exactly one per room and are not blank
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        let thresholds = [
            ("thresholds.temp_high", self.thresholds.temp_high),
            ("thresholds.hum_low", self.thresholds.hum_low),
            ("thresholds.co2_high", self.thresholds.co2_high),
        ];
        for (field, value) in thresholds {
            if !value.is_finite() {
                errors.push(ValidationError::new(field, "must be a finite number"));
            }
        }

        errors.extend(self.simulation.validate());
        errors.extend(self.rooms.validate());

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Load and validate configuration from a file.
    pub fn load_validated<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Build the engine configuration.
    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig::new()
            .window(self.simulation.window)
            .interval(Duration::minutes(i64::from(self.simulation.interval_minutes)))
            .names(self.rooms.names.iter().cloned())
            .thresholds(self.thresholds)
    }
}

/// Simulation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// History points kept per room.
    pub window: usize,
    /// Minutes between history points.
    pub interval_minutes: u32,
    /// Simulated seconds per wall second in watch mode.
    pub time_scale: f64,
    /// Wall seconds between ticks in watch mode.
    pub refresh_secs: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            window: 48,
            interval_minutes: 30,
            time_scale: 1.0,
            refresh_secs: 5,
        }
    }
}

impl SimulationConfig {
    /// Validate simulation settings.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.window == 0 {
            errors.push(ValidationError::new(
                "simulation.window",
                "must keep at least one point",
            ));
        } else if self.window > MAX_WINDOW {
            errors.push(ValidationError::new(
                "simulation.window",
                format!("must be at most {}, got {}", MAX_WINDOW, self.window),
            ));
        }
        if self.interval_minutes == 0 {
            errors.push(ValidationError::new(
                "simulation.interval_minutes",
                "must be at least 1 minute",
            ));
        } else {
            // The back-filled history spans (window - 1) intervals.
            let span = u64::from(self.interval_minutes)
                .saturating_mul(self.window.saturating_sub(1) as u64);
            if i64::from(self.interval_minutes) > MAX_HISTORY_SPAN_MINUTES
                || span > MAX_HISTORY_SPAN_MINUTES as u64
            {
                errors.push(ValidationError::new(
                    "simulation.interval_minutes",
                    format!(
                        "history of {} points every {} minutes spans more than {} minutes",
                        self.window, self.interval_minutes, MAX_HISTORY_SPAN_MINUTES
                    ),
                ));
            }
        }
        if !(self.time_scale.is_finite() && self.time_scale > 0.0) {
            errors.push(ValidationError::new(
                "simulation.time_scale",
                format!("must be a positive number, got {}", self.time_scale),
            ));
        }
        if !(1..=3600).contains(&self.refresh_secs) {
            errors.push(ValidationError::new(
                "simulation.refresh_secs",
                format!("must be between 1 and 3600, got {}", self.refresh_secs),
            ));
        }

        errors
    }
}

/// Room settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomsConfig {
    /// Display names in id order. Empty keeps the defaults.
    pub names: Vec<String>,
}

impl RoomsConfig {
    /// Validate room settings.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if !self.names.is_empty() && self.names.len() != usize::from(ROOM_COUNT) {
            errors.push(ValidationError::new(
                "rooms.names",
                format!(
                    "expected {} names, got {}",
                    ROOM_COUNT,
                    self.names.len()
                ),
            ));
        }
        for (i, name) in self.names.iter().enumerate() {
            if name.trim().is_empty() {
                errors.push(ValidationError::new(
                    format!("rooms.names[{}]", i),
                    "name cannot be empty",
                ));
            }
        }

        errors
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),
    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// A single validation error with context.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// The field path (e.g., `simulation.window` or `rooms.names[3]`).
    pub field: String,
    /// Description of the validation failure.
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("roomclimate")
        .join("config.toml")
}
