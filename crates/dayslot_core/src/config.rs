//! Drag engine tuning configuration.
//!
//! # Responsibility
//! - Hold every threshold, interval and animation constant of the drag engine.
//! - Validate the relative ordering the gesture components depend on.
//!
//! # Invariants
//! - Configuration is read-only once handed to `DragController`.
//! - `validate()` passes for `DragConfig::default()`.
//! - Durations are serialized as integer milliseconds.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Distance band mapping a vertical offset to a quantization grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridBand {
    /// Minimum |dy| (points) at which this band applies.
    pub min_distance: f64,
    /// Grid size in minutes.
    pub minutes: u32,
}

/// Bounded retry policy for remote commits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    #[serde(with = "duration_ms")]
    pub initial_backoff: Duration,
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(1),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    /// Backoff to wait after failed attempt number `attempt` (1-based).
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let factor = self.multiplier.max(1).saturating_pow(exponent);
        self.initial_backoff.saturating_mul(factor)
    }
}

/// Tuning constants for gesture recognition, axis locking, quantization,
/// zones, overlay and commit retry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragConfig {
    #[serde(with = "duration_ms")]
    pub long_press_delay: Duration,
    #[serde(with = "duration_ms")]
    pub tap_max_duration: Duration,
    pub tap_max_travel: f64,

    pub vertical_snap_threshold: f64,
    pub horizontal_break_threshold: f64,
    pub horizontal_snap_threshold: f64,
    /// Maximum |offset| while snapped.
    pub snap_band: f64,
    /// Fraction of raw movement shown while snapped.
    pub snap_resistance: f64,
    #[serde(with = "duration_ms")]
    pub break_duration: Duration,
    pub swipe_action_threshold: f64,

    #[serde(with = "duration_ms")]
    pub quantize_interval: Duration,
    pub grid_bands: Vec<GridBand>,

    pub top_zone_fraction: f64,
    pub bottom_zone_fraction: f64,
    pub edge_band_width: f64,
    #[serde(with = "duration_ms")]
    pub day_advance_delay: Duration,
    #[serde(with = "duration_ms")]
    pub day_advance_interval: Duration,
    /// Auto-scroll speed in points per second.
    pub scroll_speed: f64,

    #[serde(with = "duration_ms")]
    pub overlay_reveal_timeout: Duration,

    pub spring_stiffness: f64,
    pub spring_damping: f64,

    pub retry: RetryPolicy,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            long_press_delay: Duration::from_millis(500),
            tap_max_duration: Duration::from_millis(250),
            tap_max_travel: 10.0,
            vertical_snap_threshold: 50.0,
            horizontal_break_threshold: 60.0,
            horizontal_snap_threshold: 30.0,
            snap_band: 8.0,
            snap_resistance: 0.2,
            break_duration: Duration::from_millis(120),
            swipe_action_threshold: 90.0,
            quantize_interval: Duration::from_millis(500),
            grid_bands: vec![
                GridBand {
                    min_distance: 0.0,
                    minutes: 1,
                },
                GridBand {
                    min_distance: 120.0,
                    minutes: 5,
                },
                GridBand {
                    min_distance: 200.0,
                    minutes: 10,
                },
                GridBand {
                    min_distance: 280.0,
                    minutes: 30,
                },
                GridBand {
                    min_distance: 360.0,
                    minutes: 60,
                },
            ],
            top_zone_fraction: 0.15,
            bottom_zone_fraction: 0.85,
            edge_band_width: 40.0,
            day_advance_delay: Duration::from_millis(1000),
            day_advance_interval: Duration::from_millis(1000),
            scroll_speed: 600.0,
            overlay_reveal_timeout: Duration::from_millis(150),
            spring_stiffness: 300.0,
            spring_damping: 30.0,
            retry: RetryPolicy::default(),
        }
    }
}

/// Configuration parse/validation failures.
#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid drag config json: {err}"),
            Self::Invalid(message) => write!(f, "invalid drag config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

impl DragConfig {
    /// Parses JSON overrides on top of defaults and validates the result.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: DragConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks ordering constraints between thresholds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive_durations = [
            ("long_press_delay", self.long_press_delay),
            ("quantize_interval", self.quantize_interval),
            ("day_advance_interval", self.day_advance_interval),
        ];
        for (name, value) in positive_durations {
            if value.is_zero() {
                return Err(invalid(format!("{name} must be > 0")));
            }
        }

        let positive_lengths = [
            ("vertical_snap_threshold", self.vertical_snap_threshold),
            ("horizontal_break_threshold", self.horizontal_break_threshold),
            ("horizontal_snap_threshold", self.horizontal_snap_threshold),
            ("scroll_speed", self.scroll_speed),
        ];
        for (name, value) in positive_lengths {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(format!("{name} must be a positive number")));
            }
        }

        if self.horizontal_snap_threshold >= self.horizontal_break_threshold {
            return Err(invalid(format!(
                "horizontal_snap_threshold ({}) must be < horizontal_break_threshold ({})",
                self.horizontal_snap_threshold, self.horizontal_break_threshold
            )));
        }
        if self.snap_band < 0.0 || !(0.0..=1.0).contains(&self.snap_resistance) {
            return Err(invalid(
                "snap_band must be >= 0 and snap_resistance within [0, 1]".to_string(),
            ));
        }

        let fractions_ok = self.top_zone_fraction > 0.0
            && self.top_zone_fraction < self.bottom_zone_fraction
            && self.bottom_zone_fraction < 1.0;
        if !fractions_ok {
            return Err(invalid(format!(
                "zone fractions must satisfy 0 < top ({}) < bottom ({}) < 1",
                self.top_zone_fraction, self.bottom_zone_fraction
            )));
        }
        if self.edge_band_width < 0.0 {
            return Err(invalid("edge_band_width must be >= 0".to_string()));
        }

        self.validate_grid_bands()?;

        if self.retry.max_attempts == 0 {
            return Err(invalid("retry.max_attempts must be >= 1".to_string()));
        }

        Ok(())
    }

    fn validate_grid_bands(&self) -> Result<(), ConfigError> {
        let Some(first) = self.grid_bands.first() else {
            return Err(invalid("grid_bands must not be empty".to_string()));
        };
        if first.min_distance != 0.0 {
            return Err(invalid(
                "first grid band must start at distance 0".to_string(),
            ));
        }
        for band in &self.grid_bands {
            if band.minutes == 0 || 1440 % band.minutes != 0 {
                return Err(invalid(format!(
                    "grid band minutes ({}) must divide a day",
                    band.minutes
                )));
            }
        }
        for pair in self.grid_bands.windows(2) {
            if pair[1].min_distance <= pair[0].min_distance {
                return Err(invalid(
                    "grid band distances must be strictly increasing".to_string(),
                ));
            }
            if pair[1].minutes < pair[0].minutes {
                return Err(invalid(
                    "grid band minutes must not decrease with distance".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Grid size in minutes for a vertical offset magnitude.
    pub fn grid_minutes_for(&self, distance: f64) -> u32 {
        let distance = distance.abs();
        self.grid_bands
            .iter()
            .rev()
            .find(|band| distance >= band.min_distance)
            .map_or(1, |band| band.minutes)
    }
}

fn invalid(message: String) -> ConfigError {
    ConfigError::Invalid(message)
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
