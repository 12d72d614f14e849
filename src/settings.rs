//! Engine configuration
//!
//! Immutable per engine instance. Deserializes from JSON with every field
//! optional; missing fields take the defaults below.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::MAX_REELS;
use crate::error::ReelError;

/// Reel engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReelConfig {
    // === Shape ===
    /// Number of reels
    pub reel_count: usize,
    /// Stop positions on each reel
    pub symbols_per_reel: u32,

    // === Spin ===
    /// Base spin speed (radians/second)
    pub base_spin_speed: f64,
    /// Multiplier applied to the base speed when a spin starts
    pub spin_accel_factor: f64,
    /// Overrides `base_spin_speed * spin_accel_factor` when set
    pub initial_accelerated_speed: Option<f64>,
    /// How long reels spin before the normal stop sequence begins (ms)
    pub spin_duration_before_stop_ms: u64,

    // === Stop ===
    /// Deceleration smoothness for a normal stop
    pub deceleration_smoothness: f64,
    /// Deceleration smoothness for a quick stop
    pub quick_stop_smoothness: f64,
    /// Delay between successive reels in a normal stop (ms)
    pub normal_stop_stagger_ms: u64,
    /// Delay between successive reels in a quick stop (ms)
    pub quick_stop_stagger_ms: u64,
    /// Segments shown when the engine is created
    pub initial_segments: Option<Vec<u32>>,

    // === Layout ===
    /// Quiet period before a resize burst triggers a relayout (ms)
    pub resize_debounce_ms: u64,
    /// Gap between reels as a fraction of one reel's width
    pub reel_spacing_ratio: f32,
    /// Cylinder radius relative to reel width
    pub reel_radius: f32,
    /// Cylinder length relative to reel width
    pub reel_length: f32,
}

impl Default for ReelConfig {
    fn default() -> Self {
        Self {
            reel_count: 3,
            symbols_per_reel: 5,

            base_spin_speed: 1.0,
            spin_accel_factor: 30.0,
            initial_accelerated_speed: None,
            spin_duration_before_stop_ms: 1000,

            deceleration_smoothness: 1.5,
            quick_stop_smoothness: 0.5,
            normal_stop_stagger_ms: 250,
            quick_stop_stagger_ms: 10,
            initial_segments: None,

            resize_debounce_ms: 150,
            reel_spacing_ratio: 0.0,
            reel_radius: 1.0,
            reel_length: 1.0,
        }
    }
}

impl ReelConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self, ReelError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Speed every reel is set to when a spin starts
    pub fn initial_speed(&self) -> f64 {
        self.initial_accelerated_speed
            .unwrap_or(self.base_spin_speed * self.spin_accel_factor)
    }

    pub fn spin_duration(&self) -> Duration {
        Duration::from_millis(self.spin_duration_before_stop_ms)
    }

    pub fn normal_stagger(&self) -> Duration {
        Duration::from_millis(self.normal_stop_stagger_ms)
    }

    pub fn quick_stagger(&self) -> Duration {
        Duration::from_millis(self.quick_stop_stagger_ms)
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    /// Check the invariants the engine relies on
    pub fn validate(&self) -> Result<(), ReelError> {
        if self.reel_count == 0 {
            return Err(invalid("reel_count must be at least 1"));
        }
        if self.reel_count > MAX_REELS {
            return Err(invalid(format!(
                "reel_count {} exceeds the supported maximum of {}",
                self.reel_count, MAX_REELS
            )));
        }
        if self.symbols_per_reel == 0 {
            return Err(invalid("symbols_per_reel must be at least 1"));
        }

        let speed = self.initial_speed();
        if !(speed.is_finite() && speed > 0.0) {
            return Err(invalid(format!("initial spin speed must be positive, got {speed}")));
        }
        for (name, value) in [
            ("deceleration_smoothness", self.deceleration_smoothness),
            ("quick_stop_smoothness", self.quick_stop_smoothness),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(format!("{name} must be positive, got {value}")));
            }
        }

        if !(self.reel_spacing_ratio.is_finite() && self.reel_spacing_ratio >= 0.0) {
            return Err(invalid("reel_spacing_ratio must be non-negative"));
        }
        if !(self.reel_radius > 0.0 && self.reel_length > 0.0) {
            return Err(invalid("reel_radius and reel_length must be positive"));
        }

        if let Some(segments) = &self.initial_segments {
            for (reel, &segment) in segments.iter().enumerate() {
                if segment == 0 || segment > self.symbols_per_reel {
                    return Err(ReelError::InvalidSegment {
                        reel,
                        segment,
                        segments_per_reel: self.symbols_per_reel,
                    });
                }
            }
        }

        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> ReelError {
    ReelError::InvalidConfig(msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ReelConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.initial_speed(), 30.0);
        assert_eq!(config.normal_stagger(), Duration::from_millis(250));
        assert_eq!(config.quick_stagger(), Duration::from_millis(10));
        assert_eq!(config.spin_duration(), Duration::from_secs(1));
    }

    #[test]
    fn test_from_json_partial() {
        let config =
            ReelConfig::from_json(r#"{ "reel_count": 5, "normal_stop_stagger_ms": 400 }"#).unwrap();
        assert_eq!(config.reel_count, 5);
        assert_eq!(config.normal_stop_stagger_ms, 400);
        assert_eq!(config.symbols_per_reel, 5);
        assert_eq!(config.deceleration_smoothness, 1.5);
    }

    #[test]
    fn test_initial_speed_override() {
        let config = ReelConfig {
            initial_accelerated_speed: Some(12.0),
            ..Default::default()
        };
        assert_eq!(config.initial_speed(), 12.0);
    }

    #[test]
    fn test_rejects_zero_reels() {
        let config = ReelConfig {
            reel_count: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ReelError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_zero_symbols() {
        assert!(ReelConfig::from_json(r#"{ "symbols_per_reel": 0 }"#).is_err());
    }

    #[test]
    fn test_rejects_bad_smoothness() {
        let config = ReelConfig {
            quick_stop_smoothness: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_out_of_range_initial_segment() {
        let config = ReelConfig {
            initial_segments: Some(vec![1, 6, 2]),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ReelError::InvalidSegment { reel: 1, segment: 6, .. })
        ));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            ReelConfig::from_json("{ reel_count: "),
            Err(ReelError::Config(_))
        ));
    }
}
