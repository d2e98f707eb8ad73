use serde::{Deserialize, Serialize};

use crate::easing::Easing;
use crate::error::TweenError;

/// Configuration for the scheduler, provided by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Global multiplier on every tick delta (default: 1.0). 0 freezes time.
    pub time_scale: f32,
    /// Optional upper bound on one tick's scaled delta, for hosts that want
    /// a stalled frame to slow animations down instead of skipping ahead
    /// (default: None, every tick is applied in full).
    pub max_delta: Option<f32>,
    /// Easing preset for builders created through the scheduler
    /// (default: OutQuad).
    pub default_easing: Easing,
    /// Contain panicking callbacks instead of unwinding through `tick`
    /// (default: true).
    pub catch_panics: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            max_delta: None,
            default_easing: Easing::OutQuad,
            catch_panics: true,
        }
    }
}

impl SchedulerConfig {
    /// Parse and validate a config from a JSON string. Missing fields take
    /// their defaults.
    pub fn from_json(json: &str) -> Result<Self, TweenError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TweenError> {
        if !self.time_scale.is_finite() || self.time_scale < 0.0 {
            return Err(TweenError::config(format!(
                "time_scale must be finite and >= 0, got {}",
                self.time_scale
            )));
        }
        if let Some(max) = self.max_delta {
            if !max.is_finite() || max <= 0.0 {
                return Err(TweenError::config(format!("max_delta must be > 0, got {}", max)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_partial_config() {
        let config = SchedulerConfig::from_json(r#"{ "time_scale": 0.5 }"#).unwrap();
        assert_eq!(config.time_scale, 0.5);
        assert_eq!(config.max_delta, None);
        assert_eq!(config.default_easing, Easing::OutQuad);
        assert!(config.catch_panics);
    }

    #[test]
    fn parse_full_config() {
        let json = r#"{
            "time_scale": 2.0,
            "max_delta": 0.1,
            "default_easing": "InOutCubic",
            "catch_panics": false
        }"#;
        let config = SchedulerConfig::from_json(json).unwrap();
        assert_eq!(config.max_delta, Some(0.1));
        assert_eq!(config.default_easing, Easing::InOutCubic);
        assert!(!config.catch_panics);
    }

    #[test]
    fn reject_bad_values() {
        assert!(matches!(
            SchedulerConfig::from_json(r#"{ "time_scale": -1.0 }"#),
            Err(TweenError::Configuration(_))
        ));
        assert!(SchedulerConfig::from_json(r#"{ "max_delta": 0.0 }"#).is_err());
        assert!(matches!(
            SchedulerConfig::from_json("{ not json"),
            Err(TweenError::Config(_))
        ));
    }
}
