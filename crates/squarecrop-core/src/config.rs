//! Crop editor configuration.

use serde::{Deserialize, Serialize};

use crate::drag::DEFAULT_HANDLE_SIZE;
use crate::placement::DEFAULT_TARGET_SIZE;

/// Default display surface bounds, in display pixels.
pub const DEFAULT_MAX_DISPLAY_WIDTH: f64 = 800.0;
pub const DEFAULT_MAX_DISPLAY_HEIGHT: f64 = 600.0;

/// Tunables for the crop editor.
///
/// Every field has a serde default, so a partial object from the host page
/// deserializes with the remaining fields at their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropConfig {
    /// Maximum display surface width
    #[serde(default = "default_max_display_width")]
    pub max_display_width: f64,
    /// Maximum display surface height
    #[serde(default = "default_max_display_height")]
    pub max_display_height: f64,
    /// Corner hit-zone size in display pixels
    #[serde(default = "default_handle_size")]
    pub handle_size: f64,
    /// Output edge of the processing service; steers initial placement only
    #[serde(default = "default_target_size")]
    pub target_size: f64,
}

fn default_max_display_width() -> f64 {
    DEFAULT_MAX_DISPLAY_WIDTH
}

fn default_max_display_height() -> f64 {
    DEFAULT_MAX_DISPLAY_HEIGHT
}

fn default_handle_size() -> f64 {
    DEFAULT_HANDLE_SIZE
}

fn default_target_size() -> f64 {
    DEFAULT_TARGET_SIZE
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            max_display_width: DEFAULT_MAX_DISPLAY_WIDTH,
            max_display_height: DEFAULT_MAX_DISPLAY_HEIGHT,
            handle_size: DEFAULT_HANDLE_SIZE,
            target_size: DEFAULT_TARGET_SIZE,
        }
    }
}

impl CropConfig {
    /// Replace zero, negative or non-finite values with their defaults.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let pick = |value: f64, fallback: f64| {
            if value.is_finite() && value > 0.0 {
                value
            } else {
                fallback
            }
        };
        Self {
            max_display_width: pick(self.max_display_width, defaults.max_display_width),
            max_display_height: pick(self.max_display_height, defaults.max_display_height),
            handle_size: pick(self.handle_size, defaults.handle_size),
            target_size: pick(self.target_size, defaults.target_size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CropConfig::default();
        assert_eq!(config.max_display_width, 800.0);
        assert_eq!(config.max_display_height, 600.0);
        assert_eq!(config.handle_size, 20.0);
        assert_eq!(config.target_size, 1080.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: CropConfig = serde_json::from_str(r#"{"handle_size": 12}"#).unwrap();
        assert_eq!(config.handle_size, 12.0);
        assert_eq!(config.max_display_width, 800.0);
        assert_eq!(config.target_size, 1080.0);
    }

    #[test]
    fn test_empty_json_is_default() {
        let config: CropConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, CropConfig::default());
    }

    #[test]
    fn test_sanitized_replaces_bad_values() {
        let mut config = CropConfig::default();
        config.max_display_width = 0.0;
        config.handle_size = f64::NAN;
        config.target_size = -1.0;
        config.max_display_height = 480.0;

        let clean = config.sanitized();
        assert_eq!(clean.max_display_width, 800.0);
        assert_eq!(clean.handle_size, 20.0);
        assert_eq!(clean.target_size, 1080.0);
        assert_eq!(clean.max_display_height, 480.0);
    }
}
