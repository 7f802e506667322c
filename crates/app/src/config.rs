use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use wizard_state::zoom::DEFAULT_MAX_ZOOM;

use crate::error::{EngineError, Result};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub max_zoom: u32,
    /// Zoom levels moved per accepted pinch sample.
    pub zoom_step: u32,
    /// Scroll samples further than this from the last delivered one skip preview rendering.
    pub fast_scroll_threshold_px: i64,
    /// Opposite-direction pinch samples needed before the zoom direction flips.
    pub scale_tolerance: u32,
    /// Pinch samples whose factor moved less than this are ignored.
    pub scale_delta_epsilon: f32,
    pub stop_timeout_ms: u64,
    /// Frames rendered between two playback progress callbacks.
    pub progress_interval_frames: u32,
    pub viewport_width_px: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_zoom: DEFAULT_MAX_ZOOM,
            zoom_step: 2,
            fast_scroll_threshold_px: 100,
            scale_tolerance: 3,
            scale_delta_epsilon: 0.01,
            stop_timeout_ms: 2000,
            progress_interval_frames: 3,
            viewport_width_px: 1200,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(raw).map_err(|e| EngineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_zoom < 1 {
            return Err(EngineError::Config("max_zoom must be at least 1".into()));
        }
        if self.zoom_step < 1 {
            return Err(EngineError::Config("zoom_step must be at least 1".into()));
        }
        if self.scale_tolerance < 1 {
            return Err(EngineError::Config(
                "scale_tolerance must be at least 1".into(),
            ));
        }
        if self.viewport_width_px <= 0 {
            return Err(EngineError::Config(
                "viewport_width_px must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config = EngineConfig::from_toml_str("max_zoom = 30\n").unwrap();
        assert_eq!(config.max_zoom, 30);
        assert_eq!(config.fast_scroll_threshold_px, 100);
        assert_eq!(config.scale_tolerance, 3);
        assert_eq!(config.stop_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn empty_document_is_default() {
        assert_eq!(
            EngineConfig::from_toml_str("").unwrap(),
            EngineConfig::default()
        );
    }

    #[test]
    fn rejects_zero_viewport() {
        let err = EngineConfig::from_toml_str("viewport_width_px = 0").unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(EngineConfig::from_toml_str("max_zoom = \"lots\"").is_err());
    }
}
