use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Engine configuration, usually loaded from JSON at startup.
/// Every field is optional in the JSON and falls back to its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Screen width in pixels (default: 640).
    pub screen_width: f32,
    /// Screen height in pixels (default: 480).
    pub screen_height: f32,
    /// Initial camera zoom in pixels per world unit (default: 12).
    pub camera_zoom: f32,
    /// Directory holding `<name>.rso` geometry files (default: "assets").
    pub asset_dir: PathBuf,
    /// Radius of the circle drawn for point primitives (default: 2).
    pub point_radius: f32,
    /// Curve flattening tolerance for tessellation (default: 0.5).
    pub tessellation_tolerance: f32,
    /// Stroke width for outlines and lines (default: 1).
    pub line_width: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            screen_width: 640.0,
            screen_height: 480.0,
            camera_zoom: 12.0,
            asset_dir: PathBuf::from("assets"),
            point_radius: 2.0,
            tessellation_tolerance: 0.5,
            line_width: 1.0,
        }
    }
}

impl EngineConfig {
    /// Parse a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_gives_defaults() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.asset_dir, PathBuf::from("assets"));
    }

    #[test]
    fn partial_json_overrides() {
        let json = r#"{ "screen_width": 800, "camera_zoom": 4.0, "asset_dir": "data/sprites" }"#;
        let config = EngineConfig::from_json(json).unwrap();
        assert_eq!(config.screen_width, 800.0);
        assert_eq!(config.screen_height, 480.0);
        assert_eq!(config.camera_zoom, 4.0);
        assert_eq!(config.asset_dir, PathBuf::from("data/sprites"));
    }

    #[test]
    fn json_round_trip() {
        let config = EngineConfig { point_radius: 3.5, ..EngineConfig::default() };
        let json = config.to_json().unwrap();
        assert_eq!(EngineConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(EngineConfig::from_json(r#"{ "screen_width": "wide" }"#).is_err());
    }
}
