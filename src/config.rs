use crate::engine::EngineConfig;
use crate::projection::RoomGeometry;
use anyhow::Result;
use log::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub bridge: BridgeConfig,
    pub window: WindowConfig,
    pub room: RoomGeometry,
    pub engine: EngineConfig,
    /// Update loop period in milliseconds.
    pub tick_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BridgeConfig {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub pointer_radius: f32,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            url: "ws://localhost:3000/?type=python".to_string(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Room pointer".to_string(),
            width: 1280,
            height: 720,
            pointer_radius: 30.0,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bridge: BridgeConfig::default(),
            window: WindowConfig::default(),
            room: RoomGeometry::default(),
            engine: EngineConfig::default(),
            tick_ms: 16,
        }
    }
}

impl AppConfig {
    pub const DEFAULT_PATH: &'static str = "room_pointer.json";

    /// Loads the file at `path`, falling back to defaults when it does not exist.
    /// Missing fields take their default value.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Ok(AppConfig::default());
        }
        let content = fs::read_to_string(path)?;
        let config = serde_json::from_str::<AppConfig>(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::QuaternionOrder;

    #[test]
    fn missing_file_gives_defaults() {
        let config = AppConfig::load(Path::new("does/not/exist.json")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.tick(), Duration::from_millis(16));
        assert_eq!(config.room, RoomGeometry { width: 4.0, height: 3.0 });
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config: AppConfig = serde_json::from_str(
            r#"{"bridge":{"url":"ws://relay:3000"},"engine":{"distance":2.0,"quaternion_order":"wxyz"}}"#,
        )
        .unwrap();
        assert_eq!(config.bridge.url, "ws://relay:3000");
        assert_eq!(config.engine.distance, 2.0);
        assert_eq!(config.engine.screen_width, 1.2);
        assert_eq!(config.engine.quaternion_order, QuaternionOrder::Wxyz);
        assert_eq!(config.window, WindowConfig::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let path = std::env::temp_dir().join("room_pointer_malformed_config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(AppConfig::load(&path).is_err());
        fs::remove_file(&path).unwrap();
    }
}
