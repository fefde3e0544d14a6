//! Session configuration: TOML file with compiled defaults and startup
//! validation. Everything in here is immutable once the session runs.

use std::path::PathBuf;

use color_eyre::{eyre::eyre, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::control::ControlSettings;
use crate::mqtt::MqttConfig;

const CONFIG_DIR: &str = ".config/teledrive";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be within (0, 1], got {value}")]
    InvalidStep { name: &'static str, value: f32 },
}

/// Overlay window dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TeleopConfig {
    pub mqtt: MqttConfig,
    pub control: ControlSettings,
    pub frame: FrameConfig,
}

impl TeleopConfig {
    /// Loads `~/.config/teledrive/config.toml`, falling back to defaults
    /// when the file does not exist. Validation failures abort session
    /// startup.
    pub async fn load() -> Result<Self> {
        let path = Self::config_path();

        let config = if tokio::fs::try_exists(&path)
            .await
            .map_err(|e| eyre!("Failed to check if config file exists: {}", e))?
        {
            let content = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| eyre!("Failed to read config file: {}", e))?;
            let config: TeleopConfig =
                toml::from_str(&content).map_err(|e| eyre!("Failed to parse config file: {}", e))?;
            info!("Loaded configuration from {}", path.display());
            config
        } else {
            warn!("No config file at {}, using defaults", path.display());
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    /// Step sizes outside (0, 1] cannot start a session.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("throttle_step", self.control.throttle_step),
            ("angle_step", self.control.angle_step),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::InvalidStep { name, value });
            }
        }
        Ok(())
    }

    fn config_path() -> PathBuf {
        let mut path = dirs::home_dir().unwrap_or_else(|| {
            warn!("Could not determine home directory, using current directory");
            PathBuf::from(".")
        });
        path.push(CONFIG_DIR);
        path.push(CONFIG_FILE);
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        TeleopConfig::default().validate().unwrap();
    }

    #[test]
    fn out_of_range_steps_are_rejected() {
        for bad in [0.0, -0.25, 1.5] {
            let mut config = TeleopConfig::default();
            config.control.throttle_step = bad;
            assert!(config.validate().is_err(), "throttle_step {} accepted", bad);

            let mut config = TeleopConfig::default();
            config.control.angle_step = bad;
            assert!(config.validate().is_err(), "angle_step {} accepted", bad);
        }
    }

    #[test]
    fn full_step_is_allowed() {
        let mut config = TeleopConfig::default();
        config.control.throttle_step = 1.0;
        config.control.angle_step = 1.0;
        config.validate().unwrap();
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: TeleopConfig = toml::from_str(
            r#"
            [mqtt]
            host = "broker.local"
            video_topic = "car/cam"

            [control]
            throttle_step = 0.5
            "#,
        )
        .unwrap();

        assert_eq!(config.mqtt.host, "broker.local");
        assert_eq!(config.mqtt.video_topic, "car/cam");
        assert_eq!(config.mqtt.port, 1883);
        assert_eq!(config.control.throttle_step, 0.5);
        assert_eq!(config.control.angle_step, 0.25);
        assert_eq!(config.frame.width, 1024);
    }
}
