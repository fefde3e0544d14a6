use serde::{Deserialize, Serialize};

/// Broker connection and channel identifiers, fixed for the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,

    /// Topic the camera feed arrives on; every message here is one tick.
    pub video_topic: String,

    /// Topic the driving commands are published to.
    pub ctrl_topic: String,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 1883,
            username: None,
            password: None,
            video_topic: "vehicle/camera".to_string(),
            ctrl_topic: "vehicle/control".to_string(),
        }
    }
}
