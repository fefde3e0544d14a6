//! # MQTT Transport Module
//!
//! The messaging collaborator of the control core: one broker connection
//! carries the inbound camera feed and the outbound driving commands.
//!
//! Frame arrival is the session's tick clock: the control loop runs one
//! tick per message received on the video topic, and every tick ends with
//! exactly one command published on the control topic. The core never sees
//! the transport: it consumes decoded [`messages::VideoFrame`]s from a
//! channel and hands command snapshots back through another.
//!
//! ```text
//! mqtt/
//! ├── config.rs    - broker address, credentials and topic identifiers
//! ├── messages.rs  - frame envelope decode, command payload encode/decode
//! └── link.rs      - connection lifecycle, subscription, publish loop
//! ```
//!
//! Wire formats follow the vehicle's conventions: frames arrive as JSON
//! envelopes with a base64 image body, commands leave as a flat JSON object
//! (`angle`, `throttle`, `drive_mode`, `recording`). Malformed inbound
//! payloads are logged and dropped; publish failures are left to the
//! transport's own retry behavior.

pub mod config;
pub mod link;
pub mod messages;

pub use config::MqttConfig;
pub use link::{ConnectionState, LinkError, LinkStatus, MqttLink};
pub use messages::{FrameError, VideoFrame};
