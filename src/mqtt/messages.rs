use base64::prelude::*;
use chrono::{DateTime, Local};
use serde::Deserialize;

use crate::control::ControlState;

/// Inbound video envelope: `{"data": "<base64-encoded image>"}`.
#[derive(Debug, Deserialize)]
struct FrameEnvelope {
    data: String,
}

/// One received camera frame.
///
/// The image bytes stay in their encoded form; the control loop only uses
/// frame arrival as its tick clock and the overlay does not decode video.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub bytes: Vec<u8>,
    pub received: DateTime<Local>,
}

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("Malformed frame envelope: {0}")]
    Envelope(#[from] serde_json::Error),

    #[error("Malformed frame body: {0}")]
    Body(#[from] base64::DecodeError),
}

impl VideoFrame {
    pub fn decode(payload: &[u8]) -> Result<Self, FrameError> {
        let envelope: FrameEnvelope = serde_json::from_slice(payload)?;
        let bytes = BASE64_STANDARD.decode(envelope.data.as_bytes())?;
        Ok(VideoFrame {
            bytes,
            received: Local::now(),
        })
    }
}

/// Serializes a command snapshot into the published wire object:
/// `{"angle": f, "throttle": f, "drive_mode": "user"|"pilot", "recording": b}`.
pub fn encode_command(state: &ControlState) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(state)
}

/// Inverse of [`encode_command`]; the two round-trip exactly.
pub fn decode_command(payload: &[u8]) -> Result<ControlState, serde_json::Error> {
    serde_json::from_slice(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::DriveMode;

    #[test]
    fn command_payload_round_trips() {
        let mut state = ControlState::default();
        state.apply_axes(-0.5, 0.25);
        state.toggle_recording();

        let payload = encode_command(&state).unwrap();
        let decoded = decode_command(&payload).unwrap();
        assert_eq!(decoded, state);
    }

    #[test]
    fn command_payload_uses_wire_field_names() {
        let payload = encode_command(&ControlState::default()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&payload).unwrap();

        assert_eq!(value["angle"], 0.0);
        assert_eq!(value["throttle"], 0.0);
        assert_eq!(value["drive_mode"], "user");
        assert_eq!(value["recording"], false);
    }

    #[test]
    fn pilot_mode_serializes_lowercase() {
        let mut state = ControlState::default();
        state.set_mode(DriveMode::Pilot);

        let payload = encode_command(&state).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&payload).unwrap();
        assert_eq!(value["drive_mode"], "pilot");
    }

    #[test]
    fn frame_envelope_decodes_base64_body() {
        let frame = VideoFrame::decode(br#"{"data":"aGVsbG8="}"#).unwrap();
        assert_eq!(frame.bytes, b"hello");
    }

    #[test]
    fn malformed_envelope_is_an_error() {
        assert!(VideoFrame::decode(b"not json").is_err());
        assert!(VideoFrame::decode(br#"{"frame":"aGVsbG8="}"#).is_err());
        assert!(VideoFrame::decode(br#"{"data":"%%%"}"#).is_err());
    }
}
