//! Operator input collaborators: the normalized key space fed by the
//! overlay window and the gilrs joystick poller. Both produce snapshots the
//! control loop consumes at tick time; neither mutates control state
//! directly.

pub mod gamepad;
pub mod keys;

pub use gamepad::{GamepadPoller, PollerError, PollerHandle, PollerSettings};
pub use keys::Key;
