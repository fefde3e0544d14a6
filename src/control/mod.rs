//! # Control Core
//!
//! Input arbitration and the command state machine: the part of teledrive
//! that decides, on every tick, which input source is authoritative and what
//! the vehicle is told to do.
//!
//! ## Tick anatomy
//!
//! Each inbound video frame triggers exactly one tick:
//!
//! ```text
//! frame arrival (mqtt) ─→ ControlLoop::tick
//!                           ├─ KeyMap: one normalized key → ControlAction → ControlState
//!                           ├─ JoystickArbiter: device failover, may override the axes
//!                           └─ TickOutcome: command for publication + snapshot for the overlay
//! ```
//!
//! ## Arbitration policy
//!
//! Joysticks win over the keyboard only while they are actually moving. The
//! device that last drove keeps control as long as its reading changes; any
//! other device takes over the moment it leaves neutral; when nothing moves,
//! whatever the keyboard set this tick stands. Device index order breaks
//! ties, and exactly one device can drive per tick.
//!
//! A stick resting exactly at its last accepted reading produces no new
//! input, so it never fights a manual override.
//!
//! ## State rules
//!
//! Angle and throttle are clamped to [-1, 1] on every write. Entering Pilot
//! mode neutralizes both axes; entering User mode touches nothing. The
//! recording flag is independent of everything else.

pub mod arbiter;
pub mod driver;
pub mod keymap;
pub mod state;

pub use arbiter::{DeviceReading, JoystickArbiter};
pub use driver::{ControlLoop, ControlSettings, RenderSnapshot, TickOutcome};
pub use keymap::{ControlAction, KeyMap};
pub use state::{ControlState, DriveMode};
