use std::collections::BTreeMap;

use chrono::Local;
use gilrs::{Axis, Event, EventType, Gilrs};
use statum::{machine, state};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::control::DeviceReading;

const NEUTRAL: (f32, f32) = (0.0, 0.0);

// Poller settings
#[derive(Clone, Debug)]
pub struct PollerSettings {
    /// Analog stick deadzone as a fraction (0.0-1.0). Defaults to 0.0 so
    /// that arbitration sees the raw rounded readings; a non-zero value is
    /// an operator opt-in for drifting sticks.
    pub deadzone: f32,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self { deadzone: 0.0 }
    }
}

// Poller errors
#[derive(Debug, thiserror::Error)]
pub enum PollerError {
    #[error("Failed to initialize joystick interface: {0}")]
    InitializationError(String),
}

// Poller lifecycle states
#[state]
#[derive(Debug, Clone)]
pub enum PollerState {
    Initializing,
    Polling,
}

#[machine]
#[derive(Debug)]
pub struct GamepadPoller<S: PollerState> {
    // Gilrs context; dropping it releases the device handles
    gilrs: Gilrs,

    // Poller settings
    settings: PollerSettings,

    // Latest readings, published to the control loop
    readings_tx: watch::Sender<Vec<DeviceReading>>,

    // Left-stick state per device index; BTreeMap keeps snapshots in
    // stable index order
    axes: BTreeMap<usize, (f32, f32)>,

    // Session teardown signal
    cancel: CancellationToken,
}

impl GamepadPoller<Initializing> {
    pub fn create(
        settings: Option<PollerSettings>,
        readings_tx: watch::Sender<Vec<DeviceReading>>,
        cancel: CancellationToken,
    ) -> Result<Self, PollerError> {
        let settings = settings.unwrap_or_default();
        debug!("Creating gamepad poller with settings: {:?}", settings);

        let gilrs = match Gilrs::new() {
            Ok(g) => {
                info!("Successfully initialized gilrs");
                g
            }
            Err(e) => {
                error!("Failed to initialize gilrs: {}", e);
                return Err(PollerError::InitializationError(e.to_string()));
            }
        };

        Ok(Self::new(
            gilrs,
            settings,
            readings_tx,
            BTreeMap::new(),
            cancel,
        ))
    }

    // Enumerate connected devices and transition to Polling
    pub fn initialize(mut self) -> Result<GamepadPoller<Polling>, PollerError> {
        let connected: Vec<(usize, String)> = self
            .gilrs
            .gamepads()
            .map(|(id, gamepad)| (usize::from(id), gamepad.name().to_string()))
            .collect();

        if connected.is_empty() {
            warn!("No joystick connected, keyboard control only");
        } else {
            info!("Found {} joysticks:", connected.len());
            for (index, name) in &connected {
                info!("  [{}] {}", index, name);
                self.axes.insert(*index, NEUTRAL);
            }
        }

        info!("Gamepad poller initialized, transitioning to Polling state");
        Ok(self.transition())
    }
}

impl GamepadPoller<Polling> {
    // Run the poll loop until the session is torn down
    pub fn run_poll_loop(&mut self) {
        info!("Starting gamepad poll loop");

        let mut published = 0;
        let mut last_log_time = Local::now();
        let log_interval = chrono::Duration::seconds(30);

        while !self.cancel.is_cancelled() {
            let mut dirty = false;
            while let Some(Event { id, event, .. }) = self.gilrs.next_event() {
                dirty |= self.apply_event(usize::from(id), event);
            }

            if dirty {
                let snapshot = self.snapshot();
                debug!("Publishing {} device readings", snapshot.len());
                if self.readings_tx.send(snapshot).is_err() {
                    warn!("Readings channel closed, stopping poll loop");
                    break;
                }
                published += 1;
            }

            let now = Local::now();
            if now - last_log_time > log_interval {
                info!(
                    "Gamepad poller stats: {} snapshots published, {} devices connected",
                    published,
                    self.axes.len()
                );
                published = 0;
                last_log_time = now;
            }

            // Small sleep to prevent 100% CPU usage
            std::thread::sleep(std::time::Duration::from_micros(100));
        }

        info!("Releasing joystick handles");
    }

    // Fold one gilrs event into the per-device axis state. Returns whether
    // the state changed.
    fn apply_event(&mut self, index: usize, event: EventType) -> bool {
        match event {
            EventType::AxisChanged(Axis::LeftStickX, value, _) => {
                let entry = self.axes.entry(index).or_insert(NEUTRAL);
                entry.0 = apply_deadzone(value, self.settings.deadzone);
                true
            }
            EventType::AxisChanged(Axis::LeftStickY, value, _) => {
                let entry = self.axes.entry(index).or_insert(NEUTRAL);
                // gilrs reports stick Y up-positive; readings keep the
                // down-positive device convention
                entry.1 = -apply_deadzone(value, self.settings.deadzone);
                true
            }
            EventType::Connected => {
                info!("Joystick {} connected", index);
                self.axes.entry(index).or_insert(NEUTRAL);
                true
            }
            EventType::Disconnected => {
                warn!("Joystick {} disconnected", index);
                self.axes.remove(&index);
                true
            }
            _ => {
                debug!("Ignoring gilrs event: {:?}", event);
                false
            }
        }
    }

    // Ordered per-device readings for the current state
    fn snapshot(&self) -> Vec<DeviceReading> {
        self.axes
            .iter()
            .map(|(&index, &(x, y))| DeviceReading::new(index, x, y))
            .collect()
    }
}

// Public interface for spawning the poller
pub struct PollerHandle {}

impl PollerHandle {
    // Create a new poller and spawn it as a tokio task
    pub fn spawn(
        settings: Option<PollerSettings>,
        readings_tx: watch::Sender<Vec<DeviceReading>>,
        cancel: CancellationToken,
    ) -> Result<Self, PollerError> {
        info!("Spawning gamepad poller with settings: {:?}", settings);

        let poller = GamepadPoller::create(settings, readings_tx, cancel)?;

        tokio::spawn(async move {
            match poller.initialize() {
                Ok(mut polling) => {
                    polling.run_poll_loop();
                    info!("Gamepad poller task finished");
                }
                Err(e) => {
                    error!("Failed to initialize gamepad poller: {}", e);
                }
            }
        });

        Ok(Self {})
    }
}

// Helper function to apply deadzone to analog stick values
fn apply_deadzone(value: f32, deadzone: f32) -> f32 {
    if value.abs() < deadzone {
        0.0
    } else {
        // Rescale the value to the range outside the deadzone
        let sign = if value < 0.0 { -1.0 } else { 1.0 };
        sign * (value.abs() - deadzone) / (1.0 - deadzone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_deadzone_passes_values_through() {
        assert_eq!(apply_deadzone(0.42, 0.0), 0.42);
        assert_eq!(apply_deadzone(-0.42, 0.0), -0.42);
    }

    #[test]
    fn deadzone_zeroes_small_values_and_rescales_the_rest() {
        assert_eq!(apply_deadzone(0.04, 0.05), 0.0);
        assert_eq!(apply_deadzone(-0.04, 0.05), 0.0);
        let rescaled = apply_deadzone(1.0, 0.05);
        assert!((rescaled - 1.0).abs() < 1e-6);
    }
}
