//! Operator overlay window.
//!
//! The presentation collaborator: an egui window that shows the driving
//! status (or the help screen) from the latest render snapshot, and feeds
//! raw key presses into the control loop's key queue. It never mutates
//! control state itself: keys go through the key table like any other
//! input, and the snapshot is consumed read-only.

use std::time::Duration;

use eframe::egui::{self, Color32, RichText};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::control::{DriveMode, RenderSnapshot};
use crate::input::keys::{self, Key};

const HELP_LINES: [&str; 12] = [
    "Press 'h' to return on driving screen",
    "Press 'ESC' to exit the program",
    "Press 'z' or 'top arrow' to increase throttle",
    "Press 's' or 'bottom arrow' to decrease throttle",
    "Press 'SPACE' to reset throttle to zero",
    "Press 'd' or 'right arrow' to increase angle to right side",
    "Press 'q' or 'left arrow' to increase angle to left side",
    "Press 'TAB' to reset angle to zero",
    "Press 'p' to start autopilot mode",
    "Press 'u' to start user mode",
    "Press 'j' to enable/disable joysticks",
    "Press 'r' to enable/disable records for training",
];

const TEXT_GREEN: Color32 = Color32::from_rgb(0, 100, 0);
const RECORD_RED: Color32 = Color32::from_rgb(200, 0, 0);
const PILOT_GREEN: Color32 = Color32::from_rgb(120, 220, 120);
const USER_RED: Color32 = Color32::from_rgb(220, 100, 100);

pub struct OverlayApp {
    snapshot_rx: watch::Receiver<RenderSnapshot>,
    key_tx: mpsc::Sender<Key>,
    cancel: CancellationToken,
}

impl OverlayApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        snapshot_rx: watch::Receiver<RenderSnapshot>,
        key_tx: mpsc::Sender<Key>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            snapshot_rx,
            key_tx,
            cancel,
        }
    }

    /// Queues this repaint's key-down events for the control loop. The
    /// loop takes one key per tick; the queue is bounded and overflow is
    /// dropped.
    fn forward_keys(&mut self, ctx: &egui::Context) {
        let pressed: Vec<Key> = ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Key {
                        key,
                        pressed: true,
                        repeat: false,
                        ..
                    } => keys::from_egui(*key),
                    _ => None,
                })
                .collect()
        });

        for key in pressed {
            if let Err(e) = self.key_tx.try_send(key) {
                debug!("Key queue full, dropping key: {}", e);
            }
        }
    }

    fn help_screen(ui: &mut egui::Ui) {
        for line in HELP_LINES {
            ui.label(RichText::new(line).color(TEXT_GREEN).size(16.0));
        }
    }

    fn driving_screen(ui: &mut egui::Ui, snapshot: &RenderSnapshot) {
        ui.label(RichText::new("(Press 'h' for help)").color(TEXT_GREEN).size(14.0));

        if snapshot.state.recording {
            ui.label(
                RichText::new("* RECORDING REQUESTED...")
                    .color(RECORD_RED)
                    .size(14.0),
            );
        }

        ui.add_space(ui.available_height() - 80.0);

        match snapshot.state.mode {
            DriveMode::Pilot => {
                ui.label(
                    RichText::new("Driving mode: AUTO PILOT")
                        .color(PILOT_GREEN)
                        .size(16.0),
                );
            }
            DriveMode::User => {
                let angle = snapshot.state.angle;
                let side = if angle > 0.0 {
                    "RIGHT"
                } else if angle < 0.0 {
                    "LEFT"
                } else {
                    ""
                };
                ui.label(
                    RichText::new(format!("Angle: {:.0}% {}", angle.abs() * 100.0, side))
                        .color(axis_color(angle))
                        .size(14.0),
                );

                let throttle = snapshot.state.throttle;
                ui.label(
                    RichText::new(format!("Throttle: {:.0}%", throttle * 100.0))
                        .color(axis_color(throttle))
                        .size(14.0),
                );

                ui.label(
                    RichText::new("Driving mode: USER")
                        .color(USER_RED)
                        .size(16.0),
                );
            }
        }
    }
}

fn axis_color(value: f32) -> Color32 {
    if value > 0.0 {
        Color32::from_rgb(220, 20, 20)
    } else if value < 0.0 {
        Color32::from_rgb(20, 20, 220)
    } else {
        Color32::from_rgb(160, 160, 160)
    }
}

impl eframe::App for OverlayApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Closing the window is equivalent to the exit key.
        if ctx.input(|i| i.viewport().close_requested()) {
            self.cancel.cancel();
        }
        if self.cancel.is_cancelled() {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }

        self.forward_keys(ctx);

        let snapshot = self.snapshot_rx.borrow().clone();
        egui::CentralPanel::default().show(ctx, |ui| {
            if snapshot.display_help {
                Self::help_screen(ui);
            } else {
                Self::driving_screen(ui, &snapshot);
            }
        });

        // Snapshots arrive from the control loop, not from egui events, so
        // poll for repaints at a modest rate.
        ctx.request_repaint_after(Duration::from_millis(50));
    }
}
