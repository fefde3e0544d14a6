pub mod config;
pub mod control;
pub mod input;
pub mod mqtt;
pub mod ui;

use crate::config::TeleopConfig;
use crate::control::{ControlLoop, ControlState, DeviceReading, RenderSnapshot};
use crate::input::gamepad::PollerHandle;
use crate::input::keys::Key;
use crate::mqtt::link::MqttLink;
use crate::mqtt::messages::VideoFrame;
use crate::ui::OverlayApp;
use color_eyre::{eyre::eyre, Result};
use eframe::egui;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let config = TeleopConfig::load().await?;
    info!("Session configuration: {:?}", config);

    // One token tears the whole session down: the exit key, a closed
    // overlay window or a dead transport all end up here.
    let cancel = CancellationToken::new();

    let (frame_tx, frame_rx) = mpsc::channel::<VideoFrame>(100);
    let (key_tx, key_rx) = mpsc::channel::<Key>(100);
    let (command_tx, command_rx) = mpsc::channel::<ControlState>(100);
    let (readings_tx, readings_rx) = watch::channel(Vec::<DeviceReading>::new());

    let _poller_handle = PollerHandle::spawn(None, readings_tx, cancel.clone())
        .map_err(|e| eyre!("Failed to spawn gamepad poller: {}", e))?;

    let link = MqttLink::new(config.mqtt.clone(), frame_tx, command_rx, cancel.clone());
    tokio::spawn(async move {
        if let Err(e) = link.run().await {
            error!("MQTT link failed: {}", e);
        }
    });

    let driver = ControlLoop::new(config.control.clone());
    let (snapshot_tx, snapshot_rx) = watch::channel(driver.render_snapshot());
    let loop_cancel = cancel.clone();
    tokio::spawn(async move {
        run_control_loop(
            driver,
            frame_rx,
            key_rx,
            readings_rx,
            command_tx,
            snapshot_tx,
            loop_cancel,
        )
        .await;
    });

    info!("Starting overlay UI");
    let mut native_options = eframe::NativeOptions::default();
    native_options.viewport = egui::ViewportBuilder::default().with_inner_size(egui::vec2(
        config.frame.width as f32,
        config.frame.height as f32,
    ));

    let ui_cancel = cancel.clone();
    if let Err(e) = eframe::run_native(
        "teledrive",
        native_options,
        Box::new(move |cc| Ok(Box::new(OverlayApp::new(cc, snapshot_rx, key_tx, ui_cancel)))),
    ) {
        error!("UI terminated with error: {}", e);
    }

    cancel.cancel();
    info!("Session ended");
    Ok(())
}

/// One tick per inbound frame: take at most one queued key, borrow the
/// latest device readings, run the control loop, ship the outcome.
async fn run_control_loop(
    mut driver: ControlLoop,
    mut frame_rx: mpsc::Receiver<VideoFrame>,
    mut key_rx: mpsc::Receiver<Key>,
    readings_rx: watch::Receiver<Vec<DeviceReading>>,
    command_tx: mpsc::Sender<ControlState>,
    snapshot_tx: watch::Sender<RenderSnapshot>,
    cancel: CancellationToken,
) {
    info!("Control loop started, waiting for frames");
    let mut ticks: usize = 0;

    loop {
        let frame = tokio::select! {
            _ = cancel.cancelled() => break,
            frame = frame_rx.recv() => match frame {
                Some(frame) => frame,
                None => {
                    warn!("Frame channel closed, stopping control loop");
                    break;
                }
            },
        };

        let key = key_rx.try_recv().ok();
        let readings = readings_rx.borrow().clone();
        let outcome = driver.tick(key, &readings);

        ticks += 1;
        debug!(
            "Tick {} on frame of {} bytes received {}",
            ticks,
            frame.bytes.len(),
            frame.received.format("%H:%M:%S.%3f")
        );
        if ticks % 1000 == 0 {
            info!("Control loop processed {} frames", ticks);
        }

        if snapshot_tx.send(outcome.render).is_err() {
            debug!("Overlay gone, snapshot dropped");
        }
        if let Err(e) = command_tx.try_send(outcome.command) {
            warn!("Dropping command, publish queue full: {}", e);
        }

        if outcome.exit {
            info!("Tearing down session after {} ticks", ticks);
            cancel.cancel();
            break;
        }
    }

    info!("Control loop stopped");
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
