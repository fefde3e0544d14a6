use std::time::Duration;

use chrono::{DateTime, Local};
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::config::MqttConfig;
use super::messages::{self, VideoFrame};
use crate::control::ControlState;

#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Failed,
    Reconnecting,
}

#[derive(Clone, Debug, Default)]
pub struct LinkStatus {
    pub connection_state: ConnectionState,
    pub frames_received: usize,
    pub commands_sent: usize,
    pub last_activity: Option<DateTime<Local>>,
}

#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("MQTT client error: {0}")]
    Client(#[from] rumqttc::ClientError),
}

/// Owns the broker connection for the session: forwards every publish on
/// the video topic to the control loop as a [`VideoFrame`] and publishes
/// each command snapshot on the control topic. Publish and poll failures
/// are logged and absorbed; the transport retries, the control core never
/// sees them.
pub struct MqttLink {
    client: AsyncClient,
    eventloop: rumqttc::EventLoop,
    config: MqttConfig,
    status: LinkStatus,
    frame_tx: mpsc::Sender<VideoFrame>,
    command_rx: mpsc::Receiver<ControlState>,
    cancel: CancellationToken,
}

impl MqttLink {
    pub fn new(
        config: MqttConfig,
        frame_tx: mpsc::Sender<VideoFrame>,
        command_rx: mpsc::Receiver<ControlState>,
        cancel: CancellationToken,
    ) -> Self {
        let mut options = MqttOptions::new("teledrive", config.host.as_str(), config.port);
        options.set_keep_alive(Duration::from_secs(5));
        if let Some(username) = &config.username {
            options.set_credentials(
                username.clone(),
                config.password.clone().unwrap_or_default(),
            );
        }

        let (client, eventloop) = AsyncClient::new(options, 100);

        MqttLink {
            client,
            eventloop,
            config,
            status: LinkStatus::default(),
            frame_tx,
            command_rx,
            cancel,
        }
    }

    /// Drives the connection until teardown: one select loop over the
    /// broker event loop, the outbound command queue and the cancellation
    /// token.
    pub async fn run(mut self) -> Result<(), LinkError> {
        self.status.connection_state = ConnectionState::Connecting;
        info!(
            "Connecting to MQTT broker {}:{}",
            self.config.host, self.config.port
        );

        if let Err(e) = self
            .client
            .subscribe(self.config.video_topic.as_str(), QoS::AtMostOnce)
            .await
        {
            // The subscription is queued client-side; a failure here means
            // the client itself is gone.
            error!("Failed to subscribe to {}: {}", self.config.video_topic, e);
            self.status.connection_state = ConnectionState::Failed;
            return Err(LinkError::Client(e));
        }

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!("Session teardown requested, disconnecting from broker");
                    if let Err(e) = self.client.disconnect().await {
                        debug!("Disconnect failed: {}", e);
                    }
                    break;
                }
                event = self.eventloop.poll() => match event {
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        self.status.connection_state = ConnectionState::Connected;
                        info!("Connected to MQTT broker, watching {}", self.config.video_topic);
                    }
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        self.handle_publish(&publish.topic, &publish.payload);
                    }
                    Ok(_) => {}
                    Err(e) => {
                        self.status.connection_state = ConnectionState::Reconnecting;
                        warn!("MQTT connection error: {}, retrying", e);
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                },
                command = self.command_rx.recv() => match command {
                    Some(state) => self.publish_command(&state).await,
                    None => {
                        debug!("Command channel closed, stopping link");
                        break;
                    }
                },
            }
        }

        self.status.connection_state = ConnectionState::Disconnected;
        info!(
            "MQTT link stopped after {} frames in / {} commands out",
            self.status.frames_received, self.status.commands_sent
        );
        Ok(())
    }

    fn handle_publish(&mut self, topic: &str, payload: &[u8]) {
        if topic != self.config.video_topic {
            debug!("Ignoring message on unrelated topic {}", topic);
            return;
        }

        match VideoFrame::decode(payload) {
            Ok(frame) => {
                self.status.frames_received += 1;
                self.status.last_activity = Some(frame.received);
                // A lagging control loop drops frames instead of queueing
                // stale tick clocks.
                if let Err(e) = self.frame_tx.try_send(frame) {
                    debug!("Control loop busy, dropping frame: {}", e);
                }
            }
            Err(e) => warn!("Dropping undecodable frame: {}", e),
        }
    }

    async fn publish_command(&mut self, state: &ControlState) {
        let payload = match messages::encode_command(state) {
            Ok(payload) => payload,
            Err(e) => {
                error!("Failed to encode command: {}", e);
                return;
            }
        };

        match self
            .client
            .publish(
                self.config.ctrl_topic.as_str(),
                QoS::AtMostOnce,
                false,
                payload,
            )
            .await
        {
            Ok(()) => {
                self.status.commands_sent += 1;
                self.status.last_activity = Some(Local::now());
                if self.status.commands_sent % 500 == 0 {
                    info!(
                        "Link stats: {} frames in, {} commands out",
                        self.status.frames_received, self.status.commands_sent
                    );
                }
            }
            Err(e) => warn!("Failed to publish command: {}", e),
        }
    }
}
