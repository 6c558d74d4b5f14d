//! WebSocket connection to the server with frame-synchronized buffering

use crate::protocol::{ClientProtocol, ServerEvent};
use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use shared::{BoxedSink, ClientMessage, EntityId, ProtocolError, Transport};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::time::{interval, MissedTickBehavior};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, Message};

/// How often inbound messages are pumped while waiting for the handshake.
pub const HANDSHAKE_PUMP_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("could not connect: {0}")]
    WebSocket(#[from] tungstenite::Error),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("connection closed during handshake")]
    ClosedDuringHandshake,
    #[error("handshake finished without a player id")]
    MissingId,
}

pub struct ServerConnection {
    transport: Transport<BoxedSink>,
    protocol: ClientProtocol,
    inbound: mpsc::UnboundedReceiver<String>,
    early_events: Vec<ServerEvent>,
}

impl ServerConnection {
    /// Connects and queues the hello message. The socket is open once this
    /// returns.
    pub async fn open(url: &str) -> Result<Self, ConnectionError> {
        let (websocket, _) = connect_async(url).await?;
        info!("Connected to {}", url);

        let (mut write, mut read) = websocket.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();
        let (in_tx, in_rx) = mpsc::unbounded_channel::<String>();

        tokio::spawn(async move {
            while let Some(frame) = out_rx.recv().await {
                if let Err(e) = write.send(Message::Text(frame)).await {
                    debug!("Write to server failed: {}", e);
                    break;
                }
            }
            let _ = write.close().await;
        });

        tokio::spawn(async move {
            while let Some(message) = read.next().await {
                match message {
                    Ok(Message::Text(text)) => {
                        if in_tx.send(text).is_err() {
                            break;
                        }
                    }
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!("Error reading from server: {}", e);
                        break;
                    }
                }
            }
        });

        Ok(Self::from_parts(Box::new(out_tx), in_rx))
    }

    /// Builds a connection over any frame sink and inbound channel.
    pub fn from_parts(sink: BoxedSink, inbound: mpsc::UnboundedReceiver<String>) -> Self {
        let mut protocol = ClientProtocol::new();
        protocol.send_hello();

        Self {
            transport: Transport::new(sink),
            protocol,
            inbound,
            early_events: Vec::new(),
        }
    }

    pub fn id(&self) -> Option<EntityId> {
        self.protocol.id()
    }

    pub fn is_closed(&self) -> bool {
        self.transport.is_closed()
    }

    pub fn set_on_close<F>(&mut self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.transport.set_on_close(callback);
    }

    /// Flushes and pumps until the server answers the hello. Events that
    /// arrive with the answer are kept for the first frame.
    pub async fn wait_for_connection(&mut self) -> Result<EntityId, ConnectionError> {
        let mut wait = self.protocol.wait_for_connection()?;
        let mut pump = interval(HANDSHAKE_PUMP_INTERVAL);
        pump.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            pump.tick().await;

            self.flush();
            let events = self.pump();
            self.early_events.extend(events);

            if let Some(outcome) = wait.try_take() {
                return outcome?.ok_or(ConnectionError::MissingId);
            }
            if self.is_closed() {
                return Err(ConnectionError::ClosedDuringHandshake);
            }
        }
    }

    /// Moves everything received so far into the receive buffer, swaps it
    /// and dispatches the batch.
    fn pump(&mut self) -> Vec<ServerEvent> {
        loop {
            match self.inbound.try_recv() {
                Ok(frame) => self.transport.push_incoming(frame),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.transport.close();
                    break;
                }
            }
        }

        self.transport.swap();
        self.transport
            .incoming()
            .iter()
            .filter_map(|raw| self.protocol.handle_incoming(raw))
            .collect()
    }

    /// Start of a render frame: the events to apply this frame.
    pub fn begin_frame(&mut self) -> Vec<ServerEvent> {
        let mut events = std::mem::take(&mut self.early_events);
        events.extend(self.pump());
        events
    }

    pub fn send(&mut self, message: &ClientMessage) {
        self.protocol.send(message);
    }

    /// End of a render frame: sends everything queued.
    pub fn end_frame(&mut self) {
        self.flush();
    }

    fn flush(&mut self) {
        self.transport.flush(self.protocol.outbox_mut());
    }
}
