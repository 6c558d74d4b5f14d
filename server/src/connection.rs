//! One client connection as seen by the game loop.

use crate::protocol::{PlayerCommand, ServerProtocol};
use log::{error, warn};
use shared::{BoxedSink, EntityId, ProtocolError, ServerMessage, StateWait, Transport};

/// Network-assigned handle of a socket, independent of the player id.
pub type ConnectionId = u32;

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionEvent {
    /// The handshake finished; the player may join.
    Admitted(EntityId),
    Command(EntityId, PlayerCommand),
}

pub struct ClientConnection {
    pub id: ConnectionId,
    transport: Transport<BoxedSink>,
    protocol: ServerProtocol,
    handshake: Option<StateWait<EntityId>>,
}

impl ClientConnection {
    pub fn new(
        id: ConnectionId,
        player_id: EntityId,
        sink: BoxedSink,
    ) -> Result<Self, ProtocolError> {
        let mut protocol = ServerProtocol::new(player_id);
        let handshake = protocol.wait_for_connection()?;

        Ok(Self {
            id,
            transport: Transport::new(sink),
            protocol,
            handshake: Some(handshake),
        })
    }

    pub fn player_id(&self) -> EntityId {
        self.protocol.player_id()
    }

    pub fn is_connected(&self) -> bool {
        self.protocol.is_connected()
    }

    pub fn push_incoming(&mut self, raw: String) {
        self.transport.push_incoming(raw);
    }

    pub fn set_on_close<F>(&mut self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.transport.set_on_close(callback);
    }

    pub fn close(&mut self) {
        self.transport.close();
    }

    pub fn is_closed(&self) -> bool {
        self.transport.is_closed()
    }

    /// Swaps the inbound buffer and handles this tick's batch in arrival
    /// order. The handshake wait is checked after every message so a player
    /// is admitted on the tick its hello arrives.
    pub fn dispatch(&mut self) -> Vec<ConnectionEvent> {
        self.transport.swap();

        let mut events = Vec::new();
        for raw in self.transport.incoming() {
            let command = self.protocol.handle_incoming(raw);

            if let Some(player_id) = poll_handshake(&mut self.handshake) {
                events.push(ConnectionEvent::Admitted(player_id));
            }
            if let Some(command) = command {
                events.push(ConnectionEvent::Command(self.protocol.player_id(), command));
            }
        }
        events
    }

    pub fn send(&mut self, message: &ServerMessage) {
        self.protocol.send(message);
    }

    pub fn send_frame(&mut self, frame: String) {
        self.protocol.send_frame(frame);
    }

    pub fn flush(&mut self) {
        self.transport.flush(self.protocol.outbox_mut());
    }
}

fn poll_handshake(handshake: &mut Option<StateWait<EntityId>>) -> Option<EntityId> {
    let wait = handshake.as_mut()?;
    let outcome = wait.try_take()?;
    *handshake = None;

    match outcome {
        Ok(Some(player_id)) => Some(player_id),
        Ok(None) => {
            error!("Handshake resolved without a player id");
            None
        }
        Err(e) => {
            warn!("Handshake wait failed: {}", e);
            None
        }
    }
}
