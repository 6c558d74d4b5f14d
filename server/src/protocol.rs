//! Server side of the handshake and message dispatch.

use log::{debug, info, warn};
use shared::{
    ClientMessage, ConnectionState, EntityId, Position, Protocol, ProtocolError, SendBuffer,
    ServerMessage, StateWait,
};

/// Something a connected client asked its player to do.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCommand {
    Update {
        position: Position,
        tunnel: Option<String>,
        vote: Option<String>,
    },
    Quit,
}

pub struct ServerProtocol {
    protocol: Protocol<EntityId>,
    player_id: EntityId,
}

impl ServerProtocol {
    /// `player_id` is the identity handed out in the hello reply.
    pub fn new(player_id: EntityId) -> Self {
        Self {
            protocol: Protocol::new(),
            player_id,
        }
    }

    pub fn player_id(&self) -> EntityId {
        self.player_id
    }

    pub fn current_state(&self) -> ConnectionState {
        self.protocol.current_state()
    }

    pub fn is_connected(&self) -> bool {
        self.protocol.is_connected()
    }

    /// Resolves with the player id once the client said hello.
    pub fn wait_for_connection(&mut self) -> Result<StateWait<EntityId>, ProtocolError> {
        self.protocol.await_state(ConnectionState::Connected)
    }

    /// Dispatches one raw frame. Player and quit messages are ignored until
    /// the handshake is done.
    pub fn handle_incoming(&mut self, raw: &str) -> Option<PlayerCommand> {
        let message = self.protocol.decode::<ClientMessage>(raw)?;

        match message {
            ClientMessage::Hello => {
                self.protocol.enqueue(&ServerMessage::Hello {
                    id: self.player_id,
                });
                if !self.is_connected() {
                    info!("Handshake complete for player {}", self.player_id);
                }
                self.protocol
                    .transition_to(ConnectionState::Connected, Some(self.player_id));
                None
            }
            ClientMessage::Player {
                player_x, player_y, ..
            } if self.is_connected() && !(player_x.is_finite() && player_y.is_finite()) => {
                warn!(
                    "Discarding non-finite position ({}, {}) from player {}",
                    player_x, player_y, self.player_id
                );
                None
            }
            ClientMessage::Player {
                player_x,
                player_y,
                tunnel_color,
                vote_color,
            } if self.is_connected() => Some(PlayerCommand::Update {
                position: Position::new(player_x, player_y),
                tunnel: tunnel_color,
                vote: vote_color,
            }),
            ClientMessage::Quit if self.is_connected() => Some(PlayerCommand::Quit),
            other => {
                debug!(
                    "Ignoring {:?} from unconnected player {}",
                    other, self.player_id
                );
                None
            }
        }
    }

    pub fn send(&mut self, message: &ServerMessage) {
        self.protocol.enqueue(message);
    }

    pub fn send_frame(&mut self, frame: String) {
        self.protocol.enqueue_frame(frame);
    }

    pub fn outbox_mut(&mut self) -> &mut SendBuffer {
        self.protocol.outbox_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn sent(protocol: &mut ServerProtocol) -> Vec<Value> {
        protocol
            .outbox_mut()
            .frames()
            .map(|frame| serde_json::from_str(frame).unwrap())
            .collect()
    }

    #[test]
    fn test_hello_replies_with_id_and_connects() {
        let mut protocol = ServerProtocol::new(12);
        let mut wait = protocol.wait_for_connection().unwrap();

        assert!(protocol.handle_incoming(r#"{"type":"hello"}"#).is_none());

        assert_eq!(protocol.current_state(), ConnectionState::Connected);
        assert_eq!(sent(&mut protocol), vec![json!({ "type": "hello", "id": 12 })]);
        assert!(matches!(wait.try_take(), Some(Ok(Some(12)))));
    }

    #[test]
    fn test_player_message_ignored_before_hello() {
        let mut protocol = ServerProtocol::new(1);
        let raw = r#"{"type":"player","playerX":1,"playerY":2,"tunnelColor":null,"voteColor":null}"#;

        assert!(protocol.handle_incoming(raw).is_none());

        protocol.handle_incoming(r#"{"type":"hello"}"#);
        assert_eq!(
            protocol.handle_incoming(raw),
            Some(PlayerCommand::Update {
                position: Position::new(1.0, 2.0),
                tunnel: None,
                vote: None,
            })
        );
    }

    #[test]
    fn test_non_finite_position_is_dropped() {
        let mut protocol = ServerProtocol::new(1);
        protocol.handle_incoming(r#"{"type":"hello"}"#);

        let raw = r#"{"type":"player","playerX":1e39,"playerY":2,"tunnelColor":null,"voteColor":null}"#;
        assert!(protocol.handle_incoming(raw).is_none());
        assert!(protocol.is_connected());
    }

    #[test]
    fn test_quit_requires_connection() {
        let mut protocol = ServerProtocol::new(1);
        assert!(protocol.handle_incoming(r#"{"type":"quit"}"#).is_none());
        protocol.handle_incoming(r#"{"type":"hello"}"#);
        assert_eq!(
            protocol.handle_incoming(r#"{"type":"quit"}"#),
            Some(PlayerCommand::Quit)
        );
    }

    #[test]
    fn test_garbage_is_dropped() {
        let mut protocol = ServerProtocol::new(1);
        assert!(protocol.handle_incoming("}{").is_none());
        assert!(protocol.handle_incoming(r#"{"type":"fly"}"#).is_none());
        assert_eq!(protocol.current_state(), ConnectionState::Unconnected);
        assert!(protocol.outbox_mut().is_empty());
    }

    #[test]
    fn test_second_wait_faults() {
        let mut protocol = ServerProtocol::new(1);
        let _first = protocol.wait_for_connection().unwrap();
        assert!(matches!(
            protocol.wait_for_connection(),
            Err(ProtocolError::AlreadyWaiting)
        ));
    }
}
