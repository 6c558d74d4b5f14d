//! Client side of the handshake and message dispatch.

use log::info;
use shared::{
    CatRecord, ClientMessage, ConnectionState, EntityId, MiceRecord, Protocol, ProtocolError,
    SendBuffer, ServerMessage, StateWait, Vector2, VoteTally,
};

/// Server messages the game layer reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    Entities {
        mice: Vec<MiceRecord>,
        cats: Vec<CatRecord>,
    },
    Votes(VoteTally),
    /// Milliseconds of game time left.
    Time(u64),
    Victory,
}

pub struct ClientProtocol {
    protocol: Protocol<EntityId>,
    id: Option<EntityId>,
}

impl ClientProtocol {
    pub fn new() -> Self {
        Self {
            protocol: Protocol::new(),
            id: None,
        }
    }

    /// Id assigned by the server, once connected.
    pub fn id(&self) -> Option<EntityId> {
        self.id
    }

    pub fn current_state(&self) -> ConnectionState {
        self.protocol.current_state()
    }

    pub fn wait_for_connection(&mut self) -> Result<StateWait<EntityId>, ProtocolError> {
        self.protocol.await_state(ConnectionState::Connected)
    }

    pub fn send_hello(&mut self) {
        self.protocol.enqueue(&ClientMessage::Hello);
    }

    pub fn send_player(&mut self, position: Vector2, tunnel: Option<&str>, vote: Option<&str>) {
        self.protocol.enqueue(&ClientMessage::Player {
            player_x: position.x,
            player_y: position.y,
            tunnel_color: tunnel.map(str::to_string),
            vote_color: vote.map(str::to_string),
        });
    }

    pub fn send_quit(&mut self) {
        self.protocol.enqueue(&ClientMessage::Quit);
    }

    pub fn send(&mut self, message: &ClientMessage) {
        self.protocol.enqueue(message);
    }

    pub fn handle_incoming(&mut self, raw: &str) -> Option<ServerEvent> {
        match self.protocol.decode::<ServerMessage>(raw)? {
            ServerMessage::Hello { id } => {
                info!("Connected with id {}", id);
                self.id = Some(id);
                self.protocol
                    .transition_to(ConnectionState::Connected, Some(id));
                None
            }
            ServerMessage::Entities { mice, cats } => Some(ServerEvent::Entities { mice, cats }),
            ServerMessage::Votes { votes } => Some(ServerEvent::Votes(votes)),
            ServerMessage::Time { time } => Some(ServerEvent::Time(time)),
            ServerMessage::Victory => Some(ServerEvent::Victory),
        }
    }

    pub fn outbox_mut(&mut self) -> &mut SendBuffer {
        self.protocol.outbox_mut()
    }
}

impl Default for ClientProtocol {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hello_stores_id_and_resolves_wait() {
        let mut protocol = ClientProtocol::new();
        let mut wait = protocol.wait_for_connection().unwrap();

        assert!(protocol.handle_incoming(r#"{"type":"hello","id":5}"#).is_none());
        assert_eq!(protocol.id(), Some(5));
        assert_eq!(protocol.current_state(), ConnectionState::Connected);
        assert!(matches!(wait.try_take(), Some(Ok(Some(5)))));
    }

    #[test]
    fn test_wait_after_connect_is_immediate() {
        let mut protocol = ClientProtocol::new();
        protocol.handle_incoming(r#"{"type":"hello","id":3}"#);
        let mut wait = protocol.wait_for_connection().unwrap();
        assert!(matches!(wait.try_take(), Some(Ok(Some(3)))));
    }

    #[test]
    fn test_events_are_translated() {
        let mut protocol = ClientProtocol::new();
        assert_eq!(
            protocol.handle_incoming(r#"{"type":"time","time":1500}"#),
            Some(ServerEvent::Time(1500))
        );
        assert_eq!(
            protocol.handle_incoming(r#"{"type":"victory"}"#),
            Some(ServerEvent::Victory)
        );
        assert!(protocol.handle_incoming("not json").is_none());
    }

    #[test]
    fn test_player_message_shape() {
        let mut protocol = ClientProtocol::new();
        protocol.send_player(Vector2::new(1.5, 2.0), Some("red"), None);

        let frame = protocol.outbox_mut().frames().next().unwrap().clone();
        let value: serde_json::Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value["type"], "player");
        assert_eq!(value["playerX"], 1.5);
        assert_eq!(value["tunnelColor"], "red");
        assert!(value["voteColor"].is_null());
    }
}
