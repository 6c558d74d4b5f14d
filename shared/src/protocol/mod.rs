//! Handshake state machine and typed JSON framing shared by both roles.

mod error;
mod message;
mod state;

pub use error::ProtocolError;
pub use message::{
    decode, encode, CatRecord, ClientMessage, MiceRecord, ServerMessage, VoteTally, WireMessage,
};
pub use state::{ConnectionState, StateMachine, StateWait};

use crate::transport::SendBuffer;
use log::{error, warn};

/// Connection state plus the outbound queue of one protocol endpoint.
/// `V` is the value handed to whoever waits for a transition, the player id
/// in both roles.
pub struct Protocol<V> {
    machine: StateMachine<ConnectionState, V>,
    outbox: SendBuffer,
}

impl<V: Clone> Protocol<V> {
    pub fn new() -> Self {
        Self {
            machine: StateMachine::new(ConnectionState::Unconnected),
            outbox: SendBuffer::new(),
        }
    }

    pub fn current_state(&self) -> ConnectionState {
        self.machine.current_state()
    }

    pub fn is_connected(&self) -> bool {
        self.current_state() == ConnectionState::Connected
    }

    pub fn await_state(&mut self, expected: ConnectionState) -> Result<StateWait<V>, ProtocolError> {
        self.machine.await_state(expected)
    }

    pub fn transition_to(&mut self, state: ConnectionState, value: Option<V>) {
        self.machine.transition_to(state, value);
    }

    /// Serializes `message` onto the outbound queue. Never blocks.
    pub fn enqueue<M: WireMessage>(&mut self, message: &M) {
        match encode(message) {
            Ok(frame) => self.outbox.push(frame),
            Err(e) => error!("Dropping outgoing message: {}", e),
        }
    }

    /// Queues an already encoded frame, used for broadcasts that are
    /// serialized once for every connection.
    pub fn enqueue_frame(&mut self, frame: String) {
        self.outbox.push(frame);
    }

    /// Parses an incoming frame. Malformed or unknown messages are logged and
    /// dropped; the protocol stays usable either way.
    pub fn decode<M: WireMessage>(&self, raw: &str) -> Option<M> {
        match decode(raw) {
            Ok(message) => Some(message),
            Err(e) => {
                warn!("Discarding message '{}': {}", truncated(raw), e);
                None
            }
        }
    }

    pub fn outbox_mut(&mut self) -> &mut SendBuffer {
        &mut self.outbox
    }
}

/// Longest prefix of a rejected frame that ends up in the log.
const LOGGED_FRAME_CHARS: usize = 120;

fn truncated(raw: &str) -> &str {
    match raw.char_indices().nth(LOGGED_FRAME_CHARS) {
        Some((end, _)) => &raw[..end],
        None => raw,
    }
}

impl<V: Clone> Default for Protocol<V> {
    fn default() -> Self {
        Self::new()
    }
}
