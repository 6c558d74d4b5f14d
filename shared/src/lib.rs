//! Types shared by the cat & mouse server and client: geometry primitives,
//! map data, the JSON wire protocol and the buffered message transport.

pub mod geometry;
pub mod map;
pub mod position;
pub mod protocol;
pub mod transport;
pub mod vector;

pub use geometry::{Projection, TunnelPath};
pub use map::{Hitbox, PlayfieldMap, Point, Tunnel};
pub use position::{Position, RunningDirection};
pub use protocol::{
    decode, encode, CatRecord, ClientMessage, ConnectionState, MiceRecord, Protocol,
    ProtocolError, ServerMessage, StateMachine, StateWait, VoteTally, WireMessage,
};
pub use transport::{
    BoxedSink, FrameSink, ReceiveBuffer, SendBuffer, Transport, TransportError,
};
pub use vector::Vector2;

/// Server-assigned identity of a player or cat. Never reused while the server runs.
pub type EntityId = u32;

pub const MOUSE_SIZE: f32 = 13.0;
pub const MOUSE_SPEED: f32 = 0.03; // px per ms
pub const CAT_CENTER_OFFSET: f32 = 11.0;
pub const PORTAL_SIZE: f32 = 16.0;
pub const NOMINAL_FRAME_MS: f32 = 1000.0 / 60.0;
pub const MIRROR_STEER_SPEED: f32 = 0.05; // px per ms
pub const DEFAULT_TICK_MS: u64 = 100;
pub const GAME_DURATION_MS: u64 = 3 * 60 * 1000;
