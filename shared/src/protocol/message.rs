//! Wire messages. Every frame is a JSON object with a mandatory `type` field.

use super::error::ProtocolError;
use crate::position::RunningDirection;
use crate::EntityId;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Tunnel color -> vote color -> number of votes.
pub type VoteTally = BTreeMap<String, BTreeMap<String, u32>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiceRecord {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
    pub running_direction: Option<RunningDirection>,
    pub tunnel: Option<String>,
    pub alive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatRecord {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
    pub running_direction: Option<RunningDirection>,
}

/// Messages sent from the server to its clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    Hello { id: EntityId },
    Entities {
        mice: Vec<MiceRecord>,
        cats: Vec<CatRecord>,
    },
    Votes { votes: VoteTally },
    /// Milliseconds of game time remaining.
    Time { time: u64 },
    Victory,
}

/// Messages sent from a client to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    Hello,
    #[serde(rename_all = "camelCase")]
    Player {
        player_x: f32,
        player_y: f32,
        tunnel_color: Option<String>,
        vote_color: Option<String>,
    },
    Quit,
}

/// A closed set of message kinds that can cross the wire.
pub trait WireMessage: Serialize + DeserializeOwned {
    /// Every `type` tag this message set understands.
    const TYPES: &'static [&'static str];
}

impl WireMessage for ServerMessage {
    const TYPES: &'static [&'static str] = &["hello", "entities", "votes", "time", "victory"];
}

impl WireMessage for ClientMessage {
    const TYPES: &'static [&'static str] = &["hello", "player", "quit"];
}

/// Serializes a message to its JSON text.
pub fn encode<M: WireMessage>(message: &M) -> Result<String, ProtocolError> {
    serde_json::to_string(message).map_err(ProtocolError::Encode)
}

/// Parses a raw frame. The `type` tag is checked first so that an unknown
/// kind is reported separately from a known kind with a bad payload.
pub fn decode<M: WireMessage>(raw: &str) -> Result<M, ProtocolError> {
    let value: Value = serde_json::from_str(raw).map_err(ProtocolError::MalformedJson)?;

    let message_type = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or(ProtocolError::MissingType)?
        .to_string();

    if !M::TYPES.contains(&message_type.as_str()) {
        return Err(ProtocolError::UnknownType(message_type));
    }

    serde_json::from_value(value).map_err(|source| ProtocolError::InvalidPayload {
        message_type,
        source,
    })
}
