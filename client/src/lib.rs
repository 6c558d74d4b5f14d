//! # Cat & Mouse Game Client
//!
//! Client-side synchronization for the cat and mouse arena. The server only
//! sends periodic full snapshots; this crate turns them into a smooth local
//! view.
//!
//! ## Architecture Overview
//!
//! ### Snapshot Reconciliation
//! Every `entities` message lists all live mice and cats. [`entity_map::EntityMap`]
//! diffs it against the local mirrors by id: new ids create mirrors, known
//! ids update them, and ids that disappeared are dropped. The player's own
//! mouse is excluded and only used to detect its death.
//!
//! ### Interpolation
//! Mirrors do not jump to reported positions. Each owns a
//! [`steering::LinearSteerer`] that moves it towards the latest target every
//! render frame, snapping only for implausibly large jumps.
//!
//! ### Frame Synchronized Networking
//! [`network::ServerConnection`] collects incoming frames at any time but
//! hands them out once per render frame, and sends queued messages once per
//! frame.
//!
//! ## Module Organization
//!
//! - `actors`: mate mice and cat mirrors, and the local player mouse
//! - `entity_map`: keyed create/update/delete reconciliation
//! - `game`: client phase state machine, tunnels and votes
//! - `input`: headless wandering input
//! - `network`: WebSocket connection and handshake
//! - `protocol`: client side of the JSON message protocol
//! - `steering`: linear interpolation towards a target

pub mod actors;
pub mod entity_map;
pub mod game;
pub mod input;
pub mod network;
pub mod protocol;
pub mod steering;
