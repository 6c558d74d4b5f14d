//! # Cat & Mouse Game Server
//!
//! Authoritative server for the cat and mouse arena. It tracks player mice
//! and AI cats on a fixed tick and streams full entity snapshots to every
//! connected client over WebSocket.
//!
//! ## Architecture Design
//!
//! ### Single Owner Game Loop
//! All game state lives in one [`game::Game`] owned by the server loop.
//! Socket tasks never touch it directly; they forward frames as events and
//! the game buffers them per connection. Each tick swaps those buffers, so a
//! frame arriving mid-tick is handled on the following one.
//!
//! ### Handshake
//! A socket becomes a player only after `{"type":"hello"}`. The server
//! answers with the player's id and admits the player on that same tick.
//! The first admitted player starts the game clock.
//!
//! ### Lifecycle
//! `Pending -> Running -> Victory | Loss`. The mice win when at least two
//! of them are alive in the same tunnel. They lose when time runs out or
//! when every mouse is dead.
//!
//! ## Module Organization
//!
//! - `brain`: cat AI (patrol, stalker, lazy pursuer) behind a target registry
//! - `config`: tick rate, game duration, spawn point and cat roster
//! - `connection`: per-socket transport, protocol and handshake wait
//! - `entity`: players, cats and id allocation
//! - `game`: the lifecycle state machine and snapshot broadcasts
//! - `network`: WebSocket accept loop and the tick driven server loop
//! - `protocol`: server side of the JSON message protocol
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::GameConfig;
//! use server::game::Game;
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let game = Game::new(GameConfig::default());
//!     let server = Server::bind("127.0.0.1:8080", game).await?;
//!     server.run().await
//! }
//! ```

pub mod brain;
pub mod config;
pub mod connection;
pub mod entity;
pub mod game;
pub mod network;
pub mod protocol;
