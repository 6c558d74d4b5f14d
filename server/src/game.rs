//! Authoritative game lifecycle.
//!
//! One [`Game`] owns every connection, player and cat. It is only ever
//! touched from the server loop: network tasks hand raw frames over through
//! [`Game::receive`], and all processing happens inside [`Game::update`]
//! once per tick.

use crate::brain::{TargetRegistry, TargetView};
use crate::config::GameConfig;
use crate::connection::{ClientConnection, ConnectionEvent, ConnectionId};
use crate::entity::{IdAllocator, Player, ServerCat};
use crate::protocol::PlayerCommand;
use log::{debug, error, info};
use shared::{encode, BoxedSink, EntityId, PlayfieldMap, Position, ServerMessage, VoteTally};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Pending,
    Running,
    Victory,
    Loss,
}

impl GameState {
    pub fn has_ended(self) -> bool {
        matches!(self, GameState::Victory | GameState::Loss)
    }
}

/// Read-only view of the active players handed to cat brains.
struct ActivePlayers<'a>(&'a BTreeMap<EntityId, Player>);

impl TargetRegistry for ActivePlayers<'_> {
    fn closest_overground_alive(&self, from: Position) -> Option<EntityId> {
        self.0
            .values()
            .filter(|player| player.is_alive() && player.tunnel().is_none())
            .min_by(|a, b| {
                a.position()
                    .distance_squared(&from)
                    .total_cmp(&b.position().distance_squared(&from))
            })
            .map(|player| player.id)
    }

    fn target(&self, id: EntityId) -> Option<TargetView> {
        self.0.get(&id).map(|player| TargetView {
            position: player.position(),
            alive: player.is_alive(),
            in_tunnel: player.tunnel().is_some(),
        })
    }
}

pub struct Game {
    config: GameConfig,
    map: PlayfieldMap,
    ids: IdAllocator,
    connections: BTreeMap<ConnectionId, ClientConnection>,
    players: BTreeMap<EntityId, Player>,
    cats: Vec<ServerCat>,
    state: GameState,
    start_time: Option<Instant>,
    last_time_broadcast: Option<u64>,
    tick: u64,
    closed_tx: mpsc::UnboundedSender<ConnectionId>,
    closed_rx: mpsc::UnboundedReceiver<ConnectionId>,
}

impl Game {
    pub fn new(config: GameConfig) -> Self {
        Self::with_map(config, PlayfieldMap::default())
    }

    pub fn with_map(config: GameConfig, map: PlayfieldMap) -> Self {
        let mut ids = IdAllocator::new();
        let cats = config
            .cats
            .iter()
            .enumerate()
            .map(|(index, spawn)| {
                let seed = config.seed.map(|seed| seed.wrapping_add(index as u64));
                ServerCat::new(ids.allocate(), spawn.position, spawn.brain.build(seed))
            })
            .collect();

        let (closed_tx, closed_rx) = mpsc::unbounded_channel();

        Self {
            config,
            map,
            ids,
            connections: BTreeMap::new(),
            players: BTreeMap::new(),
            cats,
            state: GameState::Pending,
            start_time: None,
            last_time_broadcast: None,
            tick: 0,
            closed_tx,
            closed_rx,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn player(&self, id: EntityId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn cats(&self) -> &[ServerCat] {
        &self.cats
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Registers a new socket. Returns false, dropping the sink, when the
    /// game has already ended.
    pub fn connection_opened(&mut self, id: ConnectionId, sink: BoxedSink) -> bool {
        if self.state.has_ended() {
            info!("Connection {} tried joining an ended game", id);
            return false;
        }

        let player_id = self.ids.allocate();
        let mut connection = match ClientConnection::new(id, player_id, sink) {
            Ok(connection) => connection,
            Err(e) => {
                error!("Could not set up connection {}: {}", id, e);
                return false;
            }
        };

        let closed_tx = self.closed_tx.clone();
        connection.set_on_close(move || {
            // The game may already be gone during shutdown.
            let _ = closed_tx.send(id);
        });

        debug!("Connection {} opened for player {}", id, player_id);
        self.connections.insert(id, connection);
        true
    }

    /// Queues a raw frame. Nothing is processed until the next update.
    pub fn receive(&mut self, id: ConnectionId, raw: String) {
        if let Some(connection) = self.connections.get_mut(&id) {
            connection.push_incoming(raw);
        }
    }

    /// Marks a connection closed; its player is removed at the start of the
    /// next update.
    pub fn connection_closed(&mut self, id: ConnectionId) {
        if let Some(connection) = self.connections.get_mut(&id) {
            connection.close();
        }
    }

    /// Runs one tick.
    pub fn update(&mut self, now: Instant) {
        self.tick += 1;

        self.reap_closed();
        self.process_incoming(now);

        let registry = ActivePlayers(&self.players);
        for cat in &mut self.cats {
            cat.update(&registry);
        }

        self.update_game_time(now);
        self.detect_victory();
        self.detect_loss();

        self.broadcast_entities();
        self.broadcast_votes();

        for connection in self.connections.values_mut() {
            connection.flush();
        }

        self.reap_closed();

        if self.tick % 50 == 0 {
            debug!(
                "Tick {}: {:?}, {} players, {} connections",
                self.tick,
                self.state,
                self.players.len(),
                self.connections.len()
            );
        }
    }

    fn process_incoming(&mut self, now: Instant) {
        let mut events = Vec::new();
        for connection in self.connections.values_mut() {
            let connection_id = connection.id;
            events.extend(
                connection
                    .dispatch()
                    .into_iter()
                    .map(|event| (connection_id, event)),
            );
        }

        for (connection_id, event) in events {
            match event {
                ConnectionEvent::Admitted(player_id) => {
                    self.player_joined(connection_id, player_id, now)
                }
                ConnectionEvent::Command(player_id, command) => {
                    self.apply_command(player_id, command)
                }
            }
        }
    }

    fn player_joined(&mut self, connection_id: ConnectionId, player_id: EntityId, now: Instant) {
        if self.state.has_ended() {
            info!("Player {} finished its handshake after the game ended", player_id);
            self.connection_closed(connection_id);
            return;
        }

        self.players.insert(
            player_id,
            Player::new(player_id, self.config.spawn, connection_id),
        );
        info!("Player '{}' joined the game", player_id);

        if self.state == GameState::Pending {
            self.start_time = Some(now);
            self.state = GameState::Running;
            info!("Game started");
        }
    }

    fn apply_command(&mut self, player_id: EntityId, command: PlayerCommand) {
        let Some(player) = self.players.get_mut(&player_id) else {
            return;
        };

        match command {
            PlayerCommand::Update {
                position,
                tunnel,
                vote,
            } => player.update(position, tunnel, vote, &self.map),
            PlayerCommand::Quit => {
                info!("Player {} quit", player_id);
                player.kill();
            }
        }
    }

    fn update_game_time(&mut self, now: Instant) {
        if self.state != GameState::Running {
            return;
        }
        let Some(start) = self.start_time else {
            return;
        };

        let elapsed = now.saturating_duration_since(start);
        if elapsed > self.config.game_duration {
            self.state = GameState::Loss;
            for player in self.players.values_mut() {
                player.kill();
            }
            info!("Time is up, the cats win");
        }

        let second = elapsed.as_secs();
        if self.last_time_broadcast != Some(second) {
            self.last_time_broadcast = Some(second);
            let remaining = self.config.game_duration.saturating_sub(elapsed);
            self.broadcast(&ServerMessage::Time {
                time: duration_millis(remaining),
            });
        }
    }

    /// Victory needs at least two alive players, all in the same tunnel.
    /// Dead players do not count either way.
    fn detect_victory(&mut self) {
        if self.state != GameState::Running {
            return;
        }

        let mut tunnel: Option<&str> = None;
        let mut alive = 0;
        for player in self.players.values().filter(|p| p.is_alive()) {
            if alive == 0 {
                tunnel = player.tunnel();
            }
            alive += 1;

            if tunnel.is_none() || player.tunnel() != tunnel {
                return;
            }
        }

        if alive >= 2 {
            info!("Victory: {} mice reached the {:?} tunnel", alive, tunnel);
            self.state = GameState::Victory;
            self.broadcast(&ServerMessage::Victory);
        }
    }

    fn detect_loss(&mut self) {
        if self.state != GameState::Running || self.players.is_empty() {
            return;
        }

        if self.players.values().all(|player| !player.is_alive()) {
            info!("All mice are dead, the cats win");
            self.state = GameState::Loss;
        }
    }

    pub fn vote_tally(&self) -> VoteTally {
        let mut tally = VoteTally::new();
        for (tunnel, vote) in self.players.values().filter_map(Player::vote) {
            *tally
                .entry(tunnel.to_string())
                .or_default()
                .entry(vote.to_string())
                .or_default() += 1;
        }
        tally
    }

    fn broadcast_entities(&mut self) {
        let mice = self.players.values().map(Player::make_record).collect();
        let cats = self.cats.iter().map(ServerCat::make_record).collect();
        self.broadcast(&ServerMessage::Entities { mice, cats });
    }

    fn broadcast_votes(&mut self) {
        let votes = self.vote_tally();
        self.broadcast(&ServerMessage::Votes { votes });
    }

    /// Encodes once and queues the frame on every handshaken connection.
    fn broadcast(&mut self, message: &ServerMessage) {
        let frame = match encode(message) {
            Ok(frame) => frame,
            Err(e) => {
                error!("Could not encode broadcast: {}", e);
                return;
            }
        };

        for connection in self.connections.values_mut() {
            if connection.is_connected() {
                connection.send_frame(frame.clone());
            }
        }
    }

    fn reap_closed(&mut self) {
        while let Ok(id) = self.closed_rx.try_recv() {
            if let Some(connection) = self.connections.remove(&id) {
                self.player_left(connection.player_id());
            }
        }
    }

    fn player_left(&mut self, player_id: EntityId) {
        if let Some(player) = self.players.remove(&player_id) {
            info!(
                "Player {} left the game (connection {})",
                player.id,
                player.connection()
            );
        }
    }
}

fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
