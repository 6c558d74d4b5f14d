//! Client game layer: phase state machine, mirrors and the local player.

use crate::actors::{CatProxy, MateMouse, PlayerMouse};
use crate::entity_map::EntityMap;
use crate::protocol::ServerEvent;
use log::info;
use shared::{
    CatRecord, ClientMessage, EntityId, MiceRecord, PlayfieldMap, RunningDirection, Vector2,
    VoteTally,
};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientPhase {
    Connecting,
    Overground,
    Underground,
    GameOver,
    Victory,
}

impl ClientPhase {
    pub fn is_playable(self) -> bool {
        matches!(self, ClientPhase::Overground | ClientPhase::Underground)
    }

    pub fn is_final(self) -> bool {
        matches!(self, ClientPhase::GameOver | ClientPhase::Victory)
    }
}

pub struct ClientGame {
    map: PlayfieldMap,
    phase: ClientPhase,
    own_id: Option<EntityId>,
    player: PlayerMouse,
    player_placed: bool,
    tunnel: Option<String>,
    vote: Option<String>,
    mates: EntityMap<MateMouse>,
    cats: EntityMap<CatProxy>,
    votes: VoteTally,
    time_remaining: Option<u64>,
}

impl ClientGame {
    pub fn new(map: PlayfieldMap) -> Self {
        Self {
            map,
            phase: ClientPhase::Connecting,
            own_id: None,
            player: PlayerMouse::default(),
            player_placed: false,
            tunnel: None,
            vote: None,
            mates: EntityMap::new(MateMouse::new),
            cats: EntityMap::new(CatProxy::new),
            votes: VoteTally::new(),
            time_remaining: None,
        }
    }

    pub fn phase(&self) -> ClientPhase {
        self.phase
    }

    pub fn own_id(&self) -> Option<EntityId> {
        self.own_id
    }

    pub fn player(&self) -> &PlayerMouse {
        &self.player
    }

    pub fn tunnel(&self) -> Option<&str> {
        self.tunnel.as_deref()
    }

    pub fn vote(&self) -> Option<&str> {
        self.vote.as_deref()
    }

    pub fn mates(&self) -> &EntityMap<MateMouse> {
        &self.mates
    }

    pub fn cats(&self) -> &EntityMap<CatProxy> {
        &self.cats
    }

    pub fn votes(&self) -> &VoteTally {
        &self.votes
    }

    pub fn time_remaining(&self) -> Option<u64> {
        self.time_remaining
    }

    pub fn connected(&mut self, id: EntityId) {
        self.own_id = Some(id);
        if self.phase == ClientPhase::Connecting {
            self.phase = ClientPhase::Overground;
        }
    }

    pub fn apply_event(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::Entities { mice, cats } => self.apply_entities(&mice, &cats),
            ServerEvent::Votes(votes) => self.votes = votes,
            ServerEvent::Time(time) => self.time_remaining = Some(time),
            ServerEvent::Victory => {
                info!("Victory!");
                self.phase = ClientPhase::Victory;
            }
        }
    }

    fn apply_entities(&mut self, mice: &[MiceRecord], cats: &[CatRecord]) {
        let ignore: HashSet<EntityId> = self.own_id.into_iter().collect();

        let mut own_record = None;
        self.mates.reconcile(
            mice,
            |record, mate| match mate {
                Some(mate) => mate.apply(record),
                None => own_record = Some(record.clone()),
            },
            &ignore,
        );
        self.cats.reconcile(
            cats,
            |record, cat| {
                if let Some(cat) = cat {
                    cat.apply(record);
                }
            },
            &HashSet::new(),
        );

        let Some(own) = own_record else {
            return;
        };

        if !self.player_placed {
            self.player.set_position(Vector2::new(own.x, own.y));
            self.player_placed = true;
        }

        if !own.alive && self.phase.is_playable() {
            info!("Our mouse was caught, game over");
            self.phase = ClientPhase::GameOver;
        }
    }

    /// Advances one render frame: mirrors steer towards their targets and
    /// the local mouse moves. Underground it stays on the tunnel path.
    pub fn frame(&mut self, elapsed_ms: f32, direction: Option<RunningDirection>) {
        for mate in self.mates.values_mut() {
            mate.update(elapsed_ms);
        }
        for cat in self.cats.values_mut() {
            cat.update(elapsed_ms);
        }

        if !self.phase.is_playable() {
            return;
        }

        self.player.move_in(direction, elapsed_ms);
        if self.phase == ClientPhase::Underground {
            self.clamp_to_tunnel();
        }
    }

    fn clamp_to_tunnel(&mut self) {
        let Some(tunnel) = self.tunnel.as_deref().and_then(|c| self.map.tunnel(c)) else {
            return;
        };
        if let Some(projection) = tunnel.path().closest_point(self.player.position()) {
            self.player.set_position(projection.point);
        }
    }

    /// Enters the tunnel whose portal the mouse stands on, or leaves the
    /// current tunnel. Returns whether the phase changed.
    pub fn toggle_tunnel(&mut self) -> bool {
        match self.phase {
            ClientPhase::Overground => {
                let Some(tunnel) = self.map.portal_at(&self.player.hitbox()) else {
                    return false;
                };
                self.tunnel = Some(tunnel.color.clone());
                self.phase = ClientPhase::Underground;
                self.clamp_to_tunnel();
                true
            }
            ClientPhase::Underground => {
                self.tunnel = None;
                self.vote = None;
                self.phase = ClientPhase::Overground;
                true
            }
            _ => false,
        }
    }

    /// Votes only count underground and only for colors on the map.
    pub fn cast_vote(&mut self, color: &str) -> bool {
        if self.phase != ClientPhase::Underground || self.map.tunnel(color).is_none() {
            return false;
        }
        self.vote = Some(color.to_string());
        true
    }

    /// Ends the game locally. Returns the message telling the server.
    pub fn quit(&mut self) -> Option<ClientMessage> {
        if self.phase.is_final() {
            return None;
        }
        self.phase = ClientPhase::GameOver;
        Some(ClientMessage::Quit)
    }

    /// The per-frame position report, while playable.
    pub fn player_message(&self) -> Option<ClientMessage> {
        if !self.phase.is_playable() {
            return None;
        }
        let position = self.player.position();
        Some(ClientMessage::Player {
            player_x: position.x,
            player_y: position.y,
            tunnel_color: self.tunnel.clone(),
            vote_color: self.vote.clone(),
        })
    }
}
