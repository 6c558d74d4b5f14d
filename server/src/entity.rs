//! Server-owned entities: player mice and AI cats.

use crate::brain::{Brain, TargetRegistry};
use crate::connection::ConnectionId;
use log::error;
use shared::{CatRecord, EntityId, MiceRecord, PlayfieldMap, Position, RunningDirection};

/// Hands out process-lifetime-unique entity ids. Players and cats draw from
/// the same sequence, so an id is never reused while the server runs.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: EntityId,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Once the id space is exhausted the last id is handed out again and an
    /// error is logged.
    pub fn allocate(&mut self) -> EntityId {
        let id = self.next;
        match self.next.checked_add(1) {
            Some(next) => self.next = next,
            None => error!("Entity id space exhausted, reusing id {}", id),
        }
        id
    }
}

/// Position plus the direction derived from the last move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    position: Position,
    running_direction: Option<RunningDirection>,
}

impl Motion {
    pub fn new(position: Position) -> Self {
        Self {
            position,
            running_direction: None,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn running_direction(&self) -> Option<RunningDirection> {
        self.running_direction
    }

    pub fn set_position(&mut self, position: Position) {
        self.running_direction = position.running_direction(&self.position);
        self.position = position;
    }
}

fn non_empty(color: Option<String>) -> Option<String> {
    color.filter(|c| !c.is_empty())
}

#[derive(Debug, Clone)]
pub struct Player {
    pub id: EntityId,
    motion: Motion,
    tunnel: Option<String>,
    vote: Option<String>,
    alive: bool,
    connection: ConnectionId,
}

impl Player {
    pub fn new(id: EntityId, position: Position, connection: ConnectionId) -> Self {
        Self {
            id,
            motion: Motion::new(position),
            tunnel: None,
            vote: None,
            alive: true,
            connection,
        }
    }

    pub fn position(&self) -> Position {
        self.motion.position()
    }

    pub fn running_direction(&self) -> Option<RunningDirection> {
        self.motion.running_direction()
    }

    pub fn connection(&self) -> ConnectionId {
        self.connection
    }

    pub fn tunnel(&self) -> Option<&str> {
        self.tunnel.as_deref()
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Applies a client report. Inside a known tunnel the position is
    /// clamped onto the tunnel path.
    pub fn update(
        &mut self,
        position: Position,
        tunnel: Option<String>,
        vote: Option<String>,
        map: &PlayfieldMap,
    ) {
        let tunnel = non_empty(tunnel);
        let position = match tunnel.as_deref().and_then(|color| map.tunnel(color)) {
            Some(t) => t.clamp(position),
            None => position,
        };

        self.motion.set_position(position);
        self.tunnel = tunnel;
        self.vote = non_empty(vote);
    }

    ///Returns (tunnel, vote) while the player sits in a tunnel and has voted
    pub fn vote(&self) -> Option<(&str, &str)> {
        match (&self.tunnel, &self.vote) {
            (Some(tunnel), Some(vote)) => Some((tunnel.as_str(), vote.as_str())),
            _ => None,
        }
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }

    pub fn make_record(&self) -> MiceRecord {
        let position = self.position();
        MiceRecord {
            id: self.id,
            x: position.x(),
            y: position.y(),
            running_direction: self.running_direction(),
            tunnel: self.tunnel.clone(),
            alive: self.alive,
        }
    }
}

/// AI controlled cat. The brain is private to the cat.
#[derive(Debug)]
pub struct ServerCat {
    pub id: EntityId,
    motion: Motion,
    brain: Brain,
}

impl ServerCat {
    pub fn new(id: EntityId, position: Position, mut brain: Brain) -> Self {
        brain.init(position);
        Self {
            id,
            motion: Motion::new(position),
            brain,
        }
    }

    pub fn position(&self) -> Position {
        self.motion.position()
    }

    pub fn running_direction(&self) -> Option<RunningDirection> {
        self.motion.running_direction()
    }

    pub fn update(&mut self, registry: &dyn TargetRegistry) {
        let next = self.brain.advance(self.motion.position(), registry);
        self.motion.set_position(next);
    }

    pub fn make_record(&self) -> CatRecord {
        let position = self.position();
        CatRecord {
            id: self.id,
            x: position.x(),
            y: position.y(),
            running_direction: self.running_direction(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::{SquareBrain, TargetView};

    struct NoTargets;

    impl TargetRegistry for NoTargets {
        fn closest_overground_alive(&self, _from: Position) -> Option<EntityId> {
            None
        }

        fn target(&self, _id: EntityId) -> Option<TargetView> {
            None
        }
    }

    #[test]
    fn test_ids_are_monotonic() {
        let mut ids = IdAllocator::new();
        let a = ids.allocate();
        let b = ids.allocate();
        let c = ids.allocate();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_exhausted_ids_saturate() {
        let mut ids = IdAllocator {
            next: EntityId::MAX - 1,
        };
        assert_eq!(ids.allocate(), EntityId::MAX - 1);
        assert_eq!(ids.allocate(), EntityId::MAX);
        assert_eq!(ids.allocate(), EntityId::MAX);
    }

    #[test]
    fn test_motion_derives_direction() {
        let mut motion = Motion::new(Position::new(10.0, 10.0));
        assert_eq!(motion.running_direction(), None);

        motion.set_position(Position::new(10.0, 12.0));
        assert_eq!(motion.running_direction(), Some(RunningDirection::Down));

        motion.set_position(Position::new(10.0, 12.0));
        assert_eq!(motion.running_direction(), None);
    }

    #[test]
    fn test_player_update_treats_empty_colors_as_none() {
        let map = PlayfieldMap::default();
        let mut player = Player::new(1, Position::new(200.0, 200.0), 0);
        player.update(
            Position::new(205.0, 200.0),
            Some(String::new()),
            Some(String::new()),
            &map,
        );

        assert_eq!(player.tunnel(), None);
        assert_eq!(player.vote(), None);
        assert_eq!(player.running_direction(), Some(RunningDirection::Right));
    }

    #[test]
    fn test_player_update_clamps_into_tunnel() {
        let map = PlayfieldMap::default();
        let tunnel = map.tunnel("red").unwrap();
        let mut player = Player::new(1, Position::new(200.0, 200.0), 0);

        player.update(
            Position::new(100.0, 41.0),
            Some("red".to_string()),
            None,
            &map,
        );

        assert_eq!(player.position(), tunnel.clamp(Position::new(100.0, 41.0)));
        assert_eq!(player.tunnel(), Some("red"));
    }

    #[test]
    fn test_vote_requires_tunnel() {
        let map = PlayfieldMap::default();
        let mut player = Player::new(1, Position::new(0.0, 0.0), 0);

        player.update(Position::new(0.0, 0.0), None, Some("blue".to_string()), &map);
        assert_eq!(player.vote(), None);

        player.update(
            Position::new(0.0, 0.0),
            Some("red".to_string()),
            Some("blue".to_string()),
            &map,
        );
        assert_eq!(player.vote(), Some(("red", "blue")));
    }

    #[test]
    fn test_kill_is_reported_in_record() {
        let mut player = Player::new(3, Position::new(1.0, 2.0), 0);
        player.kill();
        let record = player.make_record();
        assert_eq!(record.id, 3);
        assert!(!record.alive);
        assert_eq!(record.tunnel, None);
    }

    #[test]
    fn test_cat_moves_with_its_brain() {
        let brain = Brain::Square(SquareBrain::new(36.0, 36.0, 3.0, 0.0, Some(1)));
        let mut cat = ServerCat::new(5, Position::new(0.0, 0.0), brain);

        cat.update(&NoTargets);
        let record = cat.make_record();
        assert_eq!(record.y, 3.0);
        assert_eq!(record.running_direction, Some(RunningDirection::Down));
    }
}
