//! Cat AI. A brain turns the cat's current position into its next one,
//! once per server tick.
//!
//! Brains never look at network state. Everything they need to know about
//! players comes through a [`TargetRegistry`] supplied by the game.

mod lazy;
mod square;
mod stalker;

pub use lazy::LazyBrain;
pub use square::SquareBrain;
pub use stalker::StalkerBrain;

use shared::{EntityId, Position, Vector2, CAT_CENTER_OFFSET};

/// What a brain may know about a potential target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetView {
    pub position: Position,
    pub alive: bool,
    pub in_tunnel: bool,
}

/// Query interface over the players a cat can chase.
pub trait TargetRegistry {
    /// Closest alive player that is not inside a tunnel.
    fn closest_overground_alive(&self, from: Position) -> Option<EntityId>;

    fn target(&self, id: EntityId) -> Option<TargetView>;
}

#[derive(Debug)]
pub enum Brain {
    Square(SquareBrain),
    Stalker(StalkerBrain),
    Lazy(LazyBrain),
}

impl Brain {
    pub fn init(&mut self, position: Position) {
        match self {
            Brain::Square(brain) => brain.init(position),
            Brain::Stalker(brain) => brain.init(position),
            Brain::Lazy(brain) => brain.init(position),
        }
    }

    pub fn advance(&mut self, current: Position, registry: &dyn TargetRegistry) -> Position {
        match self {
            Brain::Square(brain) => brain.advance(current),
            Brain::Stalker(brain) => brain.advance(current, registry),
            Brain::Lazy(brain) => brain.advance(current, registry),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Brain::Square(_) => "square",
            Brain::Stalker(_) => "stalker",
            Brain::Lazy(_) => "lazy",
        }
    }
}

/// Moves from `current` towards `target` by `speed`. Snaps onto the target
/// when it is closer than one step so the cat never oscillates around it.
pub(crate) fn step_towards(current: Position, target: Position, speed: f32) -> Position {
    let from = current.vector();
    let to = target.vector();

    if from.distance_squared(&to) < speed * speed {
        target
    } else {
        current.moved(to.sub(&from).unit().scale(speed))
    }
}

/// Target bookkeeping shared by the chasing brains. Holds an id, never a
/// reference; an id that vanished from the registry is an invalid target.
#[derive(Debug, Default)]
pub(crate) struct Pursuit {
    focus: Option<EntityId>,
    last_seen: Option<Position>,
}

impl Pursuit {
    pub(crate) fn reset(&mut self) {
        self.focus = None;
        self.last_seen = None;
    }

    pub(crate) fn focus(&self) -> Option<EntityId> {
        self.focus
    }

    pub(crate) fn is_valid(&self, registry: &dyn TargetRegistry) -> bool {
        self.focus
            .and_then(|id| registry.target(id))
            .is_some_and(|target| target.alive)
    }

    /// Picks the closest overground player, measured from the cat's centre.
    pub(crate) fn acquire(&mut self, current: Position, registry: &dyn TargetRegistry) {
        let centre = current.moved(Vector2::new(CAT_CENTER_OFFSET, CAT_CENTER_OFFSET));
        self.focus = registry.closest_overground_alive(centre);
    }

    /// Refreshes the remembered position while the target is visible and
    /// returns where to head.
    pub(crate) fn observe(&mut self, registry: &dyn TargetRegistry) -> Option<Position> {
        if let Some(target) = self.focus.and_then(|id| registry.target(id)) {
            if !target.in_tunnel {
                self.last_seen = Some(target.position);
            }
        }
        self.last_seen
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::BTreeMap;

    /// In-memory registry for brain tests.
    #[derive(Default)]
    pub struct FakeRegistry {
        pub targets: BTreeMap<EntityId, TargetView>,
    }

    impl FakeRegistry {
        pub fn with(mut self, id: EntityId, x: f32, y: f32) -> Self {
            self.targets.insert(
                id,
                TargetView {
                    position: Position::new(x, y),
                    alive: true,
                    in_tunnel: false,
                },
            );
            self
        }

        pub fn get_mut(&mut self, id: EntityId) -> &mut TargetView {
            self.targets.get_mut(&id).expect("unknown target")
        }
    }

    impl TargetRegistry for FakeRegistry {
        fn closest_overground_alive(&self, from: Position) -> Option<EntityId> {
            self.targets
                .iter()
                .filter(|(_, t)| t.alive && !t.in_tunnel)
                .min_by(|(_, a), (_, b)| {
                    a.position
                        .distance_squared(&from)
                        .total_cmp(&b.position.distance_squared(&from))
                })
                .map(|(id, _)| *id)
        }

        fn target(&self, id: EntityId) -> Option<TargetView> {
            self.targets.get(&id).copied()
        }
    }
}
