use super::{step_towards, Pursuit, TargetRegistry};
use shared::{EntityId, Position};

/// Follows one player until it dies. The target's position is only updated
/// while it is overground, so the cat waits at the portal where its prey
/// went underground.
#[derive(Debug)]
pub struct StalkerBrain {
    speed: f32,
    pursuit: Pursuit,
}

impl StalkerBrain {
    pub fn new(speed: f32) -> Self {
        Self {
            speed,
            pursuit: Pursuit::default(),
        }
    }

    pub fn focus(&self) -> Option<EntityId> {
        self.pursuit.focus()
    }

    pub fn init(&mut self, _position: Position) {
        self.pursuit.reset();
    }

    pub fn advance(&mut self, current: Position, registry: &dyn TargetRegistry) -> Position {
        if !self.pursuit.is_valid(registry) {
            self.pursuit.acquire(current, registry);
        }

        if self.pursuit.focus().is_none() {
            return current;
        }

        match self.pursuit.observe(registry) {
            Some(target) => step_towards(current, target, self.speed),
            None => current,
        }
    }
}
