use super::{step_towards, Pursuit, TargetRegistry};
use shared::{EntityId, Position};

pub const DEFAULT_RETARGET_TICKS: u32 = 10;

/// Like the stalker, but looks around for a closer player every
/// `retarget_ticks` ticks. Sits still while nobody is reachable.
#[derive(Debug)]
pub struct LazyBrain {
    speed: f32,
    retarget_ticks: u32,
    steps: u32,
    pursuit: Pursuit,
}

impl LazyBrain {
    pub fn new(speed: f32, retarget_ticks: u32) -> Self {
        Self {
            speed,
            retarget_ticks: retarget_ticks.max(1),
            steps: 0,
            pursuit: Pursuit::default(),
        }
    }

    pub fn focus(&self) -> Option<EntityId> {
        self.pursuit.focus()
    }

    pub fn init(&mut self, _position: Position) {
        self.steps = 0;
        self.pursuit.reset();
    }

    pub fn advance(&mut self, current: Position, registry: &dyn TargetRegistry) -> Position {
        if self.steps == 0 || !self.pursuit.is_valid(registry) {
            self.pursuit.acquire(current, registry);
        }
        self.steps = (self.steps + 1) % self.retarget_ticks;

        if self.pursuit.focus().is_none() {
            return current;
        }

        match self.pursuit.observe(registry) {
            Some(target) => step_towards(current, target, self.speed),
            None => current,
        }
    }
}
