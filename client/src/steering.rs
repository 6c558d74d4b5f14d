//! Interpolation of remote entities between network updates.

use shared::{Vector2, NOMINAL_FRAME_MS};

/// Frames worth of movement beyond which a target is jumped to directly.
const SNAP_FRAMES: f32 = 20.0;

/// Moves a position towards the most recent target at a fixed speed.
/// Only one target is held; a new one replaces the old.
#[derive(Debug, Clone)]
pub struct LinearSteerer {
    /// Pixels per millisecond.
    speed: f32,
    target: Option<Vector2>,
}

impl LinearSteerer {
    pub fn new(speed: f32) -> Self {
        Self {
            speed,
            target: None,
        }
    }

    pub fn target(&self) -> Option<Vector2> {
        self.target
    }

    pub fn has_target(&self) -> bool {
        self.target.is_some()
    }

    /// A target equal to the current position means the entity has arrived.
    pub fn set_target(&mut self, current: &Vector2, x: f32, y: f32) {
        if current.x == x && current.y == y {
            self.target = None;
        } else {
            self.target = Some(Vector2::new(x, y));
        }
    }

    pub fn advance(&mut self, position: &mut Vector2, elapsed_ms: f32) {
        let Some(target) = self.target else {
            return;
        };

        let delta = target.sub(position);
        let distance = delta.length();
        let movement = self.speed * elapsed_ms;
        let snap_distance = self.speed * NOMINAL_FRAME_MS * SNAP_FRAMES;

        if distance > snap_distance || movement >= distance {
            *position = target;
            self.target = None;
        } else {
            *position = position.add(&delta.unit().scale(movement));
        }
    }
}
