//! Client-side actors: mirrors of remote entities and the local player.

use crate::steering::LinearSteerer;
use shared::{
    CatRecord, Hitbox, MiceRecord, RunningDirection, Vector2, CAT_CENTER_OFFSET,
    MIRROR_STEER_SPEED, MOUSE_SIZE, MOUSE_SPEED,
};

/// Another player's mouse, smoothed between snapshots.
#[derive(Debug, Clone)]
pub struct MateMouse {
    position: Vector2,
    running_direction: Option<RunningDirection>,
    tunnel: Option<String>,
    alive: bool,
    placed: bool,
    steerer: LinearSteerer,
}

impl MateMouse {
    pub fn new() -> Self {
        Self {
            position: Vector2::ZERO,
            running_direction: None,
            tunnel: None,
            alive: true,
            placed: false,
            steerer: LinearSteerer::new(MIRROR_STEER_SPEED),
        }
    }

    pub fn position(&self) -> Vector2 {
        self.position
    }

    pub fn running_direction(&self) -> Option<RunningDirection> {
        self.running_direction
    }

    pub fn tunnel(&self) -> Option<&str> {
        self.tunnel.as_deref()
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// The first record places the mirror directly; later ones steer it.
    pub fn apply(&mut self, record: &MiceRecord) {
        if self.placed {
            self.steerer.set_target(&self.position, record.x, record.y);
        } else {
            self.position = Vector2::new(record.x, record.y);
            self.placed = true;
        }
        self.running_direction = record.running_direction;
        self.tunnel = record.tunnel.clone();
        self.alive = record.alive;
    }

    pub fn update(&mut self, elapsed_ms: f32) {
        self.steerer.advance(&mut self.position, elapsed_ms);
    }

    pub fn hitbox(&self) -> Hitbox {
        Hitbox::new(self.position.x, self.position.y, MOUSE_SIZE, MOUSE_SIZE)
    }
}

impl Default for MateMouse {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct CatProxy {
    position: Vector2,
    running_direction: Option<RunningDirection>,
    placed: bool,
    steerer: LinearSteerer,
}

impl CatProxy {
    pub fn new() -> Self {
        Self {
            position: Vector2::ZERO,
            running_direction: None,
            placed: false,
            steerer: LinearSteerer::new(MIRROR_STEER_SPEED),
        }
    }

    pub fn position(&self) -> Vector2 {
        self.position
    }

    pub fn running_direction(&self) -> Option<RunningDirection> {
        self.running_direction
    }

    pub fn apply(&mut self, record: &CatRecord) {
        if self.placed {
            self.steerer.set_target(&self.position, record.x, record.y);
        } else {
            self.position = Vector2::new(record.x, record.y);
            self.placed = true;
        }
        self.running_direction = record.running_direction;
    }

    pub fn update(&mut self, elapsed_ms: f32) {
        self.steerer.advance(&mut self.position, elapsed_ms);
    }

    pub fn hitbox(&self) -> Hitbox {
        let size = 2.0 * CAT_CENTER_OFFSET;
        Hitbox::new(self.position.x, self.position.y, size, size)
    }
}

impl Default for CatProxy {
    fn default() -> Self {
        Self::new()
    }
}

/// The locally controlled mouse. Moves immediately on input; the server
/// only learns about it through `player` messages.
#[derive(Debug, Clone, Default)]
pub struct PlayerMouse {
    position: Vector2,
    running_direction: Option<RunningDirection>,
}

impl PlayerMouse {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            position: Vector2::new(x, y),
            running_direction: None,
        }
    }

    pub fn position(&self) -> Vector2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vector2) {
        self.position = position;
    }

    pub fn running_direction(&self) -> Option<RunningDirection> {
        self.running_direction
    }

    pub fn move_in(&mut self, direction: Option<RunningDirection>, elapsed_ms: f32) {
        self.running_direction = direction;
        if let Some(direction) = direction {
            let step = direction.vector().scale(MOUSE_SPEED * elapsed_ms);
            self.position = self.position.add(&step);
        }
    }

    pub fn hitbox(&self) -> Hitbox {
        Hitbox::new(self.position.x, self.position.y, MOUSE_SIZE, MOUSE_SIZE)
    }
}
