//! Rounded map positions and the four running directions derived from them.

use crate::vector::Vector2;
use serde::{Deserialize, Serialize};

/// Cardinal direction an actor is running in. Serialised by name
/// (`"up"`, `"down"`, `"left"`, `"right"`) on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunningDirection {
    Up,
    Down,
    Left,
    Right,
}

impl RunningDirection {
    pub const ALL: [RunningDirection; 4] = [
        RunningDirection::Up,
        RunningDirection::Down,
        RunningDirection::Left,
        RunningDirection::Right,
    ];

    /// Unit displacement in screen coordinates (y grows downwards).
    pub fn vector(self) -> Vector2 {
        match self {
            RunningDirection::Up => Vector2::new(0.0, -1.0),
            RunningDirection::Down => Vector2::new(0.0, 1.0),
            RunningDirection::Left => Vector2::new(-1.0, 0.0),
            RunningDirection::Right => Vector2::new(1.0, 0.0),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RunningDirection::Up => "up",
            RunningDirection::Down => "down",
            RunningDirection::Left => "left",
            RunningDirection::Right => "right",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|direction| direction.name() == name)
    }

    /// Next leg of a clockwise square walk: Down, Left, Up, Right, Down, ...
    pub fn clockwise_next(self) -> Self {
        match self {
            RunningDirection::Down => RunningDirection::Left,
            RunningDirection::Left => RunningDirection::Up,
            RunningDirection::Up => RunningDirection::Right,
            RunningDirection::Right => RunningDirection::Down,
        }
    }
}

/// A map coordinate pair. Both coordinates are always rounded to one decimal
/// digit; the fields are private so no instance can hold unrounded values.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    x: f32,
    y: f32,
}

/// Saturates instead of overflowing: NaN becomes 0 and infinities become the
/// largest finite values. Magnitudes too large to scale are already whole.
fn round_to_tenth(value: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    let value = value.clamp(f32::MIN, f32::MAX);
    let scaled = value * 10.0;
    if scaled.is_finite() {
        scaled.round() / 10.0
    } else {
        value
    }
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x: round_to_tenth(x),
            y: round_to_tenth(y),
        }
    }

    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn vector(&self) -> Vector2 {
        Vector2::new(self.x, self.y)
    }

    /// Returns a new position displaced by `delta`.
    pub fn moved(&self, delta: Vector2) -> Position {
        Position::new(self.x + delta.x, self.y + delta.y)
    }

    pub fn distance_squared(&self, other: &Position) -> f32 {
        self.vector().distance_squared(&other.vector())
    }

    /// Direction of travel from `previous` to `self`. Horizontal movement
    /// takes priority over vertical; no movement yields `None`.
    pub fn running_direction(&self, previous: &Position) -> Option<RunningDirection> {
        let dx = self.x - previous.x;
        let dy = self.y - previous.y;

        if dx > 0.0 {
            Some(RunningDirection::Right)
        } else if dx < 0.0 {
            Some(RunningDirection::Left)
        } else if dy > 0.0 {
            Some(RunningDirection::Down)
        } else if dy < 0.0 {
            Some(RunningDirection::Up)
        } else {
            None
        }
    }
}

impl From<Vector2> for Position {
    fn from(vector: Vector2) -> Self {
        Position::new(vector.x, vector.y)
    }
}
