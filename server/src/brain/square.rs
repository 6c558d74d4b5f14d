use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::{Position, RunningDirection};

/// Ticks a sleeping cat stays put.
pub const IDLE_TICKS: u32 = 20;

/// Patrols a rectangle hanging down and to the left of its starting point,
/// turning clockwise (down, left, up, right) at each corner.
#[derive(Debug)]
pub struct SquareBrain {
    width: f32,
    height: f32,
    speed: f32,
    /// Chance per tick of dozing off for [`IDLE_TICKS`].
    sleepiness: f64,
    idle: u32,
    heading: RunningDirection,
    origin: Position,
    rng: StdRng,
}

impl SquareBrain {
    pub fn new(width: f32, height: f32, speed: f32, sleepiness: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            width,
            height,
            speed,
            sleepiness,
            idle: 0,
            heading: RunningDirection::Down,
            origin: Position::default(),
            rng,
        }
    }

    pub fn heading(&self) -> RunningDirection {
        self.heading
    }

    pub fn is_idle(&self) -> bool {
        self.idle > 0
    }

    pub fn init(&mut self, position: Position) {
        self.heading = RunningDirection::Down;
        self.origin = position;
        self.idle = 0;
    }

    pub fn advance(&mut self, current: Position) -> Position {
        if self.idle > 0 {
            self.idle -= 1;
            return current;
        }

        if self.sleepiness > 0.0 && self.rng.gen::<f64>() < self.sleepiness {
            self.idle = IDLE_TICKS;
            return current;
        }

        let next = current.moved(self.heading.vector().scale(self.speed));

        let leg_done = match self.heading {
            RunningDirection::Down => next.y() - self.origin.y() >= self.height,
            RunningDirection::Left => self.origin.x() - next.x() >= self.width,
            RunningDirection::Up => next.y() <= self.origin.y(),
            RunningDirection::Right => next.x() >= self.origin.x(),
        };

        if leg_done {
            self.heading = self.heading.clockwise_next();
        }

        next
    }
}
