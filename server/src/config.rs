//! Game configuration: timing, spawn point and the cat roster.

use crate::brain::{Brain, LazyBrain, SquareBrain, StalkerBrain};
use shared::{Position, DEFAULT_TICK_MS, GAME_DURATION_MS};
use std::time::Duration;

/// Recipe for building a brain. Kept separate from [`Brain`] so a config can
/// be cloned and rebuilt with a fresh RNG.
#[derive(Debug, Clone, PartialEq)]
pub enum BrainSpec {
    Square {
        width: f32,
        height: f32,
        speed: f32,
        sleepiness: f64,
    },
    Stalker {
        speed: f32,
    },
    Lazy {
        speed: f32,
        retarget_ticks: u32,
    },
}

impl BrainSpec {
    pub fn build(&self, seed: Option<u64>) -> Brain {
        match *self {
            BrainSpec::Square {
                width,
                height,
                speed,
                sleepiness,
            } => Brain::Square(SquareBrain::new(width, height, speed, sleepiness, seed)),
            BrainSpec::Stalker { speed } => Brain::Stalker(StalkerBrain::new(speed)),
            BrainSpec::Lazy {
                speed,
                retarget_ticks,
            } => Brain::Lazy(LazyBrain::new(speed, retarget_ticks)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatSpawn {
    pub position: Position,
    pub brain: BrainSpec,
}

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub tick_interval: Duration,
    pub game_duration: Duration,
    pub spawn: Position,
    pub cats: Vec<CatSpawn>,
    /// Seeds every randomized brain. `None` draws from entropy.
    pub seed: Option<u64>,
}

impl GameConfig {
    pub fn with_timing(tick_interval: Duration, game_duration: Duration) -> Self {
        Self {
            tick_interval,
            game_duration,
            ..Self::default()
        }
    }

    pub fn without_cats(mut self) -> Self {
        self.cats.clear();
        self
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(DEFAULT_TICK_MS),
            game_duration: Duration::from_millis(GAME_DURATION_MS),
            spawn: Position::new(200.0, 200.0),
            cats: vec![
                CatSpawn {
                    position: Position::new(280.0, 50.0),
                    brain: BrainSpec::Square {
                        width: 36.0,
                        height: 36.0,
                        speed: 3.0,
                        sleepiness: 0.01,
                    },
                },
                CatSpawn {
                    position: Position::new(40.0, 250.0),
                    brain: BrainSpec::Stalker { speed: 2.0 },
                },
                CatSpawn {
                    position: Position::new(300.0, 260.0),
                    brain: BrainSpec::Lazy {
                        speed: 1.5,
                        retarget_ticks: 10,
                    },
                },
            ],
            seed: None,
        }
    }
}
