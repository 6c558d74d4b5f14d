//! Headless input: a wandering mouse standing in for keyboard capture

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::RunningDirection;
use std::ops::Range;

/// Frames a chosen direction is held
const HOLD_FRAMES: Range<u32> = 15..90;

/// Produces a running direction per frame that changes at random
/// intervals, and occasionally asks to enter or leave a tunnel
pub struct WanderInput {
    rng: StdRng,
    current: Option<RunningDirection>,
    frames_left: u32,
    tunnel_chance: f64,
}

impl WanderInput {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            rng,
            current: None,
            frames_left: 0,
            tunnel_chance: 0.02,
        }
    }

    /// Returns the direction for this frame; `None` means standing still
    pub fn next_direction(&mut self) -> Option<RunningDirection> {
        if self.frames_left == 0 {
            // One slot in five keeps the mouse idle
            let pick = self.rng.gen_range(0..=RunningDirection::ALL.len());
            self.current = RunningDirection::ALL.get(pick).copied();
            self.frames_left = self.rng.gen_range(HOLD_FRAMES);
        }

        self.frames_left -= 1;
        self.current
    }

    pub fn wants_tunnel_toggle(&mut self) -> bool {
        self.rng.gen_bool(self.tunnel_chance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_is_held_for_a_while() {
        let mut input = WanderInput::new(Some(42));
        let first = input.next_direction();
        let held = HOLD_FRAMES.start as usize - 1;
        for _ in 0..held {
            assert_eq!(input.next_direction(), first);
        }
    }

    #[test]
    fn test_same_seed_same_walk() {
        let mut a = WanderInput::new(Some(9));
        let mut b = WanderInput::new(Some(9));
        for _ in 0..500 {
            assert_eq!(a.next_direction(), b.next_direction());
            assert_eq!(a.wants_tunnel_toggle(), b.wants_tunnel_toggle());
        }
    }
}
