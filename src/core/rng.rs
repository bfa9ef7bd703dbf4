//! Die sources — the one place randomness enters the engine.
//!
//! Every rolling function takes a `DieSource` so that resolution can be
//! replayed from a seed, or driven face-by-face in tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Produces individual die faces.
pub trait DieSource {
    /// Roll one die, returning a face in `1..=sides`.
    fn roll_die(&mut self, sides: u32) -> u32;
}

/// A die source backed by any `rand` generator.
#[derive(Debug, Clone)]
pub struct RngDice<R = StdRng> {
    rng: R,
}

impl RngDice<StdRng> {
    /// Reproducible dice from a seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Dice seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl<R: Rng> RngDice<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> DieSource for RngDice<R> {
    fn roll_die(&mut self, sides: u32) -> u32 {
        self.rng.gen_range(1..=sides.max(1))
    }
}

/// Replays a fixed sequence of faces, cycling when exhausted.
///
/// Faces are clamped into `1..=sides` for whichever die is being rolled.
#[derive(Debug, Clone)]
pub struct ScriptedDice {
    faces: Vec<u32>,
    cursor: usize,
}

impl ScriptedDice {
    pub fn new(faces: impl Into<Vec<u32>>) -> Self {
        Self {
            faces: faces.into(),
            cursor: 0,
        }
    }

    /// Number of faces handed out so far.
    pub fn consumed(&self) -> usize {
        self.cursor
    }
}

impl DieSource for ScriptedDice {
    fn roll_die(&mut self, sides: u32) -> u32 {
        let sides = sides.max(1);
        if self.faces.is_empty() {
            return 1;
        }
        let face = self.faces[self.cursor % self.faces.len()];
        self.cursor += 1;
        face.clamp(1, sides)
    }
}
