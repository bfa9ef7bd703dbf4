//! The resolution pipeline: dice, classification, combat and bookkeeping.

pub mod classifier;
pub mod combat;
pub mod conditions;
pub mod death_save;
pub mod dice;
pub mod movement;
pub mod pipeline;
pub mod progression;
pub mod rng;
pub mod rules;
pub mod turns;
