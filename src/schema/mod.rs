//! Plain data shared between the engine and its callers.

pub mod action;
pub mod combatant;
pub mod condition;
pub mod outcome;
pub mod roster;
