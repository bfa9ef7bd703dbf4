//! Session Engine — rules resolution for tabletop role-playing sessions.
//!
//! Turns free-text player intent and the current combatant roster into
//! randomized, rule-consistent outcomes: dice rolls, attacks, checks,
//! conditions, death saves, initiative order and experience levels, each
//! paired with a human-readable narrative. The engine never mutates the
//! roster it is handed; it returns deltas that the caller applies.

pub mod core;
pub mod schema;
