//! Death saves for downed combatants.
//!
//! Each save is an unmodified d20 against DC 10. A natural 20
//! revives at 1 HP, a natural 1 counts as two failures, otherwise the roll
//! adds one success or one failure. Three failures kill; three successes
//! stabilize.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::dice::{roll_ability_check, RollResult};
use super::rng::DieSource;
use crate::schema::combatant::{Combatant, DeathSaves};

/// Counter value at which a death-save track completes.
pub const DEATH_SAVE_LIMIT: u8 = 3;

/// Fixed target for every death save.
pub const DEATH_SAVE_DC: i32 = 10;

/// Where a downed combatant stands after a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathSaveState {
    Active,
    Stabilized,
    Dead,
    Revived,
}

/// The result of one death save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeathSaveOutcome {
    pub roll: RollResult,
    /// Counters after this save. Unchanged on a revive.
    pub saves: DeathSaves,
    pub dead: bool,
    pub stabilized: bool,
    pub revived: bool,
    /// HP to set; only present on a revive.
    pub new_hp: Option<i32>,
    pub narrative: String,
}

impl DeathSaveOutcome {
    /// Death outranks stabilizing when both tracks fill on the same call.
    pub fn state(&self) -> DeathSaveState {
        if self.revived {
            DeathSaveState::Revived
        } else if self.dead {
            DeathSaveState::Dead
        } else if self.stabilized {
            DeathSaveState::Stabilized
        } else {
            DeathSaveState::Active
        }
    }
}

/// Roll one death save for `token`.
pub fn roll_death_save<D: DieSource + ?Sized>(token: &Combatant, dice: &mut D) -> DeathSaveOutcome {
    let name = token.display_name();
    let roll = roll_ability_check(0, DEATH_SAVE_DC, dice);
    let mut saves = token.death_saves;
    let face = roll.natural().unwrap_or(0);

    if face == 20 {
        debug!(token = %token.id, "death save revived");
        return DeathSaveOutcome {
            narrative: format!(
                "💚 **{}** rolls a NAT 20 on their death save! They regain 1 HP and are conscious!",
                name
            ),
            roll,
            saves,
            dead: false,
            stabilized: true,
            revived: true,
            new_hp: Some(1),
        };
    }

    let mut narrative = if face == 1 {
        saves.failures = saves.failures.saturating_add(2);
        format!(
            "💀 **{}** rolls a NAT 1 — two death save failures! ({}/{})",
            name, saves.failures, DEATH_SAVE_LIMIT
        )
    } else if roll.success() == Some(true) {
        saves.successes = saves.successes.saturating_add(1);
        format!(
            "🟢 **{}** succeeds a death save ({}/{} successes)",
            name, saves.successes, DEATH_SAVE_LIMIT
        )
    } else {
        saves.failures = saves.failures.saturating_add(1);
        format!(
            "🔴 **{}** fails a death save ({}/{} failures)",
            name, saves.failures, DEATH_SAVE_LIMIT
        )
    };

    let dead = saves.failures >= DEATH_SAVE_LIMIT;
    let stabilized = saves.successes >= DEATH_SAVE_LIMIT;
    if dead {
        narrative.push_str(&format!(" 💀 **{}** has died!", name));
    }
    if stabilized {
        narrative.push_str(&format!(" 💚 **{}** has stabilized!", name));
    }

    debug!(
        token = %token.id,
        successes = saves.successes,
        failures = saves.failures,
        dead,
        stabilized,
        "death save"
    );

    DeathSaveOutcome {
        roll,
        saves,
        dead,
        stabilized,
        revived: false,
        new_hp: None,
        narrative,
    }
}
