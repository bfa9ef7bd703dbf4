//! The session's combatants, addressed by id, and the one place deltas
//! from the engine are written back.

use ron::extensions::Extensions;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

use super::combatant::{Combatant, CombatantId, DeathSaves, GridPos};
use super::outcome::{ActionResult, Effect, TurnEffect, TurnEffectKind};
use crate::core::conditions::apply_condition;
use crate::core::death_save::DeathSaveOutcome;
use crate::core::movement::can_reach;

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("unknown combatant {0}")]
    UnknownCombatant(CombatantId),
    #[error("duplicate combatant {0}")]
    DuplicateCombatant(CombatantId),
    #[error("stale HP for {id}: result computed from {expected}, roster has {actual}")]
    StaleHp {
        id: CombatantId,
        expected: i32,
        actual: i32,
    },
    #[error("{id} cannot reach ({x}, {y})")]
    Unreachable { id: CombatantId, x: i32, y: i32 },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Combatants in table order with an id index.
///
/// Serializes as a plain list; duplicates are rejected on load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Combatant>", into = "Vec<Combatant>")]
pub struct Roster {
    combatants: Vec<Combatant>,
    index: FxHashMap<CombatantId, usize>,
}

impl TryFrom<Vec<Combatant>> for Roster {
    type Error = RosterError;

    fn try_from(combatants: Vec<Combatant>) -> Result<Self, Self::Error> {
        Roster::from_vec(combatants)
    }
}

impl From<Roster> for Vec<Combatant> {
    fn from(roster: Roster) -> Self {
        roster.combatants
    }
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(combatants: Vec<Combatant>) -> Result<Self, RosterError> {
        let mut roster = Self::new();
        for combatant in combatants {
            roster.insert(combatant)?;
        }
        Ok(roster)
    }

    pub fn load_from_ron(path: &Path) -> Result<Self, RosterError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Ability scores may be written bare (`str: 16`); `implicit_some` is on.
    pub fn parse_ron(input: &str) -> Result<Self, RosterError> {
        let combatants: Vec<Combatant> = ron::Options::default()
            .with_default_extension(Extensions::IMPLICIT_SOME)
            .from_str(input)?;
        Self::from_vec(combatants)
    }

    pub fn insert(&mut self, combatant: Combatant) -> Result<(), RosterError> {
        if self.index.contains_key(&combatant.id) {
            return Err(RosterError::DuplicateCombatant(combatant.id));
        }
        self.index.insert(combatant.id, self.combatants.len());
        self.combatants.push(combatant);
        Ok(())
    }

    pub fn get(&self, id: CombatantId) -> Option<&Combatant> {
        self.index.get(&id).map(|&i| &self.combatants[i])
    }

    fn get_mut(&mut self, id: CombatantId) -> Result<&mut Combatant, RosterError> {
        match self.index.get(&id) {
            Some(&i) => Ok(&mut self.combatants[i]),
            None => Err(RosterError::UnknownCombatant(id)),
        }
    }

    /// Case-insensitive label lookup.
    pub fn find_by_label(&self, label: &str) -> Option<&Combatant> {
        let wanted = label.trim().to_lowercase();
        self.combatants
            .iter()
            .find(|c| c.label.to_lowercase() == wanted)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Combatant> {
        self.combatants.iter()
    }

    /// The snapshot slice the engine reads.
    pub fn as_slice(&self) -> &[Combatant] {
        &self.combatants
    }

    pub fn len(&self) -> usize {
        self.combatants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combatants.is_empty()
    }

    /// Write an action result back.
    ///
    /// HP is only written when the roster still holds the HP the result
    /// was computed from. Every id the result names is checked first, so
    /// an error leaves the roster untouched and the caller should resolve
    /// again from a fresh snapshot.
    pub fn apply(&mut self, result: &ActionResult) -> Result<(), RosterError> {
        let hp_write = match (result.target_id, result.new_target_hp) {
            (Some(id), Some(new_hp)) => {
                let target = self.get(id).ok_or(RosterError::UnknownCombatant(id))?;
                if let Some(expected) = result.prior_target_hp {
                    if target.hp != expected {
                        warn!(%id, expected, actual = target.hp, "rejected stale damage");
                        return Err(RosterError::StaleHp {
                            id,
                            expected,
                            actual: target.hp,
                        });
                    }
                }
                Some((id, new_hp))
            }
            _ => None,
        };
        for effect in &result.effects {
            let Effect::Condition { target, .. } = effect;
            if self.get(*target).is_none() {
                warn!(id = %target, "rejected effect on unknown combatant");
                return Err(RosterError::UnknownCombatant(*target));
            }
        }

        if let Some((id, new_hp)) = hp_write {
            self.get_mut(id)?.hp = new_hp;
        }
        for effect in &result.effects {
            match effect {
                Effect::Condition { target, condition } => {
                    let token = self.get_mut(*target)?;
                    token.conditions = apply_condition(&token.conditions, *condition);
                }
            }
        }
        Ok(())
    }

    /// Apply start-of-turn damage. Other effects only gate what the
    /// combatant may do and leave no state behind.
    pub fn apply_turn_effects(
        &mut self,
        id: CombatantId,
        effects: &[TurnEffect],
    ) -> Result<(), RosterError> {
        let token = self.get_mut(id)?;
        for effect in effects {
            if let TurnEffectKind::Damage { amount, .. } = effect.kind {
                token.hp = token.hp.saturating_sub(amount).max(0);
            }
        }
        Ok(())
    }

    /// Store a death save. A revive restores HP and clears the counters,
    /// as does stabilizing; a death leaves the counters in place.
    pub fn apply_death_save(
        &mut self,
        id: CombatantId,
        outcome: &DeathSaveOutcome,
    ) -> Result<(), RosterError> {
        let token = self.get_mut(id)?;
        if let Some(hp) = outcome.new_hp {
            token.hp = hp;
            token.death_saves = DeathSaves::default();
        } else if outcome.stabilized && !outcome.dead {
            token.death_saves = DeathSaves::default();
        } else {
            token.death_saves = outcome.saves;
        }
        Ok(())
    }

    /// Move a combatant if the square is within its effective speed.
    pub fn move_to(&mut self, id: CombatantId, to: GridPos) -> Result<(), RosterError> {
        let token = self.get_mut(id)?;
        if !can_reach(token, to) {
            warn!(%id, x = to.x, y = to.y, "rejected move");
            return Err(RosterError::Unreachable {
                id,
                x: to.x,
                y: to.y,
            });
        }
        token.position = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dice::roll;
    use crate::core::rng::ScriptedDice;
    use crate::schema::action::ActionType;
    use crate::schema::condition::Condition;
    use crate::schema::outcome::ResultKind;

    fn roster() -> Roster {
        Roster::from_vec(vec![
            Combatant::new(CombatantId(1), "Kael", 20),
            Combatant::new(CombatantId(2), "Goblin", 7).npc(),
        ])
        .unwrap()
    }

    fn hit(target: u64, prior: i32, new_hp: i32) -> ActionResult {
        let mut r = ActionResult::new("hit", ResultKind::Combat, Some(ActionType::Attack));
        r.target_id = Some(CombatantId(target));
        r.damage = Some(prior - new_hp);
        r.prior_target_hp = Some(prior);
        r.new_target_hp = Some(new_hp);
        r
    }

    #[test]
    fn duplicate_ids_rejected() {
        let err = Roster::from_vec(vec![
            Combatant::new(CombatantId(1), "A", 5),
            Combatant::new(CombatantId(1), "B", 5),
        ])
        .unwrap_err();
        assert!(matches!(err, RosterError::DuplicateCombatant(CombatantId(1))));
    }

    #[test]
    fn apply_writes_new_hp() {
        let mut roster = roster();
        roster.apply(&hit(2, 7, 3)).unwrap();
        assert_eq!(roster.get(CombatantId(2)).unwrap().hp, 3);
    }

    #[test]
    fn stale_result_is_rejected_whole() {
        let mut roster = roster();
        let first = hit(2, 7, 3);
        let mut second = hit(2, 7, 1);
        second.effects.push(Effect::Condition {
            target: CombatantId(2),
            condition: Condition::Prone,
        });
        roster.apply(&first).unwrap();
        let err = roster.apply(&second).unwrap_err();
        assert!(matches!(
            err,
            RosterError::StaleHp {
                expected: 7,
                actual: 3,
                ..
            }
        ));
        let goblin = roster.get(CombatantId(2)).unwrap();
        assert_eq!(goblin.hp, 3);
        assert!(goblin.conditions.is_empty());
    }

    #[test]
    fn unknown_effect_target_leaves_hp_untouched() {
        let mut roster = roster();
        let mut r = hit(2, 7, 2);
        r.effects.push(Effect::Condition {
            target: CombatantId(2),
            condition: Condition::Burning,
        });
        r.effects.push(Effect::Condition {
            target: CombatantId(9),
            condition: Condition::Prone,
        });
        assert!(matches!(
            roster.apply(&r),
            Err(RosterError::UnknownCombatant(CombatantId(9)))
        ));
        let goblin = roster.get(CombatantId(2)).unwrap();
        assert_eq!(goblin.hp, 7);
        assert!(goblin.conditions.is_empty());
    }

    #[test]
    fn condition_effects_applied() {
        let mut roster = roster();
        let mut r = ActionResult::new("guard", ResultKind::Action, Some(ActionType::Defend));
        r.effects.push(Effect::Condition {
            target: CombatantId(1),
            condition: Condition::Shielded,
        });
        roster.apply(&r).unwrap();
        roster.apply(&r).unwrap();
        let kael = roster.get(CombatantId(1)).unwrap();
        assert_eq!(kael.conditions.len(), 1);
        assert!(kael.has_condition(Condition::Shielded));
    }

    #[test]
    fn unknown_target_errors() {
        let mut roster = roster();
        assert!(matches!(
            roster.apply(&hit(9, 4, 0)),
            Err(RosterError::UnknownCombatant(CombatantId(9)))
        ));
    }

    #[test]
    fn turn_damage_floors_at_zero() {
        let mut roster = roster();
        let burn = roll("1d6", &mut ScriptedDice::new(vec![6]));
        let effect = TurnEffect {
            condition: Condition::Burning,
            kind: TurnEffectKind::Damage {
                amount: 9,
                new_hp: 0,
            },
            narrative: String::new(),
            roll: Some(burn),
        };
        roster.apply_turn_effects(CombatantId(2), &[effect]).unwrap();
        assert_eq!(roster.get(CombatantId(2)).unwrap().hp, 0);
    }

    #[test]
    fn frozen_move_rejected() {
        let mut roster = roster();
        roster.move_to(CombatantId(1), GridPos::new(3, 3)).unwrap();
        assert_eq!(roster.get(CombatantId(1)).unwrap().position, GridPos::new(3, 3));

        let mut r = ActionResult::new("ice", ResultKind::Combat, Some(ActionType::CastSpell));
        r.effects.push(Effect::Condition {
            target: CombatantId(1),
            condition: Condition::Frozen,
        });
        roster.apply(&r).unwrap();
        assert!(roster.move_to(CombatantId(1), GridPos::new(3, 4)).is_err());
    }

    #[test]
    fn label_lookup_ignores_case() {
        assert_eq!(roster().find_by_label("goblin").map(|c| c.id), Some(CombatantId(2)));
    }

    #[test]
    fn parses_roster_ron() {
        let roster = Roster::parse_ron(
            r#"[
                (id: (1), label: "Kael", hp: 12, max_hp: 20, ac: 16, stats: (str: 16)),
                (id: (2), label: "Goblin", hp: 7, max_hp: 7, is_npc: true, conditions: [poisoned]),
            ]"#,
        )
        .unwrap();
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.get(CombatantId(1)).unwrap().armor_class, 16);
        assert!(roster
            .get(CombatantId(2))
            .unwrap()
            .has_condition(Condition::Poisoned));
    }
}
