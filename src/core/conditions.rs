//! Condition bookkeeping and start-of-turn condition effects.

use std::collections::BTreeSet;

use super::dice::roll_damage;
use super::rng::DieSource;
use crate::schema::combatant::Combatant;
use crate::schema::condition::Condition;
use crate::schema::outcome::{TurnEffect, TurnEffectKind};

/// Fire damage a burning combatant takes as its turn starts.
pub const BURN_DAMAGE: &str = "1d6";

/// A copy of `conditions` with `condition` present. Idempotent.
pub fn apply_condition(conditions: &BTreeSet<Condition>, condition: Condition) -> BTreeSet<Condition> {
    let mut next = conditions.clone();
    next.insert(condition);
    next
}

/// A copy of `conditions` without `condition`. Removing an absent
/// condition is a no-op.
pub fn remove_condition(conditions: &BTreeSet<Condition>, condition: Condition) -> BTreeSet<Condition> {
    let mut next = conditions.clone();
    next.remove(&condition);
    next
}

/// Effects `token`'s conditions trigger at the start of its turn.
///
/// Reports burning, then poisoned, then stunned. Nothing is applied; a
/// burning effect carries the HP the token would be left with.
pub fn process_condition_effects<D: DieSource + ?Sized>(
    token: &Combatant,
    dice: &mut D,
) -> Vec<TurnEffect> {
    let name = token.display_name();
    let mut effects = Vec::new();

    if token.has_condition(Condition::Burning) {
        let burn = roll_damage(BURN_DAMAGE, false, dice);
        let amount = burn.total;
        effects.push(TurnEffect {
            condition: Condition::Burning,
            kind: TurnEffectKind::Damage {
                amount,
                new_hp: token.hp.saturating_sub(amount).max(0),
            },
            narrative: format!("🔥 **{}** takes **{}** fire damage from burning!", name, amount),
            roll: Some(burn),
        });
    }

    if token.has_condition(Condition::Poisoned) {
        effects.push(TurnEffect {
            condition: Condition::Poisoned,
            kind: TurnEffectKind::Disadvantage,
            narrative: format!(
                "☠️ **{}** is poisoned — disadvantage on attacks and ability checks.",
                name
            ),
            roll: None,
        });
    }

    if token.has_condition(Condition::Stunned) {
        effects.push(TurnEffect {
            condition: Condition::Stunned,
            kind: TurnEffectKind::SkipTurn,
            narrative: format!("💫 **{}** is stunned and cannot act!", name),
            roll: None,
        });
    }

    effects
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::ScriptedDice;
    use crate::schema::combatant::CombatantId;

    fn token_with(conditions: &[Condition]) -> Combatant {
        let mut token = Combatant::new(CombatantId(5), "Brannoc", 12);
        token.hp = 4;
        token.conditions = conditions.iter().copied().collect();
        token
    }

    #[test]
    fn apply_is_idempotent() {
        let empty = BTreeSet::new();
        let once = apply_condition(&empty, Condition::Poisoned);
        let twice = apply_condition(&once, Condition::Poisoned);
        assert_eq!(once, twice);
        assert_eq!(twice.len(), 1);
        assert!(empty.is_empty());
    }

    #[test]
    fn remove_absent_is_noop() {
        let set = apply_condition(&BTreeSet::new(), Condition::Prone);
        assert_eq!(remove_condition(&set, Condition::Blinded), set);
        assert!(remove_condition(&set, Condition::Prone).is_empty());
    }

    #[test]
    fn no_conditions_no_effects() {
        let mut dice = ScriptedDice::new(vec![3]);
        assert!(process_condition_effects(&token_with(&[]), &mut dice).is_empty());
        assert_eq!(dice.consumed(), 0);
    }

    #[test]
    fn burning_reports_damage_without_mutating() {
        let token = token_with(&[Condition::Burning]);
        let mut dice = ScriptedDice::new(vec![6]);
        let effects = process_condition_effects(&token, &mut dice);
        assert_eq!(effects.len(), 1);
        assert_eq!(
            effects[0].kind,
            TurnEffectKind::Damage {
                amount: 6,
                new_hp: 0
            }
        );
        assert!(effects[0].narrative.contains("6"));
        assert_eq!(token.hp, 4);
    }

    #[test]
    fn effects_follow_fixed_order() {
        let token = token_with(&[Condition::Stunned, Condition::Poisoned, Condition::Burning, Condition::Prone]);
        let mut dice = ScriptedDice::new(vec![2]);
        let effects = process_condition_effects(&token, &mut dice);
        let order: Vec<Condition> = effects.iter().map(|e| e.condition).collect();
        assert_eq!(
            order,
            vec![Condition::Burning, Condition::Poisoned, Condition::Stunned]
        );
        assert_eq!(effects[1].kind, TurnEffectKind::Disadvantage);
        assert_eq!(effects[2].kind, TurnEffectKind::SkipTurn);
        assert!(effects[1].roll.is_none());
    }
}
