use serde::{Deserialize, Serialize};

use super::action::ActionType;
use super::combatant::CombatantId;
use super::condition::Condition;
use crate::core::dice::RollResult;

/// Log category the session layer files a result under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultKind {
    Dice,
    Combat,
    Action,
    Movement,
    Narrative,
}

/// A state change the caller is asked to apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Effect {
    Condition {
        target: CombatantId,
        condition: Condition,
    },
}

/// Everything one resolved action produced: text to show, dice to show,
/// and deltas to apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    pub narrative: String,
    pub rolls: Vec<RollResult>,
    pub kind: ResultKind,
    /// `None` only for the placeholder result of an empty resolution.
    pub action: Option<ActionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<CombatantId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage: Option<i32>,
    /// Target HP the damage was computed from; appliers compare against it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prior_target_hp: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_target_hp: Option<i32>,
    #[serde(default)]
    pub target_downed: bool,
    #[serde(default)]
    pub requires_grid_move: bool,
    #[serde(default)]
    pub effects: Vec<Effect>,
}

impl ActionResult {
    /// A result carrying only narrative and rolls.
    pub fn new(narrative: impl Into<String>, kind: ResultKind, action: Option<ActionType>) -> Self {
        Self {
            narrative: narrative.into(),
            rolls: Vec::new(),
            kind,
            action,
            target_id: None,
            damage: None,
            prior_target_hp: None,
            new_target_hp: None,
            target_downed: false,
            requires_grid_move: false,
            effects: Vec::new(),
        }
    }

    /// The neutral result for "nothing to resolve".
    pub fn nothing() -> Self {
        Self::new("No action to resolve.", ResultKind::Narrative, None)
    }

    pub fn with_roll(mut self, roll: RollResult) -> Self {
        self.rolls.push(roll);
        self
    }

    /// Returns true when the caller has HP to write back.
    pub fn has_damage(&self) -> bool {
        self.target_id.is_some() && self.new_target_hp.is_some()
    }
}

/// One slot of the initiative order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitiativeEntry {
    pub token_id: CombatantId,
    pub label: String,
    pub roll: RollResult,
    pub total: i32,
    pub is_npc: bool,
}

/// The mechanical part of a start-of-turn condition effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnEffectKind {
    Damage { amount: i32, new_hp: i32 },
    Disadvantage,
    SkipTurn,
}

/// What a condition does to its bearer as their turn begins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnEffect {
    pub condition: Condition,
    pub kind: TurnEffectKind,
    pub narrative: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roll: Option<RollResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_result_has_narrative() {
        let r = ActionResult::nothing();
        assert_eq!(r.narrative, "No action to resolve.");
        assert!(r.rolls.is_empty());
        assert!(r.action.is_none());
        assert!(!r.has_damage());
    }

    #[test]
    fn effect_serializes_with_kind_tag() {
        let effect = Effect::Condition {
            target: CombatantId(9),
            condition: Condition::Shielded,
        };
        let text = ron::to_string(&effect).unwrap();
        assert!(text.contains("shielded"), "got {}", text);
    }
}
