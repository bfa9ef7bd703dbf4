use serde::{Deserialize, Serialize};

use super::combatant::Combatant;

/// The kinds of action a line of player input can express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    DiceRoll,
    Attack,
    CastSpell,
    Movement,
    SkillCheck,
    Defend,
    Interact,
    Generic,
}

impl ActionType {
    /// Snake-case name, as stored in log metadata.
    pub fn name(&self) -> &'static str {
        match self {
            Self::DiceRoll => "dice_roll",
            Self::Attack => "attack",
            Self::CastSpell => "cast_spell",
            Self::Movement => "movement",
            Self::SkillCheck => "skill_check",
            Self::Defend => "defend",
            Self::Interact => "interact",
            Self::Generic => "generic",
        }
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Who or what the input pointed at.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Targeting {
    /// The roster member the phrase resolved to, if any.
    pub target: Option<Combatant>,
    /// The phrase as it appeared in the input, lowercased.
    pub target_name: Option<String>,
}

/// What the action does, carrying only the data its resolution needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    DiceRoll { notation: String },
    Attack(Targeting),
    CastSpell(Targeting),
    Movement(Targeting),
    SkillCheck,
    Defend,
    Interact(Targeting),
    Generic,
}

/// A classified line of player input. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub raw_input: String,
    pub actor: Combatant,
    pub kind: ActionKind,
}

impl Action {
    pub fn action_type(&self) -> ActionType {
        match &self.kind {
            ActionKind::DiceRoll { .. } => ActionType::DiceRoll,
            ActionKind::Attack(_) => ActionType::Attack,
            ActionKind::CastSpell(_) => ActionType::CastSpell,
            ActionKind::Movement(_) => ActionType::Movement,
            ActionKind::SkillCheck => ActionType::SkillCheck,
            ActionKind::Defend => ActionType::Defend,
            ActionKind::Interact(_) => ActionType::Interact,
            ActionKind::Generic => ActionType::Generic,
        }
    }

    fn targeting(&self) -> Option<&Targeting> {
        match &self.kind {
            ActionKind::Attack(t)
            | ActionKind::CastSpell(t)
            | ActionKind::Movement(t)
            | ActionKind::Interact(t) => Some(t),
            _ => None,
        }
    }

    /// The resolved target, for kinds that take one.
    pub fn target(&self) -> Option<&Combatant> {
        self.targeting().and_then(|t| t.target.as_ref())
    }

    /// The target phrase from the input, for kinds that take one.
    pub fn target_name(&self) -> Option<&str> {
        self.targeting().and_then(|t| t.target_name.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::combatant::CombatantId;

    #[test]
    fn target_accessors_follow_kind() {
        let actor = Combatant::new(CombatantId(1), "Aria", 12);
        let goblin = Combatant::new(CombatantId(2), "Goblin", 7);
        let attack = Action {
            raw_input: "I attack the goblin".to_string(),
            actor: actor.clone(),
            kind: ActionKind::Attack(Targeting {
                target: Some(goblin),
                target_name: Some("goblin".to_string()),
            }),
        };
        assert_eq!(attack.action_type(), ActionType::Attack);
        assert_eq!(attack.target().map(|t| t.id), Some(CombatantId(2)));
        assert_eq!(attack.target_name(), Some("goblin"));

        let defend = Action {
            raw_input: "I defend".to_string(),
            actor,
            kind: ActionKind::Defend,
        };
        assert!(defend.target().is_none());
        assert_eq!(defend.action_type().name(), "defend");
    }
}
