use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::condition::Condition;

/// Score assumed for any ability a combatant does not list.
pub const DEFAULT_ABILITY_SCORE: i32 = 10;

/// Armor class assumed when a combatant carries none.
pub const DEFAULT_ARMOR_CLASS: i32 = 10;

/// Grid squares a combatant may move per turn unless told otherwise.
pub const DEFAULT_SPEED: u32 = 6;

/// Newtype wrapper for combatant IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CombatantId(pub u64);

impl std::fmt::Display for CombatantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The six ability scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ability {
    Str,
    Dex,
    Con,
    Int,
    Wis,
    Cha,
}

impl Ability {
    pub const ALL: [Ability; 6] = [
        Ability::Str,
        Ability::Dex,
        Ability::Con,
        Ability::Int,
        Ability::Wis,
        Ability::Cha,
    ];

    /// Three-letter key: "str", "dex", ...
    pub fn key(&self) -> &'static str {
        match self {
            Self::Str => "str",
            Self::Dex => "dex",
            Self::Con => "con",
            Self::Int => "int",
            Self::Wis => "wis",
            Self::Cha => "cha",
        }
    }

    /// Full name: "Strength", "Dexterity", ...
    pub fn name(&self) -> &'static str {
        match self {
            Self::Str => "Strength",
            Self::Dex => "Dexterity",
            Self::Con => "Constitution",
            Self::Int => "Intelligence",
            Self::Wis => "Wisdom",
            Self::Cha => "Charisma",
        }
    }

    /// Parse a three-letter key or a full name, case-insensitively.
    pub fn from_key(key: &str) -> Option<Ability> {
        let key = key.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|a| a.key() == key || a.name().to_lowercase() == key)
    }
}

/// Raw ability scores. Absent scores read as [`DEFAULT_ABILITY_SCORE`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityScores {
    #[serde(rename = "str", skip_serializing_if = "Option::is_none")]
    pub strength: Option<i32>,
    #[serde(rename = "dex", skip_serializing_if = "Option::is_none")]
    pub dexterity: Option<i32>,
    #[serde(rename = "con", skip_serializing_if = "Option::is_none")]
    pub constitution: Option<i32>,
    #[serde(rename = "int", skip_serializing_if = "Option::is_none")]
    pub intelligence: Option<i32>,
    #[serde(rename = "wis", skip_serializing_if = "Option::is_none")]
    pub wisdom: Option<i32>,
    #[serde(rename = "cha", skip_serializing_if = "Option::is_none")]
    pub charisma: Option<i32>,
}

impl AbilityScores {
    fn slot(&self, ability: Ability) -> Option<i32> {
        match ability {
            Ability::Str => self.strength,
            Ability::Dex => self.dexterity,
            Ability::Con => self.constitution,
            Ability::Int => self.intelligence,
            Ability::Wis => self.wisdom,
            Ability::Cha => self.charisma,
        }
    }

    /// The score for `ability`, defaulting to 10 when absent.
    pub fn score(&self, ability: Ability) -> i32 {
        self.slot(ability).unwrap_or(DEFAULT_ABILITY_SCORE)
    }

    /// Builder-style setter.
    pub fn with(mut self, ability: Ability, score: i32) -> Self {
        let slot = match ability {
            Ability::Str => &mut self.strength,
            Ability::Dex => &mut self.dexterity,
            Ability::Con => &mut self.constitution,
            Ability::Int => &mut self.intelligence,
            Ability::Wis => &mut self.wisdom,
            Ability::Cha => &mut self.charisma,
        };
        *slot = Some(score);
        self
    }
}

/// Death-save counters. The two counters never cancel each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeathSaves {
    pub successes: u8,
    pub failures: u8,
}

/// A square on the battle grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

fn default_armor_class() -> i32 {
    DEFAULT_ARMOR_CLASS
}

fn default_speed() -> u32 {
    DEFAULT_SPEED
}

/// A token on the table: player character or NPC.
///
/// The engine reads combatants as snapshots and never writes back to them;
/// every change is reported as a delta for the session layer to apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub id: CombatantId,
    pub label: String,
    #[serde(default, alias = "stats")]
    pub ability_scores: AbilityScores,
    pub hp: i32,
    pub max_hp: i32,
    #[serde(default = "default_armor_class", alias = "ac")]
    pub armor_class: i32,
    #[serde(default)]
    pub conditions: BTreeSet<Condition>,
    #[serde(default)]
    pub death_saves: DeathSaves,
    #[serde(default)]
    pub position: GridPos,
    #[serde(default = "default_speed")]
    pub speed: u32,
    #[serde(default)]
    pub is_npc: bool,
}

impl Combatant {
    /// A fresh combatant at full health with default scores.
    pub fn new(id: CombatantId, label: impl Into<String>, max_hp: i32) -> Self {
        Self {
            id,
            label: label.into(),
            ability_scores: AbilityScores::default(),
            hp: max_hp,
            max_hp,
            armor_class: DEFAULT_ARMOR_CLASS,
            conditions: BTreeSet::new(),
            death_saves: DeathSaves::default(),
            position: GridPos::default(),
            speed: DEFAULT_SPEED,
            is_npc: false,
        }
    }

    pub fn with_scores(mut self, scores: AbilityScores) -> Self {
        self.ability_scores = scores;
        self
    }

    pub fn with_armor_class(mut self, armor_class: i32) -> Self {
        self.armor_class = armor_class;
        self
    }

    pub fn with_position(mut self, position: GridPos) -> Self {
        self.position = position;
        self
    }

    pub fn npc(mut self) -> Self {
        self.is_npc = true;
        self
    }

    /// Returns true if this combatant currently has `condition`.
    pub fn has_condition(&self, condition: Condition) -> bool {
        self.conditions.contains(&condition)
    }

    /// Label used in narratives; never empty.
    pub fn display_name(&self) -> &str {
        let label = self.label.trim();
        if label.is_empty() {
            "Unknown"
        } else {
            label
        }
    }

    /// Returns true once HP has dropped to zero.
    pub fn is_down(&self) -> bool {
        self.hp <= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_scores_default_to_ten() {
        let scores = AbilityScores::default().with(Ability::Str, 16);
        assert_eq!(scores.score(Ability::Str), 16);
        assert_eq!(scores.score(Ability::Dex), DEFAULT_ABILITY_SCORE);
        assert_eq!(scores.score(Ability::Cha), DEFAULT_ABILITY_SCORE);
    }

    #[test]
    fn ability_from_key_accepts_names() {
        assert_eq!(Ability::from_key("dex"), Some(Ability::Dex));
        assert_eq!(Ability::from_key(" Wisdom "), Some(Ability::Wis));
        assert_eq!(Ability::from_key("luck"), None);
    }

    #[test]
    fn combatant_defaults() {
        let c = Combatant::new(CombatantId(3), "Goblin", 7);
        assert_eq!(c.hp, 7);
        assert_eq!(c.armor_class, DEFAULT_ARMOR_CLASS);
        assert_eq!(c.speed, DEFAULT_SPEED);
        assert!(!c.is_npc);
        assert!(c.conditions.is_empty());
        assert_eq!(c.display_name(), "Goblin");
    }

    #[test]
    fn blank_label_displays_unknown() {
        let c = Combatant::new(CombatantId(1), "  ", 5);
        assert_eq!(c.display_name(), "Unknown");
    }

    #[test]
    fn combatant_from_ron_with_store_field_names() {
        let input = r#"#![enable(implicit_some)]
        (
            id: (4),
            label: "Ogre",
            stats: (str: 19, con: 16),
            hp: 59,
            max_hp: 59,
            ac: 11,
            conditions: [prone],
            is_npc: true,
        )"#;
        let ogre: Combatant = ron::from_str(input).unwrap();
        assert_eq!(ogre.id, CombatantId(4));
        assert_eq!(ogre.ability_scores.score(Ability::Str), 19);
        assert_eq!(ogre.ability_scores.score(Ability::Dex), 10);
        assert_eq!(ogre.armor_class, 11);
        assert!(ogre.has_condition(Condition::Prone));
        assert_eq!(ogre.speed, DEFAULT_SPEED);
        assert!(ogre.is_npc);
    }
}
