//! Rule book — the tunable numbers and tables behind resolution.
//!
//! `RuleBook::default()` is the standard rule set. A RON file may override
//! any subset of it; omitted fields keep their defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use super::dice;
use super::progression::STANDARD_XP_THRESHOLDS;
use crate::schema::combatant::{Ability, DEFAULT_ARMOR_CLASS};

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("invalid damage notation for {field}: {notation}")]
    InvalidDamage { field: &'static str, notation: String },
    #[error("invalid XP table: {0}")]
    InvalidXpTable(String),
    #[error("skill lexicon entry {0} has an empty keyword or name")]
    EmptySkill(usize),
}

/// One entry of the skill lexicon: an input keyword, the skill it names,
/// and the ability the check uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillEntry {
    pub keyword: String,
    pub skill: String,
    pub ability: Ability,
}

impl SkillEntry {
    pub fn new(keyword: &str, skill: &str, ability: Ability) -> Self {
        Self {
            keyword: keyword.to_string(),
            skill: skill.to_string(),
            ability,
        }
    }
}

/// Standard lexicon. Noun forms come first so they win over verb forms.
fn standard_skills() -> Vec<SkillEntry> {
    use Ability::*;
    [
        ("athletics", "Athletics", Str),
        ("acrobatics", "Acrobatics", Dex),
        ("stealth", "Stealth", Dex),
        ("sleight", "Sleight of Hand", Dex),
        ("arcana", "Arcana", Int),
        ("history", "History", Int),
        ("investigation", "Investigation", Int),
        ("nature", "Nature", Int),
        ("religion", "Religion", Int),
        ("insight", "Insight", Wis),
        ("medicine", "Medicine", Wis),
        ("perception", "Perception", Wis),
        ("survival", "Survival", Wis),
        ("animal handling", "Animal Handling", Wis),
        ("deception", "Deception", Cha),
        ("intimidation", "Intimidation", Cha),
        ("performance", "Performance", Cha),
        ("persuasion", "Persuasion", Cha),
        ("persuade", "Persuasion", Cha),
        ("intimidate", "Intimidation", Cha),
        ("deceive", "Deception", Cha),
        ("investigate", "Investigation", Int),
        ("inspect", "Investigation", Int),
        ("search", "Investigation", Int),
    ]
    .into_iter()
    .map(|(keyword, skill, ability)| SkillEntry::new(keyword, skill, ability))
    .collect()
}

/// The numbers and tables the resolution pipeline consults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleBook {
    /// AC used when an attack has no target or the target lists none.
    pub default_armor_class: i32,
    pub melee_damage: String,
    pub spell_damage: String,
    /// DC of an untargeted spell, which is rolled as an INT check.
    pub spell_focus_dc: i32,
    pub skill_check_dc: i32,
    pub interact_dc: i32,
    /// Scanned in order; the first keyword found in the input wins.
    pub skills: Vec<SkillEntry>,
    pub default_skill: SkillEntry,
    pub xp_thresholds: Vec<u32>,
}

impl Default for RuleBook {
    fn default() -> Self {
        Self {
            default_armor_class: DEFAULT_ARMOR_CLASS,
            melee_damage: "1d6".to_string(),
            spell_damage: "1d8".to_string(),
            spell_focus_dc: 12,
            skill_check_dc: 12,
            interact_dc: 10,
            skills: standard_skills(),
            default_skill: SkillEntry::new("perception", "Perception", Ability::Wis),
            xp_thresholds: STANDARD_XP_THRESHOLDS.to_vec(),
        }
    }
}

impl RuleBook {
    /// Load and validate a rule book from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<RuleBook, RulesError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse and validate a rule book from a RON string.
    pub fn parse_ron(input: &str) -> Result<RuleBook, RulesError> {
        let rules: RuleBook = ron::from_str(input)?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn validate(&self) -> Result<(), RulesError> {
        for (field, notation) in [
            ("melee_damage", &self.melee_damage),
            ("spell_damage", &self.spell_damage),
        ] {
            if dice::parse(notation).is_err() {
                return Err(RulesError::InvalidDamage {
                    field,
                    notation: notation.clone(),
                });
            }
        }

        match self.xp_thresholds.first() {
            None => return Err(RulesError::InvalidXpTable("table is empty".to_string())),
            Some(&first) if first != 0 => {
                return Err(RulesError::InvalidXpTable(format!(
                    "level 1 must start at 0 XP, found {}",
                    first
                )))
            }
            Some(_) => {}
        }
        if let Some(pair) = self.xp_thresholds.windows(2).find(|w| w[0] >= w[1]) {
            return Err(RulesError::InvalidXpTable(format!(
                "thresholds must ascend strictly, found {} then {}",
                pair[0], pair[1]
            )));
        }

        let blank = |entry: &SkillEntry| entry.keyword.trim().is_empty() || entry.skill.trim().is_empty();
        if let Some(index) = self.skills.iter().position(blank) {
            return Err(RulesError::EmptySkill(index));
        }
        if blank(&self.default_skill) {
            return Err(RulesError::EmptySkill(self.skills.len()));
        }

        Ok(())
    }

    /// First lexicon entry whose keyword appears in `input`, else the default.
    pub fn skill_for(&self, input: &str) -> &SkillEntry {
        let lowered = input.to_lowercase();
        self.skills
            .iter()
            .find(|entry| lowered.contains(&entry.keyword.to_lowercase()))
            .unwrap_or(&self.default_skill)
    }
}
