//! The resolution pipeline: text → Action → ActionResult.
//!
//! `SessionEngine` owns the rule book and the die source and nothing else.
//! It reads the roster it is handed and returns results for the caller to
//! apply, usually through `Roster`.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::classifier::parse_action;
use crate::core::combat::{resolve_action, resolve_skill_check, roll_all_initiative};
use crate::core::conditions::process_condition_effects;
use crate::core::death_save::{roll_death_save, DeathSaveOutcome};
use crate::core::dice::{roll, RollResult};
use crate::core::rng::{DieSource, RngDice};
use crate::core::rules::{RuleBook, RulesError};
use crate::schema::action::Action;
use crate::schema::combatant::{Ability, Combatant};
use crate::schema::outcome::{ActionResult, InitiativeEntry, TurnEffect};
use crate::schema::roster::RosterError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("rules error: {0}")]
    Rules(#[from] RulesError),
    #[error("roster error: {0}")]
    Roster(#[from] RosterError),
}

/// The top-level session engine. Built via `SessionEngine::builder()`.
pub struct SessionEngine {
    rules: RuleBook,
    dice: Box<dyn DieSource>,
}

/// Builder for constructing a `SessionEngine`.
pub struct SessionEngineBuilder {
    seed: Option<u64>,
    rules_path: Option<PathBuf>,
    /// Directly provided rules (for testing without files).
    rules: Option<RuleBook>,
    dice: Option<Box<dyn DieSource>>,
}

impl SessionEngine {
    pub fn builder() -> SessionEngineBuilder {
        SessionEngineBuilder {
            seed: None,
            rules_path: None,
            rules: None,
            dice: None,
        }
    }

    pub fn rules(&self) -> &RuleBook {
        &self.rules
    }

    /// Classify `text` for `actor`. `None` for blank input.
    pub fn parse(&self, text: &str, actor: &Combatant, roster: &[Combatant]) -> Option<Action> {
        parse_action(text, actor, roster)
    }

    /// Resolve an action. `None` yields the neutral placeholder result.
    pub fn resolve(&mut self, action: Option<&Action>) -> ActionResult {
        match action {
            Some(action) => resolve_action(action, &self.rules, self.dice.as_mut()),
            None => ActionResult::nothing(),
        }
    }

    /// Parse and resolve one line of player input.
    ///
    /// Returns `None` when there is nothing to resolve; the caller should
    /// not emit a log entry for it.
    pub fn submit(
        &mut self,
        text: &str,
        actor: &Combatant,
        roster: &[Combatant],
    ) -> Option<ActionResult> {
        let Some(action) = self.parse(text, actor, roster) else {
            debug!(actor = %actor.id, "blank input ignored");
            return None;
        };
        Some(self.resolve(Some(&action)))
    }

    pub fn roll(&mut self, notation: &str) -> RollResult {
        roll(notation, self.dice.as_mut())
    }

    pub fn roll_initiative(&mut self, tokens: &[Combatant]) -> Vec<InitiativeEntry> {
        roll_all_initiative(tokens, self.dice.as_mut())
    }

    /// A direct check of `ability`, against the rule book's skill DC unless
    /// `dc` is given.
    pub fn skill_check(
        &mut self,
        token: &Combatant,
        ability: Ability,
        dc: Option<i32>,
        skill_name: Option<&str>,
    ) -> ActionResult {
        let dc = dc.unwrap_or(self.rules.skill_check_dc);
        resolve_skill_check(token, ability, dc, skill_name, self.dice.as_mut())
    }

    pub fn death_save(&mut self, token: &Combatant) -> DeathSaveOutcome {
        roll_death_save(token, self.dice.as_mut())
    }

    /// Start-of-turn condition effects for `token`.
    pub fn start_turn(&mut self, token: &Combatant) -> Vec<TurnEffect> {
        process_condition_effects(token, self.dice.as_mut())
    }
}

impl SessionEngineBuilder {
    /// Seed the default die source for reproducible sessions.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn rules_path(mut self, path: impl AsRef<Path>) -> Self {
        self.rules_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Provide rules directly. Takes precedence over `rules_path`.
    pub fn with_rules(mut self, rules: RuleBook) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Provide a die source directly. Takes precedence over `seed`.
    pub fn with_dice(mut self, dice: impl DieSource + 'static) -> Self {
        self.dice = Some(Box::new(dice));
        self
    }

    pub fn build(self) -> Result<SessionEngine, EngineError> {
        let rules = match (self.rules, &self.rules_path) {
            (Some(rules), _) => {
                rules.validate()?;
                rules
            }
            (None, Some(path)) => {
                info!(path = %path.display(), "loading rule book");
                RuleBook::load_from_ron(path)?
            }
            (None, None) => RuleBook::default(),
        };

        let dice: Box<dyn DieSource> = match (self.dice, self.seed) {
            (Some(dice), _) => dice,
            (None, Some(seed)) => Box::new(RngDice::seeded(seed)),
            (None, None) => Box::new(RngDice::from_entropy()),
        };

        Ok(SessionEngine { rules, dice })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::ScriptedDice;
    use crate::schema::combatant::CombatantId;
    use crate::schema::outcome::ResultKind;

    fn party() -> Vec<Combatant> {
        vec![
            Combatant::new(CombatantId(1), "Kael", 20),
            Combatant::new(CombatantId(2), "Goblin", 7).npc(),
        ]
    }

    #[test]
    fn blank_input_resolves_to_nothing() {
        let mut engine = SessionEngine::builder().seed(1).build().unwrap();
        let roster = party();
        assert!(engine.submit("   ", &roster[0], &roster).is_none());
        assert_eq!(engine.resolve(None).narrative, "No action to resolve.");
    }

    #[test]
    fn scripted_dice_make_submit_exact() {
        let mut engine = SessionEngine::builder()
            .with_dice(ScriptedDice::new(vec![12, 5]))
            .build()
            .unwrap();
        let roster = party();
        let result = engine.submit("I stab the goblin", &roster[0], &roster).unwrap();
        assert_eq!(result.kind, ResultKind::Combat);
        assert_eq!(result.damage, Some(5));
        assert_eq!(result.new_target_hp, Some(2));
    }

    #[test]
    fn same_seed_same_rolls() {
        let mut a = SessionEngine::builder().seed(42).build().unwrap();
        let mut b = SessionEngine::builder().seed(42).build().unwrap();
        for _ in 0..10 {
            assert_eq!(a.roll("3d6+1").rolls, b.roll("3d6+1").rolls);
        }
    }

    #[test]
    fn custom_rules_change_resolution() {
        let rules = RuleBook {
            melee_damage: "1d12".to_string(),
            ..RuleBook::default()
        };
        let mut engine = SessionEngine::builder()
            .with_rules(rules)
            .with_dice(ScriptedDice::new(vec![15, 11]))
            .build()
            .unwrap();
        let roster = party();
        let result = engine.submit("I hit the goblin", &roster[0], &roster).unwrap();
        assert_eq!(result.damage, Some(11));
    }

    #[test]
    fn skill_check_defaults_to_rules_dc() {
        let rules = RuleBook {
            skill_check_dc: 14,
            ..RuleBook::default()
        };
        let mut engine = SessionEngine::builder()
            .with_rules(rules)
            .with_dice(ScriptedDice::new(vec![13]))
            .build()
            .unwrap();
        let roster = party();
        let fallback = engine.skill_check(&roster[0], Ability::Con, None, None);
        assert_eq!(fallback.rolls[0].success(), Some(false));
        assert!(fallback.narrative.contains("Constitution check"));

        let easy = engine.skill_check(&roster[0], Ability::Con, Some(13), Some("Endurance"));
        assert_eq!(easy.rolls[0].success(), Some(true));
        assert!(easy.narrative.contains("Endurance check"));
    }

    #[test]
    fn invalid_rules_fail_build() {
        let rules = RuleBook {
            spell_damage: "lots".to_string(),
            ..RuleBook::default()
        };
        let err = SessionEngine::builder().with_rules(rules).build().err();
        assert!(matches!(err, Some(EngineError::Rules(_))));
    }

    #[test]
    fn missing_rules_file_fails_build() {
        let err = SessionEngine::builder()
            .rules_path("no/such/rules.ron")
            .build()
            .err();
        assert!(matches!(err, Some(EngineError::Rules(RulesError::Io(_)))));
    }
}
