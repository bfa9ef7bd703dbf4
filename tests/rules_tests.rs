//! Rule book integration tests — RON overrides flowing through resolution.

use session_engine::core::pipeline::{EngineError, SessionEngine};
use session_engine::core::progression::{level_in, progress_in};
use session_engine::core::rng::ScriptedDice;
use session_engine::core::rules::{RuleBook, RulesError};
use session_engine::schema::combatant::{Ability, CombatantId, DeathSaves};
use session_engine::schema::roster::Roster;
use std::path::Path;

const RULES: &str = "tests/fixtures/rules.ron";

fn load_rules() -> RuleBook {
    RuleBook::load_from_ron(Path::new(RULES)).unwrap()
}

#[test]
fn partial_file_keeps_defaults() {
    let rules = load_rules();
    let defaults = RuleBook::default();
    assert_eq!(rules.melee_damage, "1d10");
    assert_eq!(rules.skill_check_dc, 15);
    assert_eq!(rules.interact_dc, defaults.interact_dc);
    assert_eq!(rules.default_armor_class, defaults.default_armor_class);
    assert_eq!(rules.default_skill, defaults.default_skill);
}

#[test]
fn custom_lexicon_replaces_standard_one() {
    let rules = load_rules();
    assert_eq!(rules.skill_for("I climb the wall").ability, Ability::Str);
    assert_eq!(rules.skill_for("I listen at the door").skill, "Perception");
    // not in the custom lexicon any more
    assert_eq!(rules.skill_for("I try persuasion").skill, "Perception");
}

#[test]
fn custom_level_table() {
    let rules = load_rules();
    assert_eq!(level_in(&rules.xp_thresholds, 999), 1);
    assert_eq!(level_in(&rules.xp_thresholds, 3500), 3);
    assert_eq!(level_in(&rules.xp_thresholds, 9000), 4);
    assert_eq!(progress_in(&rules.xp_thresholds, 2000), 0.5);
    assert_eq!(progress_in(&rules.xp_thresholds, 9000), 1.0);
}

#[test]
fn engine_resolves_with_file_rules() {
    let roster = Roster::load_from_ron(Path::new("tests/fixtures/roster.ron")).unwrap();
    let mut engine = SessionEngine::builder()
        .rules_path(RULES)
        .with_dice(ScriptedDice::new(vec![11, 9]))
        .build()
        .unwrap();
    let kael = roster.get(CombatantId(1)).unwrap();

    // 11 + 3 = 14 vs AC 12, then 1d10 -> 9
    let result = engine
        .submit("I strike the goblin scout", kael, roster.as_slice())
        .unwrap();
    assert_eq!(result.damage, Some(9));
    assert_eq!(result.new_target_hp, Some(0));
    assert!(result.target_downed);

    // 11 + 0 = 11 misses the raised DC 15
    let check = engine
        .submit("I check the door and listen", kael, roster.as_slice())
        .unwrap();
    assert_eq!(check.rolls[0].success(), Some(false));
    assert!(check.narrative.contains("Perception"));
}

#[test]
fn death_saves_stay_at_dc_ten_under_custom_rules() {
    let roster = Roster::load_from_ron(Path::new("tests/fixtures/roster.ron")).unwrap();
    let mut engine = SessionEngine::builder()
        .rules_path(RULES)
        .with_dice(ScriptedDice::new(vec![10, 19, 9, 2]))
        .build()
        .unwrap();
    let mira = roster.get(CombatantId(2)).unwrap();

    for _ in 0..2 {
        let outcome = engine.death_save(mira);
        assert_eq!(outcome.saves, DeathSaves { successes: 2, failures: 1 });
    }
    for _ in 0..2 {
        let outcome = engine.death_save(mira);
        assert_eq!(outcome.saves, DeathSaves { successes: 1, failures: 2 });
        assert!(!outcome.dead);
    }
}

#[test]
fn invalid_files_are_rejected() {
    let bad_damage = RuleBook::parse_ron(r#"(melee_damage: "a lot")"#).unwrap_err();
    assert!(matches!(bad_damage, RulesError::InvalidDamage { field: "melee_damage", .. }));

    let bad_table = RuleBook::parse_ron("(xp_thresholds: [0, 500, 500])").unwrap_err();
    assert!(matches!(bad_table, RulesError::InvalidXpTable(_)));

    let blank_skill =
        RuleBook::parse_ron(r#"(skills: [(keyword: " ", skill: "Nothing", ability: wis)])"#)
            .unwrap_err();
    assert!(matches!(blank_skill, RulesError::EmptySkill(0)));

    assert!(matches!(
        RuleBook::parse_ron("(melee_damage: 3)"),
        Err(RulesError::Ron(_))
    ));
}

#[test]
fn builder_surfaces_rule_errors() {
    let err = SessionEngine::builder()
        .rules_path("tests/fixtures/missing.ron")
        .build()
        .err();
    assert!(matches!(err, Some(EngineError::Rules(RulesError::Io(_)))));
}
