//! Pipeline integration tests — text in, results applied to a roster.

use session_engine::core::classifier::{classify, parse_action};
use session_engine::core::pipeline::SessionEngine;
use session_engine::core::rng::ScriptedDice;
use session_engine::core::turns::InitiativeTracker;
use session_engine::schema::action::ActionType;
use session_engine::schema::combatant::{CombatantId, GridPos};
use session_engine::schema::condition::Condition;
use session_engine::schema::outcome::{ResultKind, TurnEffectKind};
use session_engine::schema::roster::{Roster, RosterError};
use std::path::Path;

const KAEL: CombatantId = CombatantId(1);
const MIRA: CombatantId = CombatantId(2);
const ARCHER: CombatantId = CombatantId(3);
const SCOUT: CombatantId = CombatantId(4);

fn load_roster() -> Roster {
    Roster::load_from_ron(Path::new("tests/fixtures/roster.ron")).unwrap()
}

fn scripted(faces: Vec<u32>) -> SessionEngine {
    SessionEngine::builder()
        .with_dice(ScriptedDice::new(faces))
        .build()
        .unwrap()
}

#[test]
fn fixture_roster_loads_with_aliases() {
    let roster = load_roster();
    assert_eq!(roster.len(), 4);
    let kael = roster.get(KAEL).unwrap();
    assert_eq!(kael.armor_class, 16);
    assert_eq!(kael.ability_scores.strength, Some(16));
    assert_eq!(roster.get(SCOUT).unwrap().speed, 5);
    assert!(roster.get(ARCHER).unwrap().is_npc);
}

#[test]
fn attack_targets_first_matching_goblin() {
    let roster = load_roster();
    let kael = roster.get(KAEL).unwrap();
    let action = parse_action("I attack the goblin", kael, roster.as_slice()).unwrap();
    assert_eq!(action.action_type(), ActionType::Attack);
    let target = action.target().unwrap();
    assert!(target.label.to_lowercase().contains("goblin"));
    assert_eq!(target.id, ARCHER);
}

#[test]
fn spell_words_classify_as_spellcasting() {
    assert_eq!(classify("I cast fireball at the dragon"), ActionType::CastSpell);
    assert_eq!(classify("/roll 4d6"), ActionType::DiceRoll);
    assert_eq!(classify("I whistle"), ActionType::Generic);
}

#[test]
fn submit_and_apply_round_trip() {
    let mut roster = load_roster();
    // d20 10 + STR 3 = 13 vs AC 13; 1d6 -> 5
    let mut engine = scripted(vec![10, 5]);
    let kael = roster.get(KAEL).unwrap().clone();
    let result = engine
        .submit("I slash at the goblin archer", &kael, roster.as_slice())
        .unwrap();
    assert_eq!(result.kind, ResultKind::Combat);
    assert_eq!(result.new_target_hp, Some(2));
    roster.apply(&result).unwrap();
    assert_eq!(roster.get(ARCHER).unwrap().hp, 2);
    // the actor's snapshot is untouched
    assert_eq!(kael.hp, 24);
}

#[test]
fn concurrent_results_from_one_snapshot_conflict() {
    let mut roster = load_roster();
    let mut engine = scripted(vec![15, 3]);
    let snapshot = roster.as_slice().to_vec();
    let kael = snapshot[0].clone();
    let first = engine.submit("I hit the goblin archer", &kael, &snapshot).unwrap();
    let second = engine.submit("I hit the goblin archer", &kael, &snapshot).unwrap();

    roster.apply(&first).unwrap();
    let err = roster.apply(&second).unwrap_err();
    assert!(matches!(err, RosterError::StaleHp { id, .. } if id == ARCHER));
    assert_eq!(roster.get(ARCHER).unwrap().hp, 4);
}

#[test]
fn defend_applies_shield_to_actor() {
    let mut roster = load_roster();
    let mut engine = scripted(vec![]);
    let kael = roster.get(KAEL).unwrap().clone();
    let result = engine.submit("I raise my shield", &kael, roster.as_slice()).unwrap();
    roster.apply(&result).unwrap();
    assert!(roster.get(KAEL).unwrap().has_condition(Condition::Shielded));
}

#[test]
fn start_of_turn_effects_apply_in_order() {
    let mut roster = load_roster();
    let mut engine = scripted(vec![4]);
    let archer = roster.get(ARCHER).unwrap().clone();
    let effects = engine.start_turn(&archer);
    assert_eq!(effects.len(), 2);
    assert_eq!(effects[0].condition, Condition::Burning);
    assert_eq!(effects[1].kind, TurnEffectKind::Disadvantage);
    roster.apply_turn_effects(ARCHER, &effects).unwrap();
    assert_eq!(roster.get(ARCHER).unwrap().hp, 3);
}

#[test]
fn frozen_combatant_cannot_move() {
    let mut roster = load_roster();
    assert!(roster.move_to(SCOUT, GridPos::new(4, 2)).is_err());
    assert!(roster.move_to(KAEL, GridPos::new(3, 3)).is_ok());
    assert!(roster.move_to(KAEL, GridPos::new(3, 10)).is_err());
}

#[test]
fn death_saves_accumulate_on_the_roster() {
    let mut roster = load_roster();
    // fixture starts Mira at 1 success / 1 failure
    let mut engine = scripted(vec![14, 1]);

    let mira = roster.get(MIRA).unwrap().clone();
    let outcome = engine.death_save(&mira);
    assert!(!outcome.dead && !outcome.stabilized);
    roster.apply_death_save(MIRA, &outcome).unwrap();
    assert_eq!(roster.get(MIRA).unwrap().death_saves.successes, 2);

    let mira = roster.get(MIRA).unwrap().clone();
    let outcome = engine.death_save(&mira);
    assert!(outcome.dead);
    roster.apply_death_save(MIRA, &outcome).unwrap();
    assert_eq!(roster.get(MIRA).unwrap().death_saves.failures, 3);
}

#[test]
fn natural_twenty_brings_a_combatant_back() {
    let mut roster = load_roster();
    let mut engine = scripted(vec![20]);
    let mira = roster.get(MIRA).unwrap().clone();
    let outcome = engine.death_save(&mira);
    roster.apply_death_save(MIRA, &outcome).unwrap();
    let mira = roster.get(MIRA).unwrap();
    assert_eq!(mira.hp, 1);
    assert_eq!(mira.death_saves.failures, 0);
}

#[test]
fn seeded_initiative_is_sorted_and_reproducible() {
    let roster = load_roster();
    let mut a = SessionEngine::builder().seed(9).build().unwrap();
    let mut b = SessionEngine::builder().seed(9).build().unwrap();
    let first = a.roll_initiative(roster.as_slice());
    let second = b.roll_initiative(roster.as_slice());
    assert_eq!(first, second);
    assert_eq!(first.len(), 4);
    assert!(first.windows(2).all(|w| w[0].total >= w[1].total));
}

#[test]
fn tracker_cycles_through_rolled_order() {
    let roster = load_roster();
    let mut engine = scripted(vec![3, 17, 9, 12]);
    let mut tracker = InitiativeTracker::new(engine.roll_initiative(roster.as_slice()));
    let mut seen = Vec::new();
    for _ in 0..4 {
        seen.push(tracker.current_id().unwrap());
        tracker.advance();
    }
    assert_eq!(seen, vec![MIRA, SCOUT, ARCHER, KAEL]);
    assert_eq!(tracker.round, 2);
}

#[test]
fn bad_notation_becomes_narrative() {
    let roster = load_roster();
    let mut engine = scripted(vec![]);
    let kael = roster.get(KAEL).unwrap();
    let result = engine.submit("/roll 0d6", kael, roster.as_slice()).unwrap();
    assert_eq!(result.kind, ResultKind::Dice);
    assert!(result.rolls[0].is_error());
    assert!(result.narrative.contains("Invalid dice notation"));
}
