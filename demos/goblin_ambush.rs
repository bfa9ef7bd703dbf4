//! Goblin Ambush example — a short scripted skirmish on the road.
//!
//! Two adventurers against two goblins. Initiative is rolled once, then
//! each combatant acts from a fixed script for three rounds. Results are
//! written back through the roster, so HP, conditions and death saves carry
//! from turn to turn.
//!
//! Run with: cargo run --example goblin_ambush

use session_engine::core::pipeline::SessionEngine;
use session_engine::core::progression::{get_level, xp_for_next_level};
use session_engine::core::turns::InitiativeTracker;
use session_engine::schema::combatant::{Ability, AbilityScores, Combatant, CombatantId, GridPos};
use session_engine::schema::condition::Condition;
use session_engine::schema::roster::Roster;

const ROUNDS: u32 = 3;

fn script(label: &str, round: u32) -> &'static str {
    match (label, round) {
        ("Kael", 1) => "I charge and strike the goblin archer",
        ("Kael", _) => "I swing my axe at the goblin scout",
        ("Mira", 1) => "I cast fire bolt at the goblin scout",
        ("Mira", 2) => "I search the bushes for more goblins",
        ("Mira", _) => "I cast frost at the goblin archer",
        ("Goblin Archer", _) => "I shoot an arrow at Mira",
        ("Goblin Scout", 1) => "I dodge behind a tree",
        _ => "I stab at Kael",
    }
}

fn main() {
    let kael = Combatant::new(CombatantId(1), "Kael", 24)
        .with_scores(
            AbilityScores::default()
                .with(Ability::Str, 16)
                .with(Ability::Dex, 12)
                .with(Ability::Con, 15),
        )
        .with_armor_class(16)
        .with_position(GridPos::new(0, 0));
    let mira = Combatant::new(CombatantId(2), "Mira", 14)
        .with_scores(
            AbilityScores::default()
                .with(Ability::Int, 17)
                .with(Ability::Dex, 14)
                .with(Ability::Wis, 12),
        )
        .with_armor_class(12)
        .with_position(GridPos::new(1, 0));
    let archer = Combatant::new(CombatantId(3), "Goblin Archer", 7)
        .with_scores(AbilityScores::default().with(Ability::Dex, 14))
        .with_armor_class(13)
        .with_position(GridPos::new(6, 3))
        .npc();
    let mut scout = Combatant::new(CombatantId(4), "Goblin Scout", 9)
        .with_armor_class(12)
        .with_position(GridPos::new(4, 1))
        .npc();
    scout.conditions.insert(Condition::Poisoned);

    let mut roster =
        Roster::from_vec(vec![kael, mira, archer, scout]).expect("Failed to build roster");

    let mut engine = SessionEngine::builder()
        .seed(1312)
        .build()
        .expect("Failed to build engine");

    println!("=== Goblin Ambush ===\n");

    let order = engine.roll_initiative(roster.as_slice());
    for entry in &order {
        println!("  {:<14} initiative {}", entry.label, entry.total);
    }
    let mut tracker = InitiativeTracker::new(order);

    while tracker.round <= ROUNDS {
        let Some(id) = tracker.current_id() else {
            break;
        };
        let token = roster.get(id).cloned().expect("combatant in roster");
        println!("\n[Round {}] {}", tracker.round, token.display_name());

        if token.is_down() {
            if token.is_npc {
                println!("  (out of the fight)");
            } else {
                let outcome = engine.death_save(&token);
                println!("  {}", outcome.narrative);
                roster
                    .apply_death_save(id, &outcome)
                    .expect("death save applies");
            }
            tracker.advance();
            continue;
        }

        let effects = engine.start_turn(&token);
        for effect in &effects {
            println!("  {}", effect.narrative);
        }
        roster
            .apply_turn_effects(id, &effects)
            .expect("turn effects apply");

        let token = roster.get(id).cloned().expect("combatant in roster");
        let text = script(&token.label, tracker.round);
        println!("  > {}", text);
        if let Some(result) = engine.submit(text, &token, roster.as_slice()) {
            println!("  {}", result.narrative);
            roster.apply(&result).expect("fresh result applies");
        }

        tracker.advance();
    }

    println!("\n=== Aftermath ===");
    for c in roster.iter() {
        println!("  {:<14} {:>2}/{:<2} HP", c.display_name(), c.hp, c.max_hp);
    }

    let xp = 2 * 50;
    println!(
        "\nThe party shares {} XP: level {}, next level at {} XP.",
        xp,
        get_level(xp),
        xp_for_next_level(xp).unwrap_or(xp)
    );
}
