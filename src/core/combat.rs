//! Combat resolution — actions into rolls, damage, effects and narrative.
//!
//! Nothing here mutates a combatant. Damage is reported as the HP the
//! target would be left with, computed from the snapshot in the action.

use tracing::debug;

use super::dice::{
    ability_modifier, format_roll, roll, roll_ability_check, roll_attack, roll_damage,
    roll_initiative,
};
use super::rng::DieSource;
use super::rules::RuleBook;
use crate::schema::action::{Action, ActionKind, ActionType, Targeting};
use crate::schema::combatant::{Ability, Combatant};
use crate::schema::condition::Condition;
use crate::schema::outcome::{ActionResult, Effect, InitiativeEntry, ResultKind};

fn modifier(token: &Combatant, ability: Ability) -> i32 {
    ability_modifier(token.ability_scores.score(ability))
}

/// Roll damage for a landed hit and fold it into `result`.
fn land_hit<D: DieSource + ?Sized>(
    result: &mut ActionResult,
    target: &Combatant,
    damage_dice: &str,
    critical: bool,
    dice: &mut D,
) {
    let damage = roll_damage(damage_dice, critical, dice);
    let amount = damage.total.max(0);
    let new_hp = target.hp.saturating_sub(amount).max(0);

    result.narrative.push(' ');
    result.narrative.push_str(&format_roll(&damage));
    result.rolls.push(damage);
    result.damage = Some(amount);
    result.prior_target_hp = Some(target.hp);
    result.new_target_hp = Some(new_hp);

    if new_hp <= 0 {
        result.target_downed = true;
        result
            .narrative
            .push_str(&format!(" 💀 **{}** is down!", target.display_name()));
    }
}

/// An attack roll of `ability` against the target's AC, with damage on a hit.
fn targeted_strike<D: DieSource + ?Sized>(
    actor: &Combatant,
    target: &Combatant,
    ability: Ability,
    damage_dice: &str,
    opening: String,
    action: ActionType,
    dice: &mut D,
) -> ActionResult {
    let attack = roll_attack(modifier(actor, ability), target.armor_class, dice);
    let hit = attack.hit() == Some(true);
    let critical = attack.is_critical;

    let mut result = ActionResult::new(
        format!("{} {}", opening, format_roll(&attack)),
        ResultKind::Combat,
        Some(action),
    )
    .with_roll(attack);
    result.target_id = Some(target.id);

    if hit {
        land_hit(&mut result, target, damage_dice, critical, dice);
    }
    result
}

fn resolve_dice_roll<D: DieSource + ?Sized>(notation: &str, dice: &mut D) -> ActionResult {
    let rolled = roll(notation, dice);
    ActionResult::new(format_roll(&rolled), ResultKind::Dice, Some(ActionType::DiceRoll))
        .with_roll(rolled)
}

fn resolve_attack_action<D: DieSource + ?Sized>(
    actor: &Combatant,
    targeting: &Targeting,
    rules: &RuleBook,
    dice: &mut D,
) -> ActionResult {
    let name = actor.display_name();
    match &targeting.target {
        Some(target) => targeted_strike(
            actor,
            target,
            Ability::Str,
            &rules.melee_damage,
            format!("⚔️ **{}** attacks **{}**!", name, target.display_name()),
            ActionType::Attack,
            dice,
        ),
        None => {
            let attack = roll_attack(modifier(actor, Ability::Str), rules.default_armor_class, dice);
            ActionResult::new(
                format!("⚔️ **{}** attacks! {}", name, format_roll(&attack)),
                ResultKind::Combat,
                Some(ActionType::Attack),
            )
            .with_roll(attack)
        }
    }
}

fn resolve_spell<D: DieSource + ?Sized>(
    actor: &Combatant,
    targeting: &Targeting,
    rules: &RuleBook,
    dice: &mut D,
) -> ActionResult {
    let name = actor.display_name();
    match &targeting.target {
        Some(target) => targeted_strike(
            actor,
            target,
            Ability::Int,
            &rules.spell_damage,
            format!("✨ **{}** casts a spell at **{}**!", name, target.display_name()),
            ActionType::CastSpell,
            dice,
        ),
        None => {
            let check = roll_ability_check(modifier(actor, Ability::Int), rules.spell_focus_dc, dice);
            ActionResult::new(
                format!("✨ **{}** channels arcane energy — {}", name, format_roll(&check)),
                ResultKind::Action,
                Some(ActionType::CastSpell),
            )
            .with_roll(check)
        }
    }
}

fn resolve_skill_action<D: DieSource + ?Sized>(
    action: &Action,
    rules: &RuleBook,
    dice: &mut D,
) -> ActionResult {
    let skill = rules.skill_for(&action.raw_input);
    let check = roll_ability_check(
        modifier(&action.actor, skill.ability),
        rules.skill_check_dc,
        dice,
    );
    ActionResult::new(
        format!(
            "🔍 **{}** makes a {} check — {}",
            action.actor.display_name(),
            skill.skill,
            format_roll(&check)
        ),
        ResultKind::Action,
        Some(ActionType::SkillCheck),
    )
    .with_roll(check)
}

fn resolve_movement(actor: &Combatant, targeting: &Targeting) -> ActionResult {
    let narrative = match &targeting.target {
        Some(target) => format!(
            "🏃 **{}** moves toward **{}**.",
            actor.display_name(),
            target.display_name()
        ),
        None => format!("🏃 **{}** moves across the battlefield.", actor.display_name()),
    };
    let mut result = ActionResult::new(narrative, ResultKind::Movement, Some(ActionType::Movement));
    result.requires_grid_move = true;
    result
}

fn resolve_defend(actor: &Combatant) -> ActionResult {
    let mut result = ActionResult::new(
        format!(
            "🛡️ **{}** takes a defensive stance. (+2 AC until next turn)",
            actor.display_name()
        ),
        ResultKind::Action,
        Some(ActionType::Defend),
    );
    result.effects.push(Effect::Condition {
        target: actor.id,
        condition: Condition::Shielded,
    });
    result
}

fn resolve_interact<D: DieSource + ?Sized>(
    actor: &Combatant,
    targeting: &Targeting,
    rules: &RuleBook,
    dice: &mut D,
) -> ActionResult {
    let check = roll_ability_check(modifier(actor, Ability::Wis), rules.interact_dc, dice);
    let subject = match &targeting.target {
        Some(target) => format!(
            "**{}** interacts with **{}**",
            actor.display_name(),
            target.display_name()
        ),
        None => format!("**{}** interacts", actor.display_name()),
    };
    ActionResult::new(
        format!("🤝 {} — {}", subject, format_roll(&check)),
        ResultKind::Action,
        Some(ActionType::Interact),
    )
    .with_roll(check)
}

fn resolve_generic(action: &Action) -> ActionResult {
    ActionResult::new(
        format!(
            "📝 **{}**: *\"{}\"*",
            action.actor.display_name(),
            action.raw_input
        ),
        ResultKind::Narrative,
        Some(ActionType::Generic),
    )
}

/// Resolve a classified action into rolls, deltas and narrative.
pub fn resolve_action<D: DieSource + ?Sized>(
    action: &Action,
    rules: &RuleBook,
    dice: &mut D,
) -> ActionResult {
    let actor = &action.actor;
    let result = match &action.kind {
        ActionKind::DiceRoll { notation } => resolve_dice_roll(notation, dice),
        ActionKind::Attack(targeting) => resolve_attack_action(actor, targeting, rules, dice),
        ActionKind::CastSpell(targeting) => resolve_spell(actor, targeting, rules, dice),
        ActionKind::SkillCheck => resolve_skill_action(action, rules, dice),
        ActionKind::Movement(targeting) => resolve_movement(actor, targeting),
        ActionKind::Defend => resolve_defend(actor),
        ActionKind::Interact(targeting) => resolve_interact(actor, targeting, rules, dice),
        ActionKind::Generic => resolve_generic(action),
    };

    debug!(
        action = %action.action_type(),
        actor = %actor.id,
        target = ?result.target_id,
        damage = ?result.damage,
        "resolved action"
    );
    result
}

/// A direct weapon attack outside of free-text input.
///
/// Uses STR plus `attack_bonus` to hit, and `weapon_damage` on a hit.
pub fn resolve_attack<D: DieSource + ?Sized>(
    attacker: &Combatant,
    target: &Combatant,
    weapon_damage: &str,
    attack_bonus: i32,
    dice: &mut D,
) -> ActionResult {
    let a = attacker.display_name();
    let t = target.display_name();
    let attack = roll_attack(
        modifier(attacker, Ability::Str).saturating_add(attack_bonus),
        target.armor_class,
        dice,
    );
    let hit = attack.hit() == Some(true);
    let critical = attack.is_critical;

    let narrative = if critical {
        format!("⚔️ **{}** strikes **{}** with devastating precision! {}", a, t, format_roll(&attack))
    } else if hit {
        format!("⚔️ **{}** attacks **{}**. {}", a, t, format_roll(&attack))
    } else if attack.is_fumble {
        format!("⚔️ **{}** swings wildly at **{}** — {}", a, t, format_roll(&attack))
    } else {
        format!("⚔️ **{}** attacks **{}** — {}", a, t, format_roll(&attack))
    };

    let mut result = ActionResult::new(narrative, ResultKind::Combat, Some(ActionType::Attack))
        .with_roll(attack);
    result.target_id = Some(target.id);
    if hit {
        land_hit(&mut result, target, weapon_damage, critical, dice);
    }
    result
}

/// A named check of `ability` against `dc`.
pub fn resolve_skill_check<D: DieSource + ?Sized>(
    token: &Combatant,
    ability: Ability,
    dc: i32,
    skill_name: Option<&str>,
    dice: &mut D,
) -> ActionResult {
    let check = roll_ability_check(modifier(token, ability), dc, dice);
    let name = skill_name
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(ability.name());
    ActionResult::new(
        format!(
            "🎲 **{}** attempts a {} check — {}",
            token.display_name(),
            name,
            format_roll(&check)
        ),
        ResultKind::Action,
        Some(ActionType::SkillCheck),
    )
    .with_roll(check)
}

/// Roll initiative for every token and order them by total, highest first.
///
/// Equal totals keep roster order; there is no DEX tiebreak.
pub fn roll_all_initiative<D: DieSource + ?Sized>(
    tokens: &[Combatant],
    dice: &mut D,
) -> Vec<InitiativeEntry> {
    let mut entries: Vec<InitiativeEntry> = tokens
        .iter()
        .map(|token| {
            let roll = roll_initiative(modifier(token, Ability::Dex), dice);
            InitiativeEntry {
                token_id: token.id,
                label: token.label.clone(),
                total: roll.total,
                roll,
                is_npc: token.is_npc,
            }
        })
        .collect();
    entries.sort_by(|a, b| b.total.cmp(&a.total));
    entries
}
