//! Action classifier — free text to a typed, targeted `Action`.
//!
//! Classification walks an ordered list of rule groups and stops at the
//! first that matches. The order is part of the behavior: "I strike with
//! fire" is an attack because attack verbs are checked before spell words.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::schema::action::{Action, ActionKind, ActionType, Targeting};
use crate::schema::combatant::{Combatant, CombatantId};

/// Notation used when a dice action captures nothing.
pub const DEFAULT_DICE: &str = "d20";

struct ActionRule {
    pattern: Regex,
    action: ActionType,
}

fn rule(pattern: &str, action: ActionType) -> ActionRule {
    ActionRule {
        pattern: Regex::new(pattern).expect("valid action pattern"),
        action,
    }
}

/// Highest priority first.
static ACTION_RULES: LazyLock<Vec<ActionRule>> = LazyLock::new(|| {
    vec![
        rule(r"(?i)^/roll?\s+(.+)", ActionType::DiceRoll),
        rule(r"(?i)^(\d*d\d+(?:[+-]\d+)?)\b", ActionType::DiceRoll),
        rule(
            r"(?i)\b(attack|strike|hit|slash|stab|shoot|swing|smash|punch|kick|bite|claw)\b",
            ActionType::Attack,
        ),
        rule(
            r"(?i)\b(cast|spell|magic|fireball|heal|lightning|frost|ice|fire|thunder|arcane)\b",
            ActionType::CastSpell,
        ),
        rule(
            r"(?i)\b(move|walk|run|dash|sneak|stealth|climb|swim|fly|jump|teleport)\b",
            ActionType::Movement,
        ),
        rule(
            r"(?i)\b(check|inspect|investigate|search|perception|insight|persuade|intimidate|deceive|acrobatics|athletics)\b",
            ActionType::SkillCheck,
        ),
        rule(
            r"(?i)\b(defend|block|dodge|parry|shield|guard|brace)\b",
            ActionType::Defend,
        ),
        rule(
            r"(?i)\b(talk|speak|ask|tell|negotiate|barter|trade|buy|sell|give|open|close|pick|lock|trap|use|drink|eat)\b",
            ActionType::Interact,
        ),
    ]
});

static PREPOSITION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:at|to|on|against|with)\s+(?:(?:the|a|an)\s+)?(\w+(?:\s+\w+)?)")
        .expect("valid preposition regex")
});

static ARTICLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:the|a|an)\s+(\w+(?:\s+\w+)?)").expect("valid article regex")
});

static TRAILING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\w+(?:\s+\w+)?)\s*$").expect("valid trailing phrase regex")
});

const ARTICLES: &[&str] = &["the", "a", "an"];

/// Words never tried on their own when matching a phrase word by word.
const STOPWORDS: &[&str] = &[
    "the", "and", "with", "his", "her", "its", "him", "them", "their", "your", "you", "this",
    "that", "my",
];

/// The first rule group matching `text`, with its first capture.
fn match_rule(text: &str) -> (ActionType, Option<String>) {
    for rule in ACTION_RULES.iter() {
        if let Some(caps) = rule.pattern.captures(text) {
            let capture = caps.get(1).map(|m| m.as_str().trim().to_string());
            return (rule.action, capture);
        }
    }
    (ActionType::Generic, None)
}

/// Classify free text. The first matching rule group wins.
pub fn classify(text: &str) -> ActionType {
    match_rule(text.trim()).0
}

fn normalize_phrase(raw: &str) -> Option<String> {
    let mut words: Vec<String> = raw.split_whitespace().map(str::to_lowercase).collect();
    while words.first().is_some_and(|w| ARTICLES.contains(&w.as_str())) {
        words.remove(0);
    }
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

/// Candidate target phrases. A preposition cue, when present, is the only
/// candidate; article-led and trailing phrases are tried only without one.
fn candidate_phrases(text: &str) -> Vec<String> {
    if let Some(cue) = PREPOSITION_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| normalize_phrase(m.as_str()))
    {
        return vec![cue];
    }

    let mut phrases: Vec<String> = Vec::new();
    let captures = ARTICLE_RE
        .captures_iter(text)
        .chain(TRAILING_RE.captures(text));
    for caps in captures {
        if let Some(phrase) = caps.get(1).and_then(|m| normalize_phrase(m.as_str())) {
            if !phrases.contains(&phrase) {
                phrases.push(phrase);
            }
        }
    }
    phrases
}

fn roster_match<'a>(
    phrase: &str,
    actor_id: CombatantId,
    roster: &'a [Combatant],
) -> Option<&'a Combatant> {
    roster
        .iter()
        .filter(|c| c.id != actor_id)
        .find(|c| c.label.to_lowercase().contains(phrase))
}

/// Resolve the phrase the input points at against the roster.
///
/// Whole phrases are tried first, in cue order; then their individual
/// words. The actor is never its own target.
pub fn extract_targeting(text: &str, actor_id: CombatantId, roster: &[Combatant]) -> Targeting {
    let phrases = candidate_phrases(text);

    for phrase in &phrases {
        if let Some(target) = roster_match(phrase, actor_id, roster) {
            return Targeting {
                target: Some(target.clone()),
                target_name: Some(phrase.clone()),
            };
        }
    }

    for phrase in &phrases {
        for word in phrase.split_whitespace() {
            if word.len() < 3 || STOPWORDS.contains(&word) {
                continue;
            }
            if let Some(target) = roster_match(word, actor_id, roster) {
                return Targeting {
                    target: Some(target.clone()),
                    target_name: Some(word.to_string()),
                };
            }
        }
    }

    // Keep the phrase the player aimed at even when nobody answers to it.
    let target_name = PREPOSITION_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| normalize_phrase(m.as_str()));
    Targeting {
        target: None,
        target_name,
    }
}

/// The roster member `text` points at, if any.
pub fn extract_target(text: &str, actor_id: CombatantId, roster: &[Combatant]) -> Option<Combatant> {
    extract_targeting(text, actor_id, roster).target
}

/// Turn a line of player input into an `Action`.
///
/// Returns `None` only for empty or whitespace-only input.
pub fn parse_action(text: &str, actor: &Combatant, roster: &[Combatant]) -> Option<Action> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (action_type, capture) = match_rule(trimmed);
    let targeting = || extract_targeting(trimmed, actor.id, roster);

    let kind = match action_type {
        ActionType::DiceRoll => ActionKind::DiceRoll {
            notation: capture
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_DICE.to_string()),
        },
        ActionType::Attack => ActionKind::Attack(targeting()),
        ActionType::CastSpell => ActionKind::CastSpell(targeting()),
        ActionType::Movement => ActionKind::Movement(targeting()),
        ActionType::SkillCheck => ActionKind::SkillCheck,
        ActionType::Defend => ActionKind::Defend,
        ActionType::Interact => ActionKind::Interact(targeting()),
        ActionType::Generic => ActionKind::Generic,
    };

    let action = Action {
        raw_input: trimmed.to_string(),
        actor: actor.clone(),
        kind,
    };
    debug!(
        action = %action.action_type(),
        actor = %actor.id,
        target = ?action.target().map(|t| t.id),
        "classified input"
    );
    Some(action)
}
