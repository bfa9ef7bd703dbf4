//! Dice subsystem — notation parsing, rolling, and roll formatting.
//!
//! Notation follows `[count]d<sides>[±modifier]`: "d20", "2d6+3", "4d8-1".
//! Rolling never fails outright; malformed notation yields a `RollResult`
//! with `total == 0`, no faces, and the error attached, so the text can be
//! dropped straight into a narrative.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{trace, warn};

use super::rng::DieSource;

/// Upper bound on dice per roll.
pub const MAX_DICE: u32 = 1_000;
/// Upper bound on faces per die.
pub const MAX_SIDES: u32 = 10_000;

static NOTATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d*)d(\d+)([+-]\d+)?$").expect("valid dice notation regex")
});

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum DiceError {
    #[error("Invalid dice notation: {0}")]
    InvalidNotation(String),
}

/// A parsed dice specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceNotation {
    pub count: u32,
    pub sides: u32,
    pub modifier: i32,
}

impl DiceNotation {
    pub fn new(count: u32, sides: u32, modifier: i32) -> Self {
        Self {
            count,
            sides,
            modifier,
        }
    }

    /// Returns true for a lone d20, the only roll that can crit or fumble.
    pub fn is_single_d20(&self) -> bool {
        self.count == 1 && self.sides == 20
    }

    /// The same dice with the die count doubled; the modifier is untouched.
    pub fn doubled(&self) -> Self {
        Self {
            count: self.count.saturating_mul(2),
            ..*self
        }
    }
}

impl FromStr for DiceNotation {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

impl fmt::Display for DiceNotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.modifier {
            0 => write!(f, "{}d{}", self.count, self.sides),
            m if m > 0 => write!(f, "{}d{}+{}", self.count, self.sides, m),
            m => write!(f, "{}d{}{}", self.count, self.sides, m),
        }
    }
}

/// Parse dice notation. Case-insensitive; surrounding whitespace is ignored.
pub fn parse(notation: &str) -> Result<DiceNotation, DiceError> {
    let invalid = || DiceError::InvalidNotation(notation.to_string());
    let normalized = notation.trim().to_lowercase();
    let caps = NOTATION_RE.captures(&normalized).ok_or_else(invalid)?;

    let count = match caps.get(1).map(|m| m.as_str()) {
        Some("") | None => 1,
        Some(digits) => digits.parse::<u32>().map_err(|_| invalid())?,
    };
    let sides = caps[2].parse::<u32>().map_err(|_| invalid())?;
    let modifier = match caps.get(3) {
        Some(m) => m.as_str().parse::<i32>().map_err(|_| invalid())?,
        None => 0,
    };

    if count == 0 || count > MAX_DICE || sides == 0 || sides > MAX_SIDES {
        return Err(invalid());
    }

    Ok(DiceNotation {
        count,
        sides,
        modifier,
    })
}

/// What a roll was made for, with the verdict data that goes with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RollKind {
    Plain,
    Attack { target_ac: i32, hit: bool },
    Damage { critical: bool },
    AbilityCheck { dc: i32, success: bool },
    Initiative,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollMode {
    #[default]
    Normal,
    Advantage,
    Disadvantage,
}

/// The outcome of one roll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollResult {
    pub notation: String,
    pub rolls: Vec<u32>,
    pub subtotal: i32,
    pub modifier: i32,
    pub total: i32,
    pub is_critical: bool,
    pub is_fumble: bool,
    pub kind: RollKind,
    pub mode: RollMode,
    /// The discarded draw of an advantage/disadvantage roll.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_roll: Option<Box<RollResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<DiceError>,
}

impl RollResult {
    fn invalid(notation: &str) -> Self {
        warn!(notation, "invalid dice notation");
        Self {
            notation: notation.to_string(),
            rolls: Vec::new(),
            subtotal: 0,
            modifier: 0,
            total: 0,
            is_critical: false,
            is_fumble: false,
            kind: RollKind::Plain,
            mode: RollMode::Normal,
            other_roll: None,
            error: Some(DiceError::InvalidNotation(notation.to_string())),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// The face of the first die, if any were rolled.
    pub fn natural(&self) -> Option<u32> {
        self.rolls.first().copied()
    }

    /// Attack verdict, if this was an attack roll.
    pub fn hit(&self) -> Option<bool> {
        match self.kind {
            RollKind::Attack { hit, .. } => Some(hit),
            _ => None,
        }
    }

    /// Check verdict, if this was an ability check.
    pub fn success(&self) -> Option<bool> {
        match self.kind {
            RollKind::AbilityCheck { success, .. } => Some(success),
            _ => None,
        }
    }

    /// Replace the modifier and recompute the total.
    fn with_modifier(mut self, modifier: i32) -> Self {
        self.modifier = modifier;
        self.total = self.subtotal.saturating_add(modifier);
        self
    }
}

fn roll_parsed<D: DieSource + ?Sized>(
    parsed: &DiceNotation,
    notation: String,
    dice: &mut D,
) -> RollResult {
    let rolls: Vec<u32> = (0..parsed.count).map(|_| dice.roll_die(parsed.sides)).collect();
    // MAX_DICE * MAX_SIDES fits in an i32.
    let subtotal = rolls.iter().sum::<u32>() as i32;
    let total = subtotal.saturating_add(parsed.modifier);
    let single_d20 = parsed.is_single_d20();

    trace!(%notation, ?rolls, total, "rolled dice");

    RollResult {
        is_critical: single_d20 && rolls[0] == 20,
        is_fumble: single_d20 && rolls[0] == 1,
        notation,
        rolls,
        subtotal,
        modifier: parsed.modifier,
        total,
        kind: RollKind::Plain,
        mode: RollMode::Normal,
        other_roll: None,
        error: None,
    }
}

/// Roll dice from notation. Never fails; see the module docs.
pub fn roll<D: DieSource + ?Sized>(notation: &str, dice: &mut D) -> RollResult {
    match parse(notation) {
        Ok(parsed) => roll_parsed(&parsed, notation.trim().to_string(), dice),
        Err(_) => RollResult::invalid(notation),
    }
}

fn keep_one(first: RollResult, second: RollResult, keep_first: bool, mode: RollMode) -> RollResult {
    let (mut chosen, other) = if keep_first {
        (first, second)
    } else {
        (second, first)
    };
    chosen.mode = mode;
    chosen.other_roll = Some(Box::new(other));
    chosen
}

/// Roll twice and keep the higher total. Ties keep the first draw.
pub fn roll_advantage<D: DieSource + ?Sized>(notation: &str, dice: &mut D) -> RollResult {
    let first = roll(notation, dice);
    let second = roll(notation, dice);
    let keep_first = first.total >= second.total;
    keep_one(first, second, keep_first, RollMode::Advantage)
}

/// Roll twice and keep the lower total. Ties keep the first draw.
pub fn roll_disadvantage<D: DieSource + ?Sized>(notation: &str, dice: &mut D) -> RollResult {
    let first = roll(notation, dice);
    let second = roll(notation, dice);
    let keep_first = first.total <= second.total;
    keep_one(first, second, keep_first, RollMode::Disadvantage)
}

/// d20 plus the DEX modifier.
pub fn roll_initiative<D: DieSource + ?Sized>(dex_modifier: i32, dice: &mut D) -> RollResult {
    let mut result = roll("d20", dice).with_modifier(dex_modifier);
    result.kind = RollKind::Initiative;
    result
}

/// d20 plus an ability modifier against a difficulty class.
pub fn roll_ability_check<D: DieSource + ?Sized>(
    ability_modifier: i32,
    dc: i32,
    dice: &mut D,
) -> RollResult {
    let mut result = roll("d20", dice).with_modifier(ability_modifier);
    result.kind = RollKind::AbilityCheck {
        dc,
        success: result.total >= dc,
    };
    result
}

/// d20 plus an attack modifier against armor class.
///
/// A natural 20 always hits and a natural 1 always misses.
pub fn roll_attack<D: DieSource + ?Sized>(
    attack_modifier: i32,
    target_ac: i32,
    dice: &mut D,
) -> RollResult {
    let mut result = roll("d20", dice).with_modifier(attack_modifier);
    let hit = result.is_critical || (!result.is_fumble && result.total >= target_ac);
    result.kind = RollKind::Attack { target_ac, hit };
    result
}

/// Roll damage dice; a critical doubles the dice but not the modifier.
pub fn roll_damage<D: DieSource + ?Sized>(
    notation: &str,
    critical: bool,
    dice: &mut D,
) -> RollResult {
    let parsed = match parse(notation) {
        Ok(parsed) => parsed,
        Err(_) => return RollResult::invalid(notation),
    };
    let effective = if critical { parsed.doubled() } else { parsed };
    let mut result = roll_parsed(&effective, effective.to_string(), dice);
    result.kind = RollKind::Damage { critical };
    result
}

/// Ability modifier from a score: `floor((score - 10) / 2)`.
pub fn ability_modifier(score: i32) -> i32 {
    score.saturating_sub(10).div_euclid(2)
}

fn signed(modifier: i32) -> String {
    if modifier < 0 {
        format!(" - {}", -(modifier as i64))
    } else {
        format!(" + {}", modifier)
    }
}

fn join_faces(rolls: &[u32]) -> String {
    rolls
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render a roll as a narrative fragment with its full breakdown.
pub fn format_roll(result: &RollResult) -> String {
    if let Some(error) = &result.error {
        return error.to_string();
    }

    let mut out = match result.kind {
        RollKind::Attack { target_ac, hit } => {
            let mut s = format!("🎯 Attack: {}", join_faces(&result.rolls));
            if result.modifier != 0 {
                s.push_str(&signed(result.modifier));
            }
            s.push_str(&format!(" = **{}** vs AC {}", result.total, target_ac));
            if result.is_critical {
                s.push_str(" ⭐ **CRITICAL HIT!**");
            } else if result.is_fumble {
                s.push_str(" 💀 **FUMBLE!**");
            } else if hit {
                s.push_str(" ✅ **HIT!**");
            } else {
                s.push_str(" ❌ **MISS**");
            }
            s
        }
        RollKind::Damage { critical } => {
            let mut s = format!("💥 Damage: [{}]", join_faces(&result.rolls));
            if result.modifier != 0 {
                s.push_str(&signed(result.modifier));
            }
            s.push_str(&format!(" = **{}**", result.total));
            if critical {
                s.push_str(" (Critical!)");
            }
            s
        }
        RollKind::AbilityCheck { dc, success } => {
            let mut s = format!("🎲 Check: {}", join_faces(&result.rolls));
            if result.modifier != 0 {
                s.push_str(&signed(result.modifier));
            }
            s.push_str(&format!(" = **{}** vs DC {}", result.total, dc));
            s.push_str(if success {
                " ✅ **SUCCESS**"
            } else {
                " ❌ **FAIL**"
            });
            s
        }
        RollKind::Initiative => {
            let mut s = format!("⚡ Initiative: {}", join_faces(&result.rolls));
            if result.modifier != 0 {
                s.push_str(&signed(result.modifier));
            }
            s.push_str(&format!(" = **{}**", result.total));
            s
        }
        RollKind::Plain => {
            let mut s = format!(
                "🎲 Roll {}: [{}]",
                result.notation,
                join_faces(&result.rolls)
            );
            if result.modifier != 0 {
                s.push_str(&signed(result.modifier));
            }
            s.push_str(&format!(" = **{}**", result.total));
            if result.is_critical {
                s.push_str(" ⭐ NAT 20!");
            }
            if result.is_fumble {
                s.push_str(" 💀 NAT 1!");
            }
            s
        }
    };

    match result.mode {
        RollMode::Normal => {}
        RollMode::Advantage => out.push_str(" (Advantage)"),
        RollMode::Disadvantage => out.push_str(" (Disadvantage)"),
    }

    out
}

/// One die of the standard set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DieType {
    pub sides: u32,
    pub label: &'static str,
    pub emoji: &'static str,
}

/// The standard polyhedral set offered by dice pickers.
pub const DICE_SET: [DieType; 7] = [
    DieType { sides: 4, label: "d4", emoji: "🔷" },
    DieType { sides: 6, label: "d6", emoji: "🎲" },
    DieType { sides: 8, label: "d8", emoji: "💎" },
    DieType { sides: 10, label: "d10", emoji: "🔶" },
    DieType { sides: 12, label: "d12", emoji: "⬡" },
    DieType { sides: 20, label: "d20", emoji: "⭐" },
    DieType { sides: 100, label: "d100", emoji: "💯" },
];
