//! WASM bindings for session-engine — the browser session layer's entry
//! point. Everything crosses the boundary as JSON strings.

use wasm_bindgen::prelude::*;

use session_engine::core::pipeline::SessionEngine;
use session_engine::core::progression::{get_level, get_xp_progress, xp_for_next_level};
use session_engine::core::rules::RuleBook;
use session_engine::schema::combatant::{Ability, Combatant, CombatantId};
use session_engine::schema::condition::{Condition, ConditionInfo};

// ---------------------------------------------------------------------------
// JSON helper types for communication across the WASM boundary
// ---------------------------------------------------------------------------
#[derive(serde::Deserialize)]
struct SubmitInput {
    text: String,
    actor_id: u64,
    roster: Vec<Combatant>,
}

#[derive(serde::Serialize)]
struct LevelInfo {
    level: u32,
    progress: f64,
    next_threshold: Option<u32>,
}

fn parse_json<'a, T: serde::Deserialize<'a>>(json: &'a str, what: &str) -> Result<T, JsError> {
    serde_json::from_str(json).map_err(|e| JsError::new(&format!("Invalid {what} JSON: {e}")))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsError> {
    serde_json::to_string(value).map_err(|e| JsError::new(&format!("Serialization error: {e}")))
}

// ---------------------------------------------------------------------------
// SessionTable — the main exported struct
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct SessionTable {
    engine: SessionEngine,
}

#[wasm_bindgen]
impl SessionTable {
    /// Create an engine with the standard rules, or with a RON rule book.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64, rules_ron: Option<String>) -> Result<SessionTable, JsError> {
        let mut builder = SessionEngine::builder().seed(seed);
        if let Some(src) = rules_ron {
            let rules = RuleBook::parse_ron(&src)
                .map_err(|e| JsError::new(&format!("Rules parse error: {e}")))?;
            builder = builder.with_rules(rules);
        }
        let engine = builder
            .build()
            .map_err(|e| JsError::new(&format!("Engine build error: {e}")))?;
        Ok(SessionTable { engine })
    }

    /// Resolve one line of player input.
    ///
    /// Expected JSON shape:
    /// ```json
    /// { "text": "I attack the goblin", "actor_id": 1, "roster": [ ... ] }
    /// ```
    /// Returns the ActionResult as JSON, or `null` for blank input.
    pub fn submit(&mut self, input_json: &str) -> Result<String, JsError> {
        let input: SubmitInput = parse_json(input_json, "submit")?;
        let actor = input
            .roster
            .iter()
            .find(|c| c.id == CombatantId(input.actor_id))
            .ok_or_else(|| JsError::new(&format!("Unknown actor: {}", input.actor_id)))?;
        let result = self.engine.submit(&input.text, actor, &input.roster);
        to_json(&result)
    }

    /// Roll dice notation. Malformed notation comes back as an error roll.
    pub fn roll(&mut self, notation: &str) -> Result<String, JsError> {
        to_json(&self.engine.roll(notation))
    }

    /// Roll initiative for a JSON array of combatants; returns the sorted order.
    pub fn roll_initiative(&mut self, tokens_json: &str) -> Result<String, JsError> {
        let tokens: Vec<Combatant> = parse_json(tokens_json, "roster")?;
        to_json(&self.engine.roll_initiative(&tokens))
    }

    /// A direct ability check. `ability` takes a key ("dex") or a full name
    /// ("Dexterity"); `dc` falls back to the rule book's skill DC.
    pub fn skill_check(
        &mut self,
        token_json: &str,
        ability: &str,
        dc: Option<i32>,
    ) -> Result<String, JsError> {
        let token: Combatant = parse_json(token_json, "combatant")?;
        let ability = Ability::from_key(ability)
            .ok_or_else(|| JsError::new(&format!("Unknown ability: {ability}")))?;
        to_json(&self.engine.skill_check(&token, ability, dc, None))
    }

    pub fn death_save(&mut self, token_json: &str) -> Result<String, JsError> {
        let token: Combatant = parse_json(token_json, "combatant")?;
        to_json(&self.engine.death_save(&token))
    }

    /// Start-of-turn condition effects for one combatant.
    pub fn start_turn(&mut self, token_json: &str) -> Result<String, JsError> {
        let token: Combatant = parse_json(token_json, "combatant")?;
        to_json(&self.engine.start_turn(&token))
    }

    /// Return JSON array of the condition catalog.
    pub fn conditions() -> String {
        let catalog: Vec<ConditionInfo> = Condition::catalog();
        serde_json::to_string(&catalog).unwrap_or_else(|_| "[]".to_string())
    }

    /// Level, progress and next threshold for an XP total.
    pub fn level_info(xp: u32) -> String {
        let info = LevelInfo {
            level: get_level(xp),
            progress: get_xp_progress(xp),
            next_threshold: xp_for_next_level(xp),
        };
        serde_json::to_string(&info).unwrap_or_else(|_| "{}".to_string())
    }
}
