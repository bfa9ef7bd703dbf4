//! Turn order over a rolled initiative list.

use serde::{Deserialize, Serialize};

use crate::schema::combatant::CombatantId;
use crate::schema::outcome::InitiativeEntry;

/// Whose turn it is, and which round the encounter is in.
///
/// Rounds start at 1. Advancing past the last entry wraps to the top of
/// the order and bumps the round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitiativeTracker {
    pub order: Vec<InitiativeEntry>,
    pub current: usize,
    pub round: u32,
}

impl InitiativeTracker {
    pub fn new(order: Vec<InitiativeEntry>) -> Self {
        Self {
            order,
            current: 0,
            round: 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn current_entry(&self) -> Option<&InitiativeEntry> {
        self.order.get(self.current)
    }

    pub fn current_id(&self) -> Option<CombatantId> {
        self.current_entry().map(|e| e.token_id)
    }

    /// Move to the next combatant and return it.
    pub fn advance(&mut self) -> Option<&InitiativeEntry> {
        if self.order.is_empty() {
            return None;
        }
        self.current += 1;
        if self.current >= self.order.len() {
            self.current = 0;
            self.round += 1;
        }
        self.current_entry()
    }

    /// Drop a combatant from the order, keeping the current turn pointed
    /// at the same combatant where possible.
    pub fn remove(&mut self, id: CombatantId) -> bool {
        let Some(index) = self.order.iter().position(|e| e.token_id == id) else {
            return false;
        };
        self.order.remove(index);
        if index < self.current {
            self.current -= 1;
        }
        if self.current >= self.order.len() {
            self.current = 0;
        }
        true
    }
}
