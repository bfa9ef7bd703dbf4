//! Grid movement rules. Distance is Manhattan; occupancy and terrain are
//! the map layer's business.

use crate::schema::combatant::{Combatant, GridPos};
use crate::schema::condition::Condition;

/// Manhattan distance between two squares.
pub fn distance(from_x: i32, from_y: i32, to_x: i32, to_y: i32) -> u32 {
    from_x.abs_diff(to_x).saturating_add(from_y.abs_diff(to_y))
}

/// A move is legal iff its Manhattan distance is within `speed`.
pub fn is_valid_move(from_x: i32, from_y: i32, to_x: i32, to_y: i32, speed: u32) -> bool {
    distance(from_x, from_y, to_x, to_y) <= speed
}

/// Squares the combatant may cover this turn. Frozen combatants cannot move.
pub fn effective_speed(token: &Combatant) -> u32 {
    if token.has_condition(Condition::Frozen) {
        0
    } else {
        token.speed
    }
}

/// Whether `token` can reach `to` from where it stands.
pub fn can_reach(token: &Combatant, to: GridPos) -> bool {
    let from = token.position;
    is_valid_move(from.x, from.y, to.x, to.y, effective_speed(token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::combatant::CombatantId;

    #[test]
    fn manhattan_distance() {
        assert_eq!(distance(0, 0, 3, 4), 7);
        assert_eq!(distance(2, 2, -1, 5), 6);
        assert_eq!(distance(1, 1, 1, 1), 0);
    }

    #[test]
    fn move_within_speed() {
        assert!(is_valid_move(0, 0, 3, 3, 6));
        assert!(!is_valid_move(0, 0, 3, 4, 6));
        assert!(is_valid_move(5, 5, 5, 5, 0));
    }

    #[test]
    fn frozen_cannot_move() {
        let mut token = Combatant::new(CombatantId(1), "Rook", 10).with_position(GridPos::new(2, 2));
        assert!(can_reach(&token, GridPos::new(4, 4)));
        token.conditions.insert(Condition::Frozen);
        assert_eq!(effective_speed(&token), 0);
        assert!(!can_reach(&token, GridPos::new(2, 3)));
        assert!(can_reach(&token, GridPos::new(2, 2)));
    }
}
