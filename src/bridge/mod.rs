//! Special-order bridge
//!
//! The host has its own quest-like "special orders". Orders tagged with
//! this engine's order type go through the same NPC interaction flow, and
//! are checked before the engine's own offers so the two systems never
//! offer the same beat twice.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::info;

/// A special order as the host describes it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialOrder {
    pub quest_key: String,
    /// NPC who hands the order out
    pub requester: String,
    pub order_type: String,
    #[serde(default)]
    pub generation_seed: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Host-side view of the special order board
pub trait OrderBoard {
    /// Orders currently posted, in board order
    fn available(&self) -> &[SpecialOrder];

    fn is_accepted(&self, quest_key: &str) -> bool;

    /// Take the order onto the player's team
    fn accept(&mut self, order: &SpecialOrder);
}

/// In-memory order board
#[derive(Debug, Clone, Default)]
pub struct SpecialOrderBoard {
    available: Vec<SpecialOrder>,
    accepted: HashSet<String>,
}

impl SpecialOrderBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&mut self, order: SpecialOrder) {
        self.available.push(order);
    }
}

impl OrderBoard for SpecialOrderBoard {
    fn available(&self) -> &[SpecialOrder] {
        &self.available
    }

    fn is_accepted(&self, quest_key: &str) -> bool {
        self.accepted.contains(quest_key)
    }

    fn accept(&mut self, order: &SpecialOrder) {
        info!("Special order '{}' accepted from {}", order.quest_key, order.requester);
        self.accepted.insert(order.quest_key.clone());
    }
}

/// First posted order of `order_type` requested by `npc` and not yet accepted
pub fn offered_special_order<'a, B>(board: &'a B, npc: &str, order_type: &str) -> Option<&'a SpecialOrder>
where
    B: OrderBoard + ?Sized,
{
    board.available().iter().find(|order| {
        order.requester == npc && order.order_type == order_type && !board.is_accepted(&order.quest_key)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(key: &str, requester: &str, order_type: &str) -> SpecialOrder {
        SpecialOrder {
            quest_key: key.to_string(),
            requester: requester.to_string(),
            order_type: order_type.to_string(),
            generation_seed: 0,
            name: key.to_string(),
            description: format!("Help {}", requester),
        }
    }

    #[test]
    fn test_filters_requester_type_and_acceptance() {
        let mut board = SpecialOrderBoard::new();
        board.post(order("vanilla", "Abigail", ""));
        board.post(order("pierre", "Pierre", "QF_NPC"));
        board.post(order("first", "Abigail", "QF_NPC"));
        board.post(order("second", "Abigail", "QF_NPC"));

        let hit = offered_special_order(&board, "Abigail", "QF_NPC").unwrap();
        assert_eq!(hit.quest_key, "first");

        let first = hit.clone();
        board.accept(&first);
        let hit = offered_special_order(&board, "Abigail", "QF_NPC").unwrap();
        assert_eq!(hit.quest_key, "second");

        assert!(offered_special_order(&board, "Sebastian", "QF_NPC").is_none());
    }
}
