//! Quest indicator queries
//!
//! Read-only checks the renderer calls every frame for each NPC on screen.

use serde::Deserialize;

use crate::bridge::{offered_special_order, OrderBoard};
use crate::condition::HookCategory;
use crate::engine::QuestEngine;

/// What the renderer knows about an NPC this frame
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NpcView {
    pub name: String,
    pub is_villager: bool,
    pub invisible: bool,
    pub emoting: bool,
    pub sleeping: bool,
    pub event_up: bool,
    /// NPC already has text floating above its head
    pub text_above_head_active: bool,
}

/// Whether `npc` has an offer for a quest the player does not carry yet
pub fn offers_quest(engine: &QuestEngine, npc: &str, hint_secret: bool) -> bool {
    engine
        .offers()
        .offers_something(HookCategory::Npc, npc, engine.quests(), hint_secret)
}

pub fn has_temporary_message_available(engine: &QuestEngine, npc: &str) -> bool {
    offers_quest(engine, npc, true)
}

pub fn offers_special_order<B>(engine: &QuestEngine, board: &B, npc: &str) -> bool
where
    B: OrderBoard + ?Sized,
{
    offered_special_order(board, npc, &engine.config().special_order_type).is_some()
}

pub fn should_draw_indicator<B>(engine: &QuestEngine, board: &B, view: &NpcView) -> bool
where
    B: OrderBoard + ?Sized,
{
    if !engine.config().show_npc_quest_indicators {
        return false;
    }

    let busy = view.invisible || view.emoting || view.sleeping || view.event_up || view.text_above_head_active;
    if !view.is_villager || busy {
        return false;
    }

    offers_quest(engine, &view.name, false) || offers_special_order(engine, board, &view.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{SpecialOrder, SpecialOrderBoard};
    use crate::condition::{NpcContext, RawEvent};
    use crate::config::EngineConfig;
    use crate::offer::Offer;
    use crate::quest::QuestDefinition;

    fn engine(config: EngineConfig) -> QuestEngine {
        let mut engine = QuestEngine::with_default_hooks(config).unwrap();
        engine.add_quest(QuestDefinition::new("Flute"));
        engine.add_quest(QuestDefinition::new("Secret"));
        engine.add_offer(Offer::new("Flute", HookCategory::Npc, "Abigail", "I lost my flute."));
        engine.add_offer(Offer::new("Secret", HookCategory::Npc, "Sebastian", "").secret(true));
        engine
    }

    fn villager(name: &str) -> NpcView {
        NpcView {
            name: name.to_string(),
            is_villager: true,
            ..NpcView::default()
        }
    }

    #[test]
    fn test_offers_quest_respects_secrecy() {
        let engine = engine(EngineConfig::default());

        assert!(offers_quest(&engine, "Abigail", false));
        assert!(!offers_quest(&engine, "Sebastian", false));
        assert!(has_temporary_message_available(&engine, "Sebastian"));
        assert!(!offers_quest(&engine, "Pierre", true));
    }

    #[test]
    fn test_accepted_quest_clears_indicator() {
        let mut engine = engine(EngineConfig::default());
        let board = SpecialOrderBoard::new();
        assert!(should_draw_indicator(&engine, &board, &villager("Abigail")));

        engine.notify(RawEvent::Npc(NpcContext {
            player: "Farmer".to_string(),
            npc: "Abigail".to_string(),
            location: "Town".to_string(),
        }));
        assert!(should_draw_indicator(&engine, &board, &villager("Abigail")));

        engine.accept_quest("Flute").unwrap();
        assert!(!offers_quest(&engine, "Abigail", true));
        assert!(!should_draw_indicator(&engine, &board, &villager("Abigail")));
    }

    #[test]
    fn test_indicator_gates() {
        let engine = engine(EngineConfig::default());
        let board = SpecialOrderBoard::new();

        let mut sleeping = villager("Abigail");
        sleeping.sleeping = true;
        assert!(!should_draw_indicator(&engine, &board, &sleeping));

        let mut talking = villager("Abigail");
        talking.text_above_head_active = true;
        assert!(!should_draw_indicator(&engine, &board, &talking));

        let mut monster = villager("Abigail");
        monster.is_villager = false;
        assert!(!should_draw_indicator(&engine, &board, &monster));

        let hidden = engine_with_indicators_off();
        assert!(!should_draw_indicator(&hidden, &board, &villager("Abigail")));
    }

    fn engine_with_indicators_off() -> QuestEngine {
        engine(EngineConfig {
            show_npc_quest_indicators: false,
            ..EngineConfig::default()
        })
    }

    #[test]
    fn test_offer_for_unknown_quest_draws_nothing() {
        let mut engine = engine(EngineConfig::default());
        engine.add_offer(Offer::new("Ghost", HookCategory::Npc, "Pierre", "Boo"));
        let board = SpecialOrderBoard::new();

        assert!(!offers_quest(&engine, "Pierre", true));
        assert!(!should_draw_indicator(&engine, &board, &villager("Pierre")));
    }

    #[test]
    fn test_special_order_draws_indicator() {
        let engine = engine(EngineConfig::default());
        let mut board = SpecialOrderBoard::new();
        board.post(SpecialOrder {
            quest_key: "fish".to_string(),
            requester: "Willy".to_string(),
            order_type: "QF_NPC".to_string(),
            generation_seed: 0,
            name: "Big Catch".to_string(),
            description: String::new(),
        });

        assert!(should_draw_indicator(&engine, &board, &villager("Willy")));
        assert!(!should_draw_indicator(&engine, &board, &villager("Pierre")));
    }
}
