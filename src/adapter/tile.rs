//! Tile-touch adapter
//!
//! Called after the host has run a tile's touch action.

use serde::Serialize;

use crate::condition::{Position, RawEvent, TileContext};
use crate::engine::{EventOutcome, QuestEngine};

#[derive(Debug, Clone, Serialize)]
pub struct TouchOutcome {
    pub event: EventOutcome,
}

impl TouchOutcome {
    /// True when a quest was offered by this touch
    pub fn handled(&self) -> bool {
        self.event.offered_anything()
    }
}

pub fn after_touch_action(
    engine: &mut QuestEngine,
    player: &str,
    location: &str,
    action: &str,
    position: Position,
) -> TouchOutcome {
    let event = engine.notify(RawEvent::Tile(TileContext {
        player: player.to_string(),
        location: location.to_string(),
        position,
        action: action.to_string(),
    }));

    TouchOutcome { event }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{Hook, HookCategory};
    use crate::config::EngineConfig;
    use crate::offer::Offer;
    use crate::quest::{QuestDefinition, QuestState};

    #[test]
    fn test_find_the_well() {
        let mut engine = QuestEngine::new(EngineConfig::default()).unwrap();
        engine.register_hook(Hook::tile()).unwrap();
        engine.add_quest(QuestDefinition::new("FindTheWell"));
        engine.add_offer(
            Offer::new("FindTheWell", HookCategory::Tile, "Sign 5", "Someone drew a well here.")
                .with_detail("location", "Farm"),
        );

        let first = after_touch_action(&mut engine, "Farmer", "Farm", "Sign 5", Position::new(10.0, 20.0));
        assert!(first.handled());
        assert_eq!(engine.quests().state("FindTheWell"), Some(QuestState::Offered));

        let again = after_touch_action(&mut engine, "Farmer", "Farm", "Sign 5", Position::new(10.0, 20.0));
        assert!(!again.handled());
        assert_eq!(again.event.matches.len(), 1);
    }
}
