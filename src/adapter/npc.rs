//! NPC interaction adapter
//!
//! Runs before the host's own check-action for an NPC. A handled outcome
//! means the host should skip its default dialogue.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::bridge::{offered_special_order, OrderBoard, SpecialOrder};
use crate::condition::{HookCategory, NpcContext, RawEvent};
use crate::engine::QuestEngine;
use crate::quest::QuestState;

/// HUD string shown when a special order is taken on
pub const ORDER_ACCEPTED_HUD_KEY: &str = "Strings\\StringsFromCSFiles:Farmer.cs.2011";
/// Chat notice broadcast when a special order is taken on
pub const ORDER_ACCEPTED_CHAT_KEY: &str = "AcceptedSpecialOrder";

/// Facts about one player/NPC interaction as the host sees them
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NpcInteraction {
    pub player: String,
    pub npc: String,
    pub location: String,
    /// An event or cutscene is running
    pub event_up: bool,
    pub npc_invisible: bool,
    pub npc_sleeping: bool,
    pub player_can_move: bool,
    pub riding_horse: bool,
    /// Player holds an item the NPC would accept as a gift
    pub holding_gift: bool,
    /// The NPC's dialogue sheet, by key
    pub dialogue: HashMap<String, String>,
}

impl Default for NpcInteraction {
    fn default() -> Self {
        Self {
            player: String::new(),
            npc: String::new(),
            location: String::new(),
            event_up: false,
            npc_invisible: false,
            npc_sleeping: false,
            player_can_move: true,
            riding_horse: false,
            holding_gift: false,
            dialogue: HashMap::new(),
        }
    }
}

impl NpcInteraction {
    pub fn new(player: impl Into<String>, npc: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            player: player.into(),
            npc: npc.into(),
            location: location.into(),
            ..Self::default()
        }
    }

    fn blocked_by(&self) -> Option<&'static str> {
        if self.event_up {
            Some("event running")
        } else if self.npc_invisible {
            Some("npc invisible")
        } else if self.npc_sleeping {
            Some("npc sleeping")
        } else if !self.player_can_move {
            Some("player cannot move")
        } else if self.riding_horse {
            Some("player riding")
        } else if self.holding_gift {
            Some("player holding a gift")
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostNotice {
    Hud { string_key: String },
    Chat { key: String, args: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NpcOutcome {
    NotHandled,
    SpecialOrderAccepted {
        order: SpecialOrder,
        dialogue: String,
        notices: Vec<HostNotice>,
    },
    QuestOffered {
        quest: String,
        dialogue: String,
    },
}

impl NpcOutcome {
    pub fn handled(&self) -> bool {
        !matches!(self, NpcOutcome::NotHandled)
    }
}

pub fn before_check_action<B>(engine: &mut QuestEngine, board: &mut B, interaction: &NpcInteraction) -> NpcOutcome
where
    B: OrderBoard + ?Sized,
{
    if let Some(reason) = interaction.blocked_by() {
        debug!("Skipping interaction with {}: {}", interaction.npc, reason);
        return NpcOutcome::NotHandled;
    }

    engine.notify(RawEvent::Npc(NpcContext {
        player: interaction.player.clone(),
        npc: interaction.npc.clone(),
        location: interaction.location.clone(),
    }));

    let order_type = engine.config().special_order_type.as_str();
    if let Some(order) = offered_special_order(&*board, &interaction.npc, order_type).cloned() {
        return accept_special_order(board, interaction, order);
    }

    // First offer for this NPC, here, whose quest the talk has offered.
    // Accepted quests are already in the log; Unseen means the offer's gate did not pass.
    let quests = engine.quests();
    let offer = engine
        .offers()
        .get_matched_offers(HookCategory::Npc, quests, true)
        .filter(|offer| offer.target == interaction.npc)
        .filter(|offer| offer.location().map_or(true, |loc| loc == interaction.location))
        .find(|offer| quests.state(&offer.quest_name) == Some(QuestState::Offered));

    let Some(offer) = offer else {
        return NpcOutcome::NotHandled;
    };

    info!("{} offers '{}' to {}", interaction.npc, offer.quest_name, interaction.player);
    NpcOutcome::QuestOffered {
        quest: offer.quest_name.clone(),
        dialogue: format!("{}[quest:{}]", offer.prompt, offer.quest_name.replace('@', " ")),
    }
}

fn accept_special_order<B>(board: &mut B, interaction: &NpcInteraction, order: SpecialOrder) -> NpcOutcome
where
    B: OrderBoard + ?Sized,
{
    let dialogue = interaction
        .dialogue
        .get(&format!("order_{}", order.quest_key))
        .cloned()
        .unwrap_or_else(|| order.description.clone());

    board.accept(&order);

    let notices = vec![
        HostNotice::Hud {
            string_key: ORDER_ACCEPTED_HUD_KEY.to_string(),
        },
        HostNotice::Chat {
            key: ORDER_ACCEPTED_CHAT_KEY.to_string(),
            args: vec![interaction.player.clone(), order.name.clone()],
        },
    ];

    NpcOutcome::SpecialOrderAccepted {
        order,
        dialogue,
        notices,
    }
}
