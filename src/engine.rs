//! Quest Engine
//!
//! Wires the condition manager, offers, and quests together. Every offer
//! gets a condition in its category; when an event fires any condition a
//! message is built and the quests behind the fired offers are adjusted.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info};

use crate::condition::{
    Condition, ConditionManager, ConditionMatch, Hook, HookCategory, RawEvent,
};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::message::Message;
use crate::offer::{Offer, QuestOfferManager};
use crate::quest::{Quest, QuestDefinition, QuestManager, QuestTransition};

/// Prefix of condition ids generated for offers
pub const OFFER_CONDITION_PREFIX: &str = "offer:";

/// What one event did
#[derive(Debug, Clone, Serialize)]
pub struct EventOutcome {
    pub category: HookCategory,
    pub matches: Vec<ConditionMatch>,
    pub message: Option<Message>,
    pub transitions: Vec<QuestTransition>,
}

impl EventOutcome {
    fn unmatched(category: HookCategory) -> Self {
        Self {
            category,
            matches: Vec::new(),
            message: None,
            transitions: Vec::new(),
        }
    }

    /// Whether any quest changed state
    pub fn offered_anything(&self) -> bool {
        !self.transitions.is_empty()
    }
}

pub struct QuestEngine {
    config: EngineConfig,
    conditions: ConditionManager,
    offers: QuestOfferManager,
    quests: QuestManager,
    next_ordinal: u64,
}

impl QuestEngine {
    /// Engine without any hooks registered
    pub fn new(config: EngineConfig) -> Result<Self> {
        Ok(Self {
            quests: QuestManager::new(config.quest_id_base),
            conditions: ConditionManager::new()?,
            offers: QuestOfferManager::new(),
            config,
            next_ordinal: 0,
        })
    }

    /// Engine with a hook for every known category
    pub fn with_default_hooks(config: EngineConfig) -> Result<Self> {
        let mut engine = Self::new(config)?;
        for category in [HookCategory::Tile, HookCategory::Npc, HookCategory::Time] {
            engine.register_hook(Hook::for_category(category))?;
        }
        Ok(engine)
    }

    pub fn register_hook(&mut self, hook: Hook) -> Result<()> {
        self.conditions.register_hook(hook)
    }

    pub fn register_condition(&mut self, condition: Condition) {
        self.conditions.register_condition(condition);
    }

    pub fn add_quest(&mut self, definition: QuestDefinition) {
        self.quests.add_definition(definition);
    }

    /// Register an offer and the condition that triggers it
    pub fn add_offer(&mut self, offer: Offer) {
        let index = self.offers.len();
        self.conditions.register_condition(offer.condition(index));
        self.offers.add_offer(offer);
    }

    /// Load quests, then offers, from the configured data directory
    pub fn load_content(&mut self) -> Result<()> {
        let data_dir = self.config.data_dir.clone();
        self.quests.load_from_directory(&data_dir)?;

        let before = self.offers.len();
        self.offers.load_from_directory(&data_dir)?;
        for (index, offer) in self.offers.all().enumerate().skip(before) {
            self.conditions.register_condition(offer.condition(index));
        }

        info!(
            "Content loaded: {} quests, {} offers",
            self.quests.len(),
            self.offers.len()
        );
        Ok(())
    }

    /// Replace offers with what is on disk now. Quest states survive.
    pub fn reload_content(&mut self) -> Result<()> {
        let removed = self
            .conditions
            .remove_conditions(|c| c.id.starts_with(OFFER_CONDITION_PREFIX));
        self.offers.clear();
        debug!("Dropped {} offer conditions for reload", removed);

        self.load_content()
    }

    /// Feed one raw event through the hooks.
    ///
    /// Quests behind offers whose conditions fired move to Offered.
    pub fn notify(&mut self, event: RawEvent) -> EventOutcome {
        let category = event.category();
        let matches = self.conditions.notify(event);
        if matches.is_empty() {
            return EventOutcome::unmatched(category);
        }

        let Some(context) = self.conditions.context(category) else {
            return EventOutcome::unmatched(category);
        };
        self.next_ordinal += 1;
        let message = Message::from_context(self.next_ordinal, &context);

        let fired: HashSet<&str> = matches.iter().map(|m| m.condition_id.as_str()).collect();
        // Secret offers still trigger; secrecy only hides them from hints
        let candidates: Vec<&Offer> = self
            .offers
            .matched_entries(category, &self.quests, true)
            .filter(|(index, offer)| fired.contains(offer.condition_id(*index).as_str()))
            .map(|(_, offer)| offer)
            .collect();

        let transitions = self.quests.adjust_quest(&message, candidates);

        debug!(
            "{} event #{}: {} conditions matched, {} quests offered",
            category,
            message.ordinal(),
            matches.len(),
            transitions.len()
        );

        EventOutcome {
            category,
            matches,
            message: Some(message),
            transitions,
        }
    }

    pub fn accept_quest(&mut self, name: &str) -> Result<QuestTransition> {
        self.quests.accept(name)
    }

    pub fn complete_quest(&mut self, name: &str) -> Result<QuestTransition> {
        self.quests.complete(name)
    }

    pub fn fail_quest(&mut self, name: &str) -> Result<QuestTransition> {
        self.quests.fail(name)
    }

    pub fn fetch(&self, name: &str) -> Option<&Quest> {
        self.quests.fetch(name)
    }

    pub fn resolve_game_quest_id(&self, name: &str) -> Option<i64> {
        self.quests.resolve_game_quest_id(name)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn conditions(&self) -> &ConditionManager {
        &self.conditions
    }

    pub fn offers(&self) -> &QuestOfferManager {
        &self.offers
    }

    pub fn quests(&self) -> &QuestManager {
        &self.quests
    }
}
